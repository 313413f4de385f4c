//! End-to-end bias audit: split, measure, reweigh, measure again

use anyhow::{Context, Result};
use serde::Serialize;

use super::dataset::Dataset;
use super::error::{FairnessError, Result as FairnessResult};
use super::group::GroupSelector;
use super::loader::{ensure_input_present, load_dataset};
use super::metric::{DatasetMetric, GroupSummary};
use super::reweighing::{FittedReweighing, Reweighing};
use super::split::SplitConfig;
use crate::config::AuditConfig;

/// Serializable results of one audit
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub total_instances: usize,
    pub train_instances: usize,
    pub test_instances: usize,
    /// Training partition before mitigation
    pub train_before: GroupSummary,
    /// Training partition after reweighing
    pub train_after: GroupSummary,
    /// Test partition (left unweighted) for reference; `None` when the test
    /// partition lacks one of the groups
    pub test: Option<GroupSummary>,
    pub reweighing: FittedReweighing,
}

impl AuditReport {
    pub fn mean_difference_before(&self) -> f64 {
        self.train_before.mean_difference
    }

    pub fn mean_difference_after(&self) -> f64 {
        self.train_after.mean_difference
    }
}

/// Audit results plus the partitions they were computed on
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub report: AuditReport,
    pub train: Dataset,
    pub test: Dataset,
    pub reweighted_train: Dataset,
}

/// Run the audit on an in-memory dataset.
///
/// Splits, computes the group summary on the training partition, fits
/// Reweighing on it and recomputes the summary on the reweighted copy.
pub fn audit_dataset(
    dataset: &Dataset,
    privileged: &GroupSelector,
    unprivileged: &GroupSelector,
    split: &SplitConfig,
) -> FairnessResult<AuditOutcome> {
    let (train, test) = dataset.split_with(split)?;

    let train_before = DatasetMetric::new(&train, privileged, unprivileged)?.group_summary()?;
    log::info!(
        "Mean difference on training data: {:.6}",
        train_before.mean_difference
    );

    let reweighing = Reweighing::new(privileged.clone(), unprivileged.clone()).fit(&train)?;
    let reweighted_train = reweighing.transform(&train)?;

    let train_after =
        DatasetMetric::new(&reweighted_train, privileged, unprivileged)?.group_summary()?;
    log::info!(
        "Mean difference after reweighing: {:.6}",
        train_after.mean_difference
    );

    let test_summary = summarize_test(&test, privileged, unprivileged)?;

    let report = AuditReport {
        total_instances: dataset.len(),
        train_instances: train.len(),
        test_instances: test.len(),
        train_before,
        train_after,
        test: test_summary,
        reweighing,
    };

    Ok(AuditOutcome {
        report,
        train,
        test,
        reweighted_train,
    })
}

fn summarize_test(
    test: &Dataset,
    privileged: &GroupSelector,
    unprivileged: &GroupSelector,
) -> FairnessResult<Option<GroupSummary>> {
    if test.is_empty() {
        return Ok(None);
    }
    match DatasetMetric::new(test, privileged, unprivileged)?.group_summary() {
        Ok(summary) => Ok(Some(summary)),
        Err(FairnessError::EmptyGroup { group }) => {
            log::warn!("Test partition has no instances in group {}; skipping its summary", group);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load the configured input and run the audit on it.
///
/// Writes the JSON export when the config names an export path.
pub fn run_audit(config: &AuditConfig) -> Result<AuditOutcome> {
    config.validate()?;
    ensure_input_present(&config.input, config.source_url.as_deref())?;

    let dataset = load_dataset(&config.input, &config.csv, &config.schema)?;
    let outcome = audit_dataset(
        &dataset,
        &config.privileged_groups,
        &config.unprivileged_groups,
        &config.split,
    )
    .with_context(|| format!("Audit of {} failed", config.input.display()))?;

    if let Some(path) = &config.export {
        crate::report::export_audit(&outcome.report, config, path)?;
        log::info!("Exported audit results to {}", path.display());
    }

    Ok(outcome)
}
