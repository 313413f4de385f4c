//! Group-fairness statistics over a weighted, labeled dataset
//!
//! All counts are weighted: an instance contributes its weight, not 1, so
//! the same statistics apply before and after reweighing.

use serde::Serialize;

use super::dataset::{Dataset, Label, Membership};
use super::error::{FairnessError, Result};
use super::group::{BoundSelector, GroupSelector};

/// Per-group weighted counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    /// Selector description, e.g. `{age: privileged}`
    pub selector: String,
    /// Total weight of the group
    pub weight: f64,
    /// Weight of favorable instances in the group
    pub favorable_weight: f64,
    /// Favorable rate `favorable_weight / weight`
    pub base_rate: f64,
}

/// Snapshot of both groups plus the derived fairness statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub privileged: GroupStats,
    pub unprivileged: GroupStats,
    pub total_weight: f64,
    pub mean_difference: f64,
    /// `None` when the privileged base rate is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disparate_impact: Option<f64>,
}

/// Fairness metrics for one dataset and a privileged/unprivileged group pair
pub struct DatasetMetric<'a> {
    dataset: &'a Dataset,
    privileged: GroupSelector,
    unprivileged: GroupSelector,
    privileged_bound: BoundSelector,
    unprivileged_bound: BoundSelector,
}

impl<'a> DatasetMetric<'a> {
    /// # Errors
    /// `UnknownAttribute` if a selector names an attribute the dataset does not protect
    pub fn new(
        dataset: &'a Dataset,
        privileged: &GroupSelector,
        unprivileged: &GroupSelector,
    ) -> Result<Self> {
        Ok(Self {
            dataset,
            privileged_bound: privileged.bind(dataset)?,
            unprivileged_bound: unprivileged.bind(dataset)?,
            privileged: privileged.clone(),
            unprivileged: unprivileged.clone(),
        })
    }

    fn selector(&self, group: Membership) -> (&GroupSelector, &BoundSelector) {
        match group {
            Membership::Privileged => (&self.privileged, &self.privileged_bound),
            Membership::Unprivileged => (&self.unprivileged, &self.unprivileged_bound),
        }
    }

    /// Weighted mass of instances in `group` (whole dataset when `None`)
    /// carrying `label` (any label when `None`)
    fn mass(&self, group: Option<Membership>, label: Option<Label>) -> f64 {
        let bound = group.map(|g| self.selector(g).1);
        self.dataset
            .instances()
            .iter()
            .filter(|i| bound.map_or(true, |b| b.matches(i)))
            .filter(|i| label.map_or(true, |l| i.label() == l))
            .map(|i| i.weight())
            .sum()
    }

    /// Weighted number of instances in `group`, or in the whole dataset for `None`
    pub fn num_instances(&self, group: Option<Membership>) -> f64 {
        self.mass(group, None)
    }

    /// Weighted number of favorable instances
    pub fn num_positives(&self, group: Option<Membership>) -> f64 {
        self.mass(group, Some(Label::Favorable))
    }

    /// Weighted number of unfavorable instances
    pub fn num_negatives(&self, group: Option<Membership>) -> f64 {
        self.mass(group, Some(Label::Unfavorable))
    }

    /// `P(favorable | group)`
    ///
    /// # Errors
    /// `EmptyGroup` if the group has zero total weight
    pub fn base_rate(&self, group: Option<Membership>) -> Result<f64> {
        let total = self.num_instances(group);
        if total <= 0.0 {
            let description = match group {
                Some(g) => self.selector(g).0.to_string(),
                None => "{}".to_string(),
            };
            return Err(FairnessError::EmptyGroup { group: description });
        }
        Ok(self.num_positives(group) / total)
    }

    /// `P(favorable | unprivileged) - P(favorable | privileged)`
    ///
    /// Negative values mean the unprivileged group receives the favorable
    /// outcome less often.
    pub fn mean_difference(&self) -> Result<f64> {
        let unprivileged = self.base_rate(Some(Membership::Unprivileged))?;
        let privileged = self.base_rate(Some(Membership::Privileged))?;
        Ok(unprivileged - privileged)
    }

    /// Same statistic as [`mean_difference`](Self::mean_difference)
    pub fn statistical_parity_difference(&self) -> Result<f64> {
        self.mean_difference()
    }

    /// `P(favorable | unprivileged) / P(favorable | privileged)`
    ///
    /// # Errors
    /// `EmptyGroup` for an empty group, `ZeroBaseRate` when the privileged
    /// group never receives the favorable outcome
    pub fn disparate_impact(&self) -> Result<f64> {
        let unprivileged = self.base_rate(Some(Membership::Unprivileged))?;
        let privileged = self.base_rate(Some(Membership::Privileged))?;
        if privileged == 0.0 {
            return Err(FairnessError::ZeroBaseRate);
        }
        Ok(unprivileged / privileged)
    }

    fn group_stats(&self, group: Membership) -> Result<GroupStats> {
        Ok(GroupStats {
            selector: self.selector(group).0.to_string(),
            weight: self.num_instances(Some(group)),
            favorable_weight: self.num_positives(Some(group)),
            base_rate: self.base_rate(Some(group))?,
        })
    }

    /// Collect group counts and derived statistics in one value
    pub fn group_summary(&self) -> Result<GroupSummary> {
        let privileged = self.group_stats(Membership::Privileged)?;
        let unprivileged = self.group_stats(Membership::Unprivileged)?;
        let disparate_impact = match self.disparate_impact() {
            Ok(ratio) => Some(ratio),
            Err(FairnessError::ZeroBaseRate) => None,
            Err(e) => return Err(e),
        };

        Ok(GroupSummary {
            mean_difference: unprivileged.base_rate - privileged.base_rate,
            total_weight: self.num_instances(None),
            privileged,
            unprivileged,
            disparate_impact,
        })
    }
}

/// Shorthand for [`DatasetMetric::mean_difference`]
pub fn mean_difference(
    dataset: &Dataset,
    privileged: &GroupSelector,
    unprivileged: &GroupSelector,
) -> Result<f64> {
    DatasetMetric::new(dataset, privileged, unprivileged)?.mean_difference()
}
