//! Audit configuration
//!
//! An audit is described by a JSON document naming the input file, how to
//! read it, the explicit schema, the two groups to compare and the split.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{
    CsvOptions, DatasetSchema, FairnessError, GroupSelector, LabelSpec, Membership,
    PrivilegedRule, ProtectedAttributeSpec, SplitConfig,
};

/// Where the Statlog German credit data can be downloaded from
pub const GERMAN_CREDIT_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/statlog/german/german.data";

/// Column names of `german.data`, which ships without a header row
pub const GERMAN_CREDIT_COLUMNS: [&str; 21] = [
    "status",
    "month",
    "credit_history",
    "purpose",
    "credit_amount",
    "savings",
    "employment",
    "investment_as_income_percentage",
    "personal_status",
    "other_debtors",
    "residence_since",
    "property",
    "age",
    "installment_plans",
    "housing",
    "number_of_credits",
    "skill_level",
    "people_liable_for",
    "telephone",
    "foreign_worker",
    "credit",
];

/// Full description of one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Input table (CSV-like or Parquet)
    pub input: PathBuf,
    /// Where to fetch the input from when it is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub csv: CsvOptions,
    pub schema: DatasetSchema,
    pub privileged_groups: GroupSelector,
    pub unprivileged_groups: GroupSelector,
    #[serde(default)]
    pub split: SplitConfig,
    /// Optional path for the JSON export of the results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<PathBuf>,
}

impl AuditConfig {
    /// Age-bias audit of the German credit data.
    ///
    /// `age >= 25` is privileged, `credit == 1` (good) is favorable and
    /// `2` (bad) unfavorable. `personal_status` is ignored since it encodes sex.
    /// 70/30 shuffled split with a fixed seed.
    pub fn german_credit(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            source_url: Some(GERMAN_CREDIT_URL.to_string()),
            csv: CsvOptions {
                separator: ' ',
                has_header: false,
                column_names: Some(GERMAN_CREDIT_COLUMNS.iter().map(|c| c.to_string()).collect()),
                ..CsvOptions::default()
            },
            schema: DatasetSchema {
                label: LabelSpec::new("credit", ["1"]).with_unfavorable(["2"]),
                protected_attributes: vec![ProtectedAttributeSpec::new(
                    "age",
                    PrivilegedRule::at_least(25.0),
                )],
                weight_column: None,
                ignored_columns: vec!["personal_status".to_string()],
            },
            privileged_groups: GroupSelector::new().with("age", Membership::Privileged),
            unprivileged_groups: GroupSelector::new().with("age", Membership::Unprivileged),
            split: SplitConfig {
                seed: Some(42),
                ..SplitConfig::default()
            },
            export: None,
        }
    }

    /// Read and validate a configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse audit config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful audit.
    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;

        let fraction = self.split.fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(FairnessError::InvalidSplitFraction(fraction).into());
        }

        for (side, selector) in [
            ("privileged_groups", &self.privileged_groups),
            ("unprivileged_groups", &self.unprivileged_groups),
        ] {
            if selector.is_empty() {
                anyhow::bail!("{} must name at least one protected attribute", side);
            }
            for attribute in selector.conditions().keys() {
                if !self
                    .schema
                    .protected_attributes
                    .iter()
                    .any(|p| &p.name == attribute)
                {
                    return Err(FairnessError::UnknownAttribute {
                        attribute: attribute.clone(),
                    }
                    .into());
                }
            }
        }

        if self.privileged_groups == self.unprivileged_groups {
            anyhow::bail!("privileged_groups and unprivileged_groups select the same group");
        }

        if let Some(names) = &self.csv.column_names {
            for required in self.schema.required_columns() {
                if !names.iter().any(|n| n == required) {
                    anyhow::bail!(
                        "Column '{}' is required by the schema but missing from csv.column_names",
                        required
                    );
                }
            }
        }

        Ok(())
    }
}
