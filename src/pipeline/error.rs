//! Error types for fairness metrics, reweighing and dataset construction.
//!
//! Every variant is reported synchronously to the caller. The computations
//! are deterministic, so nothing here is worth retrying.

use thiserror::Error;

use super::dataset::{Label, Membership};

/// Convenience alias used throughout the core pipeline.
pub type Result<T> = std::result::Result<T, FairnessError>;

/// Errors that can occur while building datasets or computing fairness statistics.
#[derive(Debug, Error, PartialEq)]
pub enum FairnessError {
    /// A privileged/unprivileged group has zero total weight.
    ///
    /// Rates conditioned on an empty group are undefined, so the metric
    /// refuses to produce a value rather than defaulting to zero.
    #[error("Group {group} is empty (total weight is zero)")]
    EmptyGroup {
        /// Human-readable description of the group selector
        group: String,
    },

    /// One of the four group/label cells has zero observed mass.
    ///
    /// The reweighing factor for that cell would divide by zero.
    #[error("Cannot reweigh: no weight mass for {membership} instances with {label} label")]
    DegenerateDistribution {
        /// Group side of the empty cell
        membership: Membership,
        /// Label of the empty cell
        label: Label,
    },

    /// Split fraction outside the open interval (0, 1).
    #[error("Split fraction must be in (0, 1), got {0}")]
    InvalidSplitFraction(f64),

    /// Operation needs more instances than the dataset holds.
    #[error("At least {required} instances are required, found {found}")]
    TooFewInstances {
        /// Minimum number of instances the operation needs
        required: usize,
        /// Number of instances actually present
        found: usize,
    },

    /// The privileged base rate is zero, so a ratio metric is undefined.
    #[error("Privileged group has a zero favorable rate; ratio is undefined")]
    ZeroBaseRate,

    /// A protected attribute value matched neither side of its rule.
    #[error("Value '{value}' of protected attribute '{attribute}' at row {row} is neither privileged nor unprivileged")]
    UnresolvedProtectedValue {
        attribute: String,
        value: String,
        row: usize,
    },

    /// A label value matched neither the favorable nor unfavorable set.
    #[error("Label value '{value}' in column '{column}' at row {row} is neither favorable nor unfavorable")]
    UnresolvedLabel {
        column: String,
        value: String,
        row: usize,
    },

    /// A column named by the schema was not supplied.
    #[error("Column '{column}' not found in dataset")]
    UnknownColumn { column: String },

    /// A group selector refers to an attribute that is not protected in this dataset.
    #[error("'{attribute}' is not a protected attribute of this dataset")]
    UnknownAttribute { attribute: String },

    /// Supplied columns have different row counts.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Weights must be finite and non-negative.
    #[error("Invalid weight {value} at row {row}: weights must be finite and non-negative")]
    InvalidWeight { row: usize, value: f64 },

    /// An instance satisfied both the privileged and unprivileged selectors.
    #[error("Instance at row {row} belongs to both the privileged and unprivileged groups")]
    OverlappingGroups { row: usize },

    /// A privileged rule that can never be evaluated (e.g. an empty value set).
    #[error("Invalid rule for '{attribute}': {reason}")]
    InvalidRule { attribute: String, reason: String },
}
