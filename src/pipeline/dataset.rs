//! Labeled, weighted instances with resolved protected-attribute memberships

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{FairnessError, Result};
use super::schema::{ColumnRole, DatasetSchema, ProtectedAttributeSpec};
use super::weights::{total_weight, validate_weight};

/// A single cell of the raw table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl Value {
    /// Numeric view of the value. Categorical values are parsed when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(x) => Some(*x),
            Value::Categorical(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    /// String key used when matching against configured value sets.
    ///
    /// Numbers use `{}` formatting, so `1.0` matches the configured value `"1"`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Numeric(x) => Some(format!("{}", x)),
            Value::Categorical(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Whether this value equals a configured entry.
    ///
    /// Numeric values compare numerically against entries that parse as
    /// numbers, so `"1.0"` and `"1"` both match `1.0`. Other entries fall back
    /// to the string key.
    pub fn matches_key(&self, configured: &str) -> bool {
        if let Value::Numeric(x) = self {
            if let Ok(parsed) = configured.trim().parse::<f64>() {
                return parsed == *x;
            }
        }
        self.as_key().as_deref() == Some(configured)
    }

    /// Whether any configured entry matches this value
    pub fn matches_any(&self, configured: &[String]) -> bool {
        configured.iter().any(|entry| self.matches_key(entry))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(x) => write!(f, "{}", x),
            Value::Categorical(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Numeric(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Numeric(x as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Categorical(s)
    }
}

/// Binary outcome of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Favorable,
    Unfavorable,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Favorable => write!(f, "favorable"),
            Label::Unfavorable => write!(f, "unfavorable"),
        }
    }
}

/// Side of a protected attribute's rule an instance falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Privileged,
    Unprivileged,
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::Privileged => write!(f, "privileged"),
            Membership::Unprivileged => write!(f, "unprivileged"),
        }
    }
}

/// One row of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    features: Vec<Value>,
    label: Label,
    memberships: Vec<Membership>,
    weight: f64,
}

impl Instance {
    /// Create an instance with the default weight of 1.0
    pub fn new(features: Vec<Value>, label: Label, memberships: Vec<Membership>) -> Self {
        Self {
            features,
            label,
            memberships,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn features(&self) -> &[Value] {
        &self.features
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn is_favorable(&self) -> bool {
        self.label == Label::Favorable
    }

    /// Membership under the protected attribute at `attribute_index`
    pub fn membership(&self, attribute_index: usize) -> Option<Membership> {
        self.memberships.get(attribute_index).copied()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

/// An ordered collection of instances sharing one feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    protected_attributes: Vec<ProtectedAttributeSpec>,
    instances: Vec<Instance>,
}

impl Dataset {
    /// Build a dataset from raw named columns using an explicit schema.
    ///
    /// Columns with the `Feature` or `ProtectedAttribute` role become the
    /// feature vector (in the order supplied). The label column is resolved
    /// through the schema's [`LabelSpec`](super::schema::LabelSpec), each
    /// protected attribute through its rule, and the weight column (if any)
    /// becomes the instance weight, with missing weights defaulting to 1.0.
    ///
    /// # Errors
    /// - `UnknownColumn` if a column named by the schema is absent
    /// - `ColumnLengthMismatch` if columns have different lengths
    /// - `UnresolvedLabel` / `UnresolvedProtectedValue` for values matching
    ///   neither side of their rule
    /// - `InvalidWeight` for negative or non-finite weights
    pub fn from_columns(schema: &DatasetSchema, columns: Vec<(String, Vec<Value>)>) -> Result<Self> {
        schema.validate()?;

        let n_rows = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
        for (name, values) in &columns {
            if values.len() != n_rows {
                return Err(FairnessError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: n_rows,
                    found: values.len(),
                });
            }
        }

        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect();
        let lookup = |name: &str| -> Result<usize> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| FairnessError::UnknownColumn {
                    column: name.to_string(),
                })
        };

        let label_idx = lookup(&schema.label.column)?;
        let protected_idx = schema
            .protected_attributes
            .iter()
            .map(|spec| lookup(&spec.name))
            .collect::<Result<Vec<_>>>()?;
        let weight_idx = schema.weight_column.as_deref().map(lookup).transpose()?;

        let feature_cols: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| {
                matches!(
                    schema.role_of(name),
                    ColumnRole::Feature | ColumnRole::ProtectedAttribute
                )
            })
            .map(|(i, _)| i)
            .collect();
        let feature_names = feature_cols.iter().map(|&i| columns[i].0.clone()).collect();

        let mut instances = Vec::with_capacity(n_rows);
        let mut defaulted_weights = 0usize;

        for row in 0..n_rows {
            let raw_label = &columns[label_idx].1[row];
            let label = schema
                .label
                .resolve(raw_label)
                .ok_or_else(|| FairnessError::UnresolvedLabel {
                    column: schema.label.column.clone(),
                    value: raw_label.to_string(),
                    row,
                })?;

            let memberships = schema
                .protected_attributes
                .iter()
                .zip(&protected_idx)
                .map(|(spec, &col)| {
                    let raw = &columns[col].1[row];
                    spec.rule
                        .resolve(raw)
                        .ok_or_else(|| FairnessError::UnresolvedProtectedValue {
                            attribute: spec.name.clone(),
                            value: raw.to_string(),
                            row,
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let weight = match weight_idx.map(|col| &columns[col].1[row]) {
                None => 1.0,
                Some(Value::Missing) => {
                    defaulted_weights += 1;
                    1.0
                }
                Some(raw) => validate_weight(row, raw.as_f64().unwrap_or(f64::NAN))?,
            };

            let features = feature_cols
                .iter()
                .map(|&col| columns[col].1[row].clone())
                .collect();

            instances.push(Instance {
                features,
                label,
                memberships,
                weight,
            });
        }

        if defaulted_weights > 0 {
            log::warn!(
                "{} missing weight value(s) defaulted to 1.0",
                defaulted_weights
            );
        }
        log::debug!(
            "Built dataset with {} instances and {} features",
            instances.len(),
            feature_cols.len()
        );

        Ok(Self {
            feature_names,
            protected_attributes: schema.protected_attributes.clone(),
            instances,
        })
    }

    /// Build a dataset from already-resolved instances.
    ///
    /// Every instance must carry one value per feature name, one membership
    /// per protected attribute and a valid weight.
    pub fn from_instances(
        feature_names: Vec<String>,
        protected_attributes: Vec<ProtectedAttributeSpec>,
        instances: Vec<Instance>,
    ) -> Result<Self> {
        for (row, instance) in instances.iter().enumerate() {
            if instance.features.len() != feature_names.len() {
                return Err(FairnessError::ColumnLengthMismatch {
                    column: format!("features of row {}", row),
                    expected: feature_names.len(),
                    found: instance.features.len(),
                });
            }
            if instance.memberships.len() != protected_attributes.len() {
                return Err(FairnessError::ColumnLengthMismatch {
                    column: format!("memberships of row {}", row),
                    expected: protected_attributes.len(),
                    found: instance.memberships.len(),
                });
            }
            validate_weight(row, instance.weight)?;
        }

        Ok(Self {
            feature_names,
            protected_attributes,
            instances,
        })
    }

    /// New dataset with the same schema and the given instances
    pub(crate) fn with_instances(&self, instances: Vec<Instance>) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            protected_attributes: self.protected_attributes.clone(),
            instances,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn protected_attributes(&self) -> &[ProtectedAttributeSpec] {
        &self.protected_attributes
    }

    /// Position of a protected attribute within each instance's memberships
    pub fn attribute_index(&self, attribute: &str) -> Result<usize> {
        self.protected_attributes
            .iter()
            .position(|spec| spec.name == attribute)
            .ok_or_else(|| FairnessError::UnknownAttribute {
                attribute: attribute.to_string(),
            })
    }

    /// Look up a feature value by row and feature name
    pub fn feature(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.feature_names.iter().position(|f| f == name)?;
        self.instances.get(row)?.features.get(col)
    }

    pub fn weights(&self) -> Vec<f64> {
        self.instances.iter().map(|i| i.weight).collect()
    }

    pub fn total_weight(&self) -> f64 {
        total_weight(&self.weights())
    }
}
