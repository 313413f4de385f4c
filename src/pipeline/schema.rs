//! Explicit dataset schema: column roles, label mapping and protected-attribute rules
//!
//! Column roles are declared up front instead of being inferred from column
//! names, so a dataset is only ever built against a schema the caller wrote.

use serde::{Deserialize, Serialize};

use super::dataset::{Label, Membership, Value};
use super::error::{FairnessError, Result};

/// Role a raw column plays when building a [`Dataset`](super::Dataset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Feature,
    Label,
    ProtectedAttribute,
    Weight,
    Ignored,
}

/// Rule splitting a protected attribute's values into privileged/unprivileged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrivilegedRule {
    /// Match on the value's string form.
    ///
    /// When `unprivileged` is omitted every value outside `privileged` is
    /// unprivileged; otherwise a value in neither set does not resolve.
    Values {
        privileged: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unprivileged: Option<Vec<String>>,
    },
    /// Numeric range `[min, max)`; either bound may be open.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl PrivilegedRule {
    /// Privileged when the value is at least `min`
    pub fn at_least(min: f64) -> Self {
        PrivilegedRule::Range {
            min: Some(min),
            max: None,
        }
    }

    /// Privileged when the value is one of `privileged`, unprivileged otherwise
    pub fn values<I, S>(privileged: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrivilegedRule::Values {
            privileged: privileged.into_iter().map(Into::into).collect(),
            unprivileged: None,
        }
    }

    /// Privileged/unprivileged value sets; anything else fails to resolve
    pub fn value_sets<I, J, S, T>(privileged: I, unprivileged: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        PrivilegedRule::Values {
            privileged: privileged.into_iter().map(Into::into).collect(),
            unprivileged: Some(unprivileged.into_iter().map(Into::into).collect()),
        }
    }

    /// Resolve a raw value to a membership, or `None` when it matches neither side
    pub fn resolve(&self, value: &Value) -> Option<Membership> {
        match self {
            PrivilegedRule::Values {
                privileged,
                unprivileged,
            } => {
                if value.is_missing() {
                    return None;
                }
                if value.matches_any(privileged) {
                    Some(Membership::Privileged)
                } else {
                    match unprivileged {
                        None => Some(Membership::Unprivileged),
                        Some(set) if value.matches_any(set) => Some(Membership::Unprivileged),
                        Some(_) => None,
                    }
                }
            }
            PrivilegedRule::Range { min, max } => {
                let x = value.as_f64()?;
                if x.is_nan() {
                    return None;
                }
                let above_min = min.map_or(true, |m| x >= m);
                let below_max = max.map_or(true, |m| x < m);
                if above_min && below_max {
                    Some(Membership::Privileged)
                } else {
                    Some(Membership::Unprivileged)
                }
            }
        }
    }

    fn validate(&self, attribute: &str) -> Result<()> {
        let invalid = |reason: &str| FairnessError::InvalidRule {
            attribute: attribute.to_string(),
            reason: reason.to_string(),
        };

        match self {
            PrivilegedRule::Values {
                privileged,
                unprivileged,
            } => {
                if privileged.is_empty() {
                    return Err(invalid("privileged value set is empty"));
                }
                if let Some(set) = unprivileged {
                    if set.iter().any(|v| privileged.contains(v)) {
                        return Err(invalid("a value is both privileged and unprivileged"));
                    }
                }
            }
            PrivilegedRule::Range { min, max } => match (min, max) {
                (None, None) => return Err(invalid("range needs at least one bound")),
                (Some(lo), Some(hi)) if !(lo < hi) => {
                    return Err(invalid("range minimum must be below its maximum"))
                }
                _ => {
                    if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
                        return Err(invalid("range bounds must be numbers"));
                    }
                }
            },
        }

        Ok(())
    }
}

/// A protected attribute and the rule deciding who is privileged under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedAttributeSpec {
    pub name: String,
    pub rule: PrivilegedRule,
}

impl ProtectedAttributeSpec {
    pub fn new(name: impl Into<String>, rule: PrivilegedRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Mapping from a label column's raw values to favorable/unfavorable outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    /// Label column name
    pub column: String,
    /// Values that count as a favorable outcome
    pub favorable: Vec<String>,
    /// Values that count as unfavorable; everything else when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfavorable: Option<Vec<String>>,
}

impl LabelSpec {
    pub fn new<I, S>(column: impl Into<String>, favorable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            favorable: favorable.into_iter().map(Into::into).collect(),
            unfavorable: None,
        }
    }

    pub fn with_unfavorable<I, S>(mut self, unfavorable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unfavorable = Some(unfavorable.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve a raw label value, or `None` when it matches neither set
    pub fn resolve(&self, value: &Value) -> Option<Label> {
        if value.is_missing() {
            return None;
        }
        if value.matches_any(&self.favorable) {
            return Some(Label::Favorable);
        }
        match &self.unfavorable {
            None => Some(Label::Unfavorable),
            Some(set) if value.matches_any(set) => Some(Label::Unfavorable),
            Some(_) => None,
        }
    }
}

/// Explicit column roles for building a dataset from a raw table.
///
/// Any column not named here is a plain feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub label: LabelSpec,
    pub protected_attributes: Vec<ProtectedAttributeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_column: Option<String>,
    /// Columns dropped before building feature vectors
    #[serde(default)]
    pub ignored_columns: Vec<String>,
}

impl DatasetSchema {
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if column == self.label.column {
            ColumnRole::Label
        } else if self.weight_column.as_deref() == Some(column) {
            ColumnRole::Weight
        } else if self.ignored_columns.iter().any(|c| c == column) {
            ColumnRole::Ignored
        } else if self.protected_attributes.iter().any(|p| p.name == column) {
            ColumnRole::ProtectedAttribute
        } else {
            ColumnRole::Feature
        }
    }

    /// Columns that must be present in the raw table
    pub fn required_columns(&self) -> Vec<&str> {
        std::iter::once(self.label.column.as_str())
            .chain(self.protected_attributes.iter().map(|p| p.name.as_str()))
            .chain(self.weight_column.as_deref())
            .collect()
    }

    /// Check the schema is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.label.favorable.is_empty() {
            return Err(FairnessError::InvalidRule {
                attribute: self.label.column.clone(),
                reason: "no favorable label values configured".to_string(),
            });
        }

        for (i, spec) in self.protected_attributes.iter().enumerate() {
            spec.rule.validate(&spec.name)?;

            let conflict = if spec.name == self.label.column {
                Some("protected attribute is also the label column")
            } else if self.weight_column.as_deref() == Some(spec.name.as_str()) {
                Some("protected attribute is also the weight column")
            } else if self.ignored_columns.contains(&spec.name) {
                Some("protected attribute is listed as ignored")
            } else if self.protected_attributes[..i].iter().any(|p| p.name == spec.name) {
                Some("protected attribute is declared twice")
            } else {
                None
            };

            if let Some(reason) = conflict {
                return Err(FairnessError::InvalidRule {
                    attribute: spec.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rule_resolves() {
        let rule = PrivilegedRule::at_least(25.0);
        assert_eq!(rule.resolve(&Value::Numeric(25.0)), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::Numeric(24.9)), Some(Membership::Unprivileged));
        assert_eq!(rule.resolve(&Value::from("67")), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::from("old")), None);
        assert_eq!(rule.resolve(&Value::Missing), None);
    }

    #[test]
    fn test_bounded_range_rule() {
        let rule = PrivilegedRule::Range {
            min: Some(25.0),
            max: Some(65.0),
        };
        assert_eq!(rule.resolve(&Value::Numeric(40.0)), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::Numeric(65.0)), Some(Membership::Unprivileged));
    }

    #[test]
    fn test_value_rule_complement() {
        let rule = PrivilegedRule::values(["male"]);
        assert_eq!(rule.resolve(&Value::from("male")), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::from("female")), Some(Membership::Unprivileged));
    }

    #[test]
    fn test_value_sets_reject_unknown() {
        let rule = PrivilegedRule::value_sets(["1"], ["0"]);
        assert_eq!(rule.resolve(&Value::Numeric(1.0)), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::Numeric(0.0)), Some(Membership::Unprivileged));
        assert_eq!(rule.resolve(&Value::Numeric(2.0)), None);
    }

    #[test]
    fn test_numeric_values_match_decimal_entries() {
        let spec = LabelSpec::new("credit", ["1.0"]);
        assert_eq!(spec.resolve(&Value::Numeric(1.0)), Some(Label::Favorable));
        assert_eq!(spec.resolve(&Value::Numeric(2.0)), Some(Label::Unfavorable));

        let rule = PrivilegedRule::values(["25.0"]);
        assert_eq!(rule.resolve(&Value::Numeric(25.0)), Some(Membership::Privileged));
        assert_eq!(rule.resolve(&Value::Numeric(30.0)), Some(Membership::Unprivileged));
        assert_eq!(rule.resolve(&Value::Missing), None);
    }

    #[test]
    fn test_categorical_values_match_exactly() {
        let spec = LabelSpec::new("credit", ["good"]).with_unfavorable(["bad"]);
        assert_eq!(spec.resolve(&Value::from("good")), Some(Label::Favorable));
        assert_eq!(spec.resolve(&Value::from("Good")), None);
        assert_eq!(spec.resolve(&Value::Missing), None);
    }

    #[test]
    fn test_label_spec_resolves() {
        let spec = LabelSpec::new("credit", ["1"]).with_unfavorable(["2"]);
        assert_eq!(spec.resolve(&Value::Numeric(1.0)), Some(Label::Favorable));
        assert_eq!(spec.resolve(&Value::Numeric(2.0)), Some(Label::Unfavorable));
        assert_eq!(spec.resolve(&Value::Numeric(3.0)), None);
    }

    #[test]
    fn test_role_of() {
        let schema = DatasetSchema {
            label: LabelSpec::new("credit", ["1"]),
            protected_attributes: vec![ProtectedAttributeSpec::new(
                "age",
                PrivilegedRule::at_least(25.0),
            )],
            weight_column: Some("w".to_string()),
            ignored_columns: vec!["sex".to_string()],
        };
        assert_eq!(schema.role_of("credit"), ColumnRole::Label);
        assert_eq!(schema.role_of("age"), ColumnRole::ProtectedAttribute);
        assert_eq!(schema.role_of("w"), ColumnRole::Weight);
        assert_eq!(schema.role_of("sex"), ColumnRole::Ignored);
        assert_eq!(schema.role_of("month"), ColumnRole::Feature);
        assert_eq!(schema.required_columns(), vec!["credit", "age", "w"]);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut schema = DatasetSchema {
            label: LabelSpec::new("credit", ["1"]),
            protected_attributes: vec![ProtectedAttributeSpec::new(
                "age",
                PrivilegedRule::Range {
                    min: None,
                    max: None,
                },
            )],
            weight_column: None,
            ignored_columns: vec![],
        };
        assert!(matches!(
            schema.validate(),
            Err(FairnessError::InvalidRule { .. })
        ));

        schema.protected_attributes[0].rule = PrivilegedRule::value_sets(["a"], ["a"]);
        assert!(schema.validate().is_err());

        schema.protected_attributes[0] =
            ProtectedAttributeSpec::new("credit", PrivilegedRule::at_least(1.0));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rule_deserializes_from_json() {
        let rule: PrivilegedRule =
            serde_json::from_str(r#"{"kind": "range", "min": 25}"#).unwrap();
        assert_eq!(rule, PrivilegedRule::at_least(25.0));

        let rule: PrivilegedRule =
            serde_json::from_str(r#"{"kind": "values", "privileged": ["male"]}"#).unwrap();
        assert_eq!(rule, PrivilegedRule::values(["male"]));
    }
}
