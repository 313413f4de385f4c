//! Group selectors over protected-attribute memberships
//!
//! A selector is a conjunction of `attribute -> membership` conditions, e.g.
//! `{age: privileged}`. Groups are evaluated on demand against a dataset and
//! never stored on it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, Instance, Membership};
use super::error::Result;

/// Conjunction of protected-attribute conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSelector {
    conditions: BTreeMap<String, Membership>,
}

impl GroupSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector for instances privileged under `attribute`
    pub fn privileged(attribute: impl Into<String>) -> Self {
        Self::new().with(attribute, Membership::Privileged)
    }

    /// Selector for instances unprivileged under `attribute`
    pub fn unprivileged(attribute: impl Into<String>) -> Self {
        Self::new().with(attribute, Membership::Unprivileged)
    }

    /// Add a condition
    pub fn with(mut self, attribute: impl Into<String>, membership: Membership) -> Self {
        self.conditions.insert(attribute.into(), membership);
        self
    }

    pub fn conditions(&self) -> &BTreeMap<String, Membership> {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Resolve attribute names against a dataset
    pub(crate) fn bind(&self, dataset: &Dataset) -> Result<BoundSelector> {
        let conditions = self
            .conditions
            .iter()
            .map(|(attribute, &membership)| {
                dataset
                    .attribute_index(attribute)
                    .map(|idx| (idx, membership))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BoundSelector { conditions })
    }
}

impl fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .conditions
            .iter()
            .map(|(attribute, membership)| format!("{}: {}", attribute, membership))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// A selector whose attribute names were resolved to membership indices
#[derive(Debug, Clone)]
pub(crate) struct BoundSelector {
    conditions: Vec<(usize, Membership)>,
}

impl BoundSelector {
    pub(crate) fn matches(&self, instance: &Instance) -> bool {
        self.conditions
            .iter()
            .all(|&(idx, membership)| instance.membership(idx) == Some(membership))
    }
}
