//! Reweighing pre-processing bias mitigation
//!
//! Assigns each (group, label) cell the factor
//!
//! ```text
//! factor(g, l) = W(g, *) * W(*, l) / (W(*, *) * W(g, l))
//! ```
//!
//! so that after reweighting the favorable rate no longer depends on group
//! membership, while every group keeps its total weight mass.

use serde::Serialize;

use super::dataset::{Dataset, Instance, Label, Membership};
use super::error::{FairnessError, Result};
use super::group::{BoundSelector, GroupSelector};

/// Observed weight mass of each of the four group/label cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellMasses {
    pub privileged_favorable: f64,
    pub privileged_unfavorable: f64,
    pub unprivileged_favorable: f64,
    pub unprivileged_unfavorable: f64,
    /// Favorable mass over the whole dataset, grouped or not
    pub total_favorable: f64,
    /// Unfavorable mass over the whole dataset, grouped or not
    pub total_unfavorable: f64,
}

impl CellMasses {
    pub fn get(&self, membership: Membership, label: Label) -> f64 {
        match (membership, label) {
            (Membership::Privileged, Label::Favorable) => self.privileged_favorable,
            (Membership::Privileged, Label::Unfavorable) => self.privileged_unfavorable,
            (Membership::Unprivileged, Label::Favorable) => self.unprivileged_favorable,
            (Membership::Unprivileged, Label::Unfavorable) => self.unprivileged_unfavorable,
        }
    }

    fn add(&mut self, membership: Membership, label: Label, weight: f64) {
        let cell = match (membership, label) {
            (Membership::Privileged, Label::Favorable) => &mut self.privileged_favorable,
            (Membership::Privileged, Label::Unfavorable) => &mut self.privileged_unfavorable,
            (Membership::Unprivileged, Label::Favorable) => &mut self.unprivileged_favorable,
            (Membership::Unprivileged, Label::Unfavorable) => &mut self.unprivileged_unfavorable,
        };
        *cell += weight;
    }

    pub fn group_total(&self, membership: Membership) -> f64 {
        self.get(membership, Label::Favorable) + self.get(membership, Label::Unfavorable)
    }

    pub fn label_total(&self, label: Label) -> f64 {
        match label {
            Label::Favorable => self.total_favorable,
            Label::Unfavorable => self.total_unfavorable,
        }
    }

    pub fn total(&self) -> f64 {
        self.total_favorable + self.total_unfavorable
    }
}

/// Multiplicative weight factor of each cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellFactors {
    pub privileged_favorable: f64,
    pub privileged_unfavorable: f64,
    pub unprivileged_favorable: f64,
    pub unprivileged_unfavorable: f64,
}

impl CellFactors {
    pub fn get(&self, membership: Membership, label: Label) -> f64 {
        match (membership, label) {
            (Membership::Privileged, Label::Favorable) => self.privileged_favorable,
            (Membership::Privileged, Label::Unfavorable) => self.privileged_unfavorable,
            (Membership::Unprivileged, Label::Favorable) => self.unprivileged_favorable,
            (Membership::Unprivileged, Label::Unfavorable) => self.unprivileged_unfavorable,
        }
    }
}

/// Which of the two groups an instance falls in, if any
fn group_of(
    instance: &Instance,
    row: usize,
    privileged: &BoundSelector,
    unprivileged: &BoundSelector,
) -> Result<Option<Membership>> {
    match (privileged.matches(instance), unprivileged.matches(instance)) {
        (true, true) => Err(FairnessError::OverlappingGroups { row }),
        (true, false) => Ok(Some(Membership::Privileged)),
        (false, true) => Ok(Some(Membership::Unprivileged)),
        (false, false) => Ok(None),
    }
}

/// Unfitted reweighing configuration: the two groups to balance
#[derive(Debug, Clone, PartialEq)]
pub struct Reweighing {
    privileged: GroupSelector,
    unprivileged: GroupSelector,
}

impl Reweighing {
    pub fn new(privileged: GroupSelector, unprivileged: GroupSelector) -> Self {
        Self {
            privileged,
            unprivileged,
        }
    }

    /// Measure the four cell masses of `dataset`
    pub fn cell_masses(&self, dataset: &Dataset) -> Result<CellMasses> {
        let privileged = self.privileged.bind(dataset)?;
        let unprivileged = self.unprivileged.bind(dataset)?;

        let mut masses = CellMasses::default();
        for (row, instance) in dataset.instances().iter().enumerate() {
            let weight = instance.weight();
            if instance.is_favorable() {
                masses.total_favorable += weight;
            } else {
                masses.total_unfavorable += weight;
            }
            if let Some(group) = group_of(instance, row, &privileged, &unprivileged)? {
                masses.add(group, instance.label(), weight);
            }
        }
        Ok(masses)
    }

    /// Compute the cell factors from a training dataset without modifying it.
    ///
    /// # Errors
    /// - `DegenerateDistribution` if any of the four cells has zero mass
    /// - `OverlappingGroups` if an instance matches both selectors
    /// - `UnknownAttribute` if a selector names an unprotected attribute
    pub fn fit(&self, dataset: &Dataset) -> Result<FittedReweighing> {
        let masses = self.cell_masses(dataset)?;
        let total = masses.total();

        let factor = |membership: Membership, label: Label| -> Result<f64> {
            let observed = masses.get(membership, label);
            if observed <= 0.0 {
                return Err(FairnessError::DegenerateDistribution { membership, label });
            }
            let expected = masses.group_total(membership) * masses.label_total(label) / total;
            Ok(expected / observed)
        };

        let factors = CellFactors {
            privileged_favorable: factor(Membership::Privileged, Label::Favorable)?,
            privileged_unfavorable: factor(Membership::Privileged, Label::Unfavorable)?,
            unprivileged_favorable: factor(Membership::Unprivileged, Label::Favorable)?,
            unprivileged_unfavorable: factor(Membership::Unprivileged, Label::Unfavorable)?,
        };

        log::debug!(
            "Reweighing factors: priv/fav={:.4} priv/unfav={:.4} unpriv/fav={:.4} unpriv/unfav={:.4}",
            factors.privileged_favorable,
            factors.privileged_unfavorable,
            factors.unprivileged_favorable,
            factors.unprivileged_unfavorable
        );

        Ok(FittedReweighing {
            privileged: self.privileged.clone(),
            unprivileged: self.unprivileged.clone(),
            masses,
            factors,
        })
    }

    /// Fit on `dataset` and return its reweighted copy
    pub fn fit_transform(&self, dataset: &Dataset) -> Result<Dataset> {
        self.fit(dataset)?.transform(dataset)
    }
}

/// Cell factors learned from a training dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedReweighing {
    privileged: GroupSelector,
    unprivileged: GroupSelector,
    masses: CellMasses,
    factors: CellFactors,
}

impl FittedReweighing {
    pub fn factors(&self) -> &CellFactors {
        &self.factors
    }

    /// Cell masses observed during `fit`
    pub fn masses(&self) -> &CellMasses {
        &self.masses
    }

    pub fn factor(&self, membership: Membership, label: Label) -> f64 {
        self.factors.get(membership, label)
    }

    /// Return a copy of `dataset` whose weights are multiplied by the cell factors.
    ///
    /// Features and labels are untouched; instances in neither group keep
    /// their weight. Applying this to an already reweighted dataset corrects
    /// twice.
    pub fn transform(&self, dataset: &Dataset) -> Result<Dataset> {
        let privileged = self.privileged.bind(dataset)?;
        let unprivileged = self.unprivileged.bind(dataset)?;

        let instances = dataset
            .instances()
            .iter()
            .enumerate()
            .map(|(row, instance)| {
                let mut reweighted = instance.clone();
                if let Some(group) = group_of(instance, row, &privileged, &unprivileged)? {
                    reweighted.set_weight(instance.weight() * self.factor(group, instance.label()));
                }
                Ok(reweighted)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(dataset.with_instances(instances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metric::mean_difference;
    use crate::pipeline::schema::{PrivilegedRule, ProtectedAttributeSpec};

    fn dataset(cells: &[(Membership, Label, usize)]) -> Dataset {
        let instances = cells
            .iter()
            .flat_map(|&(m, l, n)| std::iter::repeat(Instance::new(vec![], l, vec![m])).take(n))
            .collect();
        Dataset::from_instances(
            vec![],
            vec![ProtectedAttributeSpec::new("age", PrivilegedRule::at_least(25.0))],
            instances,
        )
        .unwrap()
    }

    fn reweighing() -> Reweighing {
        Reweighing::new(
            GroupSelector::privileged("age"),
            GroupSelector::unprivileged("age"),
        )
    }

    #[test]
    fn test_balanced_factors_are_one() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[
            (Privileged, Favorable, 1),
            (Privileged, Unfavorable, 1),
            (Unprivileged, Favorable, 1),
            (Unprivileged, Unfavorable, 1),
        ]);
        let fitted = reweighing().fit(&ds).unwrap();
        for m in [Privileged, Unprivileged] {
            for l in [Favorable, Unfavorable] {
                assert!((fitted.factor(m, l) - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_skewed_factors() {
        use Label::*;
        use Membership::*;
        // 8/10 privileged favorable, 2/10 unprivileged favorable
        let ds = dataset(&[
            (Privileged, Favorable, 8),
            (Privileged, Unfavorable, 2),
            (Unprivileged, Favorable, 2),
            (Unprivileged, Unfavorable, 8),
        ]);
        let fitted = reweighing().fit(&ds).unwrap();
        // expected(priv, fav) = 10 * 10 / 20 = 5, observed 8
        assert!((fitted.factor(Privileged, Favorable) - 5.0 / 8.0).abs() < 1e-12);
        assert!((fitted.factor(Privileged, Unfavorable) - 2.5).abs() < 1e-12);
        assert!((fitted.factor(Unprivileged, Favorable) - 2.5).abs() < 1e-12);
        assert!((fitted.factor(Unprivileged, Unfavorable) - 5.0 / 8.0).abs() < 1e-12);
        assert_eq!(fitted.masses().privileged_favorable, 8.0);
    }

    #[test]
    fn test_fit_does_not_mutate() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[
            (Privileged, Favorable, 3),
            (Privileged, Unfavorable, 1),
            (Unprivileged, Favorable, 1),
            (Unprivileged, Unfavorable, 3),
        ]);
        let before = ds.clone();
        let _ = reweighing().fit(&ds).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn test_transform_zeroes_mean_difference() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[
            (Privileged, Favorable, 8),
            (Privileged, Unfavorable, 2),
            (Unprivileged, Favorable, 2),
            (Unprivileged, Unfavorable, 8),
        ]);
        let p = GroupSelector::privileged("age");
        let u = GroupSelector::unprivileged("age");
        assert!((mean_difference(&ds, &p, &u).unwrap() + 0.6).abs() < 1e-12);

        let reweighted = reweighing().fit_transform(&ds).unwrap();
        assert!(mean_difference(&reweighted, &p, &u).unwrap().abs() < 1e-9);
        assert!((reweighted.total_weight() - ds.total_weight()).abs() < 1e-9);

        // Labels are untouched
        let labels = |d: &Dataset| d.instances().iter().map(|i| i.label()).collect::<Vec<_>>();
        assert_eq!(labels(&ds), labels(&reweighted));
    }

    #[test]
    fn test_empty_cell_is_degenerate() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[
            (Privileged, Favorable, 4),
            (Unprivileged, Favorable, 1),
            (Unprivileged, Unfavorable, 3),
        ]);
        let err = reweighing().fit(&ds).unwrap_err();
        assert_eq!(
            err,
            FairnessError::DegenerateDistribution {
                membership: Privileged,
                label: Unfavorable,
            }
        );
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[(Privileged, Favorable, 1), (Unprivileged, Unfavorable, 1)]);
        let overlapping = Reweighing::new(GroupSelector::new(), GroupSelector::unprivileged("age"));
        assert_eq!(
            overlapping.fit(&ds).unwrap_err(),
            FairnessError::OverlappingGroups { row: 1 }
        );
    }

    #[test]
    fn test_reapplying_double_corrects() {
        use Label::*;
        use Membership::*;
        let ds = dataset(&[
            (Privileged, Favorable, 6),
            (Privileged, Unfavorable, 4),
            (Unprivileged, Favorable, 3),
            (Unprivileged, Unfavorable, 7),
        ]);
        let fitted = reweighing().fit(&ds).unwrap();
        let once = fitted.transform(&ds).unwrap();
        let again = fitted.transform(&ds).unwrap();
        assert_eq!(once, again);

        let twice = fitted.transform(&once).unwrap();
        assert_ne!(once.weights(), twice.weights());
    }
}
