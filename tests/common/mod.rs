//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use fairweigh::pipeline::{
    Dataset, DatasetSchema, GroupSelector, Instance, Label, LabelSpec, Membership,
    PrivilegedRule, ProtectedAttributeSpec,
};
use tempfile::TempDir;

pub const TOLERANCE: f64 = 1e-9;

pub fn age_spec() -> ProtectedAttributeSpec {
    ProtectedAttributeSpec::new("age", PrivilegedRule::at_least(25.0))
}

pub fn age_groups() -> (GroupSelector, GroupSelector) {
    (
        GroupSelector::privileged("age"),
        GroupSelector::unprivileged("age"),
    )
}

/// Schema used by the CSV fixtures: `credit` good/bad label, `age` protected
pub fn credit_schema() -> DatasetSchema {
    DatasetSchema {
        label: LabelSpec::new("credit", ["good"]).with_unfavorable(["bad"]),
        protected_attributes: vec![age_spec()],
        weight_column: None,
        ignored_columns: vec!["sex".to_string()],
    }
}

/// Dataset with `n` unit-weight instances per (membership, label) cell
pub fn cell_dataset(cells: &[(Membership, Label, usize)]) -> Dataset {
    let instances = cells
        .iter()
        .flat_map(|&(m, l, n)| std::iter::repeat(Instance::new(vec![], l, vec![m])).take(n))
        .collect();
    Dataset::from_instances(vec![], vec![age_spec()], instances).unwrap()
}

/// Privileged group 8/10 favorable, unprivileged group 2/10 favorable
pub fn skewed_dataset() -> Dataset {
    cell_dataset(&[
        (Membership::Privileged, Label::Favorable, 8),
        (Membership::Privileged, Label::Unfavorable, 2),
        (Membership::Unprivileged, Label::Favorable, 2),
        (Membership::Unprivileged, Label::Unfavorable, 8),
    ])
}

/// Random dataset with random weights and an age feature
pub fn random_dataset(n: usize, seed: u64) -> Dataset {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let instances = (0..n)
        .map(|_| {
            let age: f64 = rng.gen_range(18.0..75.0);
            let membership = if age >= 25.0 {
                Membership::Privileged
            } else {
                Membership::Unprivileged
            };
            let favorable_rate = if age >= 25.0 { 0.75 } else { 0.55 };
            let label = if rng.gen_bool(favorable_rate) {
                Label::Favorable
            } else {
                Label::Unfavorable
            };
            Instance::new(vec![age.into()], label, vec![membership])
                .with_weight(rng.gen_range(0.1..3.0))
        })
        .collect();
    Dataset::from_instances(vec!["age".to_string()], vec![age_spec()], instances).unwrap()
}

/// Write CSV lines into a fresh temporary directory
pub fn create_temp_csv(name: &str, lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    (temp_dir, path)
}

/// A small credit CSV: 6 privileged (4 good), 4 unprivileged (1 good)
pub fn credit_csv_lines() -> Vec<&'static str> {
    vec![
        "age,sex,amount,credit",
        "30,m,1200,good",
        "45,f,800,good",
        "52,m,3000,good",
        "27,f,450,good",
        "38,m,5000,bad",
        "61,f,700,bad",
        "22,m,300,good",
        "19,f,650,bad",
        "23,m,1500,bad",
        "24,f,900,bad",
    ]
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}
