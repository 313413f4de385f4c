//! End-to-end audit tests

use fairweigh::config::AuditConfig;
use fairweigh::pipeline::{
    audit_dataset, run_audit, CsvOptions, Label, Membership, Reweighing, SplitConfig,
};

#[path = "common/mod.rs"]
mod common;

use common::{
    age_groups, cell_dataset, create_temp_csv, credit_csv_lines, credit_schema, random_dataset,
};

fn csv_config(input: std::path::PathBuf) -> AuditConfig {
    let (privileged, unprivileged) = age_groups();
    AuditConfig {
        input,
        source_url: None,
        csv: CsvOptions::default(),
        schema: credit_schema(),
        privileged_groups: privileged,
        unprivileged_groups: unprivileged,
        split: SplitConfig {
            fraction: 0.5,
            shuffle: false,
            seed: None,
        },
        export: None,
    }
}

#[test]
fn test_audit_removes_bias_on_training_partition() {
    let ds = random_dataset(500, 21);
    let (p, u) = age_groups();
    let split = SplitConfig {
        fraction: 0.7,
        shuffle: true,
        seed: Some(42),
    };
    let outcome = audit_dataset(&ds, &p, &u, &split).unwrap();
    let report = &outcome.report;

    assert_eq!(report.total_instances, 500);
    assert_eq!(report.train_instances, 350);
    assert_eq!(report.test_instances, 150);
    assert!(report.mean_difference_before() < 0.0);
    assert!(report.mean_difference_after().abs() < 1e-9);
    assert!((report.train_before.total_weight - report.train_after.total_weight).abs() < 1e-6);

    // Only the training partition is reweighed
    assert!(
        (outcome.train.total_weight() + outcome.test.total_weight() - ds.total_weight()).abs()
            < 1e-6
    );
    let test_summary = report.test.as_ref().unwrap();
    assert!((test_summary.total_weight - outcome.test.total_weight()).abs() < 1e-9);
    assert_eq!(outcome.reweighted_train.len(), outcome.train.len());
}

#[test]
fn test_audit_succeeds_when_test_partition_lacks_a_group() {
    // Unshuffled 0.7 split: the first 7 rows cover all four cells,
    // the last 3 are privileged only
    let ds = cell_dataset(&[
        (Membership::Unprivileged, Label::Favorable, 2),
        (Membership::Unprivileged, Label::Unfavorable, 2),
        (Membership::Privileged, Label::Unfavorable, 1),
        (Membership::Privileged, Label::Favorable, 5),
    ]);
    let (p, u) = age_groups();
    let split = SplitConfig {
        fraction: 0.7,
        shuffle: false,
        seed: None,
    };

    let (train, _) = ds.split_with(&split).unwrap();
    assert!(Reweighing::new(p.clone(), u.clone()).fit_transform(&train).is_ok());

    let outcome = audit_dataset(&ds, &p, &u, &split).unwrap();
    assert_eq!(outcome.report.train_instances, 7);
    assert_eq!(outcome.report.test_instances, 3);
    assert!(outcome.report.test.is_none());
    assert!(outcome.report.mean_difference_after().abs() < 1e-9);
}

#[test]
fn test_run_audit_from_csv_with_export() {
    let mut lines = credit_csv_lines();
    // Interleave so both halves contain all four cells
    lines.extend_from_slice(&[
        "33,m,1000,good",
        "29,f,400,bad",
        "21,m,800,good",
        "20,f,350,bad",
    ]);
    let reordered: Vec<&str> = std::iter::once(lines[0])
        .chain(lines[1..].iter().step_by(2).copied())
        .chain(lines[2..].iter().step_by(2).copied())
        .collect();
    let (dir, path) = create_temp_csv("credit.csv", &reordered);

    let mut config = csv_config(path);
    let export_path = dir.path().join("audit.json");
    config.export = Some(export_path.clone());

    let outcome = run_audit(&config).unwrap();
    assert_eq!(outcome.report.total_instances, 14);
    assert_eq!(outcome.report.train_instances, 7);
    assert!(outcome.report.mean_difference_after().abs() < 1e-9);

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(exported["results"]["train_instances"], 7);
    assert!(exported["metadata"]["timestamp"].is_string());
    assert_eq!(exported["metadata"]["privileged_groups"]["age"], "privileged");
}

#[test]
fn test_run_audit_missing_input_names_source() {
    let mut config = AuditConfig::german_credit("/nonexistent/german.data");
    config.export = None;
    let err = run_audit(&config).unwrap_err();
    assert!(err.to_string().contains("archive.ics.uci.edu"));
}

#[test]
fn test_run_audit_degenerate_training_data() {
    // Every unprivileged applicant is rejected
    let (_dir, path) = create_temp_csv(
        "credit.csv",
        &[
            "age,sex,amount,credit",
            "30,m,1,good",
            "40,f,1,bad",
            "20,m,1,bad",
            "21,f,1,bad",
        ],
    );
    let mut config = csv_config(path);
    config.split.fraction = 0.75;
    let err = run_audit(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("Cannot reweigh"));
}
