//! Age-bias audit of the Statlog German credit data.
//!
//! Run with: cargo run --example german_credit [-- path/to/config.json]
//!
//! Without a config path the built-in preset is used, reading
//! `data/german.data` (download it from the UCI repository first).

use std::path::Path;

use anyhow::Result;
use console::style;

use fairweigh::config::AuditConfig;
use fairweigh::pipeline::{
    audit_dataset, dataframe_to_dataset, dataset_stats, ensure_input_present, load_dataframe,
};
use fairweigh::report::{export_audit, FairnessSummary};
use fairweigh::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_mean_difference, print_step_header, print_success,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => AuditConfig::from_json_file(Path::new(&path))?,
        None => AuditConfig::german_credit("data/german.data"),
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // Step 1: make sure the data is there, then load it
    print_step_header(1, "Load Dataset");
    ensure_input_present(&config.input, config.source_url.as_deref())?;

    let spinner = create_spinner("Reading input...");
    let df = match load_dataframe(&config.input, &config.csv) {
        Ok(df) => df,
        Err(e) => {
            finish_with_error(&spinner, "Failed to read input");
            return Err(e);
        }
    };
    let (rows, cols, memory_mb) = dataset_stats(&df);
    let dataset = dataframe_to_dataset(&df, &config.schema)?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Features kept: {}", dataset.feature_names().len());
    println!("      Estimated memory: {:.2} MB", memory_mb);

    // Step 2: split, measure, reweigh, measure again
    print_step_header(2, "Split and Measure Bias");
    let outcome = audit_dataset(
        &dataset,
        &config.privileged_groups,
        &config.unprivileged_groups,
        &config.split,
    )?;
    let report = &outcome.report;
    print_info(&format!(
        "Training on {} of {} instances",
        report.train_instances, report.total_instances
    ));
    print_mean_difference("Mean difference (original)", report.mean_difference_before());

    print_step_header(3, "Reweighing");
    print_success("Fitted four-cell reweighing factors on training data");
    print_mean_difference("Mean difference (reweighed)", report.mean_difference_after());

    FairnessSummary::new(report).display();

    if let Some(path) = &config.export {
        print_step_header(4, "Export");
        export_audit(report, &config, path)?;
        print_success(&format!("Saved to {}", path.display()));
    }

    print_completion();

    Ok(())
}
