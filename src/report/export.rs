//! Audit export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::config::AuditConfig;
use crate::pipeline::{AuditReport, DatasetSchema, GroupSelector, SplitConfig};

/// Metadata about the audit run
#[derive(Serialize)]
pub struct AuditMetadata {
    /// Timestamp of the audit (ISO 8601 format)
    pub timestamp: String,
    /// Fairweigh version
    pub fairweigh_version: String,
    /// Input file path
    pub input_file: String,
    pub schema: DatasetSchema,
    pub privileged_groups: GroupSelector,
    pub unprivileged_groups: GroupSelector,
    pub split: SplitConfig,
}

/// Complete audit export with metadata
#[derive(Serialize)]
pub struct AuditExport<'a> {
    pub metadata: AuditMetadata,
    pub results: &'a AuditReport,
}

/// Build the export document for a report
pub fn build_export<'a>(report: &'a AuditReport, config: &AuditConfig) -> AuditExport<'a> {
    AuditExport {
        metadata: AuditMetadata {
            timestamp: Utc::now().to_rfc3339(),
            fairweigh_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.input.display().to_string(),
            schema: config.schema.clone(),
            privileged_groups: config.privileged_groups.clone(),
            unprivileged_groups: config.unprivileged_groups.clone(),
            split: config.split.clone(),
        },
        results: report,
    }
}

/// Export audit results to a JSON file
pub fn export_audit(report: &AuditReport, config: &AuditConfig, output_path: &Path) -> Result<()> {
    let export = build_export(report, config);

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize audit results to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write audit results to {}", output_path.display()))?;

    Ok(())
}
