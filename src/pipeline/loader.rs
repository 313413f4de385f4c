//! Dataset loader for CSV and Parquet files

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, Value};
use super::schema::DatasetSchema;
use super::weights::get_weights;

/// How to read a CSV input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Single-byte field separator
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
    /// Column names to assign, required when the file has no header row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,
    /// Rows scanned to infer column types
    #[serde(default = "default_infer_schema_length")]
    pub infer_schema_length: usize,
}

fn default_separator() -> char {
    ','
}

fn default_has_header() -> bool {
    true
}

fn default_infer_schema_length() -> usize {
    10000
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            has_header: default_has_header(),
            column_names: None,
            infer_schema_length: default_infer_schema_length(),
        }
    }
}

/// Setup step run before any computation: make sure the input exists.
///
/// Downloading is left to the caller; when the file is missing the error
/// names where to fetch it from, if known.
pub fn ensure_input_present(path: &Path, source_url: Option<&str>) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    match source_url {
        Some(url) => anyhow::bail!(
            "Input file not found: {}. Download it from {} and place it at that path.",
            path.display(),
            url
        ),
        None => anyhow::bail!("Input file not found: {}", path.display()),
    }
}

/// Load a raw table from a file (CSV or Parquet based on extension).
///
/// Any extension other than `parquet` is read as delimited text, so
/// headerless files such as `german.data` load through `csv` options.
pub fn load_dataframe(path: &Path, csv: &CsvOptions) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut df = if extension == "parquet" {
        LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to read Parquet file: {}", path.display()))?
    } else {
        let separator = u8::try_from(csv.separator).ok().filter(u8::is_ascii).with_context(|| {
            format!("CSV separator must be a single ASCII character, got {:?}", csv.separator)
        })?;
        LazyCsvReader::new(path)
            .with_separator(separator)
            .with_has_header(csv.has_header)
            .with_infer_schema_length(Some(csv.infer_schema_length))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?
    };

    if let Some(names) = &csv.column_names {
        if names.len() != df.width() {
            anyhow::bail!(
                "{} column names configured but {} has {} columns",
                names.len(),
                path.display(),
                df.width()
            );
        }
        df.set_column_names(names.iter().map(String::as_str))
            .context("Failed to apply configured column names")?;
    }

    log::info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );

    Ok(df)
}

/// Row count, column count and estimated memory (MB) of a loaded table
pub fn dataset_stats(df: &DataFrame) -> (usize, usize, f64) {
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    (rows, cols, memory_mb)
}

/// Convert a polars column into raw values, mapping nulls to `Value::Missing`
fn column_to_values(col: &Column) -> Result<Vec<Value>> {
    let values = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, |s| Value::Categorical(s.to_string())))
            .collect(),
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, |b| Value::Categorical(b.to_string())))
            .collect(),
        dtype if dtype.is_primitive_numeric() => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map_or(Value::Missing, Value::Numeric))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map_or(Value::Missing, |s| Value::Categorical(s.to_string())))
                .collect()
        }
    };

    Ok(values)
}

/// Build a [`Dataset`] from a DataFrame using an explicit schema.
///
/// Ignored columns are skipped before conversion, and the weight column
/// (if any) is validated through [`get_weights`].
pub fn dataframe_to_dataset(df: &DataFrame, schema: &DatasetSchema) -> Result<Dataset> {
    let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for required in schema.required_columns() {
        if !available.iter().any(|c| c == required) {
            anyhow::bail!(
                "Column '{}' not found in dataset. Available columns: {:?}",
                required,
                available
            );
        }
    }

    let weights = get_weights(df, schema.weight_column.as_deref())?;

    let mut columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let name = col.name().to_string();
        if schema.ignored_columns.contains(&name) {
            continue;
        }
        let values = if schema.weight_column.as_deref() == Some(name.as_str()) {
            weights.iter().map(|&w| Value::Numeric(w)).collect()
        } else {
            column_to_values(col)
                .with_context(|| format!("Failed to read column '{}'", name))?
        };
        columns.push((name, values));
    }

    let dataset = Dataset::from_columns(schema, columns)?;
    Ok(dataset)
}

/// Load a file and build a [`Dataset`] from it in one step
pub fn load_dataset(path: &Path, csv: &CsvOptions, schema: &DatasetSchema) -> Result<Dataset> {
    let df = load_dataframe(path, csv)?;
    dataframe_to_dataset(&df, schema)
        .with_context(|| format!("Failed to build dataset from {}", path.display()))
}
