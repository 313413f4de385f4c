//! Instance weight extraction and validation utilities

use anyhow::{anyhow, Result};
use polars::prelude::*;

use super::error::FairnessError;

/// Check a single instance weight.
///
/// Weights must be finite and non-negative; zero is allowed.
pub fn validate_weight(row: usize, weight: f64) -> std::result::Result<f64, FairnessError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(FairnessError::InvalidWeight { row, value: weight })
    }
}

/// Extract instance weights from a DataFrame column, or return default weights of 1.0.
///
/// # Arguments
/// * `df` - The DataFrame to extract weights from
/// * `weight_column` - Optional name of the weight column
///
/// # Returns
/// * `Ok(Vec<f64>)` - Vector of weights (one per row)
/// * `Err` - If weight column doesn't exist, is non-numeric, or contains
///   negative or non-finite values
///
/// Null weights default to 1.0 and are reported with a warning.
pub fn get_weights(df: &DataFrame, weight_column: Option<&str>) -> Result<Vec<f64>> {
    let Some(col_name) = weight_column else {
        return Ok(vec![1.0; df.height()]);
    };

    let column = df
        .column(col_name)
        .map_err(|_| anyhow!("Weight column '{}' not found in DataFrame", col_name))?;

    let float_col = column.cast(&DataType::Float64).map_err(|_| {
        anyhow!(
            "Weight column '{}' must be numeric (cannot cast to Float64)",
            col_name
        )
    })?;

    let ca = float_col
        .f64()
        .map_err(|_| anyhow!("Failed to access weight column '{}' as Float64", col_name))?;

    let mut weights = Vec::with_capacity(df.height());
    let mut null_count = 0usize;

    for (row, opt_val) in ca.iter().enumerate() {
        match opt_val {
            Some(w) => {
                let w = validate_weight(row, w)
                    .map_err(|e| anyhow!("Weight column '{}': {}", col_name, e))?;
                weights.push(w);
            }
            None => {
                null_count += 1;
                weights.push(1.0);
            }
        }
    }

    if null_count > 0 {
        log::warn!(
            "Weight column '{}' contains {} null value(s), defaulting to weight 1.0",
            col_name,
            null_count
        );
    }

    Ok(weights)
}

/// Calculate the total weight (sum of all weights).
#[inline]
pub fn total_weight(weights: &[f64]) -> f64 {
    weights.iter().sum()
}
