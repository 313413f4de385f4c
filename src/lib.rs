//! Fairweigh: Fairness Auditing Library
//!
//! Measures the mean outcome difference between privileged and unprivileged
//! groups of a credit-scoring dataset and removes it with the Reweighing
//! pre-processing transform.

pub mod config;
pub mod pipeline;
pub mod report;
pub mod utils;
