//! Train/test partitioning of a dataset

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::error::{FairnessError, Result};

/// Default fraction of instances assigned to the first (training) partition
pub const DEFAULT_SPLIT_FRACTION: f64 = 0.7;

/// Split settings as they appear in an audit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_fraction")]
    pub fraction: f64,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_fraction() -> f64 {
    DEFAULT_SPLIT_FRACTION
}

fn default_shuffle() -> bool {
    true
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_SPLIT_FRACTION,
            shuffle: true,
            seed: None,
        }
    }
}

impl Dataset {
    /// Partition into two disjoint datasets.
    ///
    /// The first partition holds `round(len * fraction)` instances. Features,
    /// labels and weights are carried over unchanged. With `shuffle` the
    /// instances are permuted first, by a `StdRng` seeded from `seed` when
    /// given (reproducible) or by the thread RNG otherwise.
    ///
    /// # Errors
    /// - `InvalidSplitFraction` if `fraction` is not in (0, 1)
    /// - `TooFewInstances` if the dataset has fewer than 2 instances
    pub fn split(&self, fraction: f64, shuffle: bool, seed: Option<u64>) -> Result<(Dataset, Dataset)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(FairnessError::InvalidSplitFraction(fraction));
        }
        if self.len() < 2 {
            return Err(FairnessError::TooFewInstances {
                required: 2,
                found: self.len(),
            });
        }

        let mut order: Vec<usize> = (0..self.len()).collect();
        if shuffle {
            match seed {
                Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => order.shuffle(&mut rand::thread_rng()),
            }
        }

        let cut = (self.len() as f64 * fraction).round() as usize;
        let instances = self.instances();
        let first = order[..cut].iter().map(|&i| instances[i].clone()).collect();
        let second = order[cut..].iter().map(|&i| instances[i].clone()).collect();

        log::debug!(
            "Split {} instances into {} / {} (shuffle={}, seed={:?})",
            self.len(),
            cut,
            self.len() - cut,
            shuffle,
            seed
        );

        Ok((self.with_instances(first), self.with_instances(second)))
    }

    /// Split using a [`SplitConfig`]
    pub fn split_with(&self, config: &SplitConfig) -> Result<(Dataset, Dataset)> {
        self.split(config.fraction, config.shuffle, config.seed)
    }
}
