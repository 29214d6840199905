//! Synthetic two-group data with known differential features.
//!
//! Rows are laid out in three blocks:
//!
//! 1. `n_differential` features whose group means are drawn from
//!    `U(0.1, 1)` and `U(1.1, 2)`; a coin flip decides which group is high.
//!    Values are `N(mean, sigma)` clipped at zero.
//! 2. `n_common` abundant features sharing one mean from `U(10, 11)`.
//! 3. `n_noise` sparse features with 1 to 6 random `U(0.1, 1)` entries.
//!
//! Samples `0..n_per_group` are labelled 0, the rest 1.

use crate::data::{AbundanceMatrix, Labels};
use crate::error::{DsfdrError, Result};
use nalgebra::DMatrix;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

/// Configuration for synthetic data generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of samples in each of the two groups.
    pub n_per_group: usize,
    /// Number of truly differential features.
    pub n_differential: usize,
    /// Number of abundant, non-differential features.
    pub n_common: usize,
    /// Number of sparse, non-differential features.
    pub n_noise: usize,
    /// Standard deviation of the within-group noise.
    pub sigma: f64,
    /// Scale every sample to sum to 1.
    pub normalize: bool,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_per_group: 5,
            n_differential: 100,
            n_common: 100,
            n_noise: 800,
            sigma: 0.1,
            normalize: false,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Set the number of samples per group.
    pub fn with_samples(mut self, n_per_group: usize) -> Self {
        self.n_per_group = n_per_group;
        self
    }

    /// Set the size of each feature block.
    pub fn with_features(mut self, n_differential: usize, n_common: usize, n_noise: usize) -> Self {
        self.n_differential = n_differential;
        self.n_common = n_common;
        self.n_noise = n_noise;
        self
    }

    /// Set the within-group standard deviation.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total number of features.
    pub fn n_features(&self) -> usize {
        self.n_differential + self.n_common + self.n_noise
    }
}

/// A simulated dataset and its ground truth.
#[derive(Debug, Clone)]
pub struct SimulatedData {
    pub matrix: AbundanceMatrix,
    pub labels: Labels,
    /// True for the differential block.
    pub is_differential: Vec<bool>,
}

impl SimulatedData {
    /// Fraction of `reject` that falls on non-differential features.
    ///
    /// Zero when nothing is rejected.
    pub fn false_discovery_rate(&self, reject: &[bool]) -> f64 {
        let rejected = reject.iter().filter(|&&r| r).count();
        if rejected == 0 {
            return 0.0;
        }
        let false_hits = reject
            .iter()
            .zip(&self.is_differential)
            .filter(|(&r, &d)| r && !d)
            .count();
        false_hits as f64 / rejected as f64
    }

    /// Fraction of differential features found by `reject`.
    pub fn power(&self, reject: &[bool]) -> f64 {
        let n_diff = self.is_differential.iter().filter(|&&d| d).count();
        if n_diff == 0 {
            return 0.0;
        }
        let hits = reject
            .iter()
            .zip(&self.is_differential)
            .filter(|(&r, &d)| r && d)
            .count();
        hits as f64 / n_diff as f64
    }
}

/// Generate a dataset.
pub fn simulate(config: &SimulationConfig) -> Result<SimulatedData> {
    if config.n_per_group == 0 {
        return Err(DsfdrError::InvalidConfig(
            "n_per_group must be at least 1".to_string(),
        ));
    }
    if !(config.sigma > 0.0 && config.sigma.is_finite()) {
        return Err(DsfdrError::InvalidConfig(format!(
            "sigma must be positive, got {}",
            config.sigma
        )));
    }

    let n = config.n_per_group;
    let n_samples = 2 * n;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut data = DMatrix::zeros(config.n_features(), n_samples);

    let low_mean = Uniform::new(0.1, 1.0);
    let high_mean = Uniform::new(1.1, 2.0);
    for i in 0..config.n_differential {
        let low = normal(low_mean.sample(&mut rng), config.sigma)?;
        let high = normal(high_mean.sample(&mut rng), config.sigma)?;
        let low_values: Vec<f64> = (0..n).map(|_| low.sample(&mut rng).max(0.0)).collect();
        let high_values: Vec<f64> = (0..n).map(|_| high.sample(&mut rng).max(0.0)).collect();
        let (first, second) = if rng.gen_bool(0.5) {
            (low_values, high_values)
        } else {
            (high_values, low_values)
        };
        for (j, v) in first.into_iter().chain(second).enumerate() {
            data[(i, j)] = v;
        }
    }

    let common_mean = Uniform::new(10.0, 11.0);
    for i in config.n_differential..config.n_differential + config.n_common {
        let dist = normal(common_mean.sample(&mut rng), config.sigma)?;
        for j in 0..n_samples {
            data[(i, j)] = dist.sample(&mut rng);
        }
    }

    let noise_value = Uniform::new(0.1, 1.0);
    for i in config.n_differential + config.n_common..config.n_features() {
        let n_entries = rng.gen_range(1..=6);
        for _ in 0..n_entries {
            let j = rng.gen_range(0..n_samples);
            data[(i, j)] = noise_value.sample(&mut rng);
        }
    }

    if config.normalize {
        for mut col in data.column_iter_mut() {
            let total = col.sum();
            if total > 0.0 {
                col /= total;
            }
        }
    }

    let mut is_differential = vec![false; config.n_features()];
    is_differential[..config.n_differential].fill(true);

    let labels = Labels::from_bools(
        &(0..n_samples).map(|j| j >= n).collect::<Vec<_>>(),
    );

    Ok(SimulatedData {
        matrix: AbundanceMatrix::from_matrix(data)?,
        labels,
        is_differential,
    })
}

fn normal(mean: f64, sigma: f64) -> Result<Normal> {
    Normal::new(mean, sigma).map_err(|e| DsfdrError::InvalidConfig(e.to_string()))
}
