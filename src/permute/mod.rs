//! Permutation engine: builds the empirical null of a statistic.
//!
//! Two ways of generating null realizations are supported:
//!
//! - **Label permutation**: each round shuffles the label vector (group sizes
//!   are preserved) and recomputes the statistic on the unchanged matrix.
//! - **Sign flipping**: every feature is centered within each label group, and
//!   each round multiplies every sample's centered values by an independent
//!   random sign before recomputing the statistic with the original labels.
//!   The mean-difference statistics are odd functions of the data and the
//!   centered values are symmetric about zero under the null, so the flipped
//!   statistic has the same null distribution as the label-permuted one for
//!   two balanced groups. Only statistics with that symmetry may use it.
//!
//! # Determinism
//!
//! Round `r` draws from its own generator seeded with `seed + r`, so a run is
//! reproducible from a single seed and the result does not depend on the
//! order in which rounds execute. Serial and parallel runs are identical.

use crate::data::Labels;
use crate::error::{DsfdrError, Result};
use crate::stats::Statistic;
use nalgebra::DMatrix;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How null realizations are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermutationMode {
    /// Sign flipping for meandiff/stdmeandiff, label permutation otherwise.
    #[default]
    Auto,
    /// Always shuffle labels.
    Labels,
    /// Random sign flips of group-centered values.
    SignFlip,
}

/// Configuration for the permutation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Number of permutation rounds.
    pub n_permutations: usize,
    /// Seed of round 0; round `r` uses `seed + r`.
    pub seed: u64,
    /// Whether to run rounds on the rayon thread pool.
    pub parallel: bool,
    /// Null generation strategy.
    pub mode: PermutationMode,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            n_permutations: 1000,
            seed: 42,
            parallel: true,
            mode: PermutationMode::Auto,
        }
    }
}

/// Observed statistic plus its permutation null, on the extremeness scale.
///
/// `null` has one row per feature and one column per permutation round.
/// Null values within floating-point noise of the observed value are stored
/// as exactly the observed value, so ties are counted consistently.
#[derive(Debug, Clone)]
pub struct NullDistribution {
    /// Observed statistic as reported to the caller.
    pub statistic: Vec<f64>,
    /// Observed extremeness scores (larger is more extreme).
    pub observed: Vec<f64>,
    /// Permuted extremeness scores (features × rounds).
    pub null: DMatrix<f64>,
}

impl NullDistribution {
    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.observed.len()
    }

    /// Number of permutation rounds.
    pub fn n_permutations(&self) -> usize {
        self.null.ncols()
    }

    /// Count, per feature, the rounds at least as extreme as the observation.
    pub fn exceed_counts(&self) -> Vec<usize> {
        self.observed
            .iter()
            .enumerate()
            .map(|(i, &t)| self.null.row(i).iter().filter(|&&u| u >= t).count())
            .collect()
    }

    /// Two-sided permutation p-values `(count + 1) / (B + 1)`.
    ///
    /// A feature whose null is identical to its observation gets p = 1.
    pub fn p_values(&self) -> Vec<f64> {
        let denom = self.n_permutations() as f64 + 1.0;
        self.exceed_counts()
            .into_iter()
            .map(|count| (count as f64 + 1.0) / denom)
            .collect()
    }
}

/// Resolve `Auto` against the chosen statistic and reject impossible pairs.
pub fn resolve_mode(mode: PermutationMode, statistic: &Statistic) -> Result<PermutationMode> {
    match mode {
        PermutationMode::Auto if statistic.supports_sign_flip() => Ok(PermutationMode::SignFlip),
        PermutationMode::Auto => Ok(PermutationMode::Labels),
        PermutationMode::SignFlip if !statistic.supports_sign_flip() => {
            Err(DsfdrError::InvalidConfig(format!(
                "sign-flip permutation is not valid for statistic '{}'",
                statistic.name()
            )))
        }
        other => Ok(other),
    }
}

/// Compute the observed statistic and its permutation null.
///
/// `data` must already be transformed; it is shared read-only by all rounds.
pub fn permutation_null(
    data: &DMatrix<f64>,
    labels: &Labels,
    statistic: &Statistic,
    config: &PermutationConfig,
) -> Result<NullDistribution> {
    if labels.len() != data.ncols() {
        return Err(DsfdrError::DimensionMismatch {
            expected: data.ncols(),
            actual: labels.len(),
        });
    }
    if config.n_permutations == 0 {
        return Err(DsfdrError::InvalidConfig(
            "n_permutations must be at least 1".to_string(),
        ));
    }

    let mode = resolve_mode(config.mode, statistic)?;
    let statistic_values = statistic.compute(data, labels)?;
    let observed = statistic.extremeness(&statistic_values, labels)?;

    let centered = match mode {
        PermutationMode::SignFlip => Some(center_by_group(data, labels)),
        _ => None,
    };

    let run_round = |round: usize| -> Result<Vec<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(round as u64));
        match &centered {
            Some(centered) => {
                let flipped = sign_flip(centered, &mut rng);
                let values = statistic.compute(&flipped, labels)?;
                statistic.extremeness(&values, labels)
            }
            None => {
                let permuted = shuffle_labels(labels, &mut rng);
                let values = statistic.compute(data, &permuted)?;
                statistic.extremeness(&values, &permuted)
            }
        }
    };

    let rounds: Vec<Vec<f64>> = if config.parallel {
        (0..config.n_permutations)
            .into_par_iter()
            .map(run_round)
            .collect::<Result<_>>()?
    } else {
        (0..config.n_permutations)
            .map(run_round)
            .collect::<Result<_>>()?
    };

    let null = DMatrix::from_fn(data.nrows(), config.n_permutations, |i, b| {
        let u = rounds[b][i];
        if is_close(u, observed[i]) {
            observed[i]
        } else {
            u
        }
    });

    Ok(NullDistribution {
        statistic: statistic_values,
        observed,
        null,
    })
}

/// A uniformly random relabelling with the same label multiset.
fn shuffle_labels<R: Rng>(labels: &Labels, rng: &mut R) -> Labels {
    let mut values = labels.values().to_vec();
    values.shuffle(rng);
    Labels::from_values_unchecked(values)
}

/// Multiply each sample (column) by an independent fair random sign.
fn sign_flip<R: Rng>(centered: &DMatrix<f64>, rng: &mut R) -> DMatrix<f64> {
    let mut flipped = centered.clone();
    for mut col in flipped.column_iter_mut() {
        if rng.gen_bool(0.5) {
            col.neg_mut();
        }
    }
    flipped
}

/// Subtract, per feature, the mean of each label group from its members.
pub fn center_by_group(data: &DMatrix<f64>, labels: &Labels) -> DMatrix<f64> {
    let (groups, n_groups) = labels.group_indices();
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_groups];
    for (sample, &g) in groups.iter().enumerate() {
        members[g].push(sample);
    }

    let mut centered = data.clone();
    for row in 0..data.nrows() {
        for samples in &members {
            let mean = crate::stats::meandiff::group_mean(data, row, samples);
            for &j in samples {
                centered[(row, j)] -= mean;
            }
        }
    }
    centered
}

/// Floating-point equality used when comparing null values to the observation.
#[inline]
pub(crate) fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 + 1e-8 * b.abs()
}
