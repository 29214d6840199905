//! Prefilter for the filtered BH procedure.
//!
//! A feature that is non-zero in only a few samples cannot reach a small
//! permutation p-value, whatever its values: the best it can do is have all
//! of its non-zero samples land in one group. Dropping features whose best
//! attainable p-value already exceeds `alpha` shrinks the number of tests
//! without discarding anything that could have been rejected.

use crate::data::{AbundanceMatrix, Labels};
use crate::error::Result;
use statrs::function::factorial::ln_binomial;

/// Smallest two-group permutation p-value a feature with `nonzero` non-zero
/// samples can reach.
///
/// Features with at least `min(n_low, n_high)` non-zero samples are not
/// limited this way and get 0.
pub fn min_attainable_pvalue(nonzero: usize, n_low: usize, n_high: usize) -> f64 {
    if nonzero >= n_low.min(n_high) {
        return 0.0;
    }
    let (nz, n0, n1) = (nonzero as u64, n_low as u64, n_high as u64);
    // log space: the coefficients overflow f64 for groups of a few hundred
    let ln_total = ln_binomial(n0 + n1, nz);
    (ln_binomial(n0, nz) - ln_total).exp() + (ln_binomial(n1, nz) - ln_total).exp()
}

/// Indices of the features that can still reach `alpha`.
pub fn testable_features(
    matrix: &AbundanceMatrix,
    labels: &Labels,
    alpha: f64,
) -> Result<Vec<usize>> {
    let groups = labels.two_groups()?;
    Ok((0..matrix.n_features())
        .filter(|&i| {
            min_attainable_pvalue(matrix.nonzero_count(i), groups.n_low(), groups.n_high())
                <= alpha
        })
        .collect())
}
