//! Rank-based statistics: Mann-Whitney U and Kruskal-Wallis H.

use super::rank::{rank_average, tie_term};
use crate::data::Labels;
use crate::error::{DsfdrError, Result};
use nalgebra::DMatrix;

/// Mann-Whitney U for every feature, reported as `min(U_low, U_high)`.
///
/// Ties receive average ranks. Smaller values mean stronger separation; the
/// permutation engine compares [`mannwhitney_extremeness`] instead.
pub fn mannwhitney(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let groups = labels.two_groups()?;
    let n_low = groups.n_low() as f64;
    let n_high = groups.n_high() as f64;

    Ok((0..data.nrows())
        .map(|row| {
            let values: Vec<f64> = data.row(row).iter().copied().collect();
            let ranks = rank_average(&values);
            let rank_sum_low: f64 = groups.low.iter().map(|&j| ranks[j]).sum();
            let u_low = rank_sum_low - n_low * (n_low + 1.0) / 2.0;
            let u_high = n_low * n_high - u_low;
            u_low.min(u_high)
        })
        .collect())
}

/// Distance of `min(U)` from its null centre `n_low * n_high / 2`.
///
/// Larger values are more extreme, which is the orientation the permutation
/// p-value needs. Group sizes are fixed under label permutation, so the
/// centre is the same for every round.
pub fn mannwhitney_extremeness(u: &[f64], labels: &Labels) -> Result<Vec<f64>> {
    let groups = labels.two_groups()?;
    let centre = groups.n_low() as f64 * groups.n_high() as f64 / 2.0;
    Ok(u.iter().map(|&v| (centre - v).max(0.0)).collect())
}

/// Kruskal-Wallis H for every feature, corrected for ties.
///
/// A feature whose values are all tied gets 0.
pub fn kruwallis(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let (groups, n_groups) = labels.group_indices();
    if n_groups < 2 {
        return Err(DsfdrError::InvalidLabels(format!(
            "Kruskal-Wallis requires at least 2 distinct labels, found {}",
            n_groups
        )));
    }

    let mut group_sizes = vec![0.0; n_groups];
    for &g in &groups {
        group_sizes[g] += 1.0;
    }
    let n = groups.len() as f64;

    Ok((0..data.nrows())
        .map(|row| {
            let values: Vec<f64> = data.row(row).iter().copied().collect();
            let correction = 1.0 - tie_term(&values) / (n * n * n - n);
            if correction <= 0.0 {
                return 0.0;
            }

            let ranks = rank_average(&values);
            let mut rank_sums = vec![0.0; n_groups];
            for (j, &g) in groups.iter().enumerate() {
                rank_sums[g] += ranks[j];
            }
            let weighted: f64 = rank_sums
                .iter()
                .zip(&group_sizes)
                .map(|(r, size)| r * r / size)
                .sum();
            let h = 12.0 * weighted / (n * (n + 1.0)) - 3.0 * (n + 1.0);
            (h / correction).max(0.0)
        })
        .collect())
}
