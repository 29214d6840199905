//! Benjamini-Hochberg and Benjamini-Yekutieli step-up procedures.

use serde::{Deserialize, Serialize};

/// Outcome of a step-up procedure on a p-value vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepUp {
    /// Rejection decision per feature, in input order.
    pub reject: Vec<bool>,
    /// Adjusted p-values (q-values), in input order.
    pub q_values: Vec<f64>,
}

/// Benjamini-Hochberg FDR control at level `alpha`.
///
/// Rejects every p-value up to the largest rank `k` with
/// `p(k) <= k / m * alpha`. Tied p-values are always decided together.
pub fn correct_bh(p_values: &[f64], alpha: f64) -> StepUp {
    step_up(p_values, alpha, 1.0)
}

/// Benjamini-Yekutieli FDR control at level `alpha`.
///
/// Same as BH with the threshold divided by `sum_{i=1..m} 1/i`, which keeps
/// FDR control under arbitrary dependence between features.
pub fn correct_by(p_values: &[f64], alpha: f64) -> StepUp {
    step_up(p_values, alpha, harmonic(p_values.len()))
}

/// `sum_{i=1..m} 1/i`.
pub fn harmonic(m: usize) -> f64 {
    (1..=m).map(|i| 1.0 / i as f64).sum()
}

fn step_up(p_values: &[f64], alpha: f64, dependence: f64) -> StepUp {
    let n = p_values.len();
    if n == 0 {
        return StepUp {
            reject: vec![],
            q_values: vec![],
        };
    }

    // Create sorted index
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let n_f64 = n as f64;

    // Largest rank passing its threshold
    let cutoff = (0..n)
        .rev()
        .find(|&i| p_values[indices[i]] <= (i + 1) as f64 / (n_f64 * dependence) * alpha)
        .map(|i| p_values[indices[i]]);

    let reject = match cutoff {
        Some(cut) => p_values.iter().map(|&p| p <= cut).collect(),
        None => vec![false; n],
    };

    // Adjusted p-values, working backwards from the largest
    let mut q_sorted = vec![0.0; n];
    let mut prev = f64::INFINITY;
    for i in (0..n).rev() {
        let rank = (i + 1) as f64;
        let adjusted = (p_values[indices[i]] * n_f64 * dependence / rank).min(1.0);
        prev = adjusted.min(prev);
        q_sorted[i] = prev;
    }

    // Restore original order
    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }

    StepUp { reject, q_values }
}
