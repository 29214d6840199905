//! Discrete FDR control from the permutation null.
//!
//! Standard BH assumes continuous, uniformly distributed null p-values. With
//! permutation p-values the attainable values are multiples of `1 / (B + 1)`
//! and many features share them, so BH is conservative. This procedure
//! instead estimates the number of false discoveries at a candidate threshold
//! directly from the permuted statistics.
//!
//! For every feature the observed score and its `B` null scores are pooled,
//! and every pooled value gets the pseudo p-value
//! `#{pool values >= it} / (B + 1)`. For a candidate threshold `c`:
//!
//! ```text
//! R(c)   = #{features with observed p <= c}
//! N(c)   = #{null pseudo p-values <= c, over all features and rounds}
//! FDR(c) = (R(c) + N(c)) / (R(c) * (B + 1))
//! ```
//!
//! Candidates are the distinct observed p-values, scanned from largest to
//! smallest. The threshold is the largest candidate with `FDR(c) <= alpha`
//! and every feature with `p <= c` is rejected, so features sharing a
//! p-value are never split.

use crate::permute::NullDistribution;
use serde::{Deserialize, Serialize};

/// Outcome of the discrete FDR procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteFdr {
    /// Rejection decision per feature.
    pub reject: Vec<bool>,
    /// Observed permutation p-value per feature.
    pub p_values: Vec<f64>,
    /// Estimated FDR at each feature's own p-value, made monotone.
    pub q_values: Vec<f64>,
    /// Chosen p-value threshold, if any feature was rejected.
    pub threshold: Option<f64>,
}

/// Run the discrete FDR procedure at level `alpha`.
pub fn correct_dsfdr(null: &NullDistribution, alpha: f64) -> DiscreteFdr {
    let n_features = null.n_features();
    let n_perm = null.n_permutations();
    if n_features == 0 {
        return DiscreteFdr {
            reject: vec![],
            p_values: vec![],
            q_values: vec![],
            threshold: None,
        };
    }

    let pool_size = n_perm + 1;
    let denom = pool_size as f64;

    let mut p_values = Vec::with_capacity(n_features);
    let mut null_p = Vec::with_capacity(n_features * n_perm);
    for i in 0..n_features {
        let mut pool: Vec<f64> = Vec::with_capacity(pool_size);
        pool.push(null.observed[i]);
        pool.extend(null.null.row(i).iter().copied());

        let mut sorted = pool.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let pseudo_p = |v: f64| {
            let at_least = pool_size - sorted.partition_point(|&x| x < v);
            at_least as f64 / denom
        };

        p_values.push(pseudo_p(pool[0]));
        null_p.extend(pool[1..].iter().map(|&u| pseudo_p(u)));
    }
    null_p.sort_by(|a, b| a.total_cmp(b));

    let mut candidates = p_values.clone();
    candidates.sort_by(|a, b| b.total_cmp(a));
    candidates.dedup();

    let mut threshold = None;
    let mut fdr_at = Vec::with_capacity(candidates.len());
    for &c in &candidates {
        let realized = p_values.iter().filter(|&&p| p <= c).count() as f64;
        let permuted = null_p.partition_point(|&p| p <= c) as f64;
        let fdr = (realized + permuted) / (realized * denom);
        if threshold.is_none() && fdr <= alpha {
            threshold = Some(c);
        }
        fdr_at.push((c, fdr.min(1.0)));
    }

    let reject = match threshold {
        Some(cut) => p_values.iter().map(|&p| p <= cut).collect(),
        None => vec![false; n_features],
    };

    // candidates run from largest p down, so a running minimum keeps
    // q-values monotone in p
    let mut q_values = vec![1.0; n_features];
    let mut running = 1.0_f64;
    for (c, fdr) in fdr_at {
        running = running.min(fdr);
        for (q, &p) in q_values.iter_mut().zip(&p_values) {
            if p == c {
                *q = running;
            }
        }
    }

    DiscreteFdr {
        reject,
        p_values,
        q_values,
        threshold,
    }
}
