//! Ranking with tie handling.

/// Assign 1-based ranks to `data`; tied values share the average of their
/// would-be ranks.
///
/// Empty input produces empty output.
pub fn rank_average(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut ranks = vec![0.0; n];
    if n == 0 {
        return ranks;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && data[order[j]] == data[order[i]] {
            j += 1;
        }
        // ranks (i+1)..=j share one value
        let value = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = value;
        }
        i = j;
    }

    ranks
}

/// Sum of `t³ - t` over all groups of tied values.
///
/// Used by the Kruskal-Wallis tie correction.
pub fn tie_term(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut total = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        total += t * t * t - t;
        i = j;
    }
    total
}
