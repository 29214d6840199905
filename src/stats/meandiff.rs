//! Two-group mean difference statistics.
//!
//! Both statistics are oriented as `high - low`, where `high` is the group
//! with the larger label value. With 0/1 labels that is
//! `mean(label == 1) - mean(label == 0)`.

use crate::data::{Labels, TwoGroups};
use crate::error::Result;
use nalgebra::DMatrix;
use statrs::statistics::Statistics;

/// Difference of group means for every feature.
pub fn meandiff(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let groups = labels.two_groups()?;
    Ok((0..data.nrows())
        .map(|row| mean_difference(data, row, &groups))
        .collect())
}

/// Difference of group means scaled by the sum of the group standard
/// deviations (sample, n - 1).
///
/// A feature whose groups both have zero spread gets 0.
pub fn stdmeandiff(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let groups = labels.two_groups()?;
    Ok((0..data.nrows())
        .map(|row| {
            let spread = group_sd(data, row, &groups.low) + group_sd(data, row, &groups.high);
            if spread > 0.0 {
                mean_difference(data, row, &groups) / spread
            } else {
                0.0
            }
        })
        .collect())
}

fn mean_difference(data: &DMatrix<f64>, row: usize, groups: &TwoGroups) -> f64 {
    group_mean(data, row, &groups.high) - group_mean(data, row, &groups.low)
}

pub(crate) fn group_mean(data: &DMatrix<f64>, row: usize, samples: &[usize]) -> f64 {
    let sum: f64 = samples.iter().map(|&j| data[(row, j)]).sum();
    sum / samples.len() as f64
}

fn group_sd(data: &DMatrix<f64>, row: usize, samples: &[usize]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let values: Vec<f64> = samples.iter().map(|&j| data[(row, j)]).collect();
    let sd = values.iter().std_dev();
    if sd.is_finite() {
        sd
    } else {
        0.0
    }
}
