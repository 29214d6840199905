//! Correlation of each feature with a numeric label.

use super::rank::rank_average;
use crate::data::Labels;
use crate::error::Result;
use nalgebra::DMatrix;

/// Pearson correlation between every feature row and the label values.
pub fn pearson(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let y = labels.values();
    Ok((0..data.nrows())
        .map(|row| {
            let x: Vec<f64> = data.row(row).iter().copied().collect();
            correlation(&x, y)
        })
        .collect())
}

/// Spearman correlation: Pearson correlation of average ranks.
pub fn spearman(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    let y = rank_average(labels.values());
    Ok((0..data.nrows())
        .map(|row| {
            let x: Vec<f64> = data.row(row).iter().copied().collect();
            correlation(&rank_average(&x), &y)
        })
        .collect())
}

/// Pearson correlation using only the samples where the feature is non-zero.
pub fn nonzero_pearson(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    Ok(nonzero_rows(data, labels)
        .map(|(x, y)| correlation(&x, &y))
        .collect())
}

/// Spearman correlation using only the samples where the feature is non-zero.
///
/// Ranks are recomputed within the non-zero subset.
pub fn nonzero_spearman(data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
    Ok(nonzero_rows(data, labels)
        .map(|(x, y)| correlation(&rank_average(&x), &rank_average(&y)))
        .collect())
}

fn nonzero_rows<'a>(
    data: &'a DMatrix<f64>,
    labels: &'a Labels,
) -> impl Iterator<Item = (Vec<f64>, Vec<f64>)> + 'a {
    (0..data.nrows()).map(move |row| {
        data.row(row)
            .iter()
            .zip(labels.values())
            .filter(|(&v, _)| v != 0.0)
            .map(|(&v, &l)| (v, l))
            .unzip()
    })
}

/// Pearson correlation of two equal-length slices.
///
/// Returns 0 when either side has zero variance or fewer than two points.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return 0.0;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom > 0.0 {
        (sxy / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 5e-3;

    fn create_test_data() -> (DMatrix<f64>, Labels) {
        let data = DMatrix::from_row_slice(
            3,
            8,
            &[
                0.0, 1.0, 3.0, 5.0, 10.0, 30.0, 40.0, 50.0, //
                1.0, 2.0, 3.0, 4.0, 4.0, 3.0, 2.0, 1.0, //
                0.0, 0.0, 0.0, 1.0, 0.0, 3.0, 0.0, 1.0,
            ],
        );
        let labels = Labels::new(vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        (data, labels)
    }

    #[test]
    fn test_pearson_known() {
        let (data, labels) = create_test_data();
        let res = pearson(&data, &labels).unwrap();
        assert!((res[0] - (-0.82)).abs() < TOL);
        assert!(res[1].abs() < 1e-12);
        assert!((res[2] - (-0.378)).abs() < TOL);
    }

    #[test]
    fn test_spearman_known() {
        let (data, labels) = create_test_data();
        let res = spearman(&data, &labels).unwrap();
        assert!((res[0] - (-0.873)).abs() < TOL);
        assert!(res[1].abs() < 1e-12);
        assert!((res[2] - (-0.315)).abs() < TOL);
    }

    #[test]
    fn test_zero_variance_is_zero() {
        assert_eq!(correlation(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(correlation(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_nonzero_pearson_ignores_zeros() {
        let data = DMatrix::from_row_slice(1, 6, &[0.0, 0.0, 1.0, 2.0, 3.0, 0.0]);
        let labels = Labels::new(vec![9.0, -4.0, 1.0, 2.0, 3.0, 7.0]).unwrap();
        let res = nonzero_pearson(&data, &labels).unwrap();
        assert!((res[0] - 1.0).abs() < 1e-12);
        let res = nonzero_spearman(&data, &labels).unwrap();
        assert!((res[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nonzero_too_few_samples() {
        let data = DMatrix::from_row_slice(1, 3, &[0.0, 4.0, 0.0]);
        let labels = Labels::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(nonzero_pearson(&data, &labels).unwrap(), vec![0.0]);
    }
}
