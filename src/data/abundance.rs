//! Dense abundance matrix (features × samples).

use crate::error::{DsfdrError, Result};
use nalgebra::DMatrix;

/// A dense feature-by-sample abundance matrix.
///
/// Rows represent features (taxa/OTUs), columns represent samples. Values are
/// read-only once constructed; all statistics borrow the underlying matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceMatrix {
    /// Values (features × samples).
    data: DMatrix<f64>,
    /// Feature identifiers (row names).
    feature_ids: Vec<String>,
    /// Sample identifiers (column names).
    sample_ids: Vec<String>,
}

impl AbundanceMatrix {
    /// Create a new AbundanceMatrix from a dense matrix and identifiers.
    pub fn new(
        data: DMatrix<f64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(DsfdrError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(DsfdrError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        for i in 0..nrows {
            for j in 0..ncols {
                let value = data[(i, j)];
                if !value.is_finite() {
                    return Err(DsfdrError::InvalidValue {
                        row: i,
                        col: j,
                        value,
                    });
                }
            }
        }
        Ok(Self {
            data,
            feature_ids,
            sample_ids,
        })
    }

    /// Wrap a matrix with generated identifiers (`F0..`, `S0..`).
    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self> {
        let feature_ids = (0..data.nrows()).map(|i| format!("F{}", i)).collect();
        let sample_ids = (0..data.ncols()).map(|j| format!("S{}", j)).collect();
        Self::new(data, feature_ids, sample_ids)
    }

    /// Build from row-major values.
    pub fn from_row_slice(n_features: usize, n_samples: usize, values: &[f64]) -> Result<Self> {
        if values.len() != n_features * n_samples {
            return Err(DsfdrError::DimensionMismatch {
                expected: n_features * n_samples,
                actual: values.len(),
            });
        }
        Self::from_matrix(DMatrix::from_row_slice(n_features, n_samples, values))
    }

    /// Build from one vector per feature. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_samples = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != n_samples) {
            return Err(DsfdrError::DimensionMismatch {
                expected: n_samples,
                actual: bad.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_row_slice(rows.len(), n_samples, &flat)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// True when there are no features or no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_features() == 0 || self.n_samples() == 0
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get reference to the underlying matrix.
    #[inline]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Same features and samples with new values, e.g. after a transform.
    ///
    /// The values go through the same shape and finiteness checks as [`new`](Self::new).
    pub fn with_values(&self, data: DMatrix<f64>) -> Result<Self> {
        if data.shape() != self.data.shape() {
            return Err(DsfdrError::DimensionMismatch {
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        Self::new(data, self.feature_ids.clone(), self.sample_ids.clone())
    }

    /// Number of non-zero samples for a feature.
    pub fn nonzero_count(&self, feature: usize) -> usize {
        self.data.row(feature).iter().filter(|&&v| v != 0.0).count()
    }

    /// Keep only the given features, in the given order.
    pub fn select_features(&self, features: &[usize]) -> Self {
        let n_samples = self.n_samples();
        let mut values = Vec::with_capacity(features.len() * n_samples);
        for &i in features {
            values.extend(self.data.row(i).iter().copied());
        }
        Self {
            data: DMatrix::from_row_slice(features.len(), n_samples, &values),
            feature_ids: features.iter().map(|&i| self.feature_ids[i].clone()).collect(),
            sample_ids: self.sample_ids.clone(),
        }
    }
}
