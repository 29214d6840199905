//! Value transforms applied to the matrix before any statistic is computed.
//!
//! The transform runs once, before the observed statistic; every permutation
//! round then reuses the transformed matrix, so observed and null values are
//! always computed on the same scale.
//!
//! - **none**: values as given
//! - **rank**: per-feature average ranks across samples
//! - **log2**: `log2(max(x, 2))`, flooring small counts at 1
//! - **binary**: presence/absence (non-zero becomes 1)
//! - **norm**: per-sample total-sum scaling (columns sum to 1)
//! - **custom**: any user-supplied function

use crate::error::{DsfdrError, Result};
use crate::stats::rank_average;
use nalgebra::DMatrix;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Signature of a user-supplied transform.
pub type TransformFn = dyn Fn(&DMatrix<f64>) -> Result<DMatrix<f64>> + Send + Sync;

/// A named user-supplied transform.
#[derive(Clone)]
pub struct CustomTransform {
    name: String,
    func: Arc<TransformFn>,
}

impl fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Supported value transforms.
#[derive(Debug, Clone, Default)]
pub enum Transform {
    None,
    #[default]
    Rank,
    Log2,
    Binary,
    Norm,
    Custom(CustomTransform),
}

impl Transform {
    /// Wrap a user-supplied function as a transform.
    pub fn custom<F>(name: &str, func: F) -> Self
    where
        F: Fn(&DMatrix<f64>) -> Result<DMatrix<f64>> + Send + Sync + 'static,
    {
        Transform::Custom(CustomTransform {
            name: name.to_string(),
            func: Arc::new(func),
        })
    }

    /// Look up a built-in transform by name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Transform::None),
            "rank" | "rankdata" => Ok(Transform::Rank),
            "log" | "log2" | "log2data" => Ok(Transform::Log2),
            "binary" | "binarydata" => Ok(Transform::Binary),
            "norm" | "normdata" => Ok(Transform::Norm),
            _ => Err(DsfdrError::UnknownTransform(name.to_string())),
        }
    }

    /// Name used in configuration and results.
    pub fn name(&self) -> &str {
        match self {
            Transform::None => "none",
            Transform::Rank => "rank",
            Transform::Log2 => "log2",
            Transform::Binary => "binary",
            Transform::Norm => "norm",
            Transform::Custom(c) => &c.name,
        }
    }

    /// True for user-supplied transforms.
    pub fn is_custom(&self) -> bool {
        matches!(self, Transform::Custom(_))
    }

    /// Apply the transform, returning a new matrix of the same shape.
    pub fn apply(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let out = match self {
            Transform::None => data.clone(),
            Transform::Rank => rank_rows(data),
            Transform::Log2 => data.map(|x| x.max(2.0).log2()),
            Transform::Binary => data.map(|x| if x != 0.0 { 1.0 } else { 0.0 }),
            Transform::Norm => total_sum_scale(data),
            Transform::Custom(c) => (c.func)(data)?,
        };
        if out.shape() != data.shape() {
            return Err(DsfdrError::DimensionMismatch {
                expected: data.len(),
                actual: out.len(),
            });
        }
        Ok(out)
    }
}

fn rank_rows(data: &DMatrix<f64>) -> DMatrix<f64> {
    let mut ranked = DMatrix::zeros(data.nrows(), data.ncols());
    for i in 0..data.nrows() {
        let row: Vec<f64> = data.row(i).iter().copied().collect();
        for (j, r) in rank_average(&row).into_iter().enumerate() {
            ranked[(i, j)] = r;
        }
    }
    ranked
}

/// Divide every sample (column) by its total. Empty samples stay zero.
fn total_sum_scale(data: &DMatrix<f64>) -> DMatrix<f64> {
    let mut scaled = data.clone();
    for mut col in scaled.column_iter_mut() {
        let total = col.sum();
        if total != 0.0 {
            col /= total;
        }
    }
    scaled
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Transform::Custom(a), Transform::Custom(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.func, &b.func)
            }
            (a, b) => !a.is_custom() && !b.is_custom() && a.name() == b.name(),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = DsfdrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Transform::Custom(c) = self {
            return Err(serde::ser::Error::custom(format!(
                "custom transform '{}' cannot be serialized",
                c.name
            )));
        }
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Transform::from_name(&name).map_err(serde::de::Error::custom)
    }
}
