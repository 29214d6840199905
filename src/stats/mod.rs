//! Per-feature test statistics.
//!
//! Every statistic maps `(matrix, labels)` to one value per feature (row)
//! without touching its inputs:
//!
//! - **meandiff** / **stdmeandiff**: two-group mean difference (optionally
//!   scaled by the group standard deviations)
//! - **mannwhitney**: Mann-Whitney U between two groups
//! - **kruwallis**: Kruskal-Wallis H across two or more groups
//! - **pearson** / **spearman**: correlation with a numeric label
//! - **nonzeropearson** / **nonzerospearman**: correlation over non-zero samples
//! - **custom**: any user-supplied function

pub mod correlation;
pub mod meandiff;
pub mod nonparametric;
pub mod rank;

pub use correlation::{nonzero_pearson, nonzero_spearman, pearson, spearman};
pub use meandiff::{meandiff, stdmeandiff};
pub use nonparametric::{kruwallis, mannwhitney};
pub use rank::{rank_average, tie_term};

use crate::data::Labels;
use crate::error::{DsfdrError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Signature shared by all statistic functions.
pub type StatFn = dyn Fn(&DMatrix<f64>, &Labels) -> Result<Vec<f64>> + Send + Sync;

/// A named user-supplied statistic.
///
/// Custom statistics are compared by magnitude, like the signed built-ins.
#[derive(Clone)]
pub struct CustomStatistic {
    name: String,
    func: Arc<StatFn>,
}

impl fmt::Debug for CustomStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStatistic")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Supported test statistics.
#[derive(Debug, Clone, Default)]
pub enum Statistic {
    #[default]
    MeanDiff,
    StdMeanDiff,
    MannWhitney,
    KruskalWallis,
    Pearson,
    Spearman,
    NonzeroPearson,
    NonzeroSpearman,
    Custom(CustomStatistic),
}

impl Statistic {
    /// All built-in statistics.
    pub const BUILTIN: [Statistic; 8] = [
        Statistic::MeanDiff,
        Statistic::StdMeanDiff,
        Statistic::MannWhitney,
        Statistic::KruskalWallis,
        Statistic::Pearson,
        Statistic::Spearman,
        Statistic::NonzeroPearson,
        Statistic::NonzeroSpearman,
    ];

    /// Wrap a user-supplied function as a statistic.
    pub fn custom<F>(name: &str, func: F) -> Self
    where
        F: Fn(&DMatrix<f64>, &Labels) -> Result<Vec<f64>> + Send + Sync + 'static,
    {
        Statistic::Custom(CustomStatistic {
            name: name.to_string(),
            func: Arc::new(func),
        })
    }

    /// Look up a built-in statistic by name.
    pub fn from_name(name: &str) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        Self::BUILTIN
            .into_iter()
            .find(|s| s.name() == key)
            .ok_or_else(|| DsfdrError::UnknownMethod(name.to_string()))
    }

    /// Name used in configuration and results.
    pub fn name(&self) -> &str {
        match self {
            Statistic::MeanDiff => "meandiff",
            Statistic::StdMeanDiff => "stdmeandiff",
            Statistic::MannWhitney => "mannwhitney",
            Statistic::KruskalWallis => "kruwallis",
            Statistic::Pearson => "pearson",
            Statistic::Spearman => "spearman",
            Statistic::NonzeroPearson => "nonzeropearson",
            Statistic::NonzeroSpearman => "nonzerospearman",
            Statistic::Custom(c) => &c.name,
        }
    }

    /// True for user-supplied statistics.
    pub fn is_custom(&self) -> bool {
        matches!(self, Statistic::Custom(_))
    }

    /// Whether the sign-flip null applies to this statistic.
    pub fn supports_sign_flip(&self) -> bool {
        matches!(self, Statistic::MeanDiff | Statistic::StdMeanDiff)
    }

    /// Check that the labels define the groups this statistic needs.
    pub fn validate_labels(&self, labels: &Labels) -> Result<()> {
        let n_groups = labels.n_groups();
        match self {
            Statistic::MeanDiff | Statistic::StdMeanDiff | Statistic::MannWhitney
                if n_groups != 2 =>
            {
                Err(DsfdrError::InvalidLabels(format!(
                    "{} requires exactly 2 distinct labels, found {}",
                    self.name(),
                    n_groups
                )))
            }
            Statistic::Custom(_) => Ok(()),
            _ if n_groups < 2 => Err(DsfdrError::InvalidLabels(format!(
                "{} requires at least 2 distinct labels, found {}",
                self.name(),
                n_groups
            ))),
            _ => Ok(()),
        }
    }

    /// Compute the statistic for every feature.
    pub fn compute(&self, data: &DMatrix<f64>, labels: &Labels) -> Result<Vec<f64>> {
        let values = match self {
            Statistic::MeanDiff => meandiff(data, labels)?,
            Statistic::StdMeanDiff => stdmeandiff(data, labels)?,
            Statistic::MannWhitney => mannwhitney(data, labels)?,
            Statistic::KruskalWallis => kruwallis(data, labels)?,
            Statistic::Pearson => pearson(data, labels)?,
            Statistic::Spearman => spearman(data, labels)?,
            Statistic::NonzeroPearson => nonzero_pearson(data, labels)?,
            Statistic::NonzeroSpearman => nonzero_spearman(data, labels)?,
            Statistic::Custom(c) => (c.func)(data, labels)?,
        };
        if values.len() != data.nrows() {
            return Err(DsfdrError::DimensionMismatch {
                expected: data.nrows(),
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Map statistic values onto a scale where larger means more extreme.
    ///
    /// Signed statistics use their magnitude, Kruskal-Wallis H is already
    /// one-sided, and Mann-Whitney `min(U)` is measured from its centre.
    /// Non-finite values are mapped to 0 so they can never look significant.
    pub fn extremeness(&self, values: &[f64], labels: &Labels) -> Result<Vec<f64>> {
        let scores = match self {
            Statistic::MannWhitney => nonparametric::mannwhitney_extremeness(values, labels)?,
            Statistic::KruskalWallis => values.to_vec(),
            _ => values.iter().map(|v| v.abs()).collect(),
        };
        Ok(scores
            .into_iter()
            .map(|v| if v.is_finite() { v } else { 0.0 })
            .collect())
    }
}

impl PartialEq for Statistic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Statistic::Custom(a), Statistic::Custom(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.func, &b.func)
            }
            (a, b) => !a.is_custom() && !b.is_custom() && a.name() == b.name(),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = DsfdrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl Serialize for Statistic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Statistic::Custom(c) = self {
            return Err(serde::ser::Error::custom(format!(
                "custom statistic '{}' cannot be serialized",
                c.name
            )));
        }
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Statistic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Statistic::from_name(&name).map_err(serde::de::Error::custom)
    }
}
