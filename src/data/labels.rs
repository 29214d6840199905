//! Per-sample label vectors and the group partitions derived from them.

use crate::error::{DsfdrError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One numeric label per sample.
///
/// Groups are the distinct label values sorted ascending, so group `0` is
/// always the smallest label. Samples do not need to be ordered by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    values: Vec<f64>,
}

/// Sample indices of a two-group partition.
///
/// `low` holds the samples carrying the smaller label value, `high` the
/// samples carrying the larger one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoGroups {
    pub low: Vec<usize>,
    pub high: Vec<usize>,
}

impl Labels {
    /// Create labels from numeric values. Non-finite values are rejected.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(DsfdrError::InvalidLabels(format!(
                "label at sample {} is not finite ({})",
                pos, values[pos]
            )));
        }
        // -0.0 + 0.0 == +0.0, so both zeros land in one group
        let values = values.into_iter().map(|v| v + 0.0).collect();
        Ok(Self { values })
    }

    /// Create labels from a boolean vector (`false` = 0, `true` = 1).
    pub fn from_bools(values: &[bool]) -> Self {
        Self {
            values: values.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
        }
    }

    /// Create labels from categorical values.
    ///
    /// Categories are encoded by their position in sorted order, so the
    /// encoding does not depend on which category appears first.
    pub fn from_categories<S: AsRef<str>>(values: &[S]) -> Self {
        let levels: BTreeSet<&str> = values.iter().map(|v| v.as_ref()).collect();
        let levels: Vec<&str> = levels.into_iter().collect();
        let encoded = values
            .iter()
            .map(|v| {
                // levels is built from values, so the search always hits
                levels
                    .binary_search(&v.as_ref())
                    .map(|i| i as f64)
                    .unwrap_or(f64::NAN)
            })
            .collect();
        Self { values: encoded }
    }

    /// Wrap already validated values (used for permuted copies).
    pub(crate) fn from_values_unchecked(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of samples labelled.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw label values in sample order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Distinct label values, sorted ascending.
    pub fn levels(&self) -> Vec<f64> {
        let mut levels = self.values.clone();
        levels.sort_by(|a, b| a.total_cmp(b));
        levels.dedup();
        levels
    }

    /// Number of distinct label values.
    pub fn n_groups(&self) -> usize {
        self.levels().len()
    }

    /// Group index of every sample plus the number of groups.
    pub fn group_indices(&self) -> (Vec<usize>, usize) {
        let levels = self.levels();
        let groups = self
            .values
            .iter()
            .map(|v| {
                levels
                    .binary_search_by(|l| l.total_cmp(v))
                    .unwrap_or_default()
            })
            .collect();
        (groups, levels.len())
    }

    /// Split the samples into the two label groups.
    ///
    /// Fails unless exactly two distinct label values are present.
    pub fn two_groups(&self) -> Result<TwoGroups> {
        let (groups, n_groups) = self.group_indices();
        if n_groups != 2 {
            return Err(DsfdrError::InvalidLabels(format!(
                "two-group statistic requires exactly 2 distinct labels, found {}",
                n_groups
            )));
        }
        let mut low = Vec::new();
        let mut high = Vec::new();
        for (sample, &g) in groups.iter().enumerate() {
            if g == 0 {
                low.push(sample);
            } else {
                high.push(sample);
            }
        }
        Ok(TwoGroups { low, high })
    }
}

impl From<&[bool]> for Labels {
    fn from(values: &[bool]) -> Self {
        Self::from_bools(values)
    }
}

impl TwoGroups {
    /// Size of the low-label group.
    pub fn n_low(&self) -> usize {
        self.low.len()
    }

    /// Size of the high-label group.
    pub fn n_high(&self) -> usize {
        self.high.len()
    }
}
