//! Run configuration, loadable from YAML or JSON.

use crate::correct::{validate_alpha, FdrMethod};
use crate::error::{DsfdrError, Result};
use crate::permute::{resolve_mode, PermutationMode};
use crate::stats::Statistic;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};

/// Parameters of one dsfdr run.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```yaml
/// method: mannwhitney
/// transform: none
/// alpha: 0.05
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DsfdrConfig {
    /// Test statistic.
    pub method: Statistic,
    /// Transform applied to the matrix before testing.
    pub transform: Transform,
    /// Target FDR level, strictly between 0 and 1.
    pub alpha: f64,
    /// Number of permutation rounds.
    pub n_permutations: usize,
    /// FDR procedure.
    pub fdr_method: FdrMethod,
    /// Seed for the permutation rounds; drawn at random when absent.
    pub seed: Option<u64>,
    /// Run permutation rounds in parallel.
    pub parallel: bool,
    /// Null generation strategy.
    pub permutation_mode: PermutationMode,
}

impl Default for DsfdrConfig {
    fn default() -> Self {
        Self {
            method: Statistic::MeanDiff,
            transform: Transform::Rank,
            alpha: 0.1,
            n_permutations: 1000,
            fdr_method: FdrMethod::Dsfdr,
            seed: None,
            parallel: true,
            permutation_mode: PermutationMode::Auto,
        }
    }
}

impl DsfdrConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(DsfdrError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        self.check_serializable()?;
        serde_yaml::to_string(self).map_err(DsfdrError::from)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(DsfdrError::from)
    }

    /// Save to pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        self.check_serializable()?;
        serde_json::to_string_pretty(self).map_err(DsfdrError::from)
    }

    /// Check every parameter that can be checked without data.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        if self.n_permutations == 0 {
            return Err(DsfdrError::InvalidConfig(
                "n_permutations must be at least 1".to_string(),
            ));
        }
        resolve_mode(self.permutation_mode, &self.method)?;
        Ok(())
    }

    fn check_serializable(&self) -> Result<()> {
        if self.method.is_custom() {
            return Err(DsfdrError::InvalidConfig(format!(
                "custom statistic '{}' cannot be serialized",
                self.method.name()
            )));
        }
        if self.transform.is_custom() {
            return Err(DsfdrError::InvalidConfig(format!(
                "custom transform '{}' cannot be serialized",
                self.transform.name()
            )));
        }
        Ok(())
    }
}
