//! Multiple testing correction over permutation p-values.
//!
//! - **dsfdr**: discrete FDR estimated from the pooled permutation null
//! - **bhfdr**: Benjamini-Hochberg step-up
//! - **byfdr**: Benjamini-Yekutieli step-up (arbitrary dependence)
//! - **filterbh**: BH after dropping features that cannot reach `alpha`

pub mod bh;
pub mod dsfdr;
pub mod filter;

pub use bh::{correct_bh, correct_by, harmonic, StepUp};
pub use dsfdr::{correct_dsfdr, DiscreteFdr};
pub use filter::{min_attainable_pvalue, testable_features};

use crate::error::{DsfdrError, Result};
use crate::permute::NullDistribution;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported FDR procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FdrMethod {
    #[default]
    #[serde(rename = "dsfdr")]
    Dsfdr,
    #[serde(rename = "bhfdr")]
    Bh,
    #[serde(rename = "byfdr")]
    By,
    #[serde(rename = "filterbh")]
    FilterBh,
}

impl FdrMethod {
    /// Look up an FDR method by name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dsfdr" => Ok(FdrMethod::Dsfdr),
            "bhfdr" => Ok(FdrMethod::Bh),
            "byfdr" => Ok(FdrMethod::By),
            "filterbh" => Ok(FdrMethod::FilterBh),
            _ => Err(DsfdrError::UnknownFdrMethod(name.to_string())),
        }
    }

    /// Name used in configuration and results.
    pub fn name(&self) -> &'static str {
        match self {
            FdrMethod::Dsfdr => "dsfdr",
            FdrMethod::Bh => "bhfdr",
            FdrMethod::By => "byfdr",
            FdrMethod::FilterBh => "filterbh",
        }
    }
}

impl fmt::Display for FdrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FdrMethod {
    type Err = DsfdrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Per-feature outcome of a correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub reject: Vec<bool>,
    pub p_values: Vec<f64>,
    pub q_values: Vec<f64>,
}

/// Check that `alpha` lies strictly between 0 and 1.
pub fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(DsfdrError::InvalidConfig(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )))
    }
}

/// Apply `method` to a permutation null at level `alpha`.
///
/// [`FdrMethod::FilterBh`] behaves as BH here; the prefilter runs earlier,
/// on the untransformed matrix.
pub fn correct(method: FdrMethod, null: &NullDistribution, alpha: f64) -> Result<Correction> {
    validate_alpha(alpha)?;
    let correction = match method {
        FdrMethod::Dsfdr => {
            let ds = correct_dsfdr(null, alpha);
            Correction {
                reject: ds.reject,
                p_values: ds.p_values,
                q_values: ds.q_values,
            }
        }
        FdrMethod::Bh | FdrMethod::FilterBh => {
            let p_values = null.p_values();
            let StepUp { reject, q_values } = correct_bh(&p_values, alpha);
            Correction {
                reject,
                p_values,
                q_values,
            }
        }
        FdrMethod::By => {
            let p_values = null.p_values();
            let StepUp { reject, q_values } = correct_by(&p_values, alpha);
            Correction {
                reject,
                p_values,
                q_values,
            }
        }
    };
    Ok(correction)
}
