//! Discrete FDR testing for sparse, discrete abundance data.
//!
//! Given a feature × sample matrix and one label per sample, this library
//! tests every feature for association with the labels using a permutation
//! null, and controls the false discovery rate across features. The
//! discrete FDR procedure (dsfdr) estimates false discoveries from the
//! permuted statistics themselves, which keeps power when many features
//! share the same coarse permutation p-values.
//!
//! # Overview
//!
//! - **data**: Core data structures (AbundanceMatrix, Labels, DsfdrResult)
//! - **transform**: Value transforms applied before testing (rank, log2, ...)
//! - **stats**: Per-feature test statistics (meandiff, mannwhitney, ...)
//! - **permute**: Permutation engine building the empirical null
//! - **correct**: FDR procedures (dsfdr, BH, BY, filtered BH)
//! - **pipeline**: Configuration and execution of a full run
//! - **benchmark**: Simulated datasets with known truth
//!
//! # Example
//!
//! ```no_run
//! use dsfdr::prelude::*;
//!
//! let matrix = AbundanceMatrix::from_rows(&[
//!     vec![0.0, 1.0, 3.0, 5.0, 0.0, 1.0, 100.0, 300.0, 400.0, 500.0, 600.0, 700.0],
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0],
//! ])
//! .unwrap();
//! let labels = Labels::from_bools(&[
//!     true, true, true, true, true, true, false, false, false, false, false, false,
//! ]);
//!
//! let result = Dsfdr::new()
//!     .method(Statistic::MeanDiff)
//!     .transform(Transform::None)
//!     .alpha(0.1)
//!     .n_permutations(1000)
//!     .fdr_method(FdrMethod::Dsfdr)
//!     .seed(31)
//!     .run(&matrix, &labels)
//!     .unwrap();
//! println!("{}", result.summary());
//! ```

pub mod benchmark;
pub mod correct;
pub mod data;
pub mod error;
pub mod permute;
pub mod pipeline;
pub mod stats;
pub mod transform;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::benchmark::{simulate, SimulatedData, SimulationConfig};
    pub use crate::correct::{correct, correct_bh, correct_by, correct_dsfdr, Correction, FdrMethod};
    pub use crate::data::{AbundanceMatrix, DsfdrResult, FeatureResult, Labels, ResultSummary};
    pub use crate::error::{DsfdrError, Result};
    pub use crate::permute::{permutation_null, NullDistribution, PermutationConfig, PermutationMode};
    pub use crate::pipeline::{dsfdr, Dsfdr, DsfdrConfig};
    pub use crate::stats::Statistic;
    pub use crate::transform::Transform;
}
