//! Core data structures: abundance matrix, labels, results.

mod abundance;
mod labels;
mod result;

pub use abundance::AbundanceMatrix;
pub use labels::{Labels, TwoGroups};
pub use result::{DsfdrResult, FeatureResult, ResultSummary};
