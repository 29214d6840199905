//! Orchestration of a full dsfdr run.

use super::config::DsfdrConfig;
use crate::correct::{correct, testable_features, Correction, FdrMethod};
use crate::data::{AbundanceMatrix, DsfdrResult, Labels};
use crate::error::{DsfdrError, Result};
use crate::permute::{permutation_null, PermutationConfig, PermutationMode};
use crate::stats::Statistic;
use crate::transform::Transform;
use tracing::{debug, info, warn};

/// Builder for a dsfdr run.
///
/// ```no_run
/// use dsfdr::prelude::*;
///
/// let matrix = AbundanceMatrix::from_rows(&[vec![0.0, 1.0, 10.0, 12.0]]).unwrap();
/// let labels = Labels::new(vec![0.0, 0.0, 1.0, 1.0]).unwrap();
/// let result = Dsfdr::new()
///     .method(Statistic::MannWhitney)
///     .transform(Transform::None)
///     .alpha(0.1)
///     .seed(1)
///     .run(&matrix, &labels)
///     .unwrap();
/// println!("{}", result.summary());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dsfdr {
    config: DsfdrConfig,
}

impl Dsfdr {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: &DsfdrConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn method(mut self, method: Statistic) -> Self {
        self.config.method = method;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.config.transform = transform;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn n_permutations(mut self, n_permutations: usize) -> Self {
        self.config.n_permutations = n_permutations;
        self
    }

    pub fn fdr_method(mut self, fdr_method: FdrMethod) -> Self {
        self.config.fdr_method = fdr_method;
        self
    }

    /// Fix the seed so the run is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Run permutation rounds on the rayon pool (default) or serially.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn permutation_mode(mut self, mode: PermutationMode) -> Self {
        self.config.permutation_mode = mode;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &DsfdrConfig {
        &self.config
    }

    /// Run on a matrix and its sample labels.
    pub fn run(&self, matrix: &AbundanceMatrix, labels: &Labels) -> Result<DsfdrResult> {
        dsfdr(matrix, labels, &self.config)
    }
}

/// Test every feature for association with `labels` and control the FDR.
///
/// Checks run in this order: the configuration, then empty input (which
/// yields a result with nothing rejected), then the label length, then the
/// label groups required by the statistic and FDR method.
pub fn dsfdr(
    matrix: &AbundanceMatrix,
    labels: &Labels,
    config: &DsfdrConfig,
) -> Result<DsfdrResult> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);

    debug!(
        method = %config.method,
        transform = %config.transform,
        fdr_method = %config.fdr_method,
        n_features = matrix.n_features(),
        n_samples = matrix.n_samples(),
        "starting dsfdr"
    );

    if matrix.is_empty() {
        debug!("empty input, nothing to test");
        return Ok(assemble(
            matrix,
            config,
            seed,
            vec![0.0; matrix.n_features()],
            unrejected(matrix.n_features()),
        ));
    }

    if labels.len() != matrix.n_samples() {
        return Err(DsfdrError::DimensionMismatch {
            expected: matrix.n_samples(),
            actual: labels.len(),
        });
    }
    config.method.validate_labels(labels)?;

    let resolution = 1.0 / (config.n_permutations as f64 + 1.0);
    if resolution > config.alpha {
        warn!(
            n_permutations = config.n_permutations,
            alpha = config.alpha,
            "too few permutations: the smallest attainable p-value {:.4} exceeds alpha",
            resolution
        );
    }

    let perm_config = PermutationConfig {
        n_permutations: config.n_permutations,
        seed,
        parallel: config.parallel,
        mode: config.permutation_mode,
    };

    let transformed = matrix.with_values(config.transform.apply(matrix.matrix())?)?;

    let (statistic, correction) = match config.fdr_method {
        FdrMethod::FilterBh => filtered(matrix, &transformed, labels, config, &perm_config)?,
        method => {
            debug!(n_permutations = config.n_permutations, "building permutation null");
            let null =
                permutation_null(transformed.matrix(), labels, &config.method, &perm_config)?;
            let correction = correct(method, &null, config.alpha)?;
            (null.statistic, correction)
        }
    };

    let result = assemble(matrix, config, seed, statistic, correction);
    info!(
        rejected = result.n_rejected(),
        total = result.len(),
        "dsfdr finished"
    );
    Ok(result)
}

/// Filtered BH: only features that can still reach `alpha` are permuted and
/// corrected; the rest are reported with p = q = 1.
fn filtered(
    matrix: &AbundanceMatrix,
    transformed: &AbundanceMatrix,
    labels: &Labels,
    config: &DsfdrConfig,
    perm_config: &PermutationConfig,
) -> Result<(Vec<f64>, Correction)> {
    let kept = testable_features(matrix, labels, config.alpha)?;
    let n_excluded = matrix.n_features() - kept.len();
    if n_excluded > 0 {
        warn!(
            excluded = n_excluded,
            kept = kept.len(),
            "features cannot reach alpha and were excluded before testing"
        );
    }

    let statistic = config.method.compute(transformed.matrix(), labels)?;
    let mut correction = unrejected(matrix.n_features());
    if kept.is_empty() {
        return Ok((statistic, correction));
    }

    let subset = transformed.select_features(&kept);
    debug!(n_permutations = config.n_permutations, "building permutation null");
    let null = permutation_null(subset.matrix(), labels, &config.method, perm_config)?;
    let partial = correct(FdrMethod::FilterBh, &null, config.alpha)?;
    for (k, &feature) in kept.iter().enumerate() {
        correction.reject[feature] = partial.reject[k];
        correction.p_values[feature] = partial.p_values[k];
        correction.q_values[feature] = partial.q_values[k];
    }
    Ok((statistic, correction))
}

fn unrejected(n_features: usize) -> Correction {
    Correction {
        reject: vec![false; n_features],
        p_values: vec![1.0; n_features],
        q_values: vec![1.0; n_features],
    }
}

fn assemble(
    matrix: &AbundanceMatrix,
    config: &DsfdrConfig,
    seed: u64,
    statistic: Vec<f64>,
    correction: Correction,
) -> DsfdrResult {
    DsfdrResult {
        feature_ids: matrix.feature_ids().to_vec(),
        reject: correction.reject,
        statistic,
        p_values: correction.p_values,
        q_values: correction.q_values,
        method: config.method.name().to_string(),
        transform: config.transform.name().to_string(),
        fdr_method: config.fdr_method.name().to_string(),
        alpha: config.alpha,
        n_permutations: config.n_permutations,
        seed,
    }
}
