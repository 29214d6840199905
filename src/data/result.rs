//! Result types for permutation-based FDR testing.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of one dsfdr run.
///
/// All per-feature vectors have one entry per feature of the input matrix,
/// in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsfdrResult {
    /// Feature identifiers.
    pub feature_ids: Vec<String>,
    /// Whether the null hypothesis was rejected for each feature.
    pub reject: Vec<bool>,
    /// Observed test statistic (effect size) for each feature.
    pub statistic: Vec<f64>,
    /// Permutation p-values.
    pub p_values: Vec<f64>,
    /// FDR-adjusted p-values (q-values).
    pub q_values: Vec<f64>,
    /// Name of the test statistic.
    pub method: String,
    /// Name of the value transform.
    pub transform: String,
    /// Name of the FDR procedure.
    pub fdr_method: String,
    /// Target FDR level.
    pub alpha: f64,
    /// Number of permutations used to build the null.
    pub n_permutations: usize,
    /// Seed of the first permutation round.
    pub seed: u64,
}

/// Per-feature view into a [`DsfdrResult`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureResult<'a> {
    pub feature_id: &'a str,
    pub reject: bool,
    pub statistic: f64,
    pub p_value: f64,
    pub q_value: f64,
}

impl DsfdrResult {
    /// Number of features.
    pub fn len(&self) -> usize {
        self.reject.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.reject.is_empty()
    }

    /// Number of rejected null hypotheses.
    pub fn n_rejected(&self) -> usize {
        self.reject.iter().filter(|&&r| r).count()
    }

    /// Indices of rejected features.
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.reject
            .iter()
            .enumerate()
            .filter(|(_, &r)| r)
            .map(|(i, _)| i)
            .collect()
    }

    /// Identifiers of rejected features.
    pub fn rejected_ids(&self) -> Vec<&str> {
        self.rejected_indices()
            .into_iter()
            .map(|i| self.feature_ids[i].as_str())
            .collect()
    }

    /// Result for a single feature.
    pub fn feature(&self, index: usize) -> Option<FeatureResult<'_>> {
        if index >= self.len() {
            return None;
        }
        Some(FeatureResult {
            feature_id: &self.feature_ids[index],
            reject: self.reject[index],
            statistic: self.statistic[index],
            p_value: self.p_values[index],
            q_value: self.q_values[index],
        })
    }

    /// Iterate over per-feature results.
    pub fn iter(&self) -> impl Iterator<Item = FeatureResult<'_>> {
        (0..self.len()).filter_map(move |i| self.feature(i))
    }

    /// Get results sorted by p-value (ascending).
    pub fn sorted_by_pvalue(&self) -> Vec<FeatureResult<'_>> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
        sorted
    }

    /// Summary counts for the run.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            total: self.len(),
            rejected: self.n_rejected(),
            alpha: self.alpha,
            fdr_method: self.fdr_method.clone(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write results to TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "feature_id\tstatistic\tp_value\tq_value\treject")?;
        for r in self.iter() {
            writeln!(
                writer,
                "{}\t{:.6}\t{:.4e}\t{:.4e}\t{}",
                r.feature_id, r.statistic, r.p_value, r.q_value, r.reject
            )?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// Summary statistics for a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub rejected: usize,
    pub alpha: f64,
    pub fdr_method: String,
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total features tested: {}", self.total)?;
        writeln!(
            f,
            "Rejected at {} alpha = {}: {}",
            self.fdr_method, self.alpha, self.rejected
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn create_test_result() -> DsfdrResult {
        DsfdrResult {
            feature_ids: vec!["t1".into(), "t2".into(), "t3".into()],
            reject: vec![false, true, true],
            statistic: vec![0.1, -3.0, 2.5],
            p_values: vec![0.4, 0.001, 0.01],
            q_values: vec![0.4, 0.003, 0.015],
            method: "meandiff".into(),
            transform: "rank".into(),
            fdr_method: "dsfdr".into(),
            alpha: 0.1,
            n_permutations: 1000,
            seed: 7,
        }
    }

    #[test]
    fn test_rejected() {
        let result = create_test_result();
        assert_eq!(result.len(), 3);
        assert_eq!(result.n_rejected(), 2);
        assert_eq!(result.rejected_indices(), vec![1, 2]);
        assert_eq!(result.rejected_ids(), vec!["t2", "t3"]);
    }

    #[test]
    fn test_sorted_by_pvalue() {
        let result = create_test_result();
        let sorted = result.sorted_by_pvalue();
        let ids: Vec<&str> = sorted.iter().map(|r| r.feature_id).collect();
        assert_eq!(ids, vec!["t2", "t3", "t1"]);
    }

    #[test]
    fn test_feature_out_of_range() {
        let result = create_test_result();
        assert!(result.feature(3).is_none());
        assert_eq!(result.feature(0).unwrap().statistic, 0.1);
    }

    #[test]
    fn test_summary() {
        let summary = create_test_result().summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rejected, 2);
        assert!(summary.to_string().contains("dsfdr"));
    }

    #[test]
    fn test_to_tsv() {
        let result = create_test_result();
        let file = NamedTempFile::new().unwrap();
        result.to_tsv(file.path()).unwrap();

        let mut contents = String::new();
        File::open(file.path())
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("feature_id\tstatistic"));
        assert!(lines[2].starts_with("t2\t-3.000000"));
        assert!(lines[2].ends_with("true"));
    }

    #[test]
    fn test_json() {
        let result = create_test_result();
        let json = result.to_json().unwrap();
        let back: DsfdrResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.feature_ids, result.feature_ids);
        assert_eq!(back.reject, result.reject);
        assert_eq!(back.n_permutations, 1000);
        for (a, b) in back.p_values.iter().zip(&result.p_values) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
