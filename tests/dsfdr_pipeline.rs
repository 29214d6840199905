//! Integration tests for full dsfdr runs.

use dsfdr::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TOL: f64 = 1e-10;

/// One strongly shifted feature, one symmetric feature, one sparse feature.
fn create_test_data() -> (AbundanceMatrix, Labels) {
    let matrix = AbundanceMatrix::from_rows(&[
        vec![0.0, 1.0, 3.0, 5.0, 0.0, 1.0, 100.0, 300.0, 400.0, 500.0, 600.0, 700.0],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 3.0, 0.0, 1.0],
    ])
    .unwrap();
    let labels = Labels::new(vec![
        1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ])
    .unwrap();
    (matrix, labels)
}

/// Log sink shared with a `tracing_subscriber` fmt layer.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with WARN-level events written to the returned sink.
fn with_captured_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.contents())
}

fn base_run(fdr_method: FdrMethod) -> Dsfdr {
    Dsfdr::new()
        .method(Statistic::MeanDiff)
        .transform(Transform::None)
        .alpha(0.1)
        .n_permutations(1000)
        .fdr_method(fdr_method)
        .seed(31)
}

#[test]
fn test_scenario_all_fdr_methods() {
    let (matrix, labels) = create_test_data();
    for method in [FdrMethod::Dsfdr, FdrMethod::Bh, FdrMethod::By] {
        let result = base_run(method).run(&matrix, &labels).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.reject, vec![true, false, false], "{}", method);
        assert_eq!(result.rejected_ids(), vec!["F0"]);
        assert!((result.p_values[0] - 1.0 / 1001.0).abs() < TOL);
        assert_eq!(result.p_values[1], 1.0);
    }
}

#[test]
fn test_scenario_with_label_permutation() {
    let (matrix, labels) = create_test_data();
    for method in [FdrMethod::Dsfdr, FdrMethod::Bh, FdrMethod::By] {
        let result = base_run(method)
            .permutation_mode(PermutationMode::Labels)
            .run(&matrix, &labels)
            .unwrap();
        assert_eq!(result.reject, vec![true, false, false], "{}", method);
    }
}

#[test]
fn test_rank_statistics_on_scenario() {
    let (matrix, labels) = create_test_data();
    for stat in [Statistic::MannWhitney, Statistic::KruskalWallis] {
        let result = base_run(FdrMethod::Dsfdr)
            .method(stat.clone())
            .run(&matrix, &labels)
            .unwrap();
        // complete separation of 6 vs 6: label-permutation p is 2 / C(12, 6)
        assert!(result.p_values[0] < 0.01, "{}", stat);
        assert_eq!(result.p_values[1], 1.0, "{}", stat);
        assert!(result.reject[0], "{}", stat);
        assert!(!result.reject[1], "{}", stat);
    }
}

#[test]
fn test_deterministic_with_seed() {
    let (matrix, labels) = create_test_data();
    let a = base_run(FdrMethod::Dsfdr).run(&matrix, &labels).unwrap();
    let b = base_run(FdrMethod::Dsfdr).run(&matrix, &labels).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_serial_matches_parallel() {
    let sim = simulate(
        &SimulationConfig::default()
            .with_samples(6)
            .with_features(10, 10, 40)
            .with_seed(3),
    )
    .unwrap();
    for mode in [PermutationMode::Labels, PermutationMode::SignFlip] {
        let run = |parallel: bool| {
            base_run(FdrMethod::Dsfdr)
                .n_permutations(200)
                .permutation_mode(mode)
                .parallel(parallel)
                .run(&sim.matrix, &sim.labels)
                .unwrap()
        };
        assert_eq!(run(false), run(true));
    }
}

#[test]
fn test_monotone_in_alpha() {
    let sim = simulate(
        &SimulationConfig::default()
            .with_samples(5)
            .with_features(20, 20, 60)
            .with_seed(11),
    )
    .unwrap();
    for method in [FdrMethod::Dsfdr, FdrMethod::Bh, FdrMethod::By] {
        let mut previous: Vec<bool> = vec![false; sim.matrix.n_features()];
        for alpha in [0.01, 0.05, 0.1, 0.2, 0.5] {
            let result = base_run(method)
                .alpha(alpha)
                .n_permutations(500)
                .run(&sim.matrix, &sim.labels)
                .unwrap();
            for (before, now) in previous.iter().zip(&result.reject) {
                assert!(!before || *now, "{} lost a rejection at alpha {}", method, alpha);
            }
            previous = result.reject;
        }
    }
}

#[test]
fn test_by_subset_of_bh() {
    let sim = simulate(
        &SimulationConfig::default()
            .with_samples(5)
            .with_features(20, 20, 60)
            .with_seed(5),
    )
    .unwrap();
    let bh = base_run(FdrMethod::Bh).run(&sim.matrix, &sim.labels).unwrap();
    let by = base_run(FdrMethod::By).run(&sim.matrix, &sim.labels).unwrap();
    assert_eq!(bh.p_values, by.p_values);
    for (b, y) in bh.reject.iter().zip(&by.reject) {
        assert!(!*y || *b);
    }
    assert!(by.n_rejected() <= bh.n_rejected());
}

#[test]
fn test_fdr_controlled_on_simulated_data() {
    // FDR is an expectation, so average the realised rate over a few datasets
    let datasets: Vec<SimulatedData> = [31, 32, 33]
        .iter()
        .map(|&seed| {
            simulate(&SimulationConfig::default().with_samples(10).with_seed(seed)).unwrap()
        })
        .collect();
    for method in [FdrMethod::Dsfdr, FdrMethod::Bh, FdrMethod::By, FdrMethod::FilterBh] {
        let mut total_fdr = 0.0;
        for sim in &datasets {
            let result = base_run(method)
                .permutation_mode(PermutationMode::Labels)
                .run(&sim.matrix, &sim.labels)
                .unwrap();
            assert_eq!(result.len(), 1000);
            total_fdr += sim.false_discovery_rate(&result.reject);
            assert!(sim.power(&result.reject) > 0.8, "{}: low power", method);
        }
        let fdr = total_fdr / datasets.len() as f64;
        assert!(fdr <= 0.1, "{}: realised FDR {}", method, fdr);
    }
}

#[test]
fn test_pvalues_bounded_and_qvalues_at_least_p() {
    let sim = simulate(
        &SimulationConfig::default()
            .with_samples(5)
            .with_features(10, 10, 30)
            .with_seed(9),
    )
    .unwrap();
    for method in [FdrMethod::Bh, FdrMethod::By] {
        let result = base_run(method).run(&sim.matrix, &sim.labels).unwrap();
        for (p, q) in result.p_values.iter().zip(&result.q_values) {
            assert!(*p >= 1.0 / 1001.0 - TOL && *p <= 1.0);
            assert!(*q >= *p - TOL && *q <= 1.0);
        }
    }
}

#[test]
fn test_filterbh_on_large_groups() {
    // 1100 vs 1100 samples; feature 0 is non-zero in 600 samples of one group
    let n = 1100;
    let shifted: Vec<f64> = (0..2 * n)
        .map(|j| if (n..n + 600).contains(&j) { 1.0 } else { 0.0 })
        .collect();
    let matrix = AbundanceMatrix::from_rows(&[shifted, vec![0.0; 2 * n]]).unwrap();
    let labels = Labels::from_bools(&(0..2 * n).map(|j| j >= n).collect::<Vec<_>>());

    let run = |method| {
        base_run(method)
            .n_permutations(200)
            .run(&matrix, &labels)
            .unwrap()
    };
    let bh = run(FdrMethod::Bh);
    let filtered = run(FdrMethod::FilterBh);
    assert_eq!(bh.reject, vec![true, false]);
    assert_eq!(filtered.reject, vec![true, false]);
    assert!((filtered.p_values[0] - 1.0 / 201.0).abs() < TOL);
    assert_eq!(filtered.p_values[1], 1.0);
}

#[test]
fn test_too_few_permutations_warns() {
    let (matrix, labels) = create_test_data();
    let (result, logs) = with_captured_warnings(|| {
        base_run(FdrMethod::Dsfdr)
            .n_permutations(5)
            .parallel(false)
            .run(&matrix, &labels)
    });
    let result = result.unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.n_rejected(), 0);
    assert!(result.p_values.iter().all(|&p| p >= 1.0 / 6.0 - TOL));
    assert!(logs.contains("WARN"), "no warning logged: {:?}", logs);
    assert!(logs.contains("too few permutations"));
    assert!(logs.contains("n_permutations=5"));

    // 1 / (9 + 1) reaches alpha = 0.1 exactly
    let (result, logs) = with_captured_warnings(|| {
        base_run(FdrMethod::Dsfdr)
            .n_permutations(9)
            .parallel(false)
            .run(&matrix, &labels)
    });
    assert_eq!(result.unwrap().len(), 3);
    assert!(!logs.contains("too few permutations"), "{}", logs);
}

#[test]
fn test_empty_input() {
    let matrix = AbundanceMatrix::from_rows(&[]).unwrap();
    let labels = Labels::new(vec![]).unwrap();
    let result = dsfdr(&matrix, &labels, &DsfdrConfig::default()).unwrap();
    assert!(result.is_empty());

    // features but no samples: nothing can be rejected
    let matrix = AbundanceMatrix::from_row_slice(2, 0, &[]).unwrap();
    let result = dsfdr(&matrix, &labels, &DsfdrConfig::default()).unwrap();
    assert_eq!(result.reject, vec![false, false]);
    assert_eq!(result.p_values, vec![1.0, 1.0]);
}

#[test]
fn test_invalid_alpha() {
    let (matrix, labels) = create_test_data();
    for alpha in [0.0, 1.0, -0.1, 2.0] {
        let result = base_run(FdrMethod::Dsfdr).alpha(alpha).run(&matrix, &labels);
        assert!(matches!(result, Err(DsfdrError::InvalidConfig(_))));
    }
}

#[test]
fn test_unknown_names() {
    assert!(matches!(
        Statistic::from_name("ttest"),
        Err(DsfdrError::UnknownMethod(_))
    ));
    assert!(matches!(
        Transform::from_name("sqrt"),
        Err(DsfdrError::UnknownTransform(_))
    ));
    assert!(matches!(
        FdrMethod::from_name("holm"),
        Err(DsfdrError::UnknownFdrMethod(_))
    ));
}

#[test]
fn test_run_from_yaml_config() {
    let yaml = "\
method: mannwhitney
transform: none
alpha: 0.1
n_permutations: 1000
fdr_method: bhfdr
seed: 31
parallel: false
";
    let config = DsfdrConfig::from_yaml(yaml).unwrap();
    let (matrix, labels) = create_test_data();
    let result = Dsfdr::from_config(&config).run(&matrix, &labels).unwrap();
    assert_eq!(result.method, "mannwhitney");
    assert_eq!(result.fdr_method, "bhfdr");
    assert_eq!(result.reject, vec![true, false, false]);

    let reloaded = DsfdrConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_custom_statistic() {
    let (matrix, labels) = create_test_data();
    // difference of medians between groups
    let median_diff = Statistic::custom("mediandiff", |data, labels| {
        let groups = labels.two_groups()?;
        let median = |row: usize, samples: &[usize]| {
            let mut v: Vec<f64> = samples.iter().map(|&j| data[(row, j)]).collect();
            v.sort_by(|a, b| a.total_cmp(b));
            let mid = v.len() / 2;
            if v.len() % 2 == 0 {
                (v[mid - 1] + v[mid]) / 2.0
            } else {
                v[mid]
            }
        };
        Ok((0..data.nrows())
            .map(|i| median(i, &groups.high) - median(i, &groups.low))
            .collect())
    });
    let result = base_run(FdrMethod::Dsfdr)
        .method(median_diff)
        .run(&matrix, &labels)
        .unwrap();
    assert_eq!(result.method, "mediandiff");
    assert_eq!(result.reject, vec![true, false, false]);
}

#[test]
fn test_write_results() {
    let (matrix, labels) = create_test_data();
    let result = base_run(FdrMethod::Dsfdr).run(&matrix, &labels).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.tsv");
    result.to_tsv(&path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("feature_id\tstatistic"));
    assert!(lines[1].starts_with("F0\t") && lines[1].ends_with("true"));

    let json = result.to_json().unwrap();
    assert!(json.contains("\"fdr_method\": \"dsfdr\""));
}
