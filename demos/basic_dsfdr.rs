//! Basic example comparing FDR procedures on simulated data.
//!
//! This example shows how to:
//! 1. Simulate a dataset with known differential features
//! 2. Run dsfdr, BH, BY and filtered BH on it
//! 3. Inspect the top results and the run configuration

use dsfdr::prelude::*;

fn main() -> Result<()> {
    println!("=== dsfdr Example ===\n");

    let sim = simulate(
        &SimulationConfig::default()
            .with_samples(10)
            .with_features(50, 50, 400)
            .with_seed(7),
    )?;

    println!("Data dimensions:");
    println!("  Features: {}", sim.matrix.n_features());
    println!("  Samples:  {}", sim.matrix.n_samples());
    println!("  Truly differential: 50");
    println!();

    println!("=== FDR Procedures (alpha = 0.1) ===\n");
    println!(
        "{:<10} {:>10} {:>10} {:>10}",
        "Method", "Rejected", "FDR", "Power"
    );
    println!("{}", "-".repeat(44));

    for method in [FdrMethod::Dsfdr, FdrMethod::Bh, FdrMethod::By, FdrMethod::FilterBh] {
        let result = Dsfdr::new()
            .method(Statistic::MeanDiff)
            .transform(Transform::None)
            .alpha(0.1)
            .fdr_method(method)
            .seed(31)
            .run(&sim.matrix, &sim.labels)?;
        println!(
            "{:<10} {:>10} {:>10.3} {:>10.3}",
            method.name(),
            result.n_rejected(),
            sim.false_discovery_rate(&result.reject),
            sim.power(&result.reject)
        );
    }

    println!("\n=== Top 10 Features (rank transform, Mann-Whitney) ===\n");

    let result = Dsfdr::new()
        .method(Statistic::MannWhitney)
        .transform(Transform::Rank)
        .seed(31)
        .run(&sim.matrix, &sim.labels)?;

    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>8}",
        "Feature", "Statistic", "p-value", "q-value", "Reject"
    );
    println!("{}", "-".repeat(56));
    for r in result.sorted_by_pvalue().iter().take(10) {
        println!(
            "{:<8} {:>12.3} {:>12.2e} {:>12.2e} {:>8}",
            r.feature_id, r.statistic, r.p_value, r.q_value, r.reject
        );
    }
    println!("\n{}", result.summary());

    println!("\n=== Run Configuration (YAML) ===\n");

    let config = DsfdrConfig {
        method: Statistic::MannWhitney,
        seed: Some(result.seed),
        ..Default::default()
    };
    println!("{}", config.to_yaml()?);

    Ok(())
}
