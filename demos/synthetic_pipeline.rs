//! End-to-end pipeline demonstration on synthetic logs
//!
//! This example demonstrates:
//! - Writing a scratch directory of per-seed job logs (.out and .err streams)
//! - Running every report (aggregate, top-K, compare) over it
//! - Reading the run statistics back
//!
//! Run with: cargo run --example synthetic_pipeline

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seedstat::config::{PipelineConfig, DEFAULT_BANNER};
use seedstat::pipeline::{Pipeline, ReportKind};
use seedstat::report::ReportWriter;

/// Mean recall@10 of each configuration; config 0 is the reproduced baseline.
const CONFIG_MEANS: [f64; 4] = [0.0560, 0.0585, 0.0552, 0.0601];

fn block(recall10: f64) -> String {
    format!(
        "{DEFAULT_BANNER}\n\
         Valid: recall@10: {:.4} recall@20: {:.4} ndcg@10: {:.4} ndcg@20: {:.4}\n\
         Test: recall@10: {recall10:.4} recall@20: {:.4} ndcg@10: {:.4} ndcg@20: {:.4}\n\n",
        recall10 + 0.004,
        recall10 * 1.52 + 0.004,
        recall10 * 0.54 + 0.002,
        recall10 * 0.66 + 0.002,
        recall10 * 1.52,
        recall10 * 0.54,
        recall10 * 0.66,
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== seedstat synthetic pipeline ===\n");

    let workspace = tempfile::tempdir()?;
    let log_dir = workspace.path().join("logs");
    let out_dir = workspace.path().join("results");
    std::fs::create_dir_all(&log_dir)?;

    // -------------------------------------------------------------------------
    // 1. Write synthetic logs
    // -------------------------------------------------------------------------
    let mut rng = StdRng::seed_from_u64(2024);
    let mut files = 0;
    for dataset in ["baby", "sports"] {
        for (cfg, mean) in CONFIG_MEANS.iter().enumerate() {
            for seed in 1..=3 {
                let submission = 880_000 + files;
                let early: f64 = mean - 0.003 + rng.gen_range(-0.0005..0.0005);
                let best: f64 = mean + rng.gen_range(-0.0008..0.0008);

                // Two improvements: the later block is the one that counts.
                let err = format!(
                    "epoch 1 loss 0.412\n{}epoch 2 loss 0.377\n{}",
                    block(early),
                    block(best)
                );
                let stem = format!("bm3_{dataset}_cfg{cfg}_seed{seed}-{submission}");
                std::fs::write(log_dir.join(format!("{stem}.err")), err)?;
                std::fs::write(log_dir.join(format!("{stem}.out")), "stdout banner only\n")?;
                files += 2;
            }
        }
    }
    // One job that crashed before reporting a test result
    std::fs::write(
        log_dir.join("bm3_baby_cfg3_seed4-999999.err"),
        "CUDA out of memory\n",
    )?;
    println!("1. Wrote {} log files to {}", files + 1, log_dir.display());

    // -------------------------------------------------------------------------
    // 2. Run every report
    // -------------------------------------------------------------------------
    println!("\n2. Running pipeline...");
    let config = PipelineConfig::builder().top_k(2).build()?;
    let metrics = config.metrics.clone();
    let output = config.output.clone();
    let pipeline = Pipeline::new(config)?;

    let mut writer = ReportWriter::new(&out_dir, output, metrics);
    let outcome = pipeline.run(&log_dir, ReportKind::All, &mut writer)?;

    // -------------------------------------------------------------------------
    // 3. Inspect statistics
    // -------------------------------------------------------------------------
    println!("\n3. Run statistics");
    println!("   Jobs found:  {}", outcome.stats.jobs_found);
    println!("   Jobs parsed: {}", outcome.stats.jobs_parsed);
    for (reason, count) in &outcome.stats.jobs_skipped {
        println!("   Skipped ({reason}): {count}");
    }
    println!("   Tables written: {}", outcome.written.len());

    println!("\n=== Done ===");
    Ok(())
}
