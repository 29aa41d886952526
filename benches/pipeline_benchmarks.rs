//! Pipeline benchmarks
//!
//! - Result-block extraction on long logs
//! - Top-K selection over many job records
//! - Full directory collection (locate + parse)
//!
//! Run with: cargo bench --bench pipeline_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seedstat::config::{PipelineConfig, DEFAULT_BANNER};
use seedstat::experiment::{JobRecord, MetricRecord};
use seedstat::extract::ResultParser;
use seedstat::pipeline::Pipeline;
use seedstat::topk::top_k_per_dataset;

const DATASETS: [&str; 3] = ["baby", "sports", "electronics"];

/// Training log with `epochs` lines of noise and a best-result block every
/// ten epochs.
fn synthetic_log(rng: &mut StdRng, epochs: usize) -> String {
    let mut text = String::new();
    for epoch in 0..epochs {
        text.push_str(&format!(
            "epoch {epoch} loss {:.5} time {:.2}s\n",
            rng.gen_range(0.1..0.5),
            rng.gen_range(10.0..20.0)
        ));
        if epoch % 10 == 9 {
            let r: f64 = rng.gen_range(0.03..0.07);
            text.push_str(&format!(
                "{DEFAULT_BANNER}\nValid: recall@10: {:.4} recall@20: {:.4} ndcg@10: {:.4} ndcg@20: {:.4}\n\
                 Test: recall@10: {r:.4} recall@20: {:.4} ndcg@10: {:.4} ndcg@20: {:.4}\n\n",
                r + 0.01,
                r * 1.5 + 0.01,
                r / 2.0 + 0.01,
                r / 1.5 + 0.01,
                r * 1.5,
                r / 2.0,
                r / 1.5,
            ));
        }
    }
    text
}

fn synthetic_records(rng: &mut StdRng, n: usize) -> Vec<JobRecord> {
    (0..n)
        .map(|i| {
            let dataset = DATASETS[i % DATASETS.len()];
            let cfg = i % 40;
            let seed = (i / 40) as u64;
            JobRecord::new(
                format!("bm3_{dataset}_cfg{cfg}_seed{seed}"),
                dataset,
                cfg.to_string(),
                seed,
                format!("bm3_{dataset}_cfg{cfg}_seed{seed}.err"),
                MetricRecord::from_pairs([("recall@10", rng.gen_range(0.03..0.07))]),
            )
        })
        .collect()
}

/// Benchmark extraction of the authoritative block
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_result_block");
    let parser = ResultParser::from_config(&PipelineConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    for epochs in [100, 1_000, 10_000] {
        let text = synthetic_log(&mut rng, epochs);
        group.bench_with_input(BenchmarkId::new("parse", epochs), &text, |b, text| {
            b.iter(|| parser.parse(black_box(text)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark per-dataset top-K
fn bench_topk(c: &mut Criterion) {
    let mut group = c.benchmark_group("topk_per_dataset");
    let mut rng = StdRng::seed_from_u64(11);

    for n in [1_000, 100_000] {
        let records = synthetic_records(&mut rng, n);
        group.bench_with_input(BenchmarkId::new("k10", n), &records, |b, records| {
            b.iter(|| top_k_per_dataset(black_box(records), "recall@10", 10).unwrap());
        });
    }
    group.finish();
}

/// Benchmark locating and parsing a directory of job logs
fn bench_collect(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for dataset in DATASETS {
        for cfg in 0..20 {
            for seed in 0..5 {
                let name = format!("bm3_{dataset}_cfg{cfg}_seed{seed}-{}.err", 1000 + seed);
                std::fs::write(dir.path().join(name), synthetic_log(&mut rng, 200)).unwrap();
            }
        }
    }
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    c.bench_function("collect_300_logs", |b| {
        b.iter(|| pipeline.collect(black_box(dir.path())).unwrap());
    });
}

criterion_group!(benches, bench_extract, bench_topk, bench_collect);
criterion_main!(benches);
