//! Property-based tests for seedstat
//!
//! - Test selection invariants (top-K bounds, ordering, best ≠ baseline)
//! - Test statistical invariants (std ≥ 0, single sample std = 0, p ∈ [0, 1])
//! - Test filename grammar round-trips
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use seedstat::experiment::{ExperimentStore, JobRecord, MetricRecord, RunningStat};
use seedstat::locator::filename::{parse_log_name, StreamKind};
use seedstat::significance::{student_t_test, welch_t_test};
use seedstat::topk::{best_non_baseline, top_k_per_dataset};

// ============================================================================
// Strategies
// ============================================================================

fn arb_dataset() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["baby", "sports", "electronics"]).prop_map(str::to_string)
}

/// (dataset, config, seed, recall@10)
fn arb_records(max: usize) -> impl Strategy<Value = Vec<JobRecord>> {
    prop::collection::vec((arb_dataset(), 0u32..5, 0u64..5, 0.0f64..0.2), 0..max).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(dataset, cfg, seed, value)| {
                    JobRecord::new(
                        format!("bm3_{dataset}_cfg{cfg}_seed{seed}"),
                        dataset.clone(),
                        cfg.to_string(),
                        seed,
                        format!("bm3_{dataset}_cfg{cfg}_seed{seed}.err"),
                        MetricRecord::from_pairs([("recall@10", value)]),
                    )
                })
                .collect()
        },
    )
}

fn arb_sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1.0, 2..12)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: each dataset keeps at most K records
    #[test]
    fn prop_topk_at_most_k(records in arb_records(40), k in 1usize..6) {
        let selected = top_k_per_dataset(&records, "recall@10", k).unwrap();
        for (dataset, picked) in &selected {
            let available = records.iter().filter(|r| r.dataset() == dataset.as_str()).count();
            prop_assert_eq!(picked.len(), k.min(available));
            prop_assert!(picked.iter().all(|r| r.dataset() == dataset.as_str()));
        }
    }

    /// Property: per-dataset top-K equals a stable descending sort truncated to K
    #[test]
    fn prop_topk_matches_stable_sort(records in arb_records(40), k in 1usize..10) {
        let selected = top_k_per_dataset(&records, "recall@10", k).unwrap();

        for (dataset, picked) in &selected {
            let mut sorted: Vec<&JobRecord> = records
                .iter()
                .filter(|r| r.dataset() == dataset.as_str())
                .collect();
            sorted.sort_by(|a, b| {
                b.metric("recall@10").unwrap().total_cmp(&a.metric("recall@10").unwrap())
            });
            sorted.truncate(k);

            prop_assert_eq!(picked.len(), sorted.len());
            prop_assert!(picked.iter().zip(&sorted).all(|(a, b)| std::ptr::eq(*a, *b)));
        }
    }

    /// Property: best non-baseline is never the baseline and has the max mean
    #[test]
    fn prop_best_is_never_baseline(records in arb_records(40)) {
        let mut store = ExperimentStore::new();
        for record in &records {
            store.add_job(record);
        }
        let summaries = store.summarize(&["recall@10".to_string()]);

        for dataset in store.datasets() {
            match best_non_baseline(&summaries, dataset, "0", "recall@10") {
                Some(best) => {
                    prop_assert_ne!(best.config_id.as_str(), "0");
                    let challengers = summaries
                        .iter()
                        .filter(|s| s.dataset == dataset && s.config_id != "0");
                    for s in challengers {
                        prop_assert!(s.stat("recall@10").unwrap().mean <= best.score);
                    }
                }
                None => prop_assert!(summaries
                    .iter()
                    .filter(|s| s.dataset == dataset)
                    .all(|s| s.config_id == "0")),
            }
        }
    }

    /// Property: sample std is non-negative; a single sample has std 0
    #[test]
    fn prop_std_non_negative(values in prop::collection::vec(-1.0f64..1.0, 1..20)) {
        let stat: RunningStat = values.iter().copied().collect();
        let finished = stat.finish().unwrap();
        prop_assert!(finished.std >= 0.0);
        prop_assert_eq!(finished.count, values.len());
        if values.len() == 1 {
            prop_assert_eq!(finished.std, 0.0);
        }
    }

    /// Property: both p-values lie in [0, 1] and are symmetric in the samples
    #[test]
    fn prop_p_values_bounded(a in arb_sample(), b in arb_sample()) {
        for test in [welch_t_test, student_t_test] {
            if let Ok(p) = test(&a, &b) {
                prop_assert!((0.0..=1.0).contains(&p));
                let q = test(&b, &a).unwrap();
                prop_assert!((p - q).abs() < 1e-9);
            }
        }
    }

    /// Property: well-formed names parse back to their components
    #[test]
    fn prop_log_name_components(
        dataset in "[a-z]{1,10}",
        cfg in 0u32..1000,
        seed in 0u64..100_000,
        submission in proptest::option::of("[0-9]{1,8}"),
        err in any::<bool>(),
    ) {
        let ext = if err { "err" } else { "out" };
        let suffix = submission.as_ref().map_or_else(String::new, |s| format!("-{s}"));
        let file = format!("bm3_{dataset}_cfg{cfg}_seed{seed}{suffix}.{ext}");

        let name = parse_log_name(&file, "bm3").unwrap();
        prop_assert_eq!(name.dataset, dataset.clone());
        prop_assert_eq!(name.config_id, cfg.to_string());
        prop_assert_eq!(name.seed, seed);
        prop_assert_eq!(name.stream, if err { StreamKind::Err } else { StreamKind::Out });
        prop_assert_eq!(name.job_key, format!("bm3_{dataset}_cfg{cfg}_seed{seed}"));
    }
}
