//! Configuration selection
//!
//! Two independent policies:
//!
//! - **Top-K** over raw per-job records: per dataset, the K records with the
//!   highest value of one metric. Heap-based, O(N log K). Ties keep discovery
//!   order, so the result is identical to a stable sort followed by a
//!   truncate.
//! - **Best non-baseline** over aggregated groups: per dataset, the
//!   configuration (other than the baseline id) with the strictly largest
//!   mean of the primary metric. The first one encountered wins a tie.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Deserialize, Serialize};

use crate::experiment::{GroupSummary, JobRecord};
use crate::Error;

// Heap item ordered so that the *worst* kept candidate sits on top of the
// max-heap: lower key is worse, and among equal keys the later index is worse.
#[derive(Debug, Clone, Copy)]
struct HeapItem {
    key: f64,
    index: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keep the K best items, returned best first.
///
/// Items arrive in discovery order, so a newcomer with the same key as the
/// current worst is itself worse (later index) and never displaces it.
fn select_top_k_indices(items: impl Iterator<Item = HeapItem>, k: usize) -> Vec<usize> {
    let mut heap: BinaryHeap<HeapItem> = BinaryHeap::with_capacity(k);

    for item in items {
        if heap.len() < k {
            heap.push(item);
        } else if let Some(top) = heap.peek() {
            if item < *top {
                heap.pop();
                heap.push(item);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|item| item.index)
        .collect()
}

/// Top-K records of every dataset, datasets sorted by name.
///
/// Records lacking `metric` are ignored.
///
/// # Errors
/// Returns error if K is zero
///
/// # Examples
///
/// ```rust
/// use seedstat::experiment::{JobRecord, MetricRecord};
/// use seedstat::topk::top_k_per_dataset;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let records: Vec<JobRecord> = [0.05, 0.07, 0.06]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| {
///         JobRecord::new(
///             format!("bm3_baby_cfg{i}_seed1"),
///             "baby",
///             i.to_string(),
///             1,
///             format!("bm3_baby_cfg{i}_seed1.err"),
///             MetricRecord::from_pairs([("recall@10", v)]),
///         )
///     })
///     .collect();
///
/// let top = top_k_per_dataset(&records, "recall@10", 2)?;
/// assert_eq!(top["baby"].len(), 2);
/// assert_eq!(top["baby"][0].config_id(), "1");
/// # Ok(())
/// # }
/// ```
pub fn top_k_per_dataset<'a>(
    records: &'a [JobRecord],
    metric: &str,
    k: usize,
) -> crate::Result<BTreeMap<String, Vec<&'a JobRecord>>> {
    if k == 0 {
        return Err(Error::InvalidInput("k must be greater than 0".to_string()));
    }

    let mut by_dataset: BTreeMap<&str, Vec<HeapItem>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(key) = record.metric(metric) {
            by_dataset
                .entry(record.dataset())
                .or_default()
                .push(HeapItem { key, index });
        }
    }

    Ok(by_dataset
        .into_iter()
        .map(|(dataset, items)| {
            let picked = select_top_k_indices(items.into_iter(), k)
                .into_iter()
                .map(|index| &records[index])
                .collect();
            (dataset.to_string(), picked)
        })
        .collect())
}

/// The winning non-baseline configuration of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestConfig {
    /// Dataset
    pub dataset: String,
    /// Winning configuration id
    pub config_id: String,
    /// Its mean of the primary metric
    pub score: f64,
}

/// Best non-baseline configuration of `dataset`.
///
/// `summaries` is scanned in order; only a strictly larger mean replaces the
/// current best. Returns `None` if the dataset has no configuration other
/// than `baseline_id` (or none carrying `primary_metric`).
#[must_use]
pub fn best_non_baseline(
    summaries: &[GroupSummary],
    dataset: &str,
    baseline_id: &str,
    primary_metric: &str,
) -> Option<BestConfig> {
    let mut best: Option<BestConfig> = None;

    for summary in summaries
        .iter()
        .filter(|s| s.dataset == dataset && s.config_id != baseline_id)
    {
        let Some(stat) = summary.stat(primary_metric) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| stat.mean > b.score) {
            best = Some(BestConfig {
                dataset: summary.dataset.clone(),
                config_id: summary.config_id.clone(),
                score: stat.mean,
            });
        }
    }

    best
}

/// [`best_non_baseline`] for every dataset present in `summaries`.
#[must_use]
pub fn best_per_dataset(
    summaries: &[GroupSummary],
    baseline_id: &str,
    primary_metric: &str,
) -> BTreeMap<String, BestConfig> {
    let mut datasets: Vec<&str> = summaries.iter().map(|s| s.dataset.as_str()).collect();
    datasets.sort_unstable();
    datasets.dedup();

    datasets
        .into_iter()
        .filter_map(|ds| {
            best_non_baseline(summaries, ds, baseline_id, primary_metric)
                .map(|best| (ds.to_string(), best))
        })
        .collect()
}
