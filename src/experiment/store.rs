//! Experiment Store - groups validated records by (dataset, configuration)
//!
//! This is the result aggregator of the pipeline. Records are appended during
//! ingestion; afterwards the store is only read.

use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::{GroupSummary, RunningStat};
use super::{JobRecord, MetricRecord};

/// (dataset, configuration id)
pub type GroupKey = (String, String);

/// Records of one (dataset, configuration) group, one per validated job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricGroup {
    records: Vec<MetricRecord>,
    seeds: BTreeSet<u64>,
}

impl MetricGroup {
    /// Number of records in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no record was ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct seeds that contributed.
    #[must_use]
    pub const fn seeds(&self) -> &BTreeSet<u64> {
        &self.seeds
    }

    /// Number of distinct seeds.
    #[must_use]
    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    /// Records in ingestion order.
    #[must_use]
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Per-seed values of one metric, in ingestion order.
    #[must_use]
    pub fn samples(&self, metric: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.get(metric)).collect()
    }

    /// Running statistics of one metric.
    #[must_use]
    pub fn stat(&self, metric: &str) -> RunningStat {
        self.records.iter().filter_map(|r| r.get(metric)).collect()
    }
}

/// In-memory store of metric groups.
///
/// ## Design
///
/// Groups live in a `BTreeMap` keyed by (dataset, configuration id), so every
/// iteration (and every report) comes out sorted without an extra sort step.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    groups: BTreeMap<GroupKey, MetricGroup>,
}

impl ExperimentStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of ingested records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.groups.values().map(MetricGroup::len).sum()
    }

    /// Append one validated record and mark its seed.
    pub fn add(
        &mut self,
        dataset: impl Into<String>,
        config_id: impl Into<String>,
        seed: u64,
        record: MetricRecord,
    ) {
        let group = self
            .groups
            .entry((dataset.into(), config_id.into()))
            .or_default();
        group.records.push(record);
        group.seeds.insert(seed);
    }

    /// Append a job record.
    pub fn add_job(&mut self, job: &JobRecord) {
        self.add(
            job.dataset(),
            job.config_id(),
            job.seed(),
            job.metrics().clone(),
        );
    }

    /// Look up a group.
    #[must_use]
    pub fn group(&self, dataset: &str, config_id: &str) -> Option<&MetricGroup> {
        self.groups
            .get(&(dataset.to_string(), config_id.to_string()))
    }

    /// All groups, sorted by key.
    pub fn groups(&self) -> impl Iterator<Item = (&GroupKey, &MetricGroup)> {
        self.groups.iter()
    }

    /// Groups of one dataset, sorted by configuration id.
    pub fn groups_for_dataset<'a>(
        &'a self,
        dataset: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a MetricGroup)> + 'a {
        self.groups
            .iter()
            .filter(move |((ds, _), _)| ds == dataset)
            .map(|((_, cfg), group)| (cfg.as_str(), group))
    }

    /// Distinct datasets, sorted.
    #[must_use]
    pub fn datasets(&self) -> Vec<&str> {
        let mut datasets: Vec<&str> = self.groups.keys().map(|(ds, _)| ds.as_str()).collect();
        datasets.dedup();
        datasets
    }

    /// Summarize every group over `metrics`.
    ///
    /// Metrics a group has no values for are left out of its summary.
    #[must_use]
    pub fn summarize(&self, metrics: &[String]) -> Vec<GroupSummary> {
        self.groups
            .iter()
            .map(|((dataset, config_id), group)| GroupSummary {
                dataset: dataset.clone(),
                config_id: config_id.clone(),
                num_seeds: group.num_seeds(),
                stats: metrics
                    .iter()
                    .filter_map(|m| group.stat(m).finish().map(|s| (m.clone(), s)))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(r10: f64) -> MetricRecord {
        MetricRecord::from_pairs([("recall@10", r10)])
    }

    #[test]
    fn test_store_default() {
        let store = ExperimentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.group_count(), 0);
        assert_eq!(store.record_count(), 0);
        assert!(store.summarize(&["recall@10".to_string()]).is_empty());
    }

    #[test]
    fn test_groups_by_dataset_and_config() {
        let mut store = ExperimentStore::new();
        store.add("baby", "0", 1, record(0.056));
        store.add("baby", "0", 2, record(0.057));
        store.add("baby", "1", 1, record(0.060));
        store.add("sports", "0", 1, record(0.065));

        assert_eq!(store.group_count(), 3);
        assert_eq!(store.record_count(), 4);
        assert_eq!(store.datasets(), ["baby", "sports"]);
        assert_eq!(store.group("baby", "0").unwrap().num_seeds(), 2);
        assert_eq!(store.groups_for_dataset("baby").count(), 2);
    }

    #[test]
    fn test_summarize_end_to_end_example() {
        let mut store = ExperimentStore::new();
        for (seed, v) in [(1, 0.0560), (2, 0.0570), (3, 0.0560)] {
            store.add("baby", "0", seed, record(v));
        }

        let summary = store.summarize(&["recall@10".to_string()]);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].num_seeds, 3);

        let stat = summary[0].stat("recall@10").unwrap();
        assert_eq!(stat.count, 3);
        assert!((stat.mean - 0.056_333_333).abs() < 1e-8);
        assert!((stat.std - 0.000_577_35).abs() < 1e-7);
    }

    #[test]
    fn test_samples_in_ingestion_order() {
        let mut store = ExperimentStore::new();
        store.add("baby", "2", 7, record(0.3));
        store.add("baby", "2", 5, record(0.1));
        assert_eq!(store.group("baby", "2").unwrap().samples("recall@10"), [0.3, 0.1]);
    }
}
