//! Pipeline configuration
//!
//! Everything the pipeline treats as a constant lives here so that tests
//! (and the `--config` JSON file) can substitute their own values: the
//! filename prefix, the metric list, the result banner, the baseline
//! configuration id and the published reference table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Banner written by the training loop before each best-result block
pub const DEFAULT_BANNER: &str = "█████████████ BEST ████████████████";

/// Marker introducing the test subsection inside a block
pub const DEFAULT_TEST_MARKER: &str = "Test:";

/// Default metric list, in report column order
pub const DEFAULT_METRICS: [&str; 4] = ["recall@10", "recall@20", "ndcg@10", "ndcg@20"];

/// Published reference values: dataset → metric → value.
///
/// Used only by the comparison pipeline (`paper` rows). Injected through
/// [`PipelineConfig`] so tests can supply synthetic baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineTable {
    datasets: BTreeMap<String, BTreeMap<String, f64>>,
}

impl BaselineTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Published BM3 numbers for the three Amazon datasets
    #[must_use]
    pub fn published() -> Self {
        let rows: [(&str, [f64; 4]); 3] = [
            ("baby", [0.0564, 0.0883, 0.0301, 0.0383]),
            ("sports", [0.0656, 0.0980, 0.0355, 0.0438]),
            ("electronics", [0.0437, 0.0648, 0.0247, 0.0302]),
        ];
        let mut table = Self::new();
        for (dataset, values) in rows {
            for (metric, value) in DEFAULT_METRICS.iter().zip(values) {
                table.insert(dataset, *metric, value);
            }
        }
        table
    }

    /// Set one reference value
    pub fn insert(&mut self, dataset: impl Into<String>, metric: impl Into<String>, value: f64) {
        self.datasets
            .entry(dataset.into())
            .or_default()
            .insert(metric.into(), value);
    }

    /// Reference value for (dataset, metric)
    #[must_use]
    pub fn get(&self, dataset: &str, metric: &str) -> Option<f64> {
        self.datasets.get(dataset)?.get(metric).copied()
    }

    /// True if the table has any entry for `dataset`
    #[must_use]
    pub fn contains_dataset(&self, dataset: &str) -> bool {
        self.datasets.contains_key(dataset)
    }

    /// Datasets in sorted order
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// True if the table holds no datasets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Output file names and encodings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Aggregated-results table
    pub aggregated: String,
    /// Long-format paper/restored/adapter table
    pub long_format: String,
    /// Significance table
    pub significance: String,
    /// Top-K table
    pub topk: String,
    /// Run summary (JSON)
    pub summary: String,
    /// Prefix CSV files with a UTF-8 byte-order mark
    pub bom: bool,
    /// Also write each table as Parquet
    pub parquet: bool,
    /// Also write the JSON run summary
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            aggregated: "aggregated_results.csv".to_string(),
            long_format: "results_long.csv".to_string(),
            significance: "significance.csv".to_string(),
            topk: "topk.csv".to_string(),
            summary: "run_summary.json".to_string(),
            bom: false,
            parquet: false,
            json: false,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Filename prefix before the dataset token (`bm3` in `bm3_baby_cfg0_seed1.err`)
    pub prefix: String,
    /// Metrics every record must carry, in column order
    pub metrics: Vec<String>,
    /// Metric used to pick the best non-baseline configuration
    pub primary_metric: String,
    /// Metric used to rank raw records for top-K
    pub topk_metric: String,
    /// Records kept per dataset by top-K
    pub top_k: usize,
    /// Literal banner that opens a result block
    pub banner: String,
    /// Literal marker that opens the test subsection
    pub test_marker: String,
    /// Configuration id of the restored baseline
    pub baseline_config: String,
    /// Dataset token rewrites applied after filename parsing
    pub dataset_aliases: BTreeMap<String, String>,
    /// Published reference values
    pub baselines: BaselineTable,
    /// Output settings
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut dataset_aliases = BTreeMap::new();
        dataset_aliases.insert("elec".to_string(), "electronics".to_string());

        Self {
            prefix: "bm3".to_string(),
            metrics: DEFAULT_METRICS.iter().map(ToString::to_string).collect(),
            primary_metric: "recall@10".to_string(),
            topk_metric: "recall@10".to_string(),
            top_k: 3,
            banner: DEFAULT_BANNER.to_string(),
            test_marker: DEFAULT_TEST_MARKER.to_string(),
            baseline_config: "0".to_string(),
            dataset_aliases,
            baselines: BaselineTable::published(),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or fails
    /// [`validate`](Self::validate).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on an empty metric list, a primary or top-K
    /// metric outside the list, duplicate metrics, an empty banner, prefix or
    /// test marker, or `top_k == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(Error::Config("metric list is empty".to_string()));
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            if self.metrics[..i].contains(metric) {
                return Err(Error::Config(format!("metric `{metric}` listed twice")));
            }
        }
        if !self.has_metric(&self.primary_metric) {
            return Err(Error::Config(format!(
                "primary metric `{}` is not in the metric list",
                self.primary_metric
            )));
        }
        if !self.has_metric(&self.topk_metric) {
            return Err(Error::Config(format!(
                "top-K metric `{}` is not in the metric list",
                self.topk_metric
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be greater than 0".to_string()));
        }
        if self.banner.is_empty() || self.test_marker.is_empty() || self.prefix.is_empty() {
            return Err(Error::Config(
                "prefix, banner and test marker must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    /// True if `metric` is one of the configured metrics
    #[must_use]
    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON)
    #[must_use]
    pub const fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Set the filename prefix
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Replace the metric list
    #[must_use]
    pub fn metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Set the primary (best-selection) metric
    #[must_use]
    pub fn primary_metric(mut self, metric: impl Into<String>) -> Self {
        self.config.primary_metric = metric.into();
        self
    }

    /// Set the top-K ranking metric
    #[must_use]
    pub fn topk_metric(mut self, metric: impl Into<String>) -> Self {
        self.config.topk_metric = metric.into();
        self
    }

    /// Set K
    #[must_use]
    pub const fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the result banner
    #[must_use]
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.config.banner = banner.into();
        self
    }

    /// Set the baseline configuration id
    #[must_use]
    pub fn baseline_config(mut self, id: impl Into<String>) -> Self {
        self.config.baseline_config = id.into();
        self
    }

    /// Add a dataset alias
    #[must_use]
    pub fn dataset_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.dataset_aliases.insert(from.into(), to.into());
        self
    }

    /// Replace the reference table
    #[must_use]
    pub fn baselines(mut self, baselines: BaselineTable) -> Self {
        self.config.baselines = baselines;
        self
    }

    /// Replace the output settings
    #[must_use]
    pub fn output(mut self, output: OutputConfig) -> Self {
        self.config.output = output;
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is inconsistent
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics.len(), 4);
        assert_eq!(config.baseline_config, "0");
    }

    #[test]
    fn test_published_table() {
        let table = BaselineTable::published();
        assert_eq!(table.get("baby", "recall@10"), Some(0.0564));
        assert_eq!(table.get("electronics", "ndcg@20"), Some(0.0302));
        assert_eq!(table.get("clothing", "recall@10"), None);
        assert_eq!(table.datasets().collect::<Vec<_>>(), ["baby", "electronics", "sports"]);
    }

    #[test]
    fn test_validate_rejects_unknown_primary() {
        let err = PipelineConfig::builder()
            .primary_metric("mrr@10")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("mrr@10"));
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        assert!(PipelineConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_metrics() {
        let result = PipelineConfig::builder()
            .metrics(["recall@10", "recall@10"])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_alias() {
        let config = PipelineConfig::default();
        assert_eq!(config.dataset_aliases["elec"], "electronics");
        assert!(!config.dataset_aliases.contains_key("baby"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"top_k": 5, "baselines": {"toy": {"recall@10": 0.1}}}"#)
                .unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.prefix, "bm3");
        assert_eq!(config.baselines.get("toy", "recall@10"), Some(0.1));
        assert!(!config.baselines.contains_dataset("baby"));
    }
}
