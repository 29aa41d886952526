//! Job Record - a validated metric record with the job it came from

use serde::{Deserialize, Serialize};

use super::MetricRecord;

/// Job Record is the unit flowing from the parser into selection and
/// aggregation.
///
/// Only jobs whose authoritative block yielded a complete [`MetricRecord`]
/// become a `JobRecord`; every other job is dropped before this point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    job_key: String,
    dataset: String,
    config_id: String,
    seed: u64,
    log_file: String,
    metrics: MetricRecord,
}

impl JobRecord {
    /// Create a job record.
    ///
    /// # Arguments
    ///
    /// * `job_key` - Job key shared by the job's log streams
    /// * `dataset` - Canonical dataset name
    /// * `config_id` - Configuration id
    /// * `seed` - Random seed
    /// * `log_file` - Filename the metrics were read from
    /// * `metrics` - Complete metric record
    #[must_use]
    pub fn new(
        job_key: impl Into<String>,
        dataset: impl Into<String>,
        config_id: impl Into<String>,
        seed: u64,
        log_file: impl Into<String>,
        metrics: MetricRecord,
    ) -> Self {
        Self {
            job_key: job_key.into(),
            dataset: dataset.into(),
            config_id: config_id.into(),
            seed,
            log_file: log_file.into(),
            metrics,
        }
    }

    /// Get the job key.
    #[must_use]
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// Get the dataset.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Get the configuration id.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Get the seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the source filename.
    #[must_use]
    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    /// Get the metrics.
    #[must_use]
    pub const fn metrics(&self) -> &MetricRecord {
        &self.metrics
    }

    /// Shortcut for one metric value.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name)
    }
}
