//! Test-metric extraction from a result block

use regex::Regex;

use crate::error::JobError;
use crate::experiment::MetricRecord;
use crate::{Error, Result};

/// Pulls the configured metrics out of a block's test subsection.
///
/// Only text after the test marker is searched; validation numbers printed
/// before it are never read. Extraction is all-or-nothing.
#[derive(Debug, Clone)]
pub struct MetricParser {
    test_marker: String,
    patterns: Vec<(String, Regex)>,
}

impl MetricParser {
    /// Compile one pattern per metric.
    ///
    /// Metric names are matched literally (`@` and friends are escaped).
    ///
    /// # Errors
    ///
    /// Returns error if a pattern fails to compile (only possible for
    /// pathological metric names that blow the regex size limit).
    pub fn new<S: AsRef<str>>(test_marker: impl Into<String>, metrics: &[S]) -> Result<Self> {
        let patterns = metrics
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let pattern = format!(r"{}:\s*([0-9.]+)", regex::escape(name));
                Regex::new(&pattern)
                    .map(|re| (name.to_string(), re))
                    .map_err(|e| Error::Config(format!("bad metric name `{name}`: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            test_marker: test_marker.into(),
            patterns,
        })
    }

    /// Names of the required metrics, in order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(name, _)| name.as_str())
    }

    /// Portion of `block` after the first test marker.
    #[must_use]
    pub fn test_section<'a>(&self, block: &'a str) -> Option<&'a str> {
        block
            .find(&self.test_marker)
            .map(|at| &block[at + self.test_marker.len()..])
    }

    /// Parse a complete record from a block.
    ///
    /// # Errors
    ///
    /// - [`JobError::MissingTestSection`] if the block has no test marker
    /// - [`JobError::MissingMetric`] for the first metric not found
    /// - [`JobError::InvalidNumber`] if a value is not a float (e.g. `0.1.2`)
    pub fn parse(&self, block: &str) -> std::result::Result<MetricRecord, JobError> {
        let section = self
            .test_section(block)
            .ok_or(JobError::MissingTestSection)?;

        let mut record = MetricRecord::new();
        for (name, pattern) in &self.patterns {
            let raw = pattern
                .captures(section)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| JobError::MissingMetric(name.clone()))?;

            let value: f64 = raw.parse().map_err(|_| JobError::InvalidNumber {
                metric: name.clone(),
                raw: raw.to_string(),
            })?;
            record.insert(name.as_str(), value);
        }

        Ok(record)
    }
}
