//! Log text → metric record
//!
//! [`ResultParser`] chains the two extraction steps:
//!
//! 1. [`BlockExtractor`]: find the last best-result block
//! 2. [`MetricParser`]: read the test metrics from it, all-or-nothing
//!
//! Both steps are pure functions of the text; per-file parsing can run in
//! parallel without coordination.

pub mod block;
pub mod metrics;

pub use block::BlockExtractor;
pub use metrics::MetricParser;

use crate::config::PipelineConfig;
use crate::error::JobError;
use crate::experiment::MetricRecord;
use crate::Result;

/// Parses the authoritative metric record out of raw log text.
#[derive(Debug, Clone)]
pub struct ResultParser {
    blocks: BlockExtractor,
    metrics: MetricParser,
}

impl ResultParser {
    /// Build from explicit parts.
    #[must_use]
    pub const fn new(blocks: BlockExtractor, metrics: MetricParser) -> Self {
        Self { blocks, metrics }
    }

    /// Build from the banner, test marker and metric list of `config`.
    ///
    /// # Errors
    ///
    /// Returns error if a metric pattern fails to compile
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            blocks: BlockExtractor::new(config.banner.clone()),
            metrics: MetricParser::new(config.test_marker.clone(), config.metrics.as_slice())?,
        })
    }

    /// Block extractor in use.
    #[must_use]
    pub const fn block_extractor(&self) -> &BlockExtractor {
        &self.blocks
    }

    /// Metric parser in use.
    #[must_use]
    pub const fn metric_parser(&self) -> &MetricParser {
        &self.metrics
    }

    /// Parse the last block of `text`.
    ///
    /// Earlier blocks are never consulted, even if the last one is
    /// incomplete.
    ///
    /// # Errors
    ///
    /// [`JobError::NoResultBlock`] if the banner never occurs, otherwise the
    /// errors of [`MetricParser::parse`].
    pub fn parse(&self, text: &str) -> std::result::Result<MetricRecord, JobError> {
        let block = self
            .blocks
            .last_block(text)
            .ok_or(JobError::NoResultBlock)?;
        self.metrics.parse(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BANNER;

    fn block(r10: f64, with_ndcg20: bool) -> String {
        let mut text = format!(
            "{DEFAULT_BANNER}\nValid: recall@10: 0.1\nTest: recall@10: {r10:.4}    recall@20: 0.0880    ndcg@10: 0.0300"
        );
        if with_ndcg20 {
            text.push_str("    ndcg@20: 0.0380");
        }
        text.push_str("\n\n");
        text
    }

    #[test]
    fn test_second_block_wins() {
        let parser = ResultParser::from_config(&PipelineConfig::default()).unwrap();
        let text = format!("{}epoch 40\n{}", block(0.0500, true), block(0.0560, true));
        let record = parser.parse(&text).unwrap();
        assert!((record.get("recall@10").unwrap() - 0.0560).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_last_block_is_not_rescued_by_earlier_block() {
        let parser = ResultParser::from_config(&PipelineConfig::default()).unwrap();
        let text = format!("{}{}", block(0.0500, true), block(0.0560, false));
        assert_eq!(
            parser.parse(&text).unwrap_err(),
            JobError::MissingMetric("ndcg@20".to_string())
        );
    }

    #[test]
    fn test_no_block() {
        let parser = ResultParser::from_config(&PipelineConfig::default()).unwrap();
        assert_eq!(
            parser.parse("Traceback (most recent call last):\n").unwrap_err(),
            JobError::NoResultBlock
        );
    }
}
