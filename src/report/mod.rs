//! Report output
//!
//! [`ReportWriter`] turns pipeline results into files under an output
//! directory (CSV always, Parquet on request) and mirrors each table on a
//! console sink. Empty inputs are not errors: they produce header-only files
//! and a "no results" note.

pub mod console;
pub mod tables;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::config::OutputConfig;
use crate::experiment::{GroupSummary, JobRecord};
use crate::significance::ComparisonResult;
use crate::storage;
use crate::Result;
pub use tables::{LongRow, Method};

/// Writes report tables and console summaries.
#[derive(Debug)]
pub struct ReportWriter<W: Write = io::Stdout> {
    out_dir: PathBuf,
    output: OutputConfig,
    metrics: Vec<String>,
    console: W,
}

impl ReportWriter<io::Stdout> {
    /// Writer printing summaries to stdout.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>, output: OutputConfig, metrics: Vec<String>) -> Self {
        Self::with_console(out_dir, output, metrics, io::stdout())
    }
}

impl<W: Write> ReportWriter<W> {
    /// Writer printing summaries to `console`.
    #[must_use]
    pub fn with_console(
        out_dir: impl Into<PathBuf>,
        output: OutputConfig,
        metrics: Vec<String>,
        console: W,
    ) -> Self {
        Self {
            out_dir: out_dir.into(),
            output,
            metrics,
            console,
        }
    }

    /// Output directory.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Console sink (tests read captured output back from it).
    #[must_use]
    pub const fn console(&self) -> &W {
        &self.console
    }

    /// Consume the writer and return the console sink.
    pub fn into_console(self) -> W {
        self.console
    }

    /// Write the aggregated-results table.
    ///
    /// # Errors
    /// Returns error if the table cannot be written
    pub fn write_aggregated(&mut self, summaries: &[GroupSummary]) -> Result<PathBuf> {
        let batch = tables::aggregated_batch(summaries, &self.metrics)?;
        let path = self.store(&self.output.aggregated, &batch)?;
        console::print_aggregated(&mut self.console, summaries, &self.metrics)?;
        Ok(path)
    }

    /// Write the long-format table.
    ///
    /// # Errors
    /// Returns error if the table cannot be written
    pub fn write_long_format(&mut self, rows: &[LongRow]) -> Result<PathBuf> {
        let batch = tables::long_format_batch(rows, &self.metrics)?;
        let path = self.store(&self.output.long_format, &batch)?;
        console::print_long_format(&mut self.console, rows, &self.metrics)?;
        Ok(path)
    }

    /// Write the significance table.
    ///
    /// # Errors
    /// Returns error if the table cannot be written
    pub fn write_significance(&mut self, results: &[ComparisonResult]) -> Result<PathBuf> {
        let batch = tables::significance_batch(results)?;
        let path = self.store(&self.output.significance, &batch)?;
        console::print_significance(&mut self.console, results)?;
        Ok(path)
    }

    /// Write the top-K table.
    ///
    /// # Errors
    /// Returns error if the table cannot be written
    pub fn write_topk(
        &mut self,
        selected: &BTreeMap<String, Vec<&JobRecord>>,
        ranked_by: &str,
        k: usize,
    ) -> Result<PathBuf> {
        let flat: Vec<&JobRecord> = selected.values().flatten().copied().collect();
        let batch = tables::topk_batch(&flat, &self.metrics)?;
        let path = self.store(&self.output.topk, &batch)?;
        console::print_topk(&mut self.console, selected, &self.metrics, ranked_by, k)?;
        Ok(path)
    }

    /// Print a free-form note (skipped comparisons, run statistics).
    ///
    /// # Errors
    /// Returns error if the sink fails
    pub fn note(&mut self, text: &str) -> Result<()> {
        writeln!(self.console, "{text}")?;
        Ok(())
    }

    /// Serialize `value` as pretty JSON to the configured summary file.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails
    pub fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<PathBuf> {
        let path = self.out_dir.join(&self.output.summary);
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        info!(path = %path.display(), "wrote run summary");
        Ok(path)
    }

    fn store(&self, file_name: &str, batch: &RecordBatch) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        storage::write_csv(&path, batch, self.output.bom)?;
        if self.output.parquet {
            storage::write_parquet(path.with_extension("parquet"), batch)?;
        }
        info!(path = %path.display(), rows = batch.num_rows(), "wrote table");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregated_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ReportWriter::with_console(
            dir.path(),
            OutputConfig::default(),
            vec!["recall@10".to_string()],
            Vec::new(),
        );

        let path = writer.write_aggregated(&[]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "dataset,config_id,num_seeds,recall@10_mean,recall@10_std,recall@10_mean_pm\n"
        );

        let console = String::from_utf8(writer.into_console()).unwrap();
        assert!(console.contains("No results"));
    }

    #[test]
    fn test_parquet_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            parquet: true,
            ..OutputConfig::default()
        };
        let metrics = vec!["recall@10".to_string()];
        let mut writer = ReportWriter::with_console(dir.path(), output, metrics, io::sink());
        writer.write_significance(&[]).unwrap();
        assert!(dir.path().join("significance.parquet").exists());
    }
}
