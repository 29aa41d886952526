//! End-to-end pipeline
//!
//! ```text
//! log dir ─► LogLocator ─► LogJob ─► ResultParser ─► JobRecord
//!                                                     │
//!                    ┌────────────────────────────────┼─────────────────────┐
//!                    ▼                                ▼                     ▼
//!              top-K per dataset              ExperimentStore ─► GroupSummary
//!                                                     │                     │
//!                                                     ▼                     ▼
//!                                            SignificanceEngine     best non-baseline
//! ```
//!
//! Job-level failures are counted in [`RunStats`] and never abort the run.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::JobError;
use crate::experiment::{
    format_mean_pm, ExperimentStore, GroupSummary, JobRecord, LogJob, MetricGroup,
};
use crate::extract::ResultParser;
use crate::locator::LogLocator;
use crate::report::{LongRow, Method, ReportWriter};
use crate::significance::{
    format_delta, percent_delta_of_means, ComparisonResult, Sample, SignificanceEngine,
};
use crate::topk::{best_per_dataset, top_k_per_dataset, BestConfig};
use crate::Result;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Directory entries examined
    pub files_scanned: usize,
    /// Entries whose name is not a log name
    pub files_skipped: usize,
    /// Distinct jobs found
    pub jobs_found: usize,
    /// Jobs that produced a complete record
    pub jobs_parsed: usize,
    /// Jobs skipped, by reason label
    pub jobs_skipped: BTreeMap<String, usize>,
}

impl RunStats {
    /// Total jobs skipped
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.jobs_skipped.values().sum()
    }

    /// One-line console summary
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Scanned {} file(s): {} job(s) found, {} parsed, {} skipped",
            self.files_scanned,
            self.jobs_found,
            self.jobs_parsed,
            self.skipped_total()
        );
        if !self.jobs_skipped.is_empty() {
            let reasons: Vec<String> = self
                .jobs_skipped
                .iter()
                .map(|(reason, n)| format!("{reason}={n}"))
                .collect();
            line.push_str(&format!(" ({})", reasons.join(", ")));
        }
        line
    }
}

/// Validated records of a log directory.
#[derive(Debug, Default)]
pub struct Collected {
    /// One record per successfully parsed job, in discovery order
    pub records: Vec<JobRecord>,
    /// Counters
    pub stats: RunStats,
}

/// Output of the comparison stage.
#[derive(Debug, Default, Serialize)]
pub struct Comparison {
    /// Long-format rows (paper / restored / adapter per dataset)
    pub rows: Vec<LongRow>,
    /// Significance rows
    pub results: Vec<ComparisonResult>,
    /// Best non-baseline configuration per dataset
    pub best: BTreeMap<String, BestConfig>,
    /// Datasets whose comparison was skipped, with the reason
    pub notes: Vec<String>,
}

/// Which tables a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Aggregated mean/std per (dataset, config)
    Aggregate,
    /// Top-K raw records per dataset
    TopK,
    /// Long-format results and significance
    Compare,
    /// Everything
    All,
}

impl ReportKind {
    const fn aggregate(self) -> bool {
        matches!(self, Self::Aggregate | Self::All)
    }

    const fn topk(self) -> bool {
        matches!(self, Self::TopK | Self::All)
    }

    const fn compare(self) -> bool {
        matches!(self, Self::Compare | Self::All)
    }
}

/// JSON run summary.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// Log directory
    pub log_dir: String,
    /// Counters
    pub stats: &'a RunStats,
    /// Aggregated groups
    pub groups: &'a [GroupSummary],
    /// Comparison stage, if it ran
    pub comparison: Option<&'a Comparison>,
}

/// Result of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunOutcome {
    /// Counters
    pub stats: RunStats,
    /// Files written
    pub written: Vec<PathBuf>,
}

/// The aggregation pipeline, configured once and run over a log directory.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    locator: LogLocator,
    parser: ResultParser,
    engine: SignificanceEngine,
}

impl Pipeline {
    /// Build a pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            locator: LogLocator::from_config(&config),
            parser: ResultParser::from_config(&config)?,
            engine: SignificanceEngine::new(),
            config,
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse one job from its authoritative log stream.
    ///
    /// # Errors
    ///
    /// Any [`JobError`]; the caller skips the job.
    pub fn parse_job(&self, job: &LogJob) -> std::result::Result<JobRecord, JobError> {
        let source = job
            .authoritative()
            .ok_or_else(|| JobError::Unreadable("job has no log file".to_string()))?;

        let bytes =
            std::fs::read(source.path()).map_err(|e| JobError::Unreadable(e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);

        let metrics = self.parser.parse(&text)?;
        Ok(JobRecord::new(
            job.job_key(),
            job.dataset(),
            job.config_id(),
            job.seed(),
            source.file_name(),
            metrics,
        ))
    }

    /// Locate and parse every job under `log_dir`.
    ///
    /// # Errors
    ///
    /// Returns error only if the directory itself cannot be listed.
    pub fn collect<P: AsRef<Path>>(&self, log_dir: P) -> Result<Collected> {
        let located = self.locator.locate(log_dir.as_ref())?;
        info!(
            dir = %log_dir.as_ref().display(),
            jobs = located.jobs.len(),
            files = located.files_scanned,
            "located log files"
        );

        #[cfg(feature = "rayon")]
        let outcomes: Vec<_> = located
            .jobs
            .par_iter()
            .map(|job| (job, self.parse_job(job)))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<_> = located
            .jobs
            .iter()
            .map(|job| (job, self.parse_job(job)))
            .collect();

        let mut collected = Collected {
            records: Vec::with_capacity(outcomes.len()),
            stats: RunStats {
                files_scanned: located.files_scanned,
                files_skipped: located.files_skipped,
                jobs_found: located.jobs.len(),
                ..RunStats::default()
            },
        };

        for (job, outcome) in outcomes {
            match outcome {
                Ok(record) => collected.records.push(record),
                Err(reason) => {
                    debug!(job = job.job_key(), %reason, "skipping job");
                    *collected
                        .stats
                        .jobs_skipped
                        .entry(reason.label().to_string())
                        .or_default() += 1;
                }
            }
        }
        collected.stats.jobs_parsed = collected.records.len();

        info!(
            parsed = collected.stats.jobs_parsed,
            skipped = collected.stats.skipped_total(),
            "parsed logs"
        );
        Ok(collected)
    }

    /// Group validated records.
    #[must_use]
    pub fn aggregate(&self, records: &[JobRecord]) -> ExperimentStore {
        let mut store = ExperimentStore::new();
        for record in records {
            store.add_job(record);
        }
        store
    }

    /// Summarize every group over the configured metrics.
    #[must_use]
    pub fn summarize(&self, store: &ExperimentStore) -> Vec<GroupSummary> {
        store.summarize(&self.config.metrics)
    }

    /// Top-K records per dataset by the configured top-K metric.
    ///
    /// # Errors
    ///
    /// Returns error if K is zero
    pub fn top_k<'a>(
        &self,
        records: &'a [JobRecord],
    ) -> Result<BTreeMap<String, Vec<&'a JobRecord>>> {
        top_k_per_dataset(records, &self.config.topk_metric, self.config.top_k)
    }

    /// Paper / restored / adapter rows plus significance per dataset.
    #[must_use]
    pub fn compare(&self, store: &ExperimentStore, summaries: &[GroupSummary]) -> Comparison {
        let cfg = &self.config;
        let best = best_per_dataset(summaries, &cfg.baseline_config, &cfg.primary_metric);

        let mut datasets: Vec<&str> = store.datasets();
        datasets.extend(cfg.baselines.datasets());
        datasets.sort_unstable();
        datasets.dedup();

        let mut comparison = Comparison::default();
        for dataset in datasets {
            let restored = store.group(dataset, &cfg.baseline_config);
            let adapter = best
                .get(dataset)
                .and_then(|b| store.group(dataset, &b.config_id).map(|g| (b, g)));

            if cfg.baselines.contains_dataset(dataset) {
                comparison.rows.push(self.paper_row(dataset));
            }
            if let Some(group) = restored {
                comparison.rows.push(self.restored_row(dataset, group));
            }
            if let Some((winner, group)) = adapter {
                comparison
                    .rows
                    .push(self.adapter_row(dataset, &winner.config_id, group, restored));
            }

            if store.groups_for_dataset(dataset).next().is_none() {
                continue;
            }
            match (restored, adapter) {
                (None, _) => comparison.notes.push(format!(
                    "{dataset}: no baseline group (config {}); comparison skipped",
                    cfg.baseline_config
                )),
                (Some(_), None) => comparison.notes.push(format!(
                    "{dataset}: no non-baseline configuration; comparison skipped"
                )),
                (Some(base_group), Some((winner, group))) => {
                    for metric in &cfg.metrics {
                        let base = base_group.samples(metric);
                        let chal = group.samples(metric);
                        let result = self.engine.compare(
                            dataset,
                            metric,
                            Sample {
                                config_id: &cfg.baseline_config,
                                values: &base,
                            },
                            Sample {
                                config_id: &winner.config_id,
                                values: &chal,
                            },
                        );
                        if result.is_insufficient() {
                            warn!(dataset, metric = %metric, "insufficient seeds for t-tests");
                        }
                        comparison.results.push(result);
                    }
                }
            }
        }

        for note in &comparison.notes {
            warn!("{note}");
        }
        comparison.best = best;
        comparison
    }

    fn paper_row(&self, dataset: &str) -> LongRow {
        let baselines = &self.config.baselines;
        LongRow {
            dataset: dataset.to_string(),
            method: Method::Paper,
            config_id: None,
            cells: self
                .config
                .metrics
                .iter()
                .map(|m| {
                    baselines
                        .get(dataset, m)
                        .map_or_else(String::new, |v| format!("{v:.4}"))
                })
                .collect(),
        }
    }

    fn restored_row(&self, dataset: &str, group: &MetricGroup) -> LongRow {
        LongRow {
            dataset: dataset.to_string(),
            method: Method::Restored,
            config_id: Some(self.config.baseline_config.clone()),
            cells: self
                .config
                .metrics
                .iter()
                .map(|m| {
                    let stat = group.stat(m);
                    format_mean_pm(stat.mean().unwrap_or(f64::NAN), stat.sample_std())
                })
                .collect(),
        }
    }

    fn adapter_row(
        &self,
        dataset: &str,
        config_id: &str,
        group: &MetricGroup,
        restored: Option<&MetricGroup>,
    ) -> LongRow {
        let cells = self
            .config
            .metrics
            .iter()
            .map(|m| {
                let stat = group.stat(m);
                let mean = stat.mean().unwrap_or(f64::NAN);
                let cell = format_mean_pm(mean, stat.sample_std());
                match restored.and_then(|r| r.stat(m).mean()) {
                    Some(base) => match percent_delta_of_means(base, mean) {
                        delta @ Ok(_) => format!("{cell} ({})", format_delta(&delta)),
                        Err(_) => format!("{cell} (undefined)"),
                    },
                    None => cell,
                }
            })
            .collect();

        LongRow {
            dataset: dataset.to_string(),
            method: Method::Adapter,
            config_id: Some(config_id.to_string()),
            cells,
        }
    }

    /// Run the pipeline over `log_dir` and write the requested tables.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be listed or an output file
    /// cannot be written. Job-level failures are only counted.
    pub fn run<W: Write>(
        &self,
        log_dir: &Path,
        kind: ReportKind,
        writer: &mut ReportWriter<W>,
    ) -> Result<RunOutcome> {
        let collected = self.collect(log_dir)?;
        let mut written = Vec::new();

        let store = self.aggregate(&collected.records);
        let summaries = self.summarize(&store);

        if kind.aggregate() {
            written.push(writer.write_aggregated(&summaries)?);
        }

        if kind.topk() {
            let selected = self.top_k(&collected.records)?;
            written.push(writer.write_topk(
                &selected,
                &self.config.topk_metric,
                self.config.top_k,
            )?);
        }

        let comparison = if kind.compare() {
            let comparison = self.compare(&store, &summaries);
            written.push(writer.write_long_format(&comparison.rows)?);
            written.push(writer.write_significance(&comparison.results)?);
            for note in &comparison.notes {
                writer.note(note)?;
            }
            Some(comparison)
        } else {
            None
        };

        if self.config.output.json {
            written.push(writer.write_json(&RunSummary {
                generated_at: Utc::now(),
                log_dir: log_dir.display().to_string(),
                stats: &collected.stats,
                groups: &summaries,
                comparison: comparison.as_ref(),
            })?);
        }

        writer.note(&format!("\n{}", collected.stats.summary_line()))?;
        for path in &written {
            writer.note(&format!("Wrote {}", path.display()))?;
        }

        Ok(RunOutcome {
            stats: collected.stats,
            written,
        })
    }
}
