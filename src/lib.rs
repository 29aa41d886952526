//! # seedstat: seed-level experiment log aggregation
//!
//! **Version**: 0.1.0
//!
//! seedstat turns a directory of training-job logs (one job per dataset,
//! configuration and seed) into summary tables:
//!
//! - mean ± sample standard deviation of each test metric per
//!   (dataset, configuration), across seeds
//! - top-K jobs per dataset by one metric
//! - a long-format table comparing published reference numbers, the
//!   reproduced baseline and the best challenger configuration
//! - percent deltas plus Welch and Student t-test p-values of the challenger
//!   against the baseline
//!
//! ## Pipeline
//!
//! ```text
//! locator ─► extract ─► experiment (store, aggregate) ─► topk / significance ─► report
//! ```
//!
//! A job that cannot be parsed completely is skipped and counted. It never
//! aborts the run and never contributes a partial record.
//!
//! ## Example
//!
//! ```rust,no_run
//! use seedstat::config::PipelineConfig;
//! use seedstat::pipeline::{Pipeline, ReportKind};
//! use seedstat::report::ReportWriter;
//!
//! let config = PipelineConfig::builder().top_k(5).build()?;
//! let metrics = config.metrics.clone();
//! let output = config.output.clone();
//! let pipeline = Pipeline::new(config)?;
//!
//! let mut writer = ReportWriter::new("results", output, metrics);
//! let outcome = pipeline.run("logs".as_ref(), ReportKind::All, &mut writer)?;
//! println!("{} jobs parsed", outcome.stats.jobs_parsed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod extract;
pub mod locator;
pub mod pipeline;
pub mod precedence;
pub mod report;
pub mod significance;
pub mod storage;
pub mod topk;

pub use error::{Error, JobError, Result};
