//! Experiment schema for seed-level aggregation
//!
//! ## Schema Overview
//!
//! ```text
//! LogJob (1) ──< LogSource (≤ 2: .err, .out)
//!    │
//!    └── JobRecord (0..1) ── MetricRecord
//!                              │
//! ExperimentStore ──< MetricGroup (dataset, config) ──> GroupSummary
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use seedstat::experiment::{ExperimentStore, MetricRecord};
//!
//! let mut store = ExperimentStore::new();
//! store.add("baby", "0", 1, MetricRecord::from_pairs([("recall@10", 0.056)]));
//! store.add("baby", "0", 2, MetricRecord::from_pairs([("recall@10", 0.057)]));
//!
//! let summary = store.summarize(&["recall@10".to_string()]);
//! assert_eq!(summary[0].num_seeds, 2);
//! ```

mod aggregate;
mod job_record;
mod log_job;
mod metric_record;
mod store;

pub use aggregate::{format_mean_pm, round4, AggregateStat, GroupSummary, RunningStat};
pub use job_record::JobRecord;
pub use log_job::{LogJob, LogSource};
pub use metric_record::{MetricRecord, MetricValue};
pub use store::{ExperimentStore, GroupKey, MetricGroup};
