//! Log Job - one training job and the log streams it left behind

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::locator::filename::{LogName, StreamKind, SubmissionId};
use crate::precedence::Precedence;

/// One log file of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSource {
    path: PathBuf,
    stream: StreamKind,
    submission: Option<SubmissionId>,
}

impl LogSource {
    /// Create a source for a file whose name parsed as `name`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, name: &LogName) -> Self {
        Self {
            path: path.into(),
            stream: name.stream,
            submission: name.submission.clone(),
        }
    }

    /// Full path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare filename (for reports).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Captured stream.
    #[must_use]
    pub const fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Submission id, if the filename carried one.
    #[must_use]
    pub const fn submission(&self) -> Option<&SubmissionId> {
        self.submission.as_ref()
    }

    /// Precedence rank: stream first (`err` > `out`), then the newest submission.
    fn rank(&self) -> (StreamKind, Option<&SubmissionId>) {
        (self.stream, self.submission.as_ref())
    }
}

/// Log Job is identified by (dataset, configuration id, seed).
///
/// A job holds at most one source per stream kind. When a stream kind is
/// offered twice (a resubmitted job), the newer submission is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogJob {
    job_key: String,
    dataset: String,
    config_id: String,
    seed: u64,
    streams: BTreeMap<StreamKind, LogSource>,
}

impl LogJob {
    /// Create a job with no streams yet.
    #[must_use]
    pub fn new(
        job_key: impl Into<String>,
        dataset: impl Into<String>,
        config_id: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self {
            job_key: job_key.into(),
            dataset: dataset.into(),
            config_id: config_id.into(),
            seed,
            streams: BTreeMap::new(),
        }
    }

    /// Job key shared by all streams (`bm3_baby_cfg0_seed1`).
    #[must_use]
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// Canonical dataset name.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Configuration id.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Random seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Retained source for a stream kind.
    #[must_use]
    pub fn stream(&self, kind: StreamKind) -> Option<&LogSource> {
        self.streams.get(&kind)
    }

    /// Number of retained streams (0..=2).
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Offer a source; keeps the higher-ranked one per stream kind.
    pub fn add_source(&mut self, source: LogSource) {
        match self.streams.get(&source.stream) {
            Some(existing) if existing.rank() > source.rank() => {}
            _ => {
                self.streams.insert(source.stream, source);
            }
        }
    }

    /// The single source the pipeline reads: `err` if present, else `out`.
    #[must_use]
    pub fn authoritative(&self) -> Option<&LogSource> {
        self.streams
            .values()
            .map(|source| (source.rank(), source))
            .collect::<Precedence<_, _>>()
            .resolve()
    }
}
