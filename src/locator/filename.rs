//! Log filename grammar
//!
//! ```text
//! <prefix>_<dataset>_cfg<digits>_seed<digits>[-<alnum>+].(out|err)
//! ```
//!
//! Parsed with a strict split-and-validate routine. Anything that does not
//! match is not a log file and yields `None`.
//!
//! Constraint: the dataset token ends at the first `_` after the prefix, so a
//! dataset name containing `_` cannot be represented. Such names fail the
//! `cfg` check and are skipped like any other non-log file.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which process stream a log file captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamKind {
    /// Standard output (`.out`)
    Out,
    /// Standard error (`.err`); authoritative when present
    Err,
}

impl StreamKind {
    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::Err => "err",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "out" => Some(Self::Out),
            "err" => Some(Self::Err),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Scheduler submission id (`-12345` suffix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Raw id text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for SubmissionId {
    /// Numeric ids order numerically and before every non-numeric id;
    /// non-numeric ids order lexically.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SubmissionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields recovered from a log filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogName {
    /// `<prefix>_<dataset>_cfg<id>_seed<seed>`; shared by all streams of a job
    pub job_key: String,
    /// Dataset token as written in the filename
    pub dataset: String,
    /// Configuration id (digits, kept as text: `"0"` is the baseline)
    pub config_id: String,
    /// Random seed
    pub seed: u64,
    /// Scheduler submission id, if present
    pub submission: Option<SubmissionId>,
    /// Captured stream
    pub stream: StreamKind,
}

/// Parse a filename against the grammar for `prefix`.
///
/// Returns `None` for anything that is not a log file.
#[must_use]
pub fn parse_log_name(file_name: &str, prefix: &str) -> Option<LogName> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let stream = StreamKind::from_extension(ext)?;

    let rest = stem.strip_prefix(prefix)?.strip_prefix('_')?;

    let (dataset, rest) = rest.split_once('_')?;
    if dataset.is_empty() {
        return None;
    }

    let rest = rest.strip_prefix("cfg")?;
    let (config_id, rest) = rest.split_once('_')?;
    if !is_digits(config_id) {
        return None;
    }

    let rest = rest.strip_prefix("seed")?;
    let (seed_text, submission) = match rest.split_once('-') {
        Some((seed, sub)) => (seed, Some(sub)),
        None => (rest, None),
    };
    if !is_digits(seed_text) {
        return None;
    }
    let seed = seed_text.parse().ok()?;

    let submission = match submission {
        Some(sub) if !sub.is_empty() && sub.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            Some(SubmissionId(sub.to_string()))
        }
        Some(_) => return None,
        None => None,
    };

    Some(LogName {
        job_key: format!("{prefix}_{dataset}_cfg{config_id}_seed{seed_text}"),
        dataset: dataset.to_string(),
        config_id: config_id.to_string(),
        seed,
        submission,
        stream,
    })
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
