//! Log discovery
//!
//! Enumerates a log directory, parses each filename with the
//! [`filename`] grammar and groups the survivors into [`LogJob`]s. Grouping is
//! pure (see [`LogLocator::group`]) so it can be tested without touching the
//! file system.

pub mod filename;

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::PipelineConfig;
use crate::experiment::{LogJob, LogSource};
use crate::{Error, Result};
use filename::parse_log_name;

/// Jobs found in a directory plus enumeration counters.
#[derive(Debug, Default)]
pub struct Located {
    /// Jobs in discovery order (first file of each job, sorted by filename)
    pub jobs: Vec<LogJob>,
    /// Directory entries examined
    pub files_scanned: usize,
    /// Entries whose name did not match the grammar
    pub files_skipped: usize,
}

/// Finds log files and groups them by job.
#[derive(Debug, Clone)]
pub struct LogLocator {
    prefix: String,
    aliases: BTreeMap<String, String>,
}

impl LogLocator {
    /// Locator for filenames starting with `<prefix>_`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            aliases: BTreeMap::new(),
        }
    }

    /// Locator using the prefix and dataset aliases of `config`
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            aliases: config.dataset_aliases.clone(),
        }
    }

    /// Enumerate `dir` (non-recursive) and group its log files.
    ///
    /// # Errors
    ///
    /// Returns error if `dir` does not exist or cannot be listed. Individual
    /// entries that cannot be inspected are skipped. Symlinks are followed.
    pub fn locate<P: AsRef<Path>>(&self, dir: P) -> Result<Located> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::LogDirNotFound(dir.display().to_string()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        Ok(self.group(paths))
    }

    /// Group already-enumerated paths into jobs.
    ///
    /// Discovery order follows the input order; callers that want
    /// determinism pass sorted paths.
    #[must_use]
    pub fn group<I>(&self, paths: I) -> Located
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut located = Located::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for path in paths {
            located.files_scanned += 1;

            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| parse_log_name(n, &self.prefix))
            else {
                debug!(path = %path.display(), "skipping non-log file");
                located.files_skipped += 1;
                continue;
            };

            let slot = *index.entry(name.job_key.clone()).or_insert_with(|| {
                let dataset = self
                    .aliases
                    .get(&name.dataset)
                    .cloned()
                    .unwrap_or_else(|| name.dataset.clone());
                located.jobs.push(LogJob::new(
                    name.job_key.clone(),
                    dataset,
                    name.config_id.clone(),
                    name.seed,
                ));
                located.jobs.len() - 1
            });

            located.jobs[slot].add_source(LogSource::new(path, &name));
        }

        located
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filename::StreamKind;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/logs").join(n)).collect()
    }

    #[test]
    fn test_groups_streams_by_job() {
        let located = LogLocator::new("bm3").group(paths(&[
            "bm3_baby_cfg0_seed1-10.err",
            "bm3_baby_cfg0_seed1-10.out",
            "bm3_baby_cfg0_seed2-11.out",
            "notes.txt",
        ]));

        assert_eq!(located.files_scanned, 4);
        assert_eq!(located.files_skipped, 1);
        assert_eq!(located.jobs.len(), 2);

        let first = &located.jobs[0];
        assert_eq!(first.job_key(), "bm3_baby_cfg0_seed1");
        assert_eq!(first.stream_count(), 2);
        assert_eq!(first.authoritative().unwrap().stream(), StreamKind::Err);

        let second = &located.jobs[1];
        assert_eq!(second.seed(), 2);
        assert_eq!(second.authoritative().unwrap().stream(), StreamKind::Out);
    }

    #[test]
    fn test_applies_dataset_alias() {
        let config = PipelineConfig::default();
        let located =
            LogLocator::from_config(&config).group(paths(&["bm3_elec_cfg1_seed4.err"]));
        assert_eq!(located.jobs[0].dataset(), "electronics");
        assert_eq!(located.jobs[0].job_key(), "bm3_elec_cfg1_seed4");
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_follows_symlinks() {
        let store = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let target = store.path().join("bm3_baby_cfg0_seed1.err");
        std::fs::write(&target, "log").unwrap();
        std::os::unix::fs::symlink(&target, logs.path().join("bm3_baby_cfg0_seed1.err")).unwrap();
        std::fs::create_dir(logs.path().join("bm3_baby_cfg0_seed2.err")).unwrap();

        let located = LogLocator::new("bm3").locate(logs.path()).unwrap();
        assert_eq!(located.files_scanned, 1);
        assert_eq!(located.jobs.len(), 1);
        assert_eq!(located.jobs[0].job_key(), "bm3_baby_cfg0_seed1");
    }

    #[test]
    fn test_missing_dir_is_error() {
        let err = LogLocator::new("bm3")
            .locate("/definitely/not/a/log/dir")
            .unwrap_err();
        assert!(matches!(err, Error::LogDirNotFound(_)));
    }
}
