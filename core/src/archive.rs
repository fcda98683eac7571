//! The summary archive and its on-disk store.
//!
//! The archive is the ordered, contiguous sequence of all previously computed
//! weekly summaries. It is read once at startup, extended in memory, and
//! fully rewritten at the end of a run (atomic `.tmp` + rename). A missing
//! file and a corrupt file are distinct outcomes: the former is the expected
//! first run, the latter is surfaced as a warning before progress resets to
//! the epoch date.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};
use crate::summary::WeekSummary;

/// Ordered sequence of weekly summaries, ascending by `start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryArchive {
    summaries: Vec<WeekSummary>,
}

impl SummaryArchive {
    pub fn summaries(&self) -> &[WeekSummary] {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Append a newly computed week. Callers feed windows in order, so the
    /// archive stays sorted and contiguous by construction.
    pub fn push(&mut self, summary: WeekSummary) {
        self.summaries.push(summary);
    }

    /// First date not covered by any cached summary: one day after the
    /// latest `end`, or `epoch` for an empty archive.
    pub fn next_unprocessed(&self, epoch: NaiveDate) -> NaiveDate {
        self.summaries
            .iter()
            .map(|s| s.end)
            .max()
            .map_or(epoch, |end| end + Days::new(1))
    }

    /// Check the structural invariants: every record spans a full week and
    /// consecutive records are contiguous with no gaps or duplicates.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for summary in &self.summaries {
            if !summary.spans_full_week() {
                return Err(format!(
                    "record {} does not span a full week (end {})",
                    summary.start, summary.end
                ));
            }
        }
        for pair in self.summaries.windows(2) {
            let expected = pair[0].end + Days::new(1);
            if pair[1].start != expected {
                return Err(format!(
                    "archive not contiguous: {} follows {}, expected start {}",
                    pair[1].start, pair[0].end, expected
                ));
            }
        }
        Ok(())
    }
}

impl From<Vec<WeekSummary>> for SummaryArchive {
    fn from(summaries: Vec<WeekSummary>) -> Self {
        Self { summaries }
    }
}

/// Outcome of loading the archive file.
#[derive(Debug)]
pub enum ArchiveSource {
    /// No archive file exists yet. Expected on a first run.
    Missing,
    /// The file exists but could not be used; processing restarts from the
    /// epoch date.
    Corrupt { reason: String },
    Loaded(SummaryArchive),
}

/// On-disk store for the archive.
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted archive, distinguishing "no file yet" from "file
    /// present but unusable".
    pub fn load(&self) -> ArchiveSource {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ArchiveSource::Missing,
            Err(e) => {
                return ArchiveSource::Corrupt {
                    reason: format!("read failed: {e}"),
                };
            }
        };

        let archive: SummaryArchive = match serde_json::from_str(&raw) {
            Ok(archive) => archive,
            Err(e) => {
                return ArchiveSource::Corrupt {
                    reason: format!("parse failed: {e}"),
                };
            }
        };

        if let Err(reason) = archive.validate() {
            return ArchiveSource::Corrupt { reason };
        }

        ArchiveSource::Loaded(archive)
    }

    /// Overwrite the archive file with the full sequence, pretty-printed.
    pub fn save(&self, archive: &SummaryArchive) -> Result<()> {
        let json = serde_json::to_string_pretty(archive)
            .map_err(|source| StatsError::JsonSerialize { source })?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Atomically write `data` to `path` via a `.tmp` sibling, creating parent
/// directories as needed.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let map_err = |source| StatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(map_err)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data).map_err(map_err)?;
    std::fs::rename(&tmp, path).map_err(map_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn summary(start: &str) -> WeekSummary {
        let start = date(start);
        WeekSummary {
            start,
            end: start + Days::new(6),
            open_issues: 10,
            incoming_p0: 0,
            open_p1: 1,
            incoming_p1: 2,
            resolved_p1: 3,
            open_p2: 4,
            incoming_p2: 5,
            resolved_p2: 6,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ArchiveStore::new(tmp.path().join("summaries.json"));

        let archive: SummaryArchive = vec![summary("2023-04-15"), summary("2023-04-22")].into();
        store.save(&archive).unwrap();

        match store.load() {
            ArchiveSource::Loaded(loaded) => assert_eq!(loaded, archive),
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_distinct_from_corrupt() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ArchiveStore::new(tmp.path().join("summaries.json"));
        assert!(matches!(store.load(), ArchiveSource::Missing));
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("summaries.json");
        std::fs::write(&path, "not json at all {{{").unwrap();

        let store = ArchiveStore::new(path);
        match store.load() {
            ArchiveSource::Corrupt { reason } => assert!(reason.contains("parse failed")),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn gap_in_archive_is_corrupt() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = ArchiveStore::new(tmp.path().join("summaries.json"));

        // 2023-04-29 skipped: the second record starts a week late.
        let archive: SummaryArchive = vec![summary("2023-04-15"), summary("2023-04-29")].into();
        let json = serde_json::to_string_pretty(&archive).unwrap();
        std::fs::write(store.path(), json).unwrap();

        match store.load() {
            ArchiveSource::Corrupt { reason } => assert!(reason.contains("not contiguous")),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn next_unprocessed_is_day_after_latest_end() {
        let archive: SummaryArchive = vec![summary("2023-04-15"), summary("2023-04-22")].into();
        assert_eq!(
            archive.next_unprocessed(date("2023-04-15")),
            date("2023-04-29")
        );
    }

    #[test]
    fn next_unprocessed_of_empty_archive_is_epoch() {
        let archive = SummaryArchive::default();
        assert_eq!(
            archive.next_unprocessed(date("2023-04-15")),
            date("2023-04-15")
        );
    }

    #[test]
    fn resumed_windows_never_overlap_cached_ones() {
        let archive: SummaryArchive = vec![summary("2023-04-15"), summary("2023-04-22")].into();
        let resume = archive.next_unprocessed(date("2023-04-15"));
        let windows = crate::window::windows_from(resume, date("2023-06-01"), 52);
        let cached_max_end = archive.summaries().last().unwrap().end;
        for w in windows {
            assert!(w.start > cached_max_end);
        }
    }

    #[test]
    fn save_leaves_no_tmp_sibling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("summaries.json");
        let store = ArchiveStore::new(&path);
        store.save(&vec![summary("2023-04-15")].into()).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/summaries.json");
        let store = ArchiveStore::new(&path);
        store.save(&SummaryArchive::default()).unwrap();
        assert!(path.exists());
    }
}
