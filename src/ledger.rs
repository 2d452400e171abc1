//! Persistent release ledger.
//!
//! [`LedgerState`] is the pure in-memory record of every build ever
//! detected plus run bookkeeping counters; it carries no I/O so tests can
//! build arbitrary fixtures directly. [`LedgerStore`] moves that state to
//! and from a JSON file, writing through a sibling temp file so a torn
//! ledger is never visible on disk.

use crate::detection::types::{Channel, Release, VersionLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize ledger state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One tracked build. Created on first detection, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub build_id: String,
    pub build_number: String,
    pub version: VersionLabel,
    pub title: String,
    pub iso_url: String,
    /// First-seen timestamp, immutable once set.
    pub detected_date: DateTime<Utc>,
    pub architecture: String,
    pub channel: Channel,
}

/// In-memory ledger state: tracked builds plus process-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub builds: BTreeMap<String, LedgerEntry>,
    pub last_check: Option<DateTime<Utc>>,
    pub check_count: u64,
}

impl LedgerState {
    pub fn contains(&self, build_id: &str) -> bool {
        self.builds.contains_key(build_id)
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Insert a release if it is not tracked yet; an already tracked
    /// `build_id` is a no-op returning the existing entry, so re-detection
    /// never rewrites first-seen fields.
    pub fn record(
        &mut self,
        release: &Release,
        version: &VersionLabel,
        now: DateTime<Utc>,
    ) -> &LedgerEntry {
        self.builds
            .entry(release.build_id.clone())
            .or_insert_with(|| LedgerEntry {
                build_id: release.build_id.clone(),
                build_number: release.build_number.clone(),
                version: version.clone(),
                title: release.title.clone(),
                iso_url: release.iso_url.clone(),
                detected_date: now,
                architecture: release.architecture.clone(),
                channel: release.channel,
            })
    }

    /// Close out a run: stamp `last_check` and bump `check_count`, even
    /// when the run found nothing new.
    pub fn finalize(&mut self, now: DateTime<Utc>) {
        self.last_check = Some(now);
        self.check_count += 1;
    }
}

/// File-backed ledger storage.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted state. A missing file is a first run, not an error.
    /// A file that no longer parses is logged and replaced by a fresh
    /// state on the next persist.
    pub fn load(&self) -> Result<LedgerState, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger yet, starting empty");
                return Ok(LedgerState::default());
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Ok(state),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ledger is not valid JSON, starting fresh"
                );
                Ok(LedgerState::default())
            }
        }
    }

    /// Persist atomically: write a sibling temp file, then rename it over
    /// the target.
    pub fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(state).map_err(LedgerError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), builds = state.len(), "ledger persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::Channel;
    use chrono::TimeZone;

    fn release(build_id: &str, title: &str) -> Release {
        Release {
            build_id: build_id.to_string(),
            build_number: "26100.7462".to_string(),
            title: title.to_string(),
            architecture: "amd64".to_string(),
            channel: Channel::Retail,
            iso_url: format!("https://example.invalid/download?id={}", build_id),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_record_inserts_first_seen_entry() {
        let mut state = LedgerState::default();
        let version = VersionLabel::Retail("24H2".to_string());

        let entry = state.record(&release("abc", "Title one"), &version, at(1_000));
        assert_eq!(entry.build_id, "abc");
        assert_eq!(entry.detected_date, at(1_000));
        assert!(state.contains("abc"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut state = LedgerState::default();
        let version = VersionLabel::Retail("24H2".to_string());

        state.record(&release("abc", "Title one"), &version, at(1_000));
        let before = state.builds.get("abc").unwrap().clone();

        // Same build_id, different title, later timestamp: nothing changes.
        let other_version = VersionLabel::Unknown;
        state.record(&release("abc", "Title two"), &other_version, at(2_000));
        let after = state.builds.get("abc").unwrap();

        assert_eq!(*after, before);
        assert_eq!(after.title, "Title one");
        assert_eq!(after.detected_date, at(1_000));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_finalize_counts_every_run() {
        let mut state = LedgerState::default();
        assert_eq!(state.check_count, 0);
        assert!(state.last_check.is_none());

        state.finalize(at(1_000));
        state.finalize(at(2_000));

        assert_eq!(state.check_count, 2);
        assert_eq!(state.last_check, Some(at(2_000)));
    }

    #[test]
    fn test_load_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("tracked_releases.json"));

        let state = store.load().unwrap();
        assert!(state.is_empty());
        assert_eq!(state.check_count, 0);
    }

    #[test]
    fn test_load_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracked_releases.json");
        fs::write(&path, "{not json").unwrap();

        let state = LedgerStore::new(&path).load().unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("tracked_releases.json"));

        let mut state = LedgerState::default();
        state.record(
            &release("abc", "Windows 11, version 24H2"),
            &VersionLabel::Retail("24H2".to_string()),
            at(1_000),
        );
        state.record(
            &release("def", "Windows 11 Insider Preview"),
            &VersionLabel::Insider("28xxx".to_string()),
            at(1_000),
        );
        state.finalize(at(1_500));

        store.persist(&state).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);

        // A second persist of unchanged state is a fixed point.
        store.persist(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracked_releases.json");
        LedgerStore::new(&path).persist(&LedgerState::default()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["tracked_releases.json".to_string()]);
    }

    #[test]
    fn test_persist_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("tracked_releases.json");
        LedgerStore::new(&path).persist(&LedgerState::default()).unwrap();
        assert!(path.exists());
    }
}
