//! Change tracking for incremental runs.
//!
//! Persists a mapping from input-file path to a content fingerprint and
//! last-processed timestamp, and decides which candidate files still need
//! processing. Modification times are deliberately not a change signal:
//! only the SHA-256 of the full byte content counts, so rewriting a file
//! with identical bytes (fresh mtime) stays "unchanged".
//!
//! State is an explicit value passed into core entry points, loaded once
//! per run and saved after each committed batch.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Tracking record for one processed input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Input file path as discovered.
    pub path: String,
    /// Hex-encoded SHA-256 of the file's full byte content.
    pub fingerprint: String,
    /// When the file's extraction results were last committed.
    pub last_processed: DateTime<Utc>,
}

/// Persisted run state: all file records plus the last-run timestamp.
///
/// `BTreeMap` keeps the serialized form stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub processed: BTreeMap<String, FileRecord>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

/// Hex-encoded SHA-256 over the full byte content of a file.
pub fn fingerprint(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

impl RunState {
    /// Load state from `path`, or return the empty state when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let state = serde_json::from_str(&text)?;
        Ok(state)
    }

    /// Save state as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Whether a file needs processing: true when it has no record or its
    /// current fingerprint differs from the stored one. A file that cannot
    /// be read counts as changed (fail open) so it is retried next run
    /// rather than silently skipped forever.
    pub fn has_changed(&self, path: &Path) -> bool {
        let key = path.to_string_lossy();
        let Some(record) = self.processed.get(key.as_ref()) else {
            return true;
        };
        match fingerprint(path) {
            Ok(current) => current != record.fingerprint,
            Err(e) => {
                warn!(file = %key, error = %e, "could not fingerprint file, treating as changed");
                true
            }
        }
    }

    /// Return exactly the files that are unprocessed or modified,
    /// preserving input order.
    pub fn filter_unprocessed<'a>(&self, candidates: &'a [std::path::PathBuf]) -> Vec<&'a Path> {
        let selected: Vec<&Path> = candidates
            .iter()
            .map(|p| p.as_path())
            .filter(|p| self.has_changed(p))
            .collect();
        debug!(
            file_count = candidates.len(),
            selected = selected.len(),
            "change filter applied"
        );
        selected
    }

    /// Upsert a file record with the current content fingerprint and a
    /// fresh timestamp. Call this only after the file's notes have been
    /// durably written; marking earlier risks silent data loss on crash.
    pub fn mark_processed(&mut self, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().into_owned();
        let record = FileRecord {
            path: key.clone(),
            fingerprint: fingerprint(path)?,
            last_processed: Utc::now(),
        };
        self.processed.insert(key, record);
        Ok(())
    }

    /// Stamp the end of a successful run.
    pub fn finish_run(&mut self) {
        self.last_run = Some(Utc::now());
    }

    /// Number of tracked files.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Discard all records unconditionally.
    pub fn reset(&mut self) {
        self.processed.clear();
        self.last_run = None;
    }
}

/// Remove the state file, if any. The next run reprocesses every file.
pub fn reset_state_file(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
