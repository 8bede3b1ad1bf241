// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state store: a single-writer durable cursor document, protected by an
//! exclusive lock covering every read and write, persisted atomically
//! (serialize, write to a sibling temp file, rename over the target).
//!
//! Write-then-rename in the same directory so a crash never leaves a torn
//! file, applied here to a single JSON document rather than a WAL-backed
//! snapshot — the table synchronizer has no event log to replay on top of
//! it.

use chrono::{DateTime, Utc};
use datasync_core::{State, TableState, STATE_VERSION};
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("failed to read state file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse state file {0}: {1}")]
    Parse(PathBuf, serde_json::Error),
    #[error("failed to write temp state file {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to persist state to {0}: {1}")]
    Rename(PathBuf, std::io::Error),
}

/// A delta to apply to one table's counters in a single
/// `update_table_state` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDelta {
    pub added: i64,
    pub updated: i64,
    pub deleted: i64,
}

impl TableDelta {
    pub fn total(&self) -> i64 {
        self.added + self.updated + self.deleted
    }
}

/// Owns the state document and the path it's persisted to. Every public
/// method takes the lock, mutates, persists, and returns — so a crash loses
/// at most the not-yet-returned update.
pub struct StateStore {
    path: PathBuf,
    state: Mutex<State>,
}

impl StateStore {
    /// Load the document at `path`. Absence of the file is not an error: it
    /// initializes to the empty v1 document.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateStoreError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| StateStoreError::Parse(path.clone(), e))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => return Err(StateStoreError::Read(path.clone(), e)),
        };
        Ok(Self { path, state: Mutex::new(state) })
    }

    /// A consistent point-in-time copy, for status reporting from a second
    /// process or for the metrics aggregator's own bookkeeping.
    pub fn snapshot(&self) -> State {
        self.state.lock().clone()
    }

    /// Checkpoint `last_file`/`last_file_time` and stamp `last_sync_cycle`.
    /// Called only after a file's transaction has committed.
    pub fn set_last_file(
        &self,
        name: &str,
        mtime: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), StateStoreError> {
        let mut state = self.state.lock();
        state.last_file = name.to_string();
        state.last_file_time = Some(mtime);
        state.last_sync_cycle = Some(now);
        self.persist_locked(&state)
    }

    /// Adjust one table's LSN/count and the global `total_synced`.
    pub fn update_table_state(
        &self,
        table: &str,
        lsn: &str,
        delta: TableDelta,
        now: DateTime<Utc>,
    ) -> Result<(), StateStoreError> {
        let mut state = self.state.lock();
        let entry = state.tables.entry(table.to_string()).or_default();
        entry.last_lsn = lsn.to_string();
        entry.last_synced_at = Some(now);
        entry.record_count += delta.total();
        state.total_synced += delta.total();
        self.persist_locked(&state)
    }

    /// Set the global high-water LSN. Distinct from per-table updates
    /// because a file can touch several tables before the cursor as a whole
    /// advances.
    pub fn set_global_lsn(&self, lsn: &str) -> Result<(), StateStoreError> {
        let mut state = self.state.lock();
        state.global_lsn = lsn.to_string();
        self.persist_locked(&state)
    }

    /// Full reset: restores the empty document.
    pub fn reset(&self) -> Result<(), StateStoreError> {
        let mut state = self.state.lock();
        *state = State::default();
        self.persist_locked(&state)
    }

    /// Per-table reset: removes one table's cursor entry. Does not touch `last_file`/`global_lsn` — those
    /// are cross-table cursors and a per-table resync only invalidates that
    /// table's own progress.
    pub fn reset_table(&self, table: &str) -> Result<(), StateStoreError> {
        let mut state = self.state.lock();
        state.tables.remove(table);
        let sum: i64 = state.tables.values().map(|t| t.record_count).sum();
        state.total_synced = sum;
        self.persist_locked(&state)
    }

    fn persist_locked(&self, state: &State) -> Result<(), StateStoreError> {
        debug_assert_eq!(state.version, STATE_VERSION);
        persist_atomic(&self.path, state)
    }
}

/// Serialize `state` as indented JSON, write to a sibling `.tmp` file in the
/// same directory, fsync it, then rename over `path`. The rename is atomic
/// on any POSIX filesystem, so a crash between these steps leaves either the
/// prior file or the fully-written new one, never a truncated one.
fn persist_atomic(path: &Path, state: &State) -> Result<(), StateStoreError> {
    let json = serde_json::to_vec_pretty(state)
        .map_err(|e| StateStoreError::Write(path.to_path_buf(), e.into()))?;

    let tmp_path = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StateStoreError::Write(path.to_path_buf(), e))?;
    }
    let mut tmp = fs::File::create(&tmp_path)
        .map_err(|e| StateStoreError::Write(tmp_path.clone(), e))?;
    tmp.write_all(&json).map_err(|e| StateStoreError::Write(tmp_path.clone(), e))?;
    tmp.sync_all().map_err(|e| StateStoreError::Write(tmp_path.clone(), e))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| StateStoreError::Rename(path.to_path_buf(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasync_core::State;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn missing_file_initializes_empty_v1() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();
        let s = store.snapshot();
        assert_eq!(s.version, STATE_VERSION);
        assert!(s.last_file.is_empty());
    }

    #[test]
    fn set_last_file_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = StateStore::load(&path).unwrap();
        store.set_last_file("001.json", now(), now()).unwrap();

        let reloaded = StateStore::load(&path).unwrap();
        let s = reloaded.snapshot();
        assert_eq!(s.last_file, "001.json");
        assert_eq!(s.last_file_time, Some(now()));
        assert_eq!(s.last_sync_cycle, Some(now()));
    }

    #[test]
    fn update_table_state_accumulates_total_synced() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();

        store
            .update_table_state("users", "0/100", TableDelta { added: 1, ..Default::default() }, now())
            .unwrap();
        store
            .update_table_state(
                "users",
                "0/200",
                TableDelta { updated: 1, deleted: 1, ..Default::default() },
                now(),
            )
            .unwrap();

        let s = store.snapshot();
        assert_eq!(s.tables["users"].last_lsn, "0/200");
        assert_eq!(s.tables["users"].record_count, 3);
        assert_eq!(s.total_synced, 3);
        s.check_invariants().unwrap();
    }

    #[test]
    fn reset_restores_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();
        store.set_last_file("001.json", now(), now()).unwrap();
        store.reset().unwrap();

        let s = store.snapshot();
        assert_eq!(s, State::default());
    }

    #[test]
    fn reset_table_removes_single_entry_and_recomputes_total() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();
        store
            .update_table_state("users", "0/1", TableDelta { added: 2, ..Default::default() }, now())
            .unwrap();
        store
            .update_table_state("orders", "0/1", TableDelta { added: 5, ..Default::default() }, now())
            .unwrap();

        store.reset_table("users").unwrap();

        let s = store.snapshot();
        assert!(!s.tables.contains_key("users"));
        assert_eq!(s.total_synced, 5);
    }

    #[test]
    fn global_lsn_is_independent_of_table_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();
        store.set_global_lsn("0/500").unwrap();
        assert_eq!(store.snapshot().global_lsn, "0/500");
    }
}
