// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable cursor document persisted by the state store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current state schema version.
pub const STATE_VERSION: u32 = 1;

/// Per-table cursor: highest applied LSN, last sync timestamp, and the
/// running count of records applied to that table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    #[serde(default)]
    pub last_lsn: String,
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub record_count: i64,
}

/// The single durable document the state store owns.
///
/// Unknown fields are preserved opaquely where `serde_json::Value` would
/// otherwise lose them; this struct declares every field the cursor
/// document needs, so the only forward-compatibility lever needed is
/// `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    #[serde(default)]
    pub last_file: String,
    pub last_file_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub global_lsn: String,
    #[serde(default)]
    pub tables: BTreeMap<String, TableState>,
    #[serde(default)]
    pub total_synced: i64,
    pub last_sync_cycle: Option<DateTime<Utc>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_file: String::new(),
            last_file_time: None,
            global_lsn: String::new(),
            tables: BTreeMap::new(),
            total_synced: 0,
            last_sync_cycle: None,
        }
    }
}

impl State {
    /// Check the two cross-field invariants this document must hold:
    /// `tables[t].last_lsn <= global_lsn` for every `t` (lexicographic, since
    /// LSNs are opaque-but-orderable as used) and `total_synced` equal to the
    /// sum of per-table `record_count`. Used by tests and by the state store
    /// as a debug assertion after mutation, never on the hot path.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (table, ts) in &self.tables {
            if ts.last_lsn > self.global_lsn {
                return Err(format!(
                    "table {table:?} last_lsn {:?} exceeds global_lsn {:?}",
                    ts.last_lsn, self.global_lsn
                ));
            }
        }
        let sum: i64 = self.tables.values().map(|t| t.record_count).sum();
        if sum != self.total_synced {
            return Err(format!(
                "total_synced {} does not equal sum of per-table record_count {}",
                self.total_synced, sum
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty_v1() {
        let s = State::default();
        assert_eq!(s.version, STATE_VERSION);
        assert!(s.last_file.is_empty());
        assert!(s.last_file_time.is_none());
        assert!(s.tables.is_empty());
        assert_eq!(s.total_synced, 0);
        s.check_invariants().unwrap();
    }

    #[test]
    fn invariant_catches_lsn_above_global() {
        let mut s = State { global_lsn: "0/10".into(), ..State::default() };
        s.tables.insert(
            "users".into(),
            TableState { last_lsn: "0/20".into(), last_synced_at: None, record_count: 0 },
        );
        assert!(s.check_invariants().is_err());
    }

    #[test]
    fn invariant_catches_total_synced_mismatch() {
        let mut s = State { total_synced: 5, ..State::default() };
        s.tables.insert(
            "users".into(),
            TableState { last_lsn: String::new(), last_synced_at: None, record_count: 1 },
        );
        assert!(s.check_invariants().is_err());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut s = State { global_lsn: "0/100".into(), total_synced: 1, ..State::default() };
        s.tables.insert(
            "users".into(),
            TableState { last_lsn: "0/100".into(), last_synced_at: None, record_count: 1 },
        );
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(back.global_lsn, s.global_lsn);
        assert_eq!(back.tables["users"].record_count, 1);
    }
}
