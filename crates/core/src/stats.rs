// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local runtime stats and the per-file apply tally.

use chrono::{DateTime, Utc};

/// Tally produced by the applier for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub added: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SyncResult {
    pub fn total_applied(&self) -> u64 {
        self.added + self.updated + self.deleted
    }
}

/// In-memory, process-local stats. Destroyed on process exit.
#[derive(Debug, Clone)]
pub struct RuntimeStats {
    pub start_time: DateTime<Utc>,
    pub records_applied: u64,
    pub error_count: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_ok: bool,
}

impl RuntimeStats {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            records_applied: 0,
            error_count: 0,
            last_cycle_at: None,
            last_cycle_ok: true,
        }
    }

    pub fn record_cycle(&mut self, at: DateTime<Utc>, result: &SyncResult, ok: bool) {
        self.records_applied += result.total_applied();
        if !ok {
            self.error_count += 1;
        }
        self.last_cycle_at = Some(at);
        self.last_cycle_ok = ok;
    }
}
