// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event log rows recorded per processed file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Success,
    Failed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventStatus::Success => "SUCCESS",
            EventStatus::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// `(id, table_name, status, rows_synced, archive_ref, error_detail, sync_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogRow {
    pub id: Uuid,
    pub table_name: String,
    pub status: EventStatus,
    pub rows_synced: i32,
    pub archive_ref: Option<String>,
    pub error_detail: Option<String>,
    pub sync_time: DateTime<Utc>,
}
