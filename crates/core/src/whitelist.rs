// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whitelist entry — the unit of the table-sync allowlist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `(id, table_name unique, creator?, created_at)`, created by admin action,
/// deleted by admin action, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub id: i32,
    pub table_name: String,
    pub creator: Option<String>,
    pub created_at: DateTime<Utc>,
}
