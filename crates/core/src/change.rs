// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change records and change files parsed from the remote archive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kind of DML operation a [`ChangeRecord`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeOp::Insert => "INSERT",
            ChangeOp::Update => "UPDATE",
            ChangeOp::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// A single heterogeneously-typed scalar carried in `data`/`old_keys`.
///
/// Bound directly through the Postgres driver's parameter facility at apply
/// time rather than being converted through an intermediate string
/// representation, matching the tagged-dynamic-value shape change records
/// carry. An RFC 3339 string alone is ambiguous against a plain `Text`
/// column, so a producer-emitted timestamp is distinguished by trying an
/// RFC 3339 parse before falling back to `Text` (see `Deserialize` below).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl ChangeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ChangeValue::Null)
    }
}

/// One parsed line from an archive change file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub table: String,
    pub op: ChangeOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, ChangeValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_keys: Option<BTreeMap<String, ChangeValue>>,
    pub lsn: String,
    pub ts: DateTime<Utc>,
}

/// Errors describing a record that violates the data-model's shape
/// invariants, before it ever reaches the applier's identifier-safety check.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChangeRecordError {
    #[error("INSERT record for table {0:?} is missing `data`")]
    InsertMissingData(String),
    #[error("DELETE record for table {0:?} is missing `old_keys`")]
    DeleteMissingOldKeys(String),
    #[error("record for table {0:?} has an empty lsn")]
    EmptyLsn(String),
}

impl ChangeRecord {
    /// Validate the INSERT-has-data / DELETE-has-old_keys / non-empty-lsn
    /// invariants. Does not validate identifier safety — that is the
    /// applier's responsibility, since it governs whether a record fails
    /// vs. is just malformed at parse time.
    pub fn validate(&self) -> Result<(), ChangeRecordError> {
        if self.lsn.is_empty() {
            return Err(ChangeRecordError::EmptyLsn(self.table.clone()));
        }
        match self.op {
            ChangeOp::Insert if self.data.is_none() => {
                return Err(ChangeRecordError::InsertMissingData(self.table.clone()));
            }
            ChangeOp::Delete if self.old_keys.is_none() => {
                return Err(ChangeRecordError::DeleteMissingOldKeys(self.table.clone()));
            }
            _ => {}
        }
        Ok(())
    }
}

/// One archive artifact: a file of ordered change records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub mtime: DateTime<Utc>,
}

impl PartialOrd for ChangeFile {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangeFile {
    /// Files sort by `(mtime, name)` — the sole cross-file ordering signal
    /// relied on elsewhere.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.mtime.cmp(&other.mtime).then_with(|| self.name.cmp(&other.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn insert_requires_data() {
        let rec = ChangeRecord {
            table: "users".into(),
            op: ChangeOp::Insert,
            data: None,
            old_keys: None,
            lsn: "0/1".into(),
            ts: ts(),
        };
        assert_eq!(
            rec.validate(),
            Err(ChangeRecordError::InsertMissingData("users".into()))
        );
    }

    #[test]
    fn delete_requires_old_keys() {
        let rec = ChangeRecord {
            table: "users".into(),
            op: ChangeOp::Delete,
            data: None,
            old_keys: None,
            lsn: "0/1".into(),
            ts: ts(),
        };
        assert_eq!(
            rec.validate(),
            Err(ChangeRecordError::DeleteMissingOldKeys("users".into()))
        );
    }

    #[test]
    fn empty_lsn_rejected() {
        let rec = ChangeRecord {
            table: "users".into(),
            op: ChangeOp::Update,
            data: Some(BTreeMap::new()),
            old_keys: Some(BTreeMap::new()),
            lsn: String::new(),
            ts: ts(),
        };
        assert_eq!(rec.validate(), Err(ChangeRecordError::EmptyLsn("users".into())));
    }

    #[test]
    fn files_order_by_mtime_then_name() {
        let mut files = vec![
            ChangeFile { name: "b.json".into(), path: "/a/b.json".into(), size: 1, mtime: ts() },
            ChangeFile {
                name: "a.json".into(),
                path: "/a/a.json".into(),
                size: 1,
                mtime: ts(),
            },
            ChangeFile {
                name: "c.json".into(),
                path: "/a/c.json".into(),
                size: 1,
                mtime: ts() + chrono::Duration::seconds(1),
            },
        ];
        files.sort();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
    }
}
