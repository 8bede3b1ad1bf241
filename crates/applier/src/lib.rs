// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! datasync-applier: translates whitelisted [`ChangeRecord`]s into
//! parameterized SQL and applies them transactionally, one file at a time.

pub mod error;
mod sql_value;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use datasync_core::{is_safe_identifier, quote_identifier, ChangeOp, ChangeRecord};
use datasync_db::PkCatalog;
use datasync_storage::TableDelta;
use deadpool_postgres::Pool;
use tokio_util::sync::CancellationToken;

pub use error::ApplyError;
use sql_value::Param;

/// Per-table and per-file tally.
pub use datasync_core::SyncResult;

/// A successfully committed file's outcome: overall counters plus the
/// per-table deltas and LSNs the caller must checkpoint into the State
/// Store.
#[derive(Debug, Clone, Default)]
pub struct FileApplyResult {
    pub result: SyncResult,
    /// `table -> (last_lsn seen for that table in this file, delta)`.
    pub table_deltas: BTreeMap<String, (String, TableDelta)>,
    /// The highest LSN seen across all records in the file, regardless of
    /// table — the candidate for `State::global_lsn`.
    pub last_lsn: Option<String>,
}

pub struct Applier {
    pool: Pool,
    pk_catalog: Arc<PkCatalog>,
}

impl Applier {
    pub fn new(pool: Pool, pk_catalog: Arc<PkCatalog>) -> Self {
        Self { pool, pk_catalog }
    }

    /// Apply every record in `records` inside one transaction. Whitelist
    /// misses are skipped (not errors). Any other failure — unsafe
    /// identifier, missing primary key, or a SQL error — rolls back the
    /// whole transaction and returns `Err`; the caller must not advance the
    /// cursor past this file.
    ///
    /// `cancel` is checked between records (never mid-statement): once the
    /// current statement finishes, a cancelled token drops the transaction
    /// uncommitted and returns `ApplyError::Cancelled` instead of starting
    /// the next one.
    pub async fn apply_file(
        &self,
        records: &[ChangeRecord],
        whitelist: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<FileApplyResult, ApplyError> {
        let mut conn = self.pool.get().await.map_err(datasync_db::DbError::from)?;
        let txn = conn.transaction().await?;

        let mut outcome = FileApplyResult::default();

        for record in records {
            if cancel.is_cancelled() {
                return Err(ApplyError::Cancelled);
            }

            if !whitelist.contains(&record.table) {
                outcome.result.skipped += 1;
                continue;
            }

            if !is_safe_identifier(&record.table) {
                return Err(ApplyError::UnsafeIdentifier(record.table.clone(), record.table.clone()));
            }

            match record.op {
                ChangeOp::Insert | ChangeOp::Update => {
                    self.apply_upsert(&txn, record).await?;
                }
                ChangeOp::Delete => {
                    self.apply_delete(&txn, record).await?;
                }
            }

            let delta = match record.op {
                ChangeOp::Insert => TableDelta { added: 1, ..Default::default() },
                ChangeOp::Update => TableDelta { updated: 1, ..Default::default() },
                ChangeOp::Delete => TableDelta { deleted: 1, ..Default::default() },
            };
            match record.op {
                ChangeOp::Insert => outcome.result.added += 1,
                ChangeOp::Update => outcome.result.updated += 1,
                ChangeOp::Delete => outcome.result.deleted += 1,
            }

            let entry = outcome
                .table_deltas
                .entry(record.table.clone())
                .or_insert_with(|| (record.lsn.clone(), TableDelta::default()));
            entry.0 = record.lsn.clone();
            entry.1.added += delta.added;
            entry.1.updated += delta.updated;
            entry.1.deleted += delta.deleted;

            outcome.last_lsn = Some(match outcome.last_lsn.take() {
                Some(prev) if prev >= record.lsn => prev,
                _ => record.lsn.clone(),
            });
        }

        txn.commit().await?;
        Ok(outcome)
    }

    async fn apply_upsert(
        &self,
        txn: &tokio_postgres::Transaction<'_>,
        record: &ChangeRecord,
    ) -> Result<(), ApplyError> {
        let data = record.data.as_ref().ok_or_else(|| ApplyError::MissingData(record.table.clone()))?;

        for col in data.keys() {
            if !is_safe_identifier(col) {
                return Err(ApplyError::UnsafeIdentifier(record.table.clone(), col.clone()));
            }
        }

        let pk_cols = self.pk_catalog.pk_columns(&record.table).await?;

        let columns: Vec<&String> = data.keys().collect();
        let quoted_table = quote_identifier(&record.table);
        let quoted_cols: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let placeholders: Vec<String> =
            (1..=columns.len()).map(|i| format!("${i}")).collect();
        let quoted_pk: Vec<String> = pk_cols.iter().map(|c| quote_identifier(c)).collect();
        let set_clause: Vec<String> = columns
            .iter()
            .filter(|c| !pk_cols.contains(c))
            .map(|c| {
                let q = quote_identifier(c);
                format!("{q} = EXCLUDED.{q}")
            })
            .collect();

        let sql = if set_clause.is_empty() {
            format!(
                "INSERT INTO {quoted_table} ({}) VALUES ({}) ON CONFLICT ({}) DO NOTHING",
                quoted_cols.join(", "),
                placeholders.join(", "),
                quoted_pk.join(", "),
            )
        } else {
            format!(
                "INSERT INTO {quoted_table} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
                quoted_cols.join(", "),
                placeholders.join(", "),
                quoted_pk.join(", "),
                set_clause.join(", "),
            )
        };

        let params: Vec<Param<'_>> = columns.iter().map(|c| Param(&data[*c])).collect();
        let params_refs: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn tokio_postgres::types::ToSql + Sync)).collect();

        txn.execute(&sql, &params_refs).await?;
        Ok(())
    }

    async fn apply_delete(
        &self,
        txn: &tokio_postgres::Transaction<'_>,
        record: &ChangeRecord,
    ) -> Result<(), ApplyError> {
        let old_keys =
            record.old_keys.as_ref().ok_or_else(|| ApplyError::MissingOldKeys(record.table.clone()))?;

        let pk_cols = self.pk_catalog.pk_columns(&record.table).await?;
        for col in &pk_cols {
            if !old_keys.contains_key(col) {
                return Err(ApplyError::MissingPkInOldKeys {
                    table: record.table.clone(),
                    column: col.clone(),
                });
            }
        }

        let quoted_table = quote_identifier(&record.table);
        let where_clause: Vec<String> = pk_cols
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", quote_identifier(c), i + 1))
            .collect();
        let sql = format!("DELETE FROM {quoted_table} WHERE {}", where_clause.join(" AND "));

        let params: Vec<Param<'_>> = pk_cols.iter().map(|c| Param(&old_keys[c])).collect();
        let params_refs: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn tokio_postgres::types::ToSql + Sync)).collect();

        txn.execute(&sql, &params_refs).await?;
        Ok(())
    }
}
