// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event log: one row per processed file.

use chrono::{DateTime, Utc};
use datasync_core::EventStatus;
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Clone)]
pub struct EventLog {
    pool: Pool,
}

impl EventLog {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        &self,
        table_name: &str,
        status: EventStatus,
        rows_synced: i32,
        archive_ref: Option<&str>,
        error_detail: Option<&str>,
    ) -> Result<Uuid, DbError> {
        let id = Uuid::new_v4();
        let conn = self.pool.get().await?;
        conn.execute(
            "INSERT INTO data_sync_logs (id, table_name, status, rows_synced, archive_ref, error_detail) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[&id, &table_name, &status.to_string(), &rows_synced, &archive_ref, &error_detail],
        )
        .await?;
        Ok(id)
    }

    /// Count FAILED rows recorded since `since` — used by status reporting.
    pub async fn failed_count_since(&self, since: DateTime<Utc>) -> Result<i64, DbError> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "SELECT count(*) FROM data_sync_logs WHERE status = 'FAILED' AND sync_time >= $1",
                &[&since],
            )
            .await?;
        Ok(row.get(0))
    }

    /// Added/updated/deleted counts grouped by table within `[start, end)`,
    /// read by the metrics aggregator. The event log only
    /// records a row-count per file, not a per-op breakdown, so the
    /// aggregator treats every SUCCESS row's `rows_synced` as `records_added`
    /// for the bucket — see DESIGN.md for why a richer per-op event-log
    /// schema was not introduced.
    pub async fn rows_synced_by_table(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, DbError> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT table_name, COALESCE(sum(rows_synced), 0) FROM data_sync_logs \
                 WHERE status = 'SUCCESS' AND sync_time >= $1 AND sync_time < $2 \
                 GROUP BY table_name",
                &[&start, &end],
            )
            .await?;
        Ok(rows.iter().map(|r| (r.get(0), r.get(1))).collect())
    }
}
