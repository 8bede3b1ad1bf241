// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics store: upsert per-window record counts.

use chrono::{DateTime, Utc};
use datasync_core::{MetricRow, PeriodType};
use deadpool_postgres::Pool;

use crate::error::DbError;

#[derive(Clone)]
pub struct MetricsStore {
    pool: Pool,
}

impl MetricsStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Upsert the added/updated/deleted counts for one table's bucket.
    /// Re-running the same bucket (e.g. after a crash mid-tick) replaces the
    /// previous counts rather than doubling them.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_bucket(
        &self,
        table_name: &str,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        period_type: PeriodType,
        added: i64,
        updated: i64,
        deleted: i64,
    ) -> Result<(), DbError> {
        let conn = self.pool.get().await?;
        conn.execute(
            "INSERT INTO data_sync_metrics \
                (table_name, period_start, period_end, period_type, records_added, records_updated, records_deleted) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (table_name, period_start, period_type) DO UPDATE SET \
                period_end = excluded.period_end, \
                records_added = excluded.records_added, \
                records_updated = excluded.records_updated, \
                records_deleted = excluded.records_deleted",
            &[
                &table_name,
                &period_start,
                &period_end,
                &period_type.to_string(),
                &added,
                &updated,
                &deleted,
            ],
        )
        .await?;
        Ok(())
    }

    /// All metric rows for `table_name`, most recent bucket first.
    pub async fn history(&self, table_name: &str) -> Result<Vec<MetricRow>, DbError> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT id, table_name, period_start, period_end, period_type, \
                        records_added, records_updated, records_deleted \
                 FROM data_sync_metrics WHERE table_name = $1 ORDER BY period_start DESC",
                &[&table_name],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| {
                let period_type: String = r.get(4);
                MetricRow {
                    id: r.get(0),
                    table_name: r.get(1),
                    period_start: r.get(2),
                    period_end: r.get(3),
                    period_type: period_type.parse().unwrap_or(PeriodType::Freq),
                    records_added: r.get(5),
                    records_updated: r.get(6),
                    records_deleted: r.get(7),
                }
            })
            .collect())
    }
}
