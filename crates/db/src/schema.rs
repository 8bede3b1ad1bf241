// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent schema creation for the whitelist, event-log, and metrics
//! tables.

use deadpool_postgres::Pool;

use crate::error::DbError;

const CREATE_WHITELIST: &str = r#"
CREATE TABLE IF NOT EXISTS tables_to_sync (
    id serial PRIMARY KEY,
    table_name text UNIQUE NOT NULL,
    creator text,
    created_at timestamptz NOT NULL DEFAULT now()
)
"#;

const CREATE_EVENT_LOG: &str = r#"
CREATE TABLE IF NOT EXISTS data_sync_logs (
    id uuid PRIMARY KEY,
    table_name text NOT NULL,
    status text NOT NULL,
    rows_synced int NOT NULL,
    archive_ref text,
    error_detail text,
    sync_time timestamptz NOT NULL DEFAULT now()
)
"#;

const CREATE_EVENT_LOG_TABLE_TIME_IDX: &str =
    "CREATE INDEX IF NOT EXISTS data_sync_logs_table_time_idx ON data_sync_logs (table_name, sync_time)";
const CREATE_EVENT_LOG_STATUS_IDX: &str =
    "CREATE INDEX IF NOT EXISTS data_sync_logs_status_idx ON data_sync_logs (status)";

const CREATE_METRICS: &str = r#"
CREATE TABLE IF NOT EXISTS data_sync_metrics (
    id serial PRIMARY KEY,
    table_name text NOT NULL,
    period_start timestamptz NOT NULL,
    period_end timestamptz NOT NULL,
    period_type text NOT NULL,
    records_added bigint NOT NULL DEFAULT 0,
    records_updated bigint NOT NULL DEFAULT 0,
    records_deleted bigint NOT NULL DEFAULT 0,
    UNIQUE (table_name, period_start, period_type)
)
"#;

const CREATE_METRICS_IDX: &str =
    "CREATE INDEX IF NOT EXISTS data_sync_metrics_table_period_idx ON data_sync_metrics (table_name, period_start)";

/// Idempotently create the whitelist, event-log, and metrics tables if
/// absent.
pub async fn ensure_schema(pool: &Pool) -> Result<(), DbError> {
    let conn = pool.get().await?;
    for stmt in [
        CREATE_WHITELIST,
        CREATE_EVENT_LOG,
        CREATE_EVENT_LOG_TABLE_TIME_IDX,
        CREATE_EVENT_LOG_STATUS_IDX,
        CREATE_METRICS,
        CREATE_METRICS_IDX,
    ] {
        conn.batch_execute(stmt).await?;
    }
    Ok(())
}
