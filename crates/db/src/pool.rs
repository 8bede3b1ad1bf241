// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection pool setup, shared by the whitelist store, event log, metrics
//! store, and applier.

use datasync_core::Config;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::error::DbError;

/// 5-second ping timeout on startup.
pub const STARTUP_PING_TIMEOUT: Duration = Duration::from_secs(5);

pub fn build_pool(config: &Config) -> Result<Pool, DbError> {
    let pg_config: tokio_postgres::Config = config
        .pg_connection_string()
        .parse()
        .map_err(DbError::InvalidConnectionString)?;

    let manager_config = ManagerConfig { recycling_method: RecyclingMethod::Fast };
    let manager = Manager::from_config(pg_config, NoTls, manager_config);
    let pool = Pool::builder(manager).max_size(8).build()?;
    Ok(pool)
}

/// Open one connection and ping it, failing fast at startup if the database
/// is unreachable.
pub async fn ping(pool: &Pool) -> Result<(), DbError> {
    let conn = tokio::time::timeout(STARTUP_PING_TIMEOUT, pool.get())
        .await
        .map_err(|_| DbError::StartupPingTimeout)??;
    conn.query_one("SELECT 1", &[]).await?;
    Ok(())
}
