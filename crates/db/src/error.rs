// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the Postgres-backed whitelist, event log, and metrics
//! stores.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to build connection pool: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),
    #[error("failed to obtain a pooled connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("table {0:?} has no primary key")]
    NoPrimaryKey(String),
    #[error("table {0:?} is not whitelisted")]
    NotWhitelisted(String),
    #[error("unsafe identifier: {0:?}")]
    UnsafeIdentifier(String),
    #[error("timed out waiting for database connection")]
    StartupPingTimeout,
    #[error("invalid postgres connection string: {0}")]
    InvalidConnectionString(#[source] tokio_postgres::Error),
}
