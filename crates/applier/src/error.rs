// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use datasync_db::DbError;
use thiserror::Error;

/// A whole file's transaction failed; no rows from it are visible and its
/// cursor is not advanced.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("unsafe identifier in record for table {0:?}: {1:?}")]
    UnsafeIdentifier(String, String),
    #[error("INSERT/UPDATE record for table {0:?} is missing `data`")]
    MissingData(String),
    #[error("DELETE record for table {0:?} is missing `old_keys`")]
    MissingOldKeys(String),
    #[error("record for table {table:?} is missing primary key column {column:?} in old_keys")]
    MissingPkInOldKeys { table: String, column: String },
    #[error("apply cancelled")]
    Cancelled,
}
