// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use datasync_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("database error: {0}")]
    Db(#[from] DbError),
}
