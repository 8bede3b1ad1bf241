// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use datasync_applier::ApplyError;
use datasync_archive::ArchiveError;
use datasync_core::ConfigError;
use datasync_db::DbError;
use datasync_storage::StateStoreError;
use thiserror::Error;

use crate::pidfile::PidFileError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    PidFile(#[from] PidFileError),
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("state store error: {0}")]
    State(#[from] StateStoreError),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),
    #[error("table {0:?} is not on the whitelist")]
    NotWhitelisted(String),
    #[error("no running instance found at {0}")]
    NotRunning(std::path::PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("daemon is already running in this process")]
    AlreadyRunning,
}
