// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use datasync_core::change::ChangeRecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("ssh connect failed: {0}")]
    Connect(#[source] russh::Error),
    #[error("ssh authentication rejected for user {0:?}")]
    AuthRejected(String),
    #[error("sftp channel open failed: {0}")]
    Channel(#[source] russh::Error),
    #[error("sftp session init failed: {0}")]
    Sftp(#[source] russh_sftp::client::error::Error),
    #[error("directory listing failed for {0:?}: {1}")]
    Readdir(String, #[source] russh_sftp::client::error::Error),
    #[error("file read failed for {0:?}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("malformed change record in {file:?} at line {line}: {source}")]
    MalformedRecord { file: String, line: usize, source: serde_json::Error },
    #[error("invalid change record in {file:?} at line {line}: {source}")]
    InvalidRecord { file: String, line: usize, source: ChangeRecordError },
    #[error("not connected")]
    NotConnected,
}
