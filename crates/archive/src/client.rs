// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive client: a pure view over the remote change-file archive. Holds no
//! cursor — the daemon's State Store owns `since`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use datasync_core::ChangeFile;
use datasync_core::ChangeRecord;

use crate::error::ArchiveError;

#[async_trait]
pub trait ArchiveClient: Send + Sync {
    /// Open the SSH/SFTP session. Idempotent: calling `connect` while already
    /// connected is a no-op.
    async fn connect(&mut self) -> Result<(), ArchiveError>;

    /// Files whose `mtime > since`, ordered by `(mtime, name)` ascending —
    /// the sole cross-file apply-order signal.
    async fn discover(&mut self, since: DateTime<Utc>) -> Result<Vec<ChangeFile>, ArchiveError>;

    /// Read and parse one file into its ordered records. Empty lines are
    /// dropped; the first malformed or invariant-violating line fails the
    /// whole file.
    async fn fetch(&mut self, file: &ChangeFile) -> Result<Vec<ChangeRecord>, ArchiveError>;

    /// Release the SSH/SFTP session. Safe to call when not connected.
    async fn close(&mut self);
}
