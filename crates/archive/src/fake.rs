// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FakeArchiveClient`: an in-memory [`ArchiveClient`] for daemon/applier
//! tests, gated behind the `test-support` feature.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use datasync_core::{ChangeFile, ChangeRecord};
use parking_lot::Mutex;

use crate::client::ArchiveClient;
use crate::error::ArchiveError;
use crate::parse::parse_change_file;

#[derive(Debug, Clone)]
struct FakeFile {
    meta: ChangeFile,
    raw_contents: String,
}

/// Shared, clonable in-memory archive. Populate with [`FakeArchiveClient::push_file`]
/// before handing clones to a daemon under test.
#[derive(Clone, Default)]
pub struct FakeArchiveClient {
    files: Arc<Mutex<BTreeMap<String, FakeFile>>>,
    connected: Arc<Mutex<bool>>,
}

impl FakeArchiveClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file's raw line-delimited-JSON contents.
    pub fn push_file(&self, meta: ChangeFile, raw_contents: impl Into<String>) {
        self.files
            .lock()
            .insert(meta.name.clone(), FakeFile { meta, raw_contents: raw_contents.into() });
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.lock()
    }
}

#[async_trait]
impl ArchiveClient for FakeArchiveClient {
    async fn connect(&mut self) -> Result<(), ArchiveError> {
        *self.connected.lock() = true;
        Ok(())
    }

    async fn discover(&mut self, since: DateTime<Utc>) -> Result<Vec<ChangeFile>, ArchiveError> {
        if !*self.connected.lock() {
            return Err(ArchiveError::NotConnected);
        }
        let mut files: Vec<ChangeFile> =
            self.files.lock().values().map(|f| f.meta.clone()).filter(|f| f.mtime > since).collect();
        files.sort();
        Ok(files)
    }

    async fn fetch(&mut self, file: &ChangeFile) -> Result<Vec<ChangeRecord>, ArchiveError> {
        if !*self.connected.lock() {
            return Err(ArchiveError::NotConnected);
        }
        let contents = self
            .files
            .lock()
            .get(&file.name)
            .map(|f| f.raw_contents.clone())
            .ok_or_else(|| ArchiveError::Read(file.path.clone(), std::io::Error::other("no such fake file")))?;
        parse_change_file(&file.name, &contents)
    }

    async fn close(&mut self) {
        *self.connected.lock() = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn discover_filters_by_since_and_sorts() {
        let client = FakeArchiveClient::new();
        client.push_file(
            ChangeFile { name: "002.json".into(), path: "/a/002.json".into(), size: 1, mtime: ts("2026-01-02T00:00:00Z") },
            "",
        );
        client.push_file(
            ChangeFile { name: "001.json".into(), path: "/a/001.json".into(), size: 1, mtime: ts("2026-01-01T00:00:00Z") },
            "",
        );
        let mut client = client;
        client.connect().await.unwrap();
        let files = client.discover(ts("2026-01-01T00:00:00Z")).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "002.json");
    }

    #[tokio::test]
    async fn fetch_parses_pushed_contents() {
        let client = FakeArchiveClient::new();
        let meta = ChangeFile { name: "001.json".into(), path: "/a/001.json".into(), size: 1, mtime: ts("2026-01-01T00:00:00Z") };
        client.push_file(
            meta.clone(),
            r#"{"table":"users","op":"INSERT","data":{"id":1},"lsn":"0/1","ts":"2026-01-01T00:00:00Z"}"#,
        );
        let mut client = client;
        client.connect().await.unwrap();
        let recs = client.fetch(&meta).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].table, "users");
    }

    #[tokio::test]
    async fn operations_fail_before_connect() {
        let mut client = FakeArchiveClient::new();
        let err = client.discover(ts("2026-01-01T00:00:00Z")).await.unwrap_err();
        assert!(matches!(err, ArchiveError::NotConnected));
    }
}
