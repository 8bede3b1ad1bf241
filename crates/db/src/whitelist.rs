// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whitelist store: persist and query the set of tables eligible for sync.

use datasync_core::{quote_identifier, is_safe_identifier, WhitelistEntry};
use deadpool_postgres::Pool;

use crate::error::DbError;

#[derive(Clone)]
pub struct WhitelistStore {
    pool: Pool,
}

impl WhitelistStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Insert each non-empty name; duplicates are silently skipped, not
    /// errors. Returns the subset actually attempted (empty strings
    /// stripped), not the subset that was newly inserted.
    pub async fn add_tables(
        &self,
        names: &[String],
        creator: Option<&str>,
    ) -> Result<Vec<String>, DbError> {
        let attempted: Vec<String> =
            names.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        let conn = self.pool.get().await?;
        for name in &attempted {
            conn.execute(
                "INSERT INTO tables_to_sync (table_name, creator) VALUES ($1, $2) \
                 ON CONFLICT (table_name) DO NOTHING",
                &[name, &creator],
            )
            .await?;
        }
        Ok(attempted)
    }

    /// Delete rows; returns only names whose delete affected >= 1 row.
    pub async fn remove_tables(&self, names: &[String]) -> Result<Vec<String>, DbError> {
        let conn = self.pool.get().await?;
        let mut removed = Vec::new();
        for name in names {
            let rows = conn
                .execute("DELETE FROM tables_to_sync WHERE table_name = $1", &[name])
                .await?;
            if rows >= 1 {
                removed.push(name.clone());
            }
        }
        Ok(removed)
    }

    /// Whitelist ordered by `table_name` ascending.
    pub async fn list_tables(&self) -> Result<Vec<WhitelistEntry>, DbError> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT id, table_name, creator, created_at FROM tables_to_sync ORDER BY table_name ASC",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| WhitelistEntry {
                id: r.get(0),
                table_name: r.get(1),
                creator: r.get(2),
                created_at: r.get(3),
            })
            .collect())
    }

    pub async fn contains(&self, table: &str) -> Result<bool, DbError> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt("SELECT 1 FROM tables_to_sync WHERE table_name = $1", &[&table])
            .await?;
        Ok(row.is_some())
    }

    /// Truncate `table`. Fails if `table` is not in the whitelist. The
    /// table name is used as a SQL identifier here, so it must pass the
    /// identifier-safety check and is quoted with internal quotes doubled —
    /// the only path where a whitelisted name reaches SQL as an identifier
    /// rather than a bound parameter.
    pub async fn clear_table(&self, table: &str) -> Result<(), DbError> {
        if !self.contains(table).await? {
            return Err(DbError::NotWhitelisted(table.to_string()));
        }
        if !is_safe_identifier(table) {
            return Err(DbError::UnsafeIdentifier(table.to_string()));
        }
        let conn = self.pool.get().await?;
        conn.batch_execute(&format!("TRUNCATE TABLE {}", quote_identifier(table))).await?;
        Ok(())
    }
}
