// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primary-key column cache. The applier needs a table's PK columns to build
//! `ON CONFLICT` upserts; looking them up per-record would mean one extra
//! catalog round trip per change. Instead the mapping is resolved once per
//! table and kept for the life of the process.

use datasync_core::is_safe_identifier;
use deadpool_postgres::Pool;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::DbError;

const PK_QUERY: &str = r#"
SELECT a.attname
FROM pg_index i
JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
WHERE i.indrelid = $1::regclass AND i.indisprimary
ORDER BY array_position(i.indkey, a.attnum)
"#;

/// Process-lifetime cache of `table_name -> primary key columns`.
pub struct PkCatalog {
    pool: Pool,
    cache: Mutex<HashMap<String, Vec<String>>>,
}

impl PkCatalog {
    pub fn new(pool: Pool) -> Self {
        Self { pool, cache: Mutex::new(HashMap::new()) }
    }

    /// Return the primary-key columns for `table`, querying the catalog on
    /// first encounter and serving from cache afterward. Errors with
    /// `DbError::NoPrimaryKey` if the table has no primary key, and with
    /// `DbError::UnsafeIdentifier` before the name ever reaches a query as
    /// an identifier cast target.
    pub async fn pk_columns(&self, table: &str) -> Result<Vec<String>, DbError> {
        if let Some(cached) = self.cache.lock().get(table).cloned() {
            return Ok(cached);
        }
        if !is_safe_identifier(table) {
            return Err(DbError::UnsafeIdentifier(table.to_string()));
        }
        let conn = self.pool.get().await?;
        let rows = conn.query(PK_QUERY, &[&table]).await?;
        let cols: Vec<String> = rows.iter().map(|r| r.get(0)).collect();
        if cols.is_empty() {
            return Err(DbError::NoPrimaryKey(table.to_string()));
        }
        self.cache.lock().insert(table.to_string(), cols.clone());
        Ok(cols)
    }

    /// Drop a cached entry, forcing the next lookup to re-query the catalog.
    /// Used when a table is removed from the whitelist and later re-added
    /// under a changed schema.
    pub fn invalidate(&self, table: &str) {
        self.cache.lock().remove(table);
    }
}
