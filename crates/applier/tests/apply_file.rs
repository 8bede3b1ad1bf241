// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end apply scenarios against a real Postgres, gated on
//! `DATASYNC_TEST_PG_URL` since no database is available in this test
//! runner.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use datasync_applier::Applier;
use datasync_core::{ChangeOp, ChangeRecord, ChangeValue};
use datasync_db::PkCatalog;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_util::sync::CancellationToken;

fn test_pg_url() -> Option<String> {
    std::env::var("DATASYNC_TEST_PG_URL").ok()
}

fn ts() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
}

fn test_pool(url: &str) -> Pool {
    let pg_config: tokio_postgres::Config = url.parse().unwrap();
    let manager_config = ManagerConfig { recycling_method: RecyclingMethod::Fast };
    let manager = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(manager).max_size(4).build().unwrap()
}

fn insert(table: &str, id: i64, name: &str, lsn: &str) -> ChangeRecord {
    let mut data = BTreeMap::new();
    data.insert("id".to_string(), ChangeValue::Int(id));
    data.insert("name".to_string(), ChangeValue::Text(name.to_string()));
    ChangeRecord { table: table.to_string(), op: ChangeOp::Insert, data: Some(data), old_keys: None, lsn: lsn.to_string(), ts: ts() }
}

fn delete(table: &str, id: i64, lsn: &str) -> ChangeRecord {
    let mut old_keys = BTreeMap::new();
    old_keys.insert("id".to_string(), ChangeValue::Int(id));
    ChangeRecord { table: table.to_string(), op: ChangeOp::Delete, data: None, old_keys: Some(old_keys), lsn: lsn.to_string(), ts: ts() }
}

#[tokio::test]
#[ignore]
async fn single_insert_lands_one_row() {
    let Some(url) = test_pg_url() else {
        eprintln!("skipping: DATASYNC_TEST_PG_URL not set");
        return;
    };
    let pool = test_pool(&url);
    let conn = pool.get().await.unwrap();
    conn.batch_execute(r#"DROP TABLE IF EXISTS apply_test_users; CREATE TABLE apply_test_users (id bigint PRIMARY KEY, name text)"#)
        .await
        .unwrap();
    drop(conn);

    let applier = Applier::new(pool.clone(), Arc::new(PkCatalog::new(pool.clone())));
    let whitelist: HashSet<String> = ["apply_test_users".to_string()].into_iter().collect();
    let records = vec![insert("apply_test_users", 7, "a", "0/100")];

    let outcome = applier.apply_file(&records, &whitelist, &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.result.added, 1);
    assert_eq!(outcome.last_lsn.as_deref(), Some("0/100"));

    let conn = pool.get().await.unwrap();
    let row = conn.query_one("SELECT name FROM apply_test_users WHERE id = 7", &[]).await.unwrap();
    let name: String = row.get(0);
    assert_eq!(name, "a");
}

#[tokio::test]
#[ignore]
async fn insert_then_delete_leaves_no_row() {
    let Some(url) = test_pg_url() else {
        eprintln!("skipping: DATASYNC_TEST_PG_URL not set");
        return;
    };
    let pool = test_pool(&url);
    let conn = pool.get().await.unwrap();
    conn.batch_execute(r#"DROP TABLE IF EXISTS apply_test_orders; CREATE TABLE apply_test_orders (id bigint PRIMARY KEY, name text)"#)
        .await
        .unwrap();
    drop(conn);

    let applier = Applier::new(pool.clone(), Arc::new(PkCatalog::new(pool.clone())));
    let whitelist: HashSet<String> = ["apply_test_orders".to_string()].into_iter().collect();
    let records = vec![
        insert("apply_test_orders", 1, "a", "0/1"),
        delete("apply_test_orders", 1, "0/2"),
    ];

    let outcome = applier.apply_file(&records, &whitelist, &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.result.added, 1);
    assert_eq!(outcome.result.deleted, 1);
    assert_eq!(outcome.last_lsn.as_deref(), Some("0/2"));

    let conn = pool.get().await.unwrap();
    let count: i64 =
        conn.query_one("SELECT count(*) FROM apply_test_orders", &[]).await.unwrap().get(0);
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore]
async fn non_whitelisted_table_is_skipped_not_applied() {
    let Some(url) = test_pg_url() else {
        eprintln!("skipping: DATASYNC_TEST_PG_URL not set");
        return;
    };
    let pool = test_pool(&url);
    let applier = Applier::new(pool.clone(), Arc::new(PkCatalog::new(pool.clone())));
    let whitelist: HashSet<String> = ["apply_test_users".to_string()].into_iter().collect();
    let records = vec![insert("apply_test_not_whitelisted", 1, "x", "0/1")];

    let outcome = applier.apply_file(&records, &whitelist, &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.result.skipped, 1);
    assert_eq!(outcome.result.added, 0);
}
