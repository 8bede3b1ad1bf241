// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync add-tables` / `remove-tables` / `list-tables`.

use anyhow::{Context, Result};
use datasync_core::Config;
use datasync_db::{build_pool, ensure_schema, ping, WhitelistStore};

async fn open_store() -> Result<WhitelistStore> {
    let config = Config::load().context("loading configuration")?;
    let pool = build_pool(&config).context("building database pool")?;
    ping(&pool).await.context("pinging database")?;
    ensure_schema(&pool).await.context("ensuring schema")?;
    Ok(WhitelistStore::new(pool))
}

pub async fn add(names: &[String]) -> Result<()> {
    let store = open_store().await?;
    let creator = std::env::var("USER").ok();
    let attempted =
        store.add_tables(names, creator.as_deref()).await.context("adding tables to the whitelist")?;
    println!("whitelisted {} table(s)", attempted.len());
    for table in &attempted {
        println!("  {table}");
    }
    Ok(())
}

pub async fn remove(names: &[String]) -> Result<()> {
    let store = open_store().await?;
    let removed = store.remove_tables(names).await.context("removing tables from the whitelist")?;
    println!("removed {} table(s)", removed.len());
    for table in &removed {
        println!("  {table}");
    }
    Ok(())
}

pub async fn list() -> Result<()> {
    let store = open_store().await?;
    let entries = store.list_tables().await.context("listing the whitelist")?;
    if entries.is_empty() {
        println!("whitelist is empty");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", entry.table_name);
    }
    Ok(())
}
