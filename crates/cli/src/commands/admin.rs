// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync clear` and `datasync resync <table>`.

use std::io::Write;

use anyhow::{Context, Result};
use datasync_archive::SftpArchiveClient;
use datasync_core::{Config, SystemClock};
use datasync_daemon::{admin, Daemon};

pub async fn clear(yes: bool) -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    if !yes && !confirm("This truncates every whitelisted table and resets sync state.")? {
        println!("aborted");
        return Ok(());
    }

    let daemon = build_daemon(config).await?;
    let truncated = admin::clear_all(&daemon).await.context("clearing whitelisted tables")?;
    println!("cleared {truncated} table(s) and reset state");
    Ok(())
}

pub async fn resync(table: &str) -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    let mut daemon = build_daemon(config).await?;
    let processed =
        admin::resync_table(&mut daemon, table).await.context("resyncing table")?;
    println!("resynced {table:?}: {processed} file(s) reapplied from the archive");
    Ok(())
}

async fn build_daemon(config: Config) -> Result<Daemon<SystemClock, SftpArchiveClient>> {
    let archive = SftpArchiveClient::new(
        config.archive_host.clone(),
        config.archive_port,
        config.archive_user.clone(),
        config.archive_dir.clone(),
    );
    Daemon::init(config, SystemClock, archive).await.context("connecting to database")
}

/// `clear`'s confirmation prompt.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} Continue? [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
