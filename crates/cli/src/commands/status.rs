// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync status` — read-side status report, safe to run alongside a
//! live daemon.

use anyhow::{Context, Result};
use datasync_core::Config;
use datasync_daemon::admin;

pub async fn run() -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    let report = admin::status(&config).await.context("building status report")?;

    println!("status: {}", if report.running { "active" } else { "stopped" });
    if let Some(pid) = report.pid {
        println!("pid: {pid}");
    }
    println!("data_sync_freq: {}s", report.data_sync_freq_secs);
    println!("metric_freq: {}h", report.metric_freq_hours);
    println!(
        "last_file: {}",
        if report.last_file.is_empty() { "-" } else { report.last_file.as_str() }
    );
    if let Some(t) = report.last_file_time {
        println!("last_file_time: {t}");
    }
    if let Some(t) = report.last_sync_cycle {
        println!("last_sync_cycle: {t}");
    }
    println!("total_synced: {}", report.total_synced);
    match report.failed_event_count {
        Some(n) => println!("errors: {n}"),
        None => println!("errors: unknown (database unreachable)"),
    }

    println!("whitelist ({}):", report.whitelist.len());
    for table in &report.whitelist {
        println!("  {table}");
    }
    Ok(())
}
