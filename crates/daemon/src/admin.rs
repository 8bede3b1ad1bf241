// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin operations exposed to the outer CLI: `status`,
//! `clear`, and `resync <table>`. `status` is read-side and safe to call
//! from a second process — it never touches the running daemon's in-memory
//! [`datasync_core::RuntimeStats`], since there is no IPC channel to it; it
//! instead reads the pidfile, probes liveness, and reads the State Store.
//! `clear` and `resync` need a live [`Daemon`] handle, since they
//! truncate tables and mutate durable state through it.

use chrono::{DateTime, Utc};
use datasync_archive::ArchiveClient;
use datasync_core::{Clock, Config};
use datasync_db::{build_pool, ping, EventLog, WhitelistStore};
use datasync_storage::StateStore;
use tokio_util::sync::CancellationToken;

use crate::error::DaemonError;
use crate::lifecycle::Daemon;
use crate::pidfile::read_live_pid;

fn unix_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap_or_else(Utc::now)
}

/// A read-side snapshot of daemon state, safe to build from a second
/// process without disturbing a running instance.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub running: bool,
    pub pid: Option<i32>,
    pub data_sync_freq_secs: u64,
    pub metric_freq_hours: u64,
    pub last_file: String,
    pub last_file_time: Option<DateTime<Utc>>,
    pub last_sync_cycle: Option<DateTime<Utc>>,
    pub total_synced: i64,
    pub whitelist: Vec<String>,
    /// `None` if the database was unreachable while building this report —
    /// `status` degrades gracefully rather than failing outright when only
    /// the DB leg is down.
    pub failed_event_count: Option<i64>,
}

/// Build a [`StatusReport`]. Never fails on a DB outage: the pidfile and
/// State Store legs (both local files) are the only ones a non-zero exit
/// is warranted for; the whitelist and event-log legs degrade to `None`/
/// empty on a database the status check can't reach.
///
/// An "errors since start" count has no persisted daemon-start marker to
/// count from (RuntimeStats is in-memory only), so this reports the
/// all-time FAILED count instead — see DESIGN.md.
pub async fn status(config: &Config) -> Result<StatusReport, DaemonError> {
    let pid = read_live_pid(&config.pid_path)?;
    let state = StateStore::load(&config.state_path)?.snapshot();

    let (whitelist, failed_event_count) = match build_pool(config) {
        Ok(pool) if ping(&pool).await.is_ok() => {
            let whitelist_store = WhitelistStore::new(pool.clone());
            let names = whitelist_store
                .list_tables()
                .await
                .map(|entries| entries.into_iter().map(|e| e.table_name).collect())
                .unwrap_or_default();
            let event_log = EventLog::new(pool);
            let failed = event_log.failed_count_since(unix_epoch()).await.ok();
            (names, failed)
        }
        _ => (Vec::new(), None),
    };

    Ok(StatusReport {
        running: pid.is_some(),
        pid,
        data_sync_freq_secs: config.data_sync_freq.as_secs(),
        metric_freq_hours: config.metric_freq.as_secs() / 3600,
        last_file: state.last_file,
        last_file_time: state.last_file_time,
        last_sync_cycle: state.last_sync_cycle,
        total_synced: state.total_synced,
        whitelist,
        failed_event_count,
    })
}

/// `clear`: truncate every whitelisted table and reset the State Store to
/// its empty document. Returns the number of tables truncated.
pub async fn clear_all<C: Clock, A: ArchiveClient>(
    daemon: &Daemon<C, A>,
) -> Result<usize, DaemonError> {
    let entries = daemon.whitelist.list_tables().await?;
    for entry in &entries {
        daemon.whitelist.clear_table(&entry.table_name).await?;
        daemon.pk_catalog.invalidate(&entry.table_name);
    }
    daemon.state.reset()?;
    Ok(entries.len())
}

/// `resync <table>`: truncate one table, drop its per-table state entry, and
/// immediately run one sync cycle so the table starts refilling from the
/// archive. This only reapplies files still present in the archive — it
/// does not bootstrap from a base snapshot, so a table resynced after its
/// change files have rolled off the archive's retention window will come
/// back empty or partial.
pub async fn resync_table<C: Clock, A: ArchiveClient>(
    daemon: &mut Daemon<C, A>,
    table: &str,
) -> Result<usize, DaemonError> {
    if !daemon.whitelist.contains(table).await? {
        return Err(DaemonError::NotWhitelisted(table.to_string()));
    }
    daemon.whitelist.clear_table(table).await?;
    daemon.pk_catalog.invalidate(table);
    daemon.state.reset_table(table)?;
    daemon.run_cycle(&CancellationToken::new()).await
}
