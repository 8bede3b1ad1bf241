// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup sequence and the per-cycle sync loop body.
//!
//! Load durable state, open the backing store, then start serving — no WAL
//! replay or Unix-socket listener, since this daemon has neither.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use datasync_applier::Applier;
use datasync_archive::ArchiveClient;
use datasync_core::{ChangeFile, Clock, Config, EventStatus, RuntimeStats};
use datasync_db::{build_pool, ensure_schema, ping, EventLog, PkCatalog, WhitelistStore};
use datasync_metrics::MetricsAggregator;
use datasync_storage::StateStore;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::DaemonError;

/// Everything the daemon needs to run one sync cycle or answer a status
/// query. Built once at startup and held for the process lifetime.
pub struct Daemon<C: Clock, A: ArchiveClient> {
    pub config: Config,
    pub clock: C,
    pub state: Arc<StateStore>,
    pub whitelist: WhitelistStore,
    pub event_log: EventLog,
    pub applier: Applier,
    pub archive: A,
    pub metrics: MetricsAggregator<C>,
    pub pk_catalog: Arc<PkCatalog>,
    /// Process-local counters, destroyed on exit — not part of
    /// the durable State Store.
    pub stats: Mutex<RuntimeStats>,
}

impl<C: Clock, A: ArchiveClient> Daemon<C, A> {
    /// Startup sequence: open the DB pool, ping it with a
    /// 5-second timeout, ensure the schema exists, load the state document,
    /// then wire up the applier and metrics aggregator against the shared
    /// pool. The archive client is not connected here — it connects lazily
    /// on first use.
    pub async fn init(config: Config, clock: C, archive: A) -> Result<Self, DaemonError> {
        let pool = build_pool(&config)?;
        ping(&pool).await?;
        ensure_schema(&pool).await?;

        let state = Arc::new(StateStore::load(&config.state_path)?);
        let whitelist = WhitelistStore::new(pool.clone());
        let event_log = EventLog::new(pool.clone());
        let metrics_store = datasync_db::MetricsStore::new(pool.clone());
        let pk_catalog = Arc::new(PkCatalog::new(pool.clone()));
        let applier = Applier::new(pool.clone(), pk_catalog.clone());
        let metrics =
            MetricsAggregator::new(clock.clone(), event_log.clone(), metrics_store, config.metric_freq);
        let stats = Mutex::new(RuntimeStats::new(clock.now()));

        Ok(Self {
            config,
            clock,
            state,
            whitelist,
            event_log,
            applier,
            archive,
            metrics,
            pk_catalog,
            stats,
        })
    }

    /// One discover-fetch-apply-checkpoint cycle. Files are
    /// processed in `(mtime, name)` order; a failure on one file is logged
    /// and the cycle continues to the next rather than aborting outright,
    /// since files are independent units of work and a later file succeeding
    /// should not be blocked by an earlier one's transient failure.
    ///
    /// `cancel` is checked between files and threaded into the applier so
    /// that, once the token is cancelled, the cycle finishes the file
    /// currently in flight (rolling its transaction back rather than
    /// committing past the cancellation point) and returns without
    /// starting another.
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> Result<usize, DaemonError> {
        let since = self.cursor();
        let whitelist_entries = self.whitelist.list_tables().await?;
        let whitelist: HashSet<String> =
            whitelist_entries.into_iter().map(|e| e.table_name).collect();

        self.archive.connect().await?;
        let mut files = self.archive.discover(since).await?;
        files.sort();

        let mut processed = 0;
        let mut cycle_ok = true;
        let mut cycle_tally = datasync_core::SyncResult::default();
        for file in &files {
            if cancel.is_cancelled() {
                break;
            }
            match self.process_one_file(file, &whitelist, cancel).await {
                Ok(result) => {
                    processed += 1;
                    cycle_tally.added += result.added;
                    cycle_tally.updated += result.updated;
                    cycle_tally.deleted += result.deleted;
                    cycle_tally.skipped += result.skipped;
                }
                Err(e) => {
                    cycle_ok = false;
                    error!(file = %file.name, error = %e, "file sync failed, continuing to next file");
                    let _ = self
                        .event_log
                        .append("*", EventStatus::Failed, 0, Some(&file.name), Some(&e.to_string()))
                        .await;
                }
            }
        }
        let now = self.clock.now();
        self.stats.lock().record_cycle(now, &cycle_tally, cycle_ok);
        Ok(processed)
    }

    /// Fetch and apply one file, then checkpoint the State Store. The
    /// checkpoint only happens after a successful commit — a failed file leaves the cursor exactly where it was, so the
    /// next cycle retries it.
    async fn process_one_file(
        &mut self,
        file: &ChangeFile,
        whitelist: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<datasync_core::SyncResult, DaemonError> {
        let records = self.archive.fetch(file).await?;
        let outcome = self.applier.apply_file(&records, whitelist, cancel).await?;

        let now = self.clock.now();
        for (table, (lsn, delta)) in &outcome.table_deltas {
            self.state.update_table_state(table, lsn, *delta, now)?;
            self.event_log
                .append(table, EventStatus::Success, delta.total() as i32, Some(&file.name), None)
                .await?;
        }
        if let Some(lsn) = &outcome.last_lsn {
            self.state.set_global_lsn(lsn)?;
        }
        self.state.set_last_file(&file.name, file.mtime, now)?;
        Ok(outcome.result)
    }

    fn cursor(&self) -> DateTime<Utc> {
        self.state.snapshot().last_file_time.unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }
}
