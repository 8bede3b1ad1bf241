// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The running daemon's main loop: a sync ticker and a metrics ticker racing
//! against shutdown signals.

use std::sync::atomic::{AtomicBool, Ordering};

use datasync_archive::ArchiveClient;
use datasync_core::Clock;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::DaemonError;
use crate::lifecycle::Daemon;
use crate::pidfile::PidFile;

/// Compare-and-set guard preventing two `run()` loops in the same process.
/// This is in-process only and distinct from `PidFile`, which guards against
/// a second process; both are checked on startup.
static RUNNING: AtomicBool = AtomicBool::new(false);

/// Held for the lifetime of one `run()` call; flips `RUNNING` back to
/// `false` on drop so a later call (after this one returns) can acquire it
/// again.
struct RunGuard;

impl RunGuard {
    fn acquire() -> Result<Self, DaemonError> {
        RUNNING
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DaemonError::AlreadyRunning)?;
        Ok(Self)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        RUNNING.store(false, Ordering::Release);
    }
}

/// Run the daemon until SIGTERM/SIGINT. Acquires the pidfile for the
/// duration of the call; it is released on return via `PidFile`'s `Drop`.
/// A second concurrent call in the same process fails fast with
/// `DaemonError::AlreadyRunning` rather than racing the first for the
/// pidfile.
pub async fn run<C: Clock, A: ArchiveClient>(mut daemon: Daemon<C, A>) -> Result<(), DaemonError> {
    let _run_guard = RunGuard::acquire()?;
    let _pidfile = PidFile::acquire(&daemon.config.pid_path)?;

    let mut sync_interval = tokio::time::interval(daemon.config.data_sync_freq);
    let mut metrics_interval = tokio::time::interval(daemon.config.metric_freq);
    // The metrics ticker's first tick fires immediately; skip it so it
    // starts from a full period. The sync ticker's first tick is consumed
    // below by the explicit startup cycle instead.
    sync_interval.tick().await;
    metrics_interval.tick().await;

    let mut sigterm = signal(SignalKind::terminate())?;
    let token = CancellationToken::new();

    // Signal listening runs as its own task so it can cancel the token the
    // instant SIGTERM/SIGINT arrives, regardless of which `select!` arm
    // below is currently awaiting a sync or metrics cycle. The cycle itself
    // observes `token` cooperatively (between files/records) and returns
    // promptly rather than being preempted mid-statement.
    let shutdown_token = token.clone();
    let signal_task = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
        shutdown_token.cancel();
    });

    info!("daemon started");
    match daemon.run_cycle(&token).await {
        Ok(n) => info!(files_processed = n, "initial sync cycle complete"),
        Err(e) => warn!(error = %e, "initial sync cycle failed"),
    }

    while !token.is_cancelled() {
        tokio::select! {
            _ = sync_interval.tick() => {
                match daemon.run_cycle(&token).await {
                    Ok(n) => info!(files_processed = n, "sync cycle complete"),
                    Err(e) => warn!(error = %e, "sync cycle failed"),
                }
            }
            _ = metrics_interval.tick() => {
                match daemon.metrics.run_once().await {
                    Ok(n) => info!(tables_rolled_up = n, "metrics rollup complete"),
                    Err(e) => warn!(error = %e, "metrics rollup failed"),
                }
            }
            _ = token.cancelled() => {
                break;
            }
        }
    }

    signal_task.abort();
    daemon.archive.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn run_guard_rejects_a_second_acquire_while_held() {
        let first = RunGuard::acquire().unwrap();
        let err = RunGuard::acquire().unwrap_err();
        assert!(matches!(err, DaemonError::AlreadyRunning));
        drop(first);
    }

    #[test]
    #[serial]
    fn run_guard_can_be_reacquired_after_drop() {
        let first = RunGuard::acquire().unwrap();
        drop(first);
        let second = RunGuard::acquire();
        assert!(second.is_ok());
    }
}
