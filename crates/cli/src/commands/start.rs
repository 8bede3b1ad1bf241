// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync start` — run the daemon in the foreground.

use anyhow::{Context, Result};
use datasync_archive::SftpArchiveClient;
use datasync_core::{Config, SystemClock};
use datasync_daemon::Daemon;

pub async fn run() -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    let archive = SftpArchiveClient::new(
        config.archive_host.clone(),
        config.archive_port,
        config.archive_user.clone(),
        config.archive_dir.clone(),
    );
    let daemon =
        Daemon::init(config, SystemClock, archive).await.context("daemon startup failed")?;
    datasync_daemon::run(daemon).await.context("daemon exited with an error")?;
    Ok(())
}
