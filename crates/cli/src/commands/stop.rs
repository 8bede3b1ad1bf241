// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync stop` — read the pidfile, send SIGTERM, poll for exit, and
//! escalate to SIGKILL after 10 seconds of non-exit via a 200ms poll.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use datasync_core::Config;
use datasync_daemon::read_live_pid;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

const STOP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run() -> Result<()> {
    let config = Config::load().context("loading configuration")?;

    let Some(pid) = read_live_pid(&config.pid_path)? else {
        println!("daemon not running");
        return Ok(());
    };

    kill(Pid::from_raw(pid), Signal::SIGTERM).context("sending SIGTERM")?;

    let deadline = Instant::now() + STOP_TIMEOUT;
    while Instant::now() < deadline {
        if read_live_pid(&config.pid_path)?.is_none() {
            println!("daemon stopped");
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    kill(Pid::from_raw(pid), Signal::SIGKILL).context("sending SIGKILL")?;
    println!("daemon did not exit within 10s; sent SIGKILL");
    Ok(())
}
