// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `datasync`: the table-sync daemon's CLI surface. Argument parsing
//! itself is trivial glue — this binary only wires `clap`'s derive output
//! to the library crates that do the real work.

mod commands;

use clap::{Parser, Subcommand};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "datasync", version = VERSION, about = "PostgreSQL logical-decoding table synchronizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon in the foreground; honors SIGTERM/SIGINT
    Start,
    /// Stop a running daemon: SIGTERM, poll for exit, escalate to SIGKILL after 10s
    Stop,
    /// Print daemon status: cadence, last-sync times, counters, whitelist
    Status,
    /// Truncate all whitelisted tables and reset state
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Truncate one table, reset its per-table state, and run one cycle
    Resync {
        table: String,
    },
    /// Whitelist one or more tables for sync
    AddTables {
        names: Vec<String>,
    },
    /// Remove one or more tables from the whitelist
    RemoveTables {
        names: Vec<String>,
    },
    /// Print the whitelist
    ListTables,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start => commands::start::run().await,
        Command::Stop => commands::stop::run().await,
        Command::Status => commands::status::run().await,
        Command::Clear { yes } => commands::admin::clear(yes).await,
        Command::Resync { table } => commands::admin::resync(&table).await,
        Command::AddTables { names } => commands::whitelist::add(&names).await,
        Command::RemoveTables { names } => commands::whitelist::remove(&names).await,
        Command::ListTables => commands::whitelist::list().await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
