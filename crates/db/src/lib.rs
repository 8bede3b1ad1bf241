// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! datasync-db: Postgres-backed whitelist, event log, metrics, and
//! primary-key catalog stores.

pub mod error;
pub mod event_log;
pub mod metrics_store;
pub mod pk_catalog;
pub mod pool;
pub mod schema;
pub mod whitelist;

pub use error::DbError;
pub use event_log::EventLog;
pub use metrics_store::MetricsStore;
pub use pk_catalog::PkCatalog;
pub use pool::{build_pool, ping};
pub use schema::ensure_schema;
pub use whitelist::WhitelistStore;

pub type Pool = deadpool_postgres::Pool;
