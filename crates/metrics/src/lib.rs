// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! datasync-metrics: periodic bucket rollups from the event log into the
//! metrics table.

pub mod error;

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use datasync_core::{Clock, PeriodType};
use datasync_db::{EventLog, MetricsStore};

pub use error::MetricsError;

/// Rolls event-log rows into the metrics table on its own cadence,
/// independent of the ingest loop. Never mutates the
/// event log and shares the ingest path's DB pool.
pub struct MetricsAggregator<C> {
    clock: C,
    event_log: EventLog,
    metrics_store: MetricsStore,
    freq: StdDuration,
}

impl<C: Clock> MetricsAggregator<C> {
    pub fn new(clock: C, event_log: EventLog, metrics_store: MetricsStore, freq: StdDuration) -> Self {
        Self { clock, event_log, metrics_store, freq }
    }

    /// Run one rollup: determine the current bucket window from wall-clock
    /// now, read event-log rows in that window grouped by table, and upsert
    /// one metric row per table. Returns the number of tables rolled up.
    pub async fn run_once(&self) -> Result<usize, MetricsError> {
        let (period_start, period_end) = self.bucket_window();
        let rows = self.event_log.rows_synced_by_table(period_start, period_end).await?;
        for (table_name, rows_synced) in &rows {
            self.metrics_store
                .record_bucket(
                    table_name,
                    period_start,
                    period_end,
                    PeriodType::Freq,
                    *rows_synced,
                    0,
                    0,
                )
                .await?;
        }
        Ok(rows.len())
    }

    /// The `[period_start, period_end)` window containing `now`.
    fn bucket_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        bucket_window_at(self.clock.now(), self.freq)
    }
}

/// Align `now` to a `freq`-sized bucket since the Unix epoch, so repeated
/// runs within the same bucket upsert the same row rather than creating
/// overlapping ones. Free function so it's testable without a DB pool.
fn bucket_window_at(now: DateTime<Utc>, freq: StdDuration) -> (DateTime<Utc>, DateTime<Utc>) {
    let freq = Duration::from_std(freq).unwrap_or(Duration::hours(24));
    let freq_secs = freq.num_seconds().max(1);
    let epoch_secs = now.timestamp();
    let bucket_start_secs = (epoch_secs / freq_secs) * freq_secs;
    let period_start = Utc.timestamp_opt(bucket_start_secs, 0).single().unwrap_or(now);
    let period_end = period_start + freq;
    (period_start, period_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn bucket_window_aligns_to_freq() {
        let (start, end) =
            bucket_window_at(ts("2026-01-01T05:30:00Z"), StdDuration::from_secs(3600));
        assert_eq!(start, ts("2026-01-01T05:00:00Z"));
        assert_eq!(end, ts("2026-01-01T06:00:00Z"));
    }

    #[test]
    fn bucket_window_is_stable_within_the_same_bucket() {
        let (s1, e1) = bucket_window_at(ts("2026-01-01T05:00:01Z"), StdDuration::from_secs(3600));
        let (s2, e2) = bucket_window_at(ts("2026-01-01T05:59:59Z"), StdDuration::from_secs(3600));
        assert_eq!(s1, s2);
        assert_eq!(e1, e2);
    }
}
