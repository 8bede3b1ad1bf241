// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metric rows produced by the periodic aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `period_type` discriminates the bucket cadence a row was rolled up under.
///
/// Only `Freq` is currently scheduled by the daemon ticker (the
/// `metric_freq`-hour cadence from config); `Week`/`Month` are modeled in the
/// schema so it stays period-agnostic but have no scheduler wired to them
/// yet (see DESIGN.md's open question notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodType {
    Freq,
    Week,
    Month,
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PeriodType::Freq => "FREQ",
            PeriodType::Week => "WEEK",
            PeriodType::Month => "MONTH",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid period type: {0:?}")]
pub struct ParsePeriodTypeError(String);

impl std::str::FromStr for PeriodType {
    type Err = ParsePeriodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREQ" => Ok(PeriodType::Freq),
            "WEEK" => Ok(PeriodType::Week),
            "MONTH" => Ok(PeriodType::Month),
            other => Err(ParsePeriodTypeError(other.to_string())),
        }
    }
}

/// `(id, table_name, period_start, period_end, period_type, records_{added,updated,deleted})`,
/// unique on `(table_name, period_start, period_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: i32,
    pub table_name: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub period_type: PeriodType,
    pub records_added: i64,
    pub records_updated: i64,
    pub records_deleted: i64,
}
