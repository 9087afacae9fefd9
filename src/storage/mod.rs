//! Durable storage: the append-only readings log and the settings singleton.
//!
//! [`SqliteStore`] is the only backend.  Row timestamps are produced here,
//! not by the sampler, so a row always records when it was written.

mod sqlite;

pub use sqlite::SqliteStore;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::TIMESTAMP_FORMAT;

/// Prefix of the placeholder timestamp written while the wall clock is
/// unknown.  Rows carrying it are left out of daily aggregates.
pub const OFFLINE_MARKER: &str = "OFFLINE";

/// Most recent days returned by the monthly report.
pub const MONTHLY_DAYS: u32 = 30;

/// One per-day aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DayAverage {
    /// `YYYY-MM-DD`.
    pub day: String,
    pub avg_temp: f64,
    pub avg_hum: f64,
    pub avg_weight: f64,
    pub avg_air: f64,
}

/// Timestamp for a new row: the wall clock when known, otherwise
/// `OFFLINE-<uptime seconds>s`.
pub fn row_timestamp(wall: Option<NaiveDateTime>, uptime_ms: u64) -> String {
    match wall {
        Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        None => format!("{OFFLINE_MARKER}-{}s", uptime_ms / 1000),
    }
}
