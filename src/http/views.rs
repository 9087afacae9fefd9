//! JSON records served by the API routes.
//!
//! Field names are part of the dashboard contract and are kept short.

use serde::Serialize;

use crate::model::{Reading, Settings};
use crate::storage::DayAverage;

/// `/data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataView {
    pub temp: f32,
    pub hum: f32,
    pub weight: f32,
    pub air: i32,
}

impl From<&Reading> for DataView {
    fn from(r: &Reading) -> Self {
        Self {
            temp: r.temperature,
            hum: r.humidity,
            weight: r.weight,
            air: r.air_quality,
        }
    }
}

/// `/get_settings`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub phone: String,
    pub lt: f32,
    pub lh: f32,
    pub lw: f32,
    pub la: i32,
}

impl From<&Settings> for SettingsView {
    fn from(s: &Settings) -> Self {
        Self {
            phone: s.phone_number.to_string(),
            lt: s.limit_temp,
            lh: s.limit_humidity,
            lw: s.limit_weight,
            la: s.limit_air,
        }
    }
}

/// One `/history` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub timestamp: String,
    pub temp: f32,
    pub hum: f32,
    pub weight: f32,
    pub mq: i32,
}

impl From<Reading> for HistoryRow {
    fn from(r: Reading) -> Self {
        Self {
            timestamp: r.timestamp,
            temp: r.temperature,
            hum: r.humidity,
            weight: r.weight,
            mq: r.air_quality,
        }
    }
}

/// One `/monthly_data` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub day: String,
    pub avg_temp: f64,
    pub avg_hum: f64,
    pub avg_weight: f64,
    pub avg_mq: f64,
}

impl From<DayAverage> for MonthlyRow {
    fn from(d: DayAverage) -> Self {
        Self {
            day: d.day,
            avg_temp: d.avg_temp,
            avg_hum: d.avg_hum,
            avg_weight: d.avg_weight,
            avg_mq: d.avg_air,
        }
    }
}
