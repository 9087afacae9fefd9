//! Threshold alert evaluator.
//!
//! Runs once per sample, right after the sampler has refreshed the shared
//! reading.  Channels are checked in a fixed priority order and the first
//! breach wins:
//!
//! ```text
//!   temperature ─▶ humidity ─▶ weight ─▶ air quality
//! ```
//!
//! A single cooldown covers **all** channels: once an alert is produced no
//! other alert is produced until `cooldown_ms` has elapsed, whatever the
//! channel.  The very first breach after start is never gated.
//!
//! The cooldown restarts when the alert is *produced*, whether or not the
//! dispatcher later accepts the job.

use crate::model::{Reading, Settings};
use log::debug;

/// Channel that triggered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breach {
    Temperature,
    Humidity,
    Weight,
    AirQuality,
}

/// Text and origin of one produced alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub breach: Breach,
    pub text: String,
}

impl AlertMessage {
    fn for_reading(breach: Breach, r: &Reading) -> Self {
        let text = match breach {
            Breach::Temperature => format!("ALERT! High Temperature: {:.1}C", r.temperature),
            Breach::Humidity => format!("ALERT! High Humidity: {:.1}%", r.humidity),
            Breach::Weight => format!("ALERT! Weight Limit Exceeded: {:.1}kg", r.weight),
            Breach::AirQuality => format!("ALERT! Poor Air Quality: {}", r.air_quality),
        };
        Self { breach, text }
    }
}

pub struct AlertEvaluator {
    cooldown_ms: u64,
    /// Instant of the last produced alert.  `None` until the first one.
    last_alert_ms: Option<u64>,
}

impl AlertEvaluator {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_alert_ms: None,
        }
    }

    /// Check `reading` against `settings` at instant `now_ms`.
    ///
    /// Returns the alert to send, if any.  Limits are strict: a value equal
    /// to its limit is not a breach.
    pub fn evaluate(
        &mut self,
        reading: &Reading,
        settings: &Settings,
        now_ms: u64,
    ) -> Option<AlertMessage> {
        let breach = first_breach(reading, settings)?;

        if !self.cooldown_elapsed(now_ms) {
            debug!("ALERT | {breach:?} breach suppressed by cooldown");
            return None;
        }

        self.last_alert_ms = Some(now_ms);
        let alert = AlertMessage::for_reading(breach, reading);
        debug!("ALERT | {breach:?} breach raised");
        Some(alert)
    }

    pub fn last_alert_ms(&self) -> Option<u64> {
        self.last_alert_ms
    }

    fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        match self.last_alert_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.cooldown_ms,
        }
    }
}

fn first_breach(r: &Reading, s: &Settings) -> Option<Breach> {
    if r.temperature > s.limit_temp {
        Some(Breach::Temperature)
    } else if r.humidity > s.limit_humidity {
        Some(Breach::Humidity)
    } else if r.weight > s.limit_weight {
        Some(Breach::Weight)
    } else if r.air_quality > s.limit_air {
        Some(Breach::AirQuality)
    } else {
        None
    }
}
