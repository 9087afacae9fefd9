//! System clock adapter.
//!
//! `uptime_ms` comes from `std::time::Instant` (monotonic, starts at zero
//! when the adapter is built).  Wall time is the local system clock, and
//! is reported as unknown while it reads earlier than 2020-01-01, which is
//! what an SBC without RTC shows before NTP has synchronised.

use std::time::Instant;

use chrono::{Local, NaiveDateTime};

use crate::app::ports::ClockPort;

/// 2020-01-01T00:00:00Z.
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for SystemClock {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> Option<NaiveDateTime> {
        let now = Local::now();
        // Reject obviously unsynced time.
        if now.timestamp() < EPOCH_2020 {
            return None;
        }
        Some(now.naive_local())
    }
}
