//! Mock adapters for integration tests.
//!
//! `MockHardware` serves scripted sensor values and records every modem
//! write so tests can assert on the full AT dialogue without a serial port.
//! `ManualClock` only moves when the test says so.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use hivewatch::app::events::AppEvent;
use hivewatch::app::ports::{ClockPort, ConnectivityPort, EventSink, ModemPort, SensorPort};
use hivewatch::error::{ModemError, SensorError};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub weight: Result<f32, SensorError>,
    pub air_quality: Result<i32, SensorError>,
    pub connected: bool,
    pub reconnects: u32,
    pub writes: Vec<Vec<u8>>,
    pub fail_writes: bool,
}

impl MockHardware {
    /// Calm hive: every channel well under the default limits.
    pub fn calm() -> Self {
        Self {
            temperature: Ok(30.0),
            humidity: Ok(55.0),
            weight: Ok(42.0),
            air_quality: Ok(150),
            connected: true,
            reconnects: 0,
            writes: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn with_temperature(mut self, value: f32) -> Self {
        self.temperature = Ok(value);
        self
    }

    /// Printable rendering of every write, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of message bodies (frames ending in Ctrl-Z) written.
    pub fn bodies_sent(&self) -> usize {
        self.writes.iter().filter(|w| w.last() == Some(&0x1A)).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::calm()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity
    }

    fn read_weight(&mut self) -> Result<f32, SensorError> {
        self.weight
    }

    fn read_air_quality(&mut self) -> Result<i32, SensorError> {
        self.air_quality
    }
}

impl ModemPort for MockHardware {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        if self.fail_writes {
            return Err(ModemError::Io);
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}

impl ConnectivityPort for MockHardware {
    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn begin_reconnect(&mut self) -> Option<u32> {
        self.reconnects += 1;
        Some(self.reconnects)
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Shared handle so a clock moved into the owning task can still be
/// set from the test body.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl ClockPort for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    /// Never synced, so the monitor's own rows carry offline timestamps.
    fn wall_time(&self) -> Option<NaiveDateTime> {
        None
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
