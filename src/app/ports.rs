//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, modem, network link, clock, event sinks)
//! implement these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every component can be driven from a test with a fake clock.

use chrono::NaiveDateTime;

use crate::error::{ModemError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one call per channel, each allowed to fail on its own.
///
/// Implementations must return within a bounded time; a device that is not
/// ready yet answers `Err(SensorError::NotReady)` instead of waiting.
pub trait SensorPort {
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
    fn read_humidity(&mut self) -> Result<f32, SensorError>;
    fn read_weight(&mut self) -> Result<f32, SensorError>;
    fn read_air_quality(&mut self) -> Result<i32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Modem port (driven adapter: domain → GSM modem)
// ───────────────────────────────────────────────────────────────

/// Write-only channel to the SMS modem.  Nothing is ever read back.
pub trait ModemPort {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    fn is_connected(&mut self) -> bool;
    /// Kick off a reconnect without waiting for its outcome.
    ///
    /// Returns the attempt number since the link was last up, or `None`
    /// when the adapter declined to start one.
    fn begin_reconnect(&mut self) -> Option<u32>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since start (monotonic).
    fn uptime_ms(&self) -> u64;
    /// Local wall-clock time, `None` while the clock is not synchronised.
    fn wall_time(&self) -> Option<NaiveDateTime>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Everything the tick drives, bundled so one `&mut` covers it.
pub trait Hardware: SensorPort + ModemPort + ConnectivityPort {}

impl<T: SensorPort + ModemPort + ConnectivityPort> Hardware for T {}
