//! Hardware adapter: bridges the concrete backends to the domain ports.
//!
//! Owns the sensor backend, the modem and the network link, exposing them
//! through [`SensorPort`], [`ModemPort`] and [`ConnectivityPort`] so the
//! tick can borrow everything with one `&mut`.  This is the only place
//! where the binary decides which backend drives which port.

use crate::app::ports::{ConnectivityPort, ModemPort, SensorPort};
use crate::error::{ModemError, SensorError};

/// Concrete adapter that combines the backends behind port traits.
pub struct HostHardware<S, M, L> {
    sensors: S,
    modem: M,
    link: L,
}

impl<S, M, L> HostHardware<S, M, L> {
    pub fn new(sensors: S, modem: M, link: L) -> Self {
        Self {
            sensors,
            modem,
            link,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: SensorPort, M, L> SensorPort for HostHardware<S, M, L> {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_temperature()
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_humidity()
    }

    fn read_weight(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_weight()
    }

    fn read_air_quality(&mut self) -> Result<i32, SensorError> {
        self.sensors.read_air_quality()
    }
}

// ── ModemPort implementation ──────────────────────────────────

impl<S, M: ModemPort, L> ModemPort for HostHardware<S, M, L> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        self.modem.send(bytes)
    }
}

// ── ConnectivityPort implementation ───────────────────────────

impl<S, M, L: ConnectivityPort> ConnectivityPort for HostHardware<S, M, L> {
    fn is_connected(&mut self) -> bool {
        self.link.is_connected()
    }

    fn begin_reconnect(&mut self) -> Option<u32> {
        self.link.begin_reconnect()
    }
}
