//! Host simulation backend for the four hive channels.
//!
//! Drives the binary when no real drivers are attached.  Values follow slow
//! deterministic waveforms around plausible hive conditions so the
//! dashboard moves, and a channel can be told to fail every `n`-th read to
//! exercise stale-value retention end to end.
//!
//! A channel can also be pinned to a fixed value with [`SimulatedSensors::pin`],
//! which overrides the waveform until cleared.  The binary sets both up
//! from the `[simulation]` config section.

use log::{info, warn};

use crate::app::ports::SensorPort;
use crate::config::SimulationConfig;
use crate::error::SensorError;
use crate::sensors::Channel;

/// Centre and swing of one simulated channel.
#[derive(Debug, Clone, Copy)]
struct Wave {
    base: f32,
    amplitude: f32,
    /// Samples per full period.
    period: f32,
}

impl Wave {
    fn at(&self, step: u64) -> f32 {
        let phase = (step as f32 / self.period) * core::f32::consts::TAU;
        self.base + self.amplitude * phase.sin()
    }
}

pub struct SimulatedSensors {
    step: u64,
    waves: [Wave; Channel::COUNT],
    pinned: [Option<f32>; Channel::COUNT],
    /// Fail every n-th read of a channel; `0` disables injection.
    fail_every: [u64; Channel::COUNT],
    reads: [u64; Channel::COUNT],
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self {
            step: 0,
            waves: [
                Wave { base: 34.0, amplitude: 2.5, period: 900.0 },
                Wave { base: 60.0, amplitude: 8.0, period: 1_300.0 },
                Wave { base: 45.0, amplitude: 1.5, period: 4_000.0 },
                Wave { base: 180.0, amplitude: 40.0, period: 700.0 },
            ],
            pinned: [None; Channel::COUNT],
            fail_every: [0; Channel::COUNT],
            reads: [0; Channel::COUNT],
        }
    }

    /// Build a backend with the failures and pins named in `config`.
    /// Unknown channel labels are logged and skipped.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut sim = Self::new();
        for (label, &n) in &config.fail_every {
            match Channel::from_label(label) {
                Some(channel) => {
                    info!("SENSE | simulated {label} fails every {n} read(s)");
                    sim.fail_every(channel, n);
                }
                None => warn!("Config: unknown simulation channel '{label}'"),
            }
        }
        for (label, &value) in &config.pin {
            match Channel::from_label(label) {
                Some(channel) => {
                    info!("SENSE | simulated {label} pinned at {value}");
                    sim.pin(channel, value);
                }
                None => warn!("Config: unknown simulation channel '{label}'"),
            }
        }
        sim
    }

    /// Make `channel` fail on every `n`-th read (`0` = never).
    pub fn fail_every(&mut self, channel: Channel, n: u64) {
        self.fail_every[channel as usize] = n;
    }

    /// Pin `channel` to `value` until [`unpin`](Self::unpin).
    pub fn pin(&mut self, channel: Channel, value: f32) {
        self.pinned[channel as usize] = Some(value);
    }

    pub fn unpin(&mut self, channel: Channel) {
        self.pinned[channel as usize] = None;
    }

    fn read(&mut self, channel: Channel) -> Result<f32, SensorError> {
        let idx = channel as usize;
        self.reads[idx] += 1;
        // The air-quality read closes a sample pass.
        if channel == Channel::AirQuality {
            self.step += 1;
        }

        let n = self.fail_every[idx];
        if n != 0 && self.reads[idx] % n == 0 {
            return Err(SensorError::NotReady);
        }

        Ok(self.pinned[idx].unwrap_or_else(|| self.waves[idx].at(self.step)))
    }
}

impl SensorPort for SimulatedSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.read(Channel::Temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.read(Channel::Humidity).map(|h| h.clamp(0.0, 100.0))
    }

    fn read_weight(&mut self) -> Result<f32, SensorError> {
        self.read(Channel::Weight)
    }

    fn read_air_quality(&mut self) -> Result<i32, SensorError> {
        self.read(Channel::AirQuality).map(|a| a.round() as i32)
    }
}
