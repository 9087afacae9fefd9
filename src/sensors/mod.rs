//! Sensor subsystem: the channel sampler and the host simulation backend.
//!
//! [`SensorSampler`] reads every channel through the [`SensorPort`] and
//! writes the results into the shared [`Reading`] in place.  A channel that
//! fails keeps its previous good value: a single flaky device must never
//! blank the dashboard or trip an alert with a sentinel.

pub mod simulated;

use chrono::NaiveDateTime;
use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SensorPort};
use crate::error::SensorError;
use crate::model::{Reading, TIMESTAMP_FORMAT, UNKNOWN_TIMESTAMP};

/// One physical measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Temperature = 0,
    Humidity = 1,
    Weight = 2,
    AirQuality = 3,
}

impl Channel {
    pub const COUNT: usize = 4;
    pub const ALL: [Channel; Self::COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::Weight,
        Self::AirQuality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Weight => "weight",
            Self::AirQuality => "air_quality",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Aggregates the per-channel reads into the shared reading.
#[derive(Debug, Default)]
pub struct SensorSampler {
    /// Consecutive failures per channel, indexed by `Channel as usize`.
    misses: [u32; Channel::COUNT],
    samples: u64,
}

impl SensorSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every channel and overwrite `reading` in place.
    ///
    /// Individual read failures are reported to `sink` and the previous
    /// value is retained.  The timestamp follows the wall clock, or reads
    /// `"unknown"` while it is not synchronised.
    pub fn sample(
        &mut self,
        reading: &mut Reading,
        hw: &mut impl SensorPort,
        wall: Option<NaiveDateTime>,
        sink: &mut impl EventSink,
    ) {
        self.samples += 1;

        let temperature = finite(hw.read_temperature());
        self.apply(Channel::Temperature, temperature, &mut reading.temperature, sink);

        let humidity = finite(hw.read_humidity());
        self.apply(Channel::Humidity, humidity, &mut reading.humidity, sink);

        let weight = finite(hw.read_weight());
        self.apply(Channel::Weight, weight, &mut reading.weight, sink);

        let air = hw.read_air_quality();
        self.apply(Channel::AirQuality, air, &mut reading.air_quality, sink);

        reading.timestamp = match wall {
            Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
            None => UNKNOWN_TIMESTAMP.to_string(),
        };

        debug!(
            "Sampled: t={:.1}C h={:.1}% w={:.1}kg air={}",
            reading.temperature, reading.humidity, reading.weight, reading.air_quality
        );
    }

    /// Consecutive failed reads on `channel` (0 when the last read was good).
    pub fn misses(&self, channel: Channel) -> u32 {
        self.misses[channel as usize]
    }

    /// Number of completed sample passes.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    fn apply<T>(
        &mut self,
        channel: Channel,
        result: Result<T, SensorError>,
        slot: &mut T,
        sink: &mut impl EventSink,
    ) {
        match result {
            Ok(value) => {
                *slot = value;
                self.misses[channel as usize] = 0;
            }
            Err(error) => {
                self.misses[channel as usize] = self.misses[channel as usize].saturating_add(1);
                sink.emit(&AppEvent::ChannelStale { channel, error });
            }
        }
    }
}

/// NaN and infinities are failed reads, never values.
fn finite(result: Result<f32, SensorError>) -> Result<f32, SensorError> {
    match result {
        Ok(v) if !v.is_finite() => Err(SensorError::Malformed),
        other => other,
    }
}
