//! Runtime configuration.
//!
//! All tunable parameters for the HiveWatch monitor.  Loaded from
//! `hivewatch.toml`; any field left out falls back to its default, and a
//! missing file means "all defaults".

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::model::Settings;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HIVEWATCH_CONFIG";

/// Where the effective configuration came from.
#[derive(Debug)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// No usable file; `rejected` lists files that failed to parse.
    Defaults { rejected: Vec<(PathBuf, String)> },
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            Self::File(path) => info!("Config loaded from {}", path.display()),
            Self::Defaults { rejected } => {
                for (path, e) in rejected {
                    warn!("Config: failed to load {}: {}", path.display(), e);
                }
                warn!("Config: no usable config file found, using defaults");
            }
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub timing: TimingConfig,
    pub modem: ModemConfig,
    pub network: NetworkConfig,
    pub defaults: DefaultSettings,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Listen address for the dashboard and JSON API.
    pub bind: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Append one reading to the log this often (milliseconds).
    pub persist_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("hive.db"),
            persist_interval_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Sliding session window (milliseconds).
    pub session_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "beehive".to_string(),
            session_timeout_ms: 30 * 60 * 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Scheduler tick period (milliseconds).
    pub tick_ms: u64,
    /// Sensor sampling cadence (milliseconds).
    pub sample_interval_ms: u64,
    /// Minimum gap between two alerts of any kind (milliseconds).
    pub alert_cooldown_ms: u64,
    /// Network recovery cadence (milliseconds).
    pub reconnect_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            sample_interval_ms: 2_000,
            alert_cooldown_ms: 300_000,
            reconnect_interval_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// Serial device of the GSM modem (only used with the `rpi` feature).
    pub device: String,
    pub baud_rate: u32,
    /// Delay between two AT directives (milliseconds).
    pub step_delay_ms: u64,
    /// Time granted to the modem to finish a send (milliseconds).
    pub send_wait_ms: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            device: "/dev/serial0".to_string(),
            baud_rate: 9600,
            step_delay_ms: 200,
            send_wait_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface whose link state is watched.
    pub interface: String,
    /// Command spawned (not awaited) when the link is down, e.g.
    /// `["nmcli", "device", "connect", "wlan0"]`.  Empty disables recovery.
    pub reconnect_command: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_string(),
            reconnect_command: Vec::new(),
        }
    }
}

/// Values seeded into the settings row on first run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub phone_number: String,
    pub limit_temp: f32,
    pub limit_humidity: f32,
    pub limit_weight: f32,
    pub limit_air: i32,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        let s = Settings::default();
        Self {
            phone_number: s.phone_number.to_string(),
            limit_temp: s.limit_temp,
            limit_humidity: s.limit_humidity,
            limit_weight: s.limit_weight,
            limit_air: s.limit_air,
        }
    }
}

impl DefaultSettings {
    pub fn to_settings(&self) -> Result<Settings, SettingsError> {
        Settings::new(
            &self.phone_number,
            self.limit_temp,
            self.limit_humidity,
            self.limit_weight,
            self.limit_air,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Fault injection for the simulated sensor backend, keyed by channel
/// label (`temperature`, `humidity`, `weight`, `air_quality`).
///
/// ```toml
/// [simulation.fail_every]
/// humidity = 7
///
/// [simulation.pin]
/// temperature = 42.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fail every n-th read of the channel; `0` never fails.
    pub fail_every: BTreeMap<String, u64>,
    /// Hold the channel at a fixed value instead of the waveform.
    pub pin: BTreeMap<String, f32>,
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read config file: {}", e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: MonitorConfig =
            toml::from_str(content).map_err(|e| anyhow::anyhow!("failed to parse config: {}", e))?;
        Ok(config)
    }

    /// Load from `$HIVEWATCH_CONFIG` or the usual locations, else defaults.
    ///
    /// Runs before the logger is installed, so the outcome is returned as a
    /// [`ConfigOrigin`] for the caller to log.
    pub fn load_or_default() -> (Self, ConfigOrigin) {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("config").join("hivewatch.toml"));
        paths.push(PathBuf::from("..").join("config").join("hivewatch.toml"));

        let mut rejected = Vec::new();
        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => return (config, ConfigOrigin::File(path)),
                Err(e) => rejected.push((path, e.to_string())),
            }
        }
        (Self::default(), ConfigOrigin::Defaults { rejected })
    }

    /// Log a one-line summary of the effective configuration.
    pub fn log_summary(&self) {
        info!(
            "Config | http={} | db={} | sample={}ms persist={}ms cooldown={}ms | modem={}@{}",
            self.http.bind,
            self.storage.database.display(),
            self.timing.sample_interval_ms,
            self.storage.persist_interval_ms,
            self.timing.alert_cooldown_ms,
            self.modem.device,
            self.modem.baud_rate,
        );
    }
}
