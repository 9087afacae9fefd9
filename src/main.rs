//! HiveWatch: main entry point
//!
//! Hexagonal architecture with one owning task and an HTTP front.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HostHardware        LogEventSink   SqliteStore   SystemClock  │
//! │  (Sensor+Modem+Net)  (EventSink)    (readings)    (ClockPort)  │
//! │  axum router ──▶ request channel                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             MonitorService (pure logic)                │    │
//! │  │  Sampler · Alerts · SMS FSM · Session                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · Monitor (owning tokio task)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::net::TcpListener;

use hivewatch::adapters::clock::SystemClock;
use hivewatch::adapters::hardware::HostHardware;
use hivewatch::adapters::log_sink::LogEventSink;
use hivewatch::adapters::network::NetLink;
use hivewatch::app::service::MonitorService;
use hivewatch::config::{ModemConfig, MonitorConfig};
use hivewatch::model::Settings;
use hivewatch::runtime::{Monitor, request_channel};
use hivewatch::sensors::simulated::SimulatedSensors;
use hivewatch::session::MarkerSession;
use hivewatch::storage::SqliteStore;

#[cfg(not(feature = "rpi"))]
fn open_modem(_config: &ModemConfig) -> Result<hivewatch::adapters::modem::LogModem> {
    info!("SMS | no modem backend built in, directives go to the log");
    Ok(hivewatch::adapters::modem::LogModem::new())
}

#[cfg(feature = "rpi")]
fn open_modem(config: &ModemConfig) -> Result<hivewatch::adapters::modem::UartModem> {
    hivewatch::adapters::modem::UartModem::open(&config.device, config.baud_rate)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Config + logging ───────────────────────────────────
    let (config, origin) = MonitorConfig::load_or_default();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  HiveWatch v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    origin.log();
    config.log_summary();

    // ── 2. Store + settings ───────────────────────────────────
    let defaults = match config.defaults.to_settings() {
        Ok(s) => s,
        Err(e) => {
            warn!("Config: seed settings invalid ({}), using built-in defaults", e);
            Settings::default()
        }
    };
    let store = SqliteStore::open(&config.storage.database, &defaults)
        .await
        .with_context(|| format!("opening {}", config.storage.database.display()))?;
    let settings = match store.load_settings().await {
        Ok(s) => s,
        Err(e) => {
            warn!("STORE | settings load failed ({}), using seed values", e);
            defaults
        }
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let hw = HostHardware::new(
        SimulatedSensors::from_config(&config.simulation),
        open_modem(&config.modem)?,
        NetLink::new(&config.network.interface, config.network.reconnect_command.clone()),
    );
    let session = MarkerSession::new(
        &config.auth.username,
        &config.auth.password,
        config.auth.session_timeout_ms,
    );

    // ── 4. Owning task ────────────────────────────────────────
    let service = MonitorService::new(&config, settings, Box::new(session));
    let monitor = Monitor::new(
        service,
        hw,
        SystemClock::new(),
        LogEventSink::new(),
        store,
        Duration::from_millis(config.timing.tick_ms),
    );
    let (requests, inbox) = request_channel();
    let owner = tokio::spawn(monitor.run(inbox));

    // ── 5. HTTP front ─────────────────────────────────────────
    let listener = TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("binding {}", config.http.bind))?;
    info!("HTTP | listening on {}", config.http.bind);

    axum::serve(listener, hivewatch::http::router(requests))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Signal handler failed: {}", e);
            }
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server")?;

    // The router held the last sender; the owner drains and closes the store.
    owner.await.context("monitor task")?;
    info!("HiveWatch stopped");
    Ok(())
}
