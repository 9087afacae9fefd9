//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one line per event with a short subsystem tag.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { phone_configured } => {
                info!("START | alert recipient configured={phone_configured}");
            }
            AppEvent::ChannelStale { channel, error } => {
                info!("SENSE | {} read failed ({error}), keeping last value", channel.label());
            }
            AppEvent::AlertRaised { message } => {
                warn!("ALERT | {message}");
            }
            AppEvent::NotificationQueued { recipient } => {
                info!("SMS | queued for {recipient}");
            }
            AppEvent::NotificationDropped => {
                info!("SMS | dispatcher busy, message dropped");
            }
            AppEvent::NotificationCompleted => {
                info!("SMS | dialogue finished");
            }
            AppEvent::PersistDeferred => {
                debug!("STORE | save deferred while SMS in flight");
            }
            AppEvent::LinkDown { attempt } => {
                warn!("NET | link down, reconnect attempt {attempt}");
            }
            AppEvent::LinkRestored => {
                info!("NET | link restored");
            }
            AppEvent::Login { success } => {
                info!("AUTH | login success={success}");
            }
            AppEvent::Logout => {
                info!("AUTH | logout");
            }
            AppEvent::SessionExpired => {
                info!("AUTH | session expired");
            }
            AppEvent::SettingsUpdated => {
                info!("SETTINGS | alert settings updated");
            }
        }
    }
}
