//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, such as logging them or recording
//! them in a test.

use crate::error::SensorError;
use crate::sensors::Channel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with the given alert recipient.
    Started { phone_configured: bool },

    /// A channel read failed; its previous value was kept.
    ChannelStale { channel: Channel, error: SensorError },

    /// A threshold breach passed the cooldown and produced an alert.
    AlertRaised { message: String },

    /// A notification job was accepted by the dispatcher.
    NotificationQueued { recipient: String },

    /// A notification job was dropped because another one is in flight.
    NotificationDropped,

    /// The dispatcher finished its dialogue and is idle again.
    NotificationCompleted,

    /// Persistence was due but the dispatcher is busy.
    PersistDeferred,

    /// The network link was found down and reconnect `attempt` started.
    LinkDown { attempt: u32 },

    /// The network link came back.
    LinkRestored,

    /// A login attempt and its outcome.
    Login { success: bool },

    /// The session was closed explicitly.
    Logout,

    /// The session ran out without a renewing request.
    SessionExpired,

    /// In-memory alert settings were replaced.
    SettingsUpdated,
}
