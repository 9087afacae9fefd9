//! Inbound requests to the application service and its answers.
//!
//! The HTTP layer turns every route into a [`Request`]; the
//! [`MonitorService`](super::service::MonitorService) interprets it and
//! answers with an [`Operation`] that is either a finished [`AppReply`] or
//! a storage step the owning task must complete.

use crate::model::{Reading, Settings};
use crate::storage::DayAverage;

/// Rows returned by the history view.
pub const HISTORY_ROWS: u32 = 10;

/// Body of the manual test message.
pub const TEST_SMS_BODY: &str = "Test SMS from Hive Monitor";

/// One inbound request: the raw `Cookie` header plus what is asked for.
#[derive(Debug, Clone)]
pub struct Request {
    pub cookie: Option<String>,
    pub command: AppCommand,
}

impl Request {
    pub fn new(cookie: Option<String>, command: AppCommand) -> Self {
        Self { cookie, command }
    }
}

/// Raw alert-settings form, validated by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    pub phone: String,
    pub limit_temp: f32,
    pub limit_humidity: f32,
    pub limit_weight: f32,
    pub limit_air: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Landing page; needs no session.
    Landing,
    /// Credential check; needs no session.
    Login { username: String, password: String },
    Logout,
    /// Access check for a static privileged page.
    Page,
    CurrentReading,
    GetSettings,
    SaveSettings(SettingsUpdate),
    /// Queue the fixed test message to the configured number.
    TriggerSms,
    History,
    MonthlyAverages,
}

impl AppCommand {
    /// Commands that require a live session.
    pub fn is_privileged(&self) -> bool {
        !matches!(self, Self::Landing | Self::Login { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppReply {
    /// No valid session: redirect to the login page.
    Unauthorized,
    /// Show the login form.
    LoginForm,
    /// Already logged in: go to the dashboard.
    AlreadyAuthenticated,
    LoggedIn { cookie: String },
    LoginRejected,
    LoggedOut,
    /// Privileged page may be served.
    Granted,
    Reading(Reading),
    Settings(Settings),
    SettingsSaved,
    SettingsRejected(&'static str),
    SmsQueued,
    History(Vec<Reading>),
    Monthly(Vec<DayAverage>),
    /// The durable store failed to answer.
    StorageFailed,
}

/// What the owning task must do with a handled request.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Answer now.
    Reply(AppReply),
    /// Answer with the most recent rows.
    LoadHistory,
    /// Answer with the per-day averages.
    LoadMonthly,
    /// Answer [`AppReply::SettingsSaved`], then persist `settings`.
    PersistSettings(Settings),
}
