//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the [`AppContext`], the scheduler and the
//! sampler.  It exposes a hardware-agnostic API: all I/O flows through
//! port traits injected at call sites, so the whole service runs against
//! mock adapters and a fake clock in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        MonitorService        │
//!   ModemPort ◀── │ Sampler · Alerts · SMS FSM   │ ◀── Request
//!                 │ Session · Scheduler          │ ──▶ Operation
//! Connectivity ◀─ └──────────────────────────────┘
//! ```
//!
//! The service never awaits.  Storage work is handed back to the caller:
//! [`TickReport::persist`] for the periodic append and [`Operation`] for
//! request-driven reads and the settings write.

use log::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::dispatcher::NotificationDispatcher;
use crate::error::SettingsError;
use crate::fsm::context::NotificationJob;
use crate::model::{Reading, Settings};
use crate::scheduler::{Disposition, Scheduler, SchedulerDelegate, TaskId};
use crate::sensors::SensorSampler;
use crate::session::SessionAuthority;

use super::commands::{AppCommand, AppReply, Operation, Request, SettingsUpdate, TEST_SMS_BODY};
use super::context::AppContext;
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, Hardware};

/// Storage work produced by one tick.
#[derive(Debug, Default, PartialEq)]
pub struct TickReport {
    /// Snapshot to append to the readings log, when persistence ran.
    pub persist: Option<Reading>,
}

/// Network link bookkeeping between reconnect checks.  The attempt count
/// lives in the [`ConnectivityPort`](super::ports::ConnectivityPort).
#[derive(Debug, Default)]
struct LinkWatch {
    down: bool,
}

pub struct MonitorService {
    ctx: AppContext,
    scheduler: Scheduler,
    sampler: SensorSampler,
    link: LinkWatch,
}

impl MonitorService {
    pub fn new(
        config: &MonitorConfig,
        settings: Settings,
        session: Box<dyn SessionAuthority + Send>,
    ) -> Self {
        Self {
            ctx: AppContext::new(config, settings, session),
            scheduler: Scheduler::new(
                config.timing.sample_interval_ms,
                config.storage.persist_interval_ms,
                config.timing.reconnect_interval_ms,
            ),
            sampler: SensorSampler::new(),
            link: LinkWatch::default(),
        }
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let phone_configured = !self.ctx.settings.phone_number.is_empty();
        sink.emit(&AppEvent::Started { phone_configured });
        info!("MonitorService started");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run every task that is due at `now_ms`.
    ///
    /// The `hw` parameter satisfies the sensor, modem and connectivity
    /// ports at once, which keeps a single mutable borrow per tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl Hardware,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        let mut delegate = TickDelegate {
            ctx: &mut self.ctx,
            sampler: &mut self.sampler,
            link: &mut self.link,
            hw,
            clock,
            sink,
            persist: None,
        };
        self.scheduler.tick(now_ms, &mut delegate);
        TickReport {
            persist: delegate.persist,
        }
    }

    // ── Request handling ──────────────────────────────────────

    /// Interpret one inbound request at instant `now_ms`.
    pub fn handle(
        &mut self,
        request: Request,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Operation {
        let Request { cookie, command } = request;
        let cookie = cookie.as_deref();

        if command.is_privileged() && !self.authorize(cookie, now_ms, sink) {
            return Operation::Reply(AppReply::Unauthorized);
        }

        let reply = match command {
            AppCommand::Landing => {
                if self.authorize(cookie, now_ms, sink) {
                    AppReply::AlreadyAuthenticated
                } else {
                    AppReply::LoginForm
                }
            }
            AppCommand::Login { username, password } => {
                let success = self.ctx.session.login(&username, &password, now_ms);
                sink.emit(&AppEvent::Login { success });
                if success {
                    AppReply::LoggedIn {
                        cookie: self.ctx.session.cookie_value().to_string(),
                    }
                } else {
                    AppReply::LoginRejected
                }
            }
            AppCommand::Logout => {
                self.ctx.session.logout();
                sink.emit(&AppEvent::Logout);
                AppReply::LoggedOut
            }
            AppCommand::Page => AppReply::Granted,
            AppCommand::CurrentReading => AppReply::Reading(self.ctx.reading.clone()),
            AppCommand::GetSettings => AppReply::Settings(self.ctx.settings.clone()),
            AppCommand::SaveSettings(update) => return self.update_settings(&update, sink),
            AppCommand::TriggerSms => {
                queue_notification(&mut self.ctx, TEST_SMS_BODY, sink);
                AppReply::SmsQueued
            }
            AppCommand::History => return Operation::LoadHistory,
            AppCommand::MonthlyAverages => return Operation::LoadMonthly,
        };
        Operation::Reply(reply)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn reading(&self) -> &Reading {
        &self.ctx.reading
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.ctx.dispatcher
    }

    pub fn sampler(&self) -> &SensorSampler {
        &self.sampler
    }

    // ── Internal ──────────────────────────────────────────────

    fn authorize(&mut self, cookie: Option<&str>, now_ms: u64, sink: &mut impl EventSink) -> bool {
        let was_live = self.ctx.session.is_live();
        let ok = self.ctx.session.is_authenticated(cookie, now_ms);
        if was_live && !self.ctx.session.is_live() {
            sink.emit(&AppEvent::SessionExpired);
        }
        ok
    }

    fn update_settings(&mut self, update: &SettingsUpdate, sink: &mut impl EventSink) -> Operation {
        match Settings::new(
            &update.phone,
            update.limit_temp,
            update.limit_humidity,
            update.limit_weight,
            update.limit_air,
        ) {
            Ok(settings) => {
                self.ctx.settings = settings.clone();
                sink.emit(&AppEvent::SettingsUpdated);
                Operation::PersistSettings(settings)
            }
            Err(SettingsError::ValidationFailed(reason)) => {
                warn!("Settings update rejected: {reason}");
                Operation::Reply(AppReply::SettingsRejected(reason))
            }
        }
    }
}

/// Offer `body` to the dispatcher for the configured recipient.
fn queue_notification(ctx: &mut AppContext, body: &str, sink: &mut impl EventSink) {
    let recipient = ctx.settings.phone_number.clone();
    if recipient.is_empty() {
        warn!("SMS | no recipient configured, message not queued");
        return;
    }
    if ctx
        .dispatcher
        .enqueue(NotificationJob::new(&recipient, body))
    {
        sink.emit(&AppEvent::NotificationQueued {
            recipient: recipient.to_string(),
        });
    } else {
        sink.emit(&AppEvent::NotificationDropped);
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Borrows the service's pieces for one tick so the scheduler can call
/// back into them.
struct TickDelegate<'a, H, C, E> {
    ctx: &'a mut AppContext,
    sampler: &'a mut SensorSampler,
    link: &'a mut LinkWatch,
    hw: &'a mut H,
    clock: &'a C,
    sink: &'a mut E,
    persist: Option<Reading>,
}

impl<H: Hardware, C: ClockPort, E: EventSink> SchedulerDelegate for TickDelegate<'_, H, C, E> {
    fn on_due(&mut self, task: TaskId, now_ms: u64) -> Disposition {
        match task {
            TaskId::Sample => {
                self.sampler.sample(
                    &mut self.ctx.reading,
                    &mut *self.hw,
                    self.clock.wall_time(),
                    &mut *self.sink,
                );
                let alert = self
                    .ctx
                    .alerts
                    .evaluate(&self.ctx.reading, &self.ctx.settings, now_ms);
                if let Some(alert) = alert {
                    self.sink.emit(&AppEvent::AlertRaised {
                        message: alert.text.clone(),
                    });
                    queue_notification(&mut *self.ctx, &alert.text, &mut *self.sink);
                }
                Disposition::Ran
            }
            TaskId::Dispatch => {
                self.ctx.dispatcher.advance(now_ms, &mut *self.hw, &mut *self.sink);
                Disposition::Ran
            }
            TaskId::Persist => {
                if self.ctx.dispatcher.is_busy() {
                    self.sink.emit(&AppEvent::PersistDeferred);
                    return Disposition::Deferred;
                }
                self.persist = Some(self.ctx.reading.clone());
                Disposition::Ran
            }
            TaskId::Reconnect => {
                if self.hw.is_connected() {
                    if self.link.down {
                        self.link.down = false;
                        self.sink.emit(&AppEvent::LinkRestored);
                    }
                } else {
                    self.link.down = true;
                    match self.hw.begin_reconnect() {
                        Some(attempt) => self.sink.emit(&AppEvent::LinkDown { attempt }),
                        None => debug!("NET | link down, no reconnect started"),
                    }
                }
                Disposition::Ran
            }
        }
    }
}
