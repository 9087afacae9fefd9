//! The owning task.
//!
//! One tokio task owns the [`MonitorService`], the hardware and the store.
//! It alternates between scheduler ticks and inbound requests, so every
//! mutation of the shared context happens on this task and a tick is never
//! interleaved with a request.
//!
//! ```text
//!   axum handler ──Envelope──▶ mpsc ──▶ ┌───────────┐ ──▶ SqliteStore
//!        ▲                              │  Monitor  │
//!        └───────── oneshot reply ───── │  (owner)  │ ◀── interval tick
//!                                       └───────────┘
//! ```

use std::time::Duration;

use log::{info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::app::commands::{AppReply, HISTORY_ROWS, Operation, Request};
use crate::app::ports::{ClockPort, EventSink, Hardware};
use crate::app::service::MonitorService;
use crate::storage::SqliteStore;

/// Depth of the request queue between the HTTP layer and the owner.
pub const REQUEST_QUEUE_DEPTH: usize = 32;

/// One request plus the channel its answer goes back on.
pub struct Envelope {
    pub request: Request,
    pub reply: oneshot::Sender<AppReply>,
}

/// Sender half handed to the HTTP layer.
pub type RequestSender = mpsc::Sender<Envelope>;

/// Receiver half consumed by [`Monitor::run`].
pub type RequestReceiver = mpsc::Receiver<Envelope>;

pub fn request_channel() -> (RequestSender, RequestReceiver) {
    mpsc::channel(REQUEST_QUEUE_DEPTH)
}

pub struct Monitor<H, C, E> {
    service: MonitorService,
    hw: H,
    clock: C,
    sink: E,
    store: SqliteStore,
    tick_period: Duration,
}

impl<H, C, E> Monitor<H, C, E>
where
    H: Hardware,
    C: ClockPort,
    E: EventSink,
{
    pub fn new(
        service: MonitorService,
        hw: H,
        clock: C,
        sink: E,
        store: SqliteStore,
        tick_period: Duration,
    ) -> Self {
        Self {
            service,
            hw,
            clock,
            sink,
            store,
            tick_period,
        }
    }

    /// Tick and serve until every [`RequestSender`] is dropped.
    pub async fn run(mut self, mut requests: RequestReceiver) {
        self.service.start(&mut self.sink);

        let mut ticker = time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                envelope = requests.recv() => match envelope {
                    Some(envelope) => self.serve(envelope).await,
                    None => break,
                },
            }
        }

        info!("Request channel closed, monitor stopping");
        self.store.close().await;
    }

    /// Run one scheduler tick and any storage work it produced.
    pub async fn tick(&mut self) {
        let now = self.clock.uptime_ms();
        let report = self
            .service
            .tick(now, &mut self.hw, &self.clock, &mut self.sink);
        if let Some(reading) = report.persist {
            let wall = self.clock.wall_time();
            if let Err(e) = self.store.save_reading(&reading, wall, now).await {
                warn!("STORE | reading not saved: {e}");
            }
        }
    }

    /// Answer one request.
    pub async fn serve(&mut self, envelope: Envelope) {
        let Envelope { request, reply } = envelope;
        let now = self.clock.uptime_ms();

        let answer = match self.service.handle(request, now, &mut self.sink) {
            Operation::Reply(answer) => answer,
            Operation::LoadHistory => match self.store.query_recent(HISTORY_ROWS).await {
                Ok(rows) => AppReply::History(rows),
                Err(e) => {
                    warn!("STORE | history query failed: {e}");
                    AppReply::StorageFailed
                }
            },
            Operation::LoadMonthly => match self.store.query_monthly_averages().await {
                Ok(days) => AppReply::Monthly(days),
                Err(e) => {
                    warn!("STORE | monthly query failed: {e}");
                    AppReply::StorageFailed
                }
            },
            Operation::PersistSettings(settings) => {
                // Acknowledge first; the write is off the response path.
                let _ = reply.send(AppReply::SettingsSaved);
                if let Err(e) = self.store.save_settings(&settings).await {
                    warn!("STORE | settings not saved: {e}");
                }
                return;
            }
        };

        // The handler may have given up waiting; nothing to do then.
        let _ = reply.send(answer);
    }
}
