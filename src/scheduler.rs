//! Cooperative tick scheduler.
//!
//! Every periodic behaviour in the monitor is "due by elapsed time since
//! last run", checked once per tick.  The scheduler holds one [`Cadence`]
//! per task and notifies a [`SchedulerDelegate`] for each task whose due
//! instant has passed; it never sleeps and never blocks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        one tick                              │
//! │                                                              │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐   │
//! │  │ Sample   │  │ Dispatch │  │ Persist  │  │ Reconnect   │   │
//! │  │ (2 s)    │  │ (every)  │  │ (60 s)   │  │ (10 s)      │   │
//! │  └────┬─────┘  └────┬─────┘  └────┬─────┘  └──────┬──────┘   │
//! │       │             │             │               │          │
//! │       ▼             ▼             ▼               ▼          │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │   SchedulerDelegate::on_due(task) → Ran | Deferred      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A task that answers [`Disposition::Deferred`] stays due and is offered
//! again on the next tick.  Missed periods are never replayed: a task that
//! was due for several periods runs once and its next due instant is
//! measured from that run.

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

/// The periodic tasks, in the order they run within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    Sample = 0,
    Dispatch = 1,
    Persist = 2,
    Reconnect = 3,
}

impl TaskId {
    pub const COUNT: usize = 4;
    pub const ALL: [TaskId; Self::COUNT] =
        [Self::Sample, Self::Dispatch, Self::Persist, Self::Reconnect];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::Dispatch => "dispatch",
            Self::Persist => "persist",
            Self::Reconnect => "reconnect",
        }
    }
}

/// What the delegate did with a due task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The task ran; its next due instant moves one interval forward.
    Ran,
    /// The task could not run this tick; it stays due.
    Deferred,
}

/// Callback invoked for every due task.
pub trait SchedulerDelegate {
    fn on_due(&mut self, task: TaskId, now_ms: u64) -> Disposition;
}

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

/// "Next due" bookkeeping for one task.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    /// Period in milliseconds.  Zero means "every tick".
    pub interval_ms: u64,
    /// Instant of the last run, `None` before the first one.
    last_run_ms: Option<u64>,
}

impl Cadence {
    pub const fn every(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: None,
        }
    }

    /// Due on the first check, then once `interval_ms` has elapsed.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    pub fn mark_run(&mut self, now_ms: u64) {
        self.last_run_ms = Some(now_ms);
    }

    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    cadences: [Cadence; TaskId::COUNT],
}

impl Scheduler {
    /// Build a scheduler; `Dispatch` always runs every tick.
    pub fn new(sample_ms: u64, persist_ms: u64, reconnect_ms: u64) -> Self {
        Self {
            cadences: [
                Cadence::every(sample_ms),
                Cadence::every(0),
                Cadence::every(persist_ms),
                Cadence::every(reconnect_ms),
            ],
        }
    }

    /// Offer every due task to `delegate`, in [`TaskId::ALL`] order.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for task in TaskId::ALL {
            let cadence = &mut self.cadences[task as usize];
            if !cadence.is_due(now_ms) {
                continue;
            }
            match delegate.on_due(task, now_ms) {
                Disposition::Ran => cadence.mark_run(now_ms),
                Disposition::Deferred => debug!("Scheduler: '{}' deferred", task.label()),
            }
        }
    }

    pub fn cadence(&self, task: TaskId) -> &Cadence {
        &self.cadences[task as usize]
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
