//! Concrete dispatcher state handlers and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[job queued]──▶ MODE ──[emit AT+CMGF]──▶ NUMBER
//!    ▲                                               │
//!    │                                  [200 ms, emit AT+CMGS]
//!    │                                               ▼
//!    └──[3000 ms]── WAIT ◀──[200 ms, emit body]── CONTENT
//! ```
//!
//! The modem's answers are never read: `WAIT` returns to `IDLE` on time
//! alone.

use log::info;

use super::context::{DispatchContext, ModemDirective};
use super::{StateDescriptor, StateId};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Mode,
            name: "Mode",
            on_enter: None,
            on_exit: None,
            on_update: mode_update,
        },
        StateDescriptor {
            id: StateId::Number,
            name: "Number",
            on_enter: Some(stamp_step_delay),
            on_exit: None,
            on_update: number_update,
        },
        StateDescriptor {
            id: StateId::Content,
            name: "Content",
            on_enter: Some(stamp_step_delay),
            on_exit: None,
            on_update: content_update,
        },
        StateDescriptor {
            id: StateId::Wait,
            name: "Wait",
            on_enter: Some(wait_enter),
            on_exit: None,
            on_update: wait_update,
        },
    ]
}

fn stamp_step_delay(ctx: &mut DispatchContext) {
    ctx.deadline_ms = ctx.now_ms + ctx.step_delay_ms;
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut DispatchContext) {
    // The job is destroyed on the way back in.
    ctx.job = None;
}

fn idle_update(ctx: &mut DispatchContext) -> Option<StateId> {
    ctx.job.as_ref().map(|_| StateId::Mode)
}

// ═══════════════════════════════════════════════════════════════════════════
//  MODE
// ═══════════════════════════════════════════════════════════════════════════

fn mode_update(ctx: &mut DispatchContext) -> Option<StateId> {
    ctx.outbox = Some(ModemDirective::TextMode);
    Some(StateId::Number)
}

// ═══════════════════════════════════════════════════════════════════════════
//  NUMBER
// ═══════════════════════════════════════════════════════════════════════════

fn number_update(ctx: &mut DispatchContext) -> Option<StateId> {
    if !ctx.deadline_passed() {
        return None;
    }
    let recipient = ctx.job.as_ref().map(|j| j.recipient.clone()).unwrap_or_default();
    ctx.outbox = Some(ModemDirective::Recipient(recipient));
    Some(StateId::Content)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONTENT
// ═══════════════════════════════════════════════════════════════════════════

fn content_update(ctx: &mut DispatchContext) -> Option<StateId> {
    if !ctx.deadline_passed() {
        return None;
    }
    let body = ctx.job.as_ref().map(|j| j.body.to_string()).unwrap_or_default();
    ctx.outbox = Some(ModemDirective::Body(body));
    Some(StateId::Wait)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAIT
// ═══════════════════════════════════════════════════════════════════════════

fn wait_enter(ctx: &mut DispatchContext) {
    ctx.deadline_ms = ctx.now_ms + ctx.send_wait_ms;
    ctx.sent = ctx.sent.wrapping_add(1);
}

fn wait_update(ctx: &mut DispatchContext) -> Option<StateId> {
    if !ctx.deadline_passed() {
        return None;
    }
    if let Some(job) = &ctx.job {
        info!("SMS | dialogue to {} assumed complete", job.recipient);
    }
    Some(StateId::Idle)
}
