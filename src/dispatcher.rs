//! Notification dispatcher: single-slot SMS queue in front of the FSM.
//!
//! Owns the dialogue [`Fsm`] and its [`DispatchContext`].  One job at a
//! time: `enqueue` refuses a new job until the machine is back in `Idle`
//! and has released the previous one.  Directives produced by a step are
//! written straight to the [`ModemPort`]; nothing is read back.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ModemPort};
use crate::fsm::context::{DispatchContext, NotificationJob};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

pub struct NotificationDispatcher {
    fsm: Fsm,
    ctx: DispatchContext,
    accepted: u32,
    dropped: u32,
}

impl NotificationDispatcher {
    pub fn new(step_delay_ms: u64, send_wait_ms: u64) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: DispatchContext::new(step_delay_ms, send_wait_ms),
            accepted: 0,
            dropped: 0,
        }
    }

    /// Offer a job.  Returns `false` (and drops the job) while another one
    /// is queued or in flight.
    pub fn enqueue(&mut self, job: NotificationJob) -> bool {
        if self.ctx.job.is_some() {
            self.dropped = self.dropped.wrapping_add(1);
            info!("SMS | busy, dropping job for {}", job.recipient);
            return false;
        }
        self.ctx.job = Some(job);
        self.accepted = self.accepted.wrapping_add(1);
        true
    }

    /// Run one step of the dialogue at instant `now_ms`.
    ///
    /// A failed modem write is logged and the dialogue carries on.
    pub fn advance(&mut self, now_ms: u64, modem: &mut impl ModemPort, sink: &mut impl EventSink) {
        let before = self.fsm.current_state();
        self.ctx.now_ms = now_ms;
        self.fsm.tick(&mut self.ctx);

        if let Some(directive) = self.ctx.outbox.take() {
            if let Err(e) = modem.send(&directive.to_bytes()) {
                warn!("SMS | modem write failed in {:?}: {e}", before);
            }
        }

        if before != StateId::Idle && self.fsm.current_state() == StateId::Idle {
            sink.emit(&AppEvent::NotificationCompleted);
        }
    }

    /// A job is queued or in flight.
    pub fn is_busy(&self) -> bool {
        self.ctx.job.is_some()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Jobs accepted by [`enqueue`](Self::enqueue).
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Jobs refused because the slot was taken.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Jobs whose body reached the modem.
    pub fn sent(&self) -> u32 {
        self.ctx.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModemError;

    #[derive(Default)]
    struct Wire {
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl ModemPort for Wire {
        fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
            self.writes.push(bytes.to_vec());
            if self.fail { Err(ModemError::Io) } else { Ok(()) }
        }
    }

    #[derive(Default)]
    struct Events(Vec<AppEvent>);

    impl EventSink for Events {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn run(d: &mut NotificationDispatcher, wire: &mut Wire, ev: &mut Events, until: u64) {
        let mut now = 0;
        while now <= until {
            d.advance(now, wire, ev);
            now += 50;
        }
    }

    #[test]
    fn second_job_dropped_while_busy() {
        let mut d = NotificationDispatcher::new(200, 3_000);
        assert!(d.enqueue(NotificationJob::new("+1", "first")));
        assert!(!d.enqueue(NotificationJob::new("+1", "second")));
        assert_eq!(d.accepted(), 1);
        assert_eq!(d.dropped(), 1);
        assert!(d.is_busy());
    }

    #[test]
    fn dialogue_writes_three_frames_then_frees_slot() {
        let mut d = NotificationDispatcher::new(200, 3_000);
        let mut wire = Wire::default();
        let mut ev = Events::default();
        d.enqueue(NotificationJob::new("+254711111111", "ALERT!"));

        run(&mut d, &mut wire, &mut ev, 5_000);

        assert_eq!(wire.writes.len(), 3);
        assert_eq!(wire.writes[0], b"AT+CMGF=1\r\n");
        assert_eq!(wire.writes[1], b"AT+CMGS=\"+254711111111\"\r\n");
        assert_eq!(wire.writes[2], b"ALERT!\x1a");
        assert!(!d.is_busy());
        assert_eq!(d.sent(), 1);
        assert_eq!(ev.0, vec![AppEvent::NotificationCompleted]);
        assert!(d.enqueue(NotificationJob::new("+1", "next")));
    }

    #[test]
    fn modem_failure_does_not_stall_dialogue() {
        let mut d = NotificationDispatcher::new(200, 3_000);
        let mut wire = Wire { fail: true, ..Wire::default() };
        let mut ev = Events::default();
        d.enqueue(NotificationJob::new("+1", "x"));
        run(&mut d, &mut wire, &mut ev, 5_000);
        assert_eq!(wire.writes.len(), 3);
        assert_eq!(d.state(), StateId::Idle);
        assert!(!d.is_busy());
    }
}
