//! Shared mutable context threaded through every dispatcher state handler.
//!
//! `DispatchContext` holds the single job slot, the current tick instant,
//! the step deadline and the outbox the handlers write their modem
//! directive into.

/// Longest body the modem accepts in one text message.
pub const SMS_CAPACITY: usize = 160;

/// Byte that terminates a message body in text mode (Ctrl+Z).
pub const MESSAGE_TERMINATOR: u8 = 0x1A;

/// SMS body in a fixed-capacity buffer.
pub type SmsBody = heapless::String<SMS_CAPACITY>;

// ---------------------------------------------------------------------------
// Notification job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub recipient: String,
    pub body: SmsBody,
}

impl NotificationJob {
    /// Build a job; a body over [`SMS_CAPACITY`] bytes is cut at the last
    /// character boundary that fits.
    pub fn new(recipient: &str, body: &str) -> Self {
        let mut sms = SmsBody::new();
        for ch in body.chars() {
            if sms.push(ch).is_err() {
                break;
            }
        }
        Self {
            recipient: recipient.to_string(),
            body: sms,
        }
    }
}

// ---------------------------------------------------------------------------
// Modem directives
// ---------------------------------------------------------------------------

/// One write to the modem channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemDirective {
    /// Switch the modem to text mode.
    TextMode,
    /// Address the message.
    Recipient(String),
    /// Message text; the terminator byte is appended on the wire.
    Body(String),
}

impl ModemDirective {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::TextMode => b"AT+CMGF=1\r\n".to_vec(),
            Self::Recipient(number) => format!("AT+CMGS=\"{number}\"\r\n").into_bytes(),
            Self::Body(text) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(MESSAGE_TERMINATOR);
                bytes
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchContext
// ---------------------------------------------------------------------------

pub struct DispatchContext {
    /// Instant of the current tick (milliseconds, monotonic).
    pub now_ms: u64,
    /// Instant at which the current step may proceed.
    pub deadline_ms: u64,
    /// Delay between two directives.
    pub step_delay_ms: u64,
    /// Time granted to the modem after the body.
    pub send_wait_ms: u64,
    /// The single job slot.  `Some` from enqueue until the machine is idle
    /// again.
    pub job: Option<NotificationJob>,
    /// Directive produced by the last step, taken by the dispatcher.
    pub outbox: Option<ModemDirective>,
    /// Jobs whose body reached the modem (entered `Wait`).
    pub sent: u32,
}

impl DispatchContext {
    pub fn new(step_delay_ms: u64, send_wait_ms: u64) -> Self {
        Self {
            now_ms: 0,
            deadline_ms: 0,
            step_delay_ms,
            send_wait_ms,
            job: None,
            outbox: None,
            sent: 0,
        }
    }

    /// `true` once the current step's delay has elapsed.
    pub fn deadline_passed(&self) -> bool {
        self.now_ms >= self.deadline_ms
    }
}
