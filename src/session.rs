//! Session authority for the HTTP surface.
//!
//! One global session, not one per client:
//!
//! ```text
//!   login ok ──▶ Live { expiry = now + timeout }
//!                  │
//!                  ├── authenticated request ──▶ expiry = now + timeout
//!                  ├── now > expiry          ──▶ Closed
//!                  └── logout                ──▶ Closed
//! ```
//!
//! The cookie carries a fixed marker, so any client that presents it while
//! the session is live is let in.  Callers only see [`SessionAuthority`],
//! which leaves room for a per-session token scheme later.

use log::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "HIVESESSION";

/// Value the cookie carries while logged in.
pub const SESSION_MARKER: &str = "hive-authenticated";

pub trait SessionAuthority {
    /// Check credentials; on success the session becomes live.
    fn login(&mut self, username: &str, password: &str, now_ms: u64) -> bool;

    /// Close the session unconditionally.
    fn logout(&mut self);

    /// Validate a request given its raw `Cookie` header.
    ///
    /// An expired session is closed as a side effect.  A valid request
    /// slides the expiry forward by the full timeout.
    fn is_authenticated(&mut self, cookie_header: Option<&str>, now_ms: u64) -> bool;

    /// Whether the authority currently believes a session is open.
    fn is_live(&self) -> bool;

    /// Cookie value handed out on login.
    fn cookie_value(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Closed,
    Live { expiry_ms: u64 },
}

/// Fixed-credential, fixed-marker session.
pub struct MarkerSession {
    username: String,
    password: String,
    timeout_ms: u64,
    state: SessionState,
}

impl MarkerSession {
    pub fn new(username: &str, password: &str, timeout_ms: u64) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            timeout_ms,
            state: SessionState::Closed,
        }
    }

    /// Expiry instant of the live session, if any.
    pub fn expiry_ms(&self) -> Option<u64> {
        match self.state {
            SessionState::Live { expiry_ms } => Some(expiry_ms),
            SessionState::Closed => None,
        }
    }
}

impl SessionAuthority for MarkerSession {
    fn login(&mut self, username: &str, password: &str, now_ms: u64) -> bool {
        let ok = constant_time_eq(username.as_bytes(), self.username.as_bytes())
            & constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if ok {
            self.state = SessionState::Live {
                expiry_ms: now_ms.saturating_add(self.timeout_ms),
            };
            debug!("AUTH | credentials accepted for '{username}'");
        } else {
            debug!("AUTH | credentials rejected for '{username}'");
        }
        ok
    }

    fn logout(&mut self) {
        self.state = SessionState::Closed;
    }

    fn is_authenticated(&mut self, cookie_header: Option<&str>, now_ms: u64) -> bool {
        let SessionState::Live { expiry_ms } = self.state else {
            return false;
        };
        if now_ms > expiry_ms {
            self.state = SessionState::Closed;
            return false;
        }
        if !presents_marker(cookie_header) {
            return false;
        }
        self.state = SessionState::Live {
            expiry_ms: now_ms.saturating_add(self.timeout_ms),
        };
        true
    }

    fn is_live(&self) -> bool {
        matches!(self.state, SessionState::Live { .. })
    }

    fn cookie_value(&self) -> &str {
        SESSION_MARKER
    }
}

/// `true` when the `Cookie` header holds `HIVESESSION=<marker>`.
fn presents_marker(header: Option<&str>) -> bool {
    let Some(header) = header else {
        return false;
    };
    header.split(';').any(|pair| match pair.trim().split_once('=') {
        Some((name, value)) => name == SESSION_COOKIE && value == SESSION_MARKER,
        None => false,
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
