//! Network link adapter for Linux hosts.
//!
//! Implements [`ConnectivityPort`] over sysfs and a reconnect command.
//!
//! - Link state is read from `/sys/class/net/<iface>/operstate`.
//! - A reconnect spawns the configured command (for example
//!   `wpa_cli -i wlan0 reconnect`) and returns at once.  The child is
//!   reaped on a later poll, and no second attempt starts while it runs.
//! - An interface that does not exist at start-up is treated as
//!   unmanaged and always reported as connected.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use log::{debug, info, warn};

use crate::app::ports::ConnectivityPort;

const SYSFS_NET: &str = "/sys/class/net";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Interface not present; never reconnected.
    Unmanaged,
    Up,
    Down,
    Reconnecting { attempt: u32 },
}

pub struct NetLink {
    interface: String,
    operstate: PathBuf,
    command: Vec<String>,
    child: Option<Child>,
    state: LinkState,
    attempts: u32,
}

impl NetLink {
    pub fn new(interface: &str, command: Vec<String>) -> Self {
        Self::with_sysfs_root(Path::new(SYSFS_NET), interface, command)
    }

    /// Same as [`new`](Self::new) with a different sysfs `class/net` root.
    pub fn with_sysfs_root(root: &Path, interface: &str, command: Vec<String>) -> Self {
        let operstate = root.join(interface).join("operstate");
        let state = if operstate.exists() {
            LinkState::Up
        } else {
            info!("NET | {interface} not found, link monitoring disabled");
            LinkState::Unmanaged
        };
        Self {
            interface: interface.to_string(),
            operstate,
            command,
            child: None,
            state,
            attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    fn read_operstate(&self) -> bool {
        match fs::read_to_string(&self.operstate) {
            Ok(s) => s.trim() == "up",
            Err(e) => {
                debug!("NET | cannot read {}: {e}", self.operstate.display());
                false
            }
        }
    }

    /// Collect a finished reconnect child, if any.
    fn reap(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("NET | reconnect command exited with {status}");
                self.child = None;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("NET | cannot poll reconnect command: {e}");
                self.child = None;
            }
        }
    }
}

impl ConnectivityPort for NetLink {
    fn is_connected(&mut self) -> bool {
        self.reap();
        if self.state == LinkState::Unmanaged {
            return true;
        }
        let up = self.read_operstate();
        if up {
            if self.state != LinkState::Up {
                info!("NET | {} up after {} attempt(s)", self.interface, self.attempts);
            }
            self.state = LinkState::Up;
            self.attempts = 0;
        } else if self.state == LinkState::Up {
            self.state = LinkState::Down;
        }
        up
    }

    fn begin_reconnect(&mut self) -> Option<u32> {
        if self.state == LinkState::Unmanaged {
            return None;
        }
        if self.child.is_some() {
            debug!("NET | previous reconnect still running");
            return None;
        }
        let Some((program, args)) = self.command.split_first() else {
            warn!("NET | {} down and no reconnect command configured", self.interface);
            return None;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                self.attempts = self.attempts.saturating_add(1);
                self.state = LinkState::Reconnecting {
                    attempt: self.attempts,
                };
                info!("NET | reconnect attempt {} ({program})", self.attempts);
                self.child = Some(child);
                Some(self.attempts)
            }
            Err(e) => {
                warn!("NET | cannot start '{program}': {e}");
                None
            }
        }
    }
}
