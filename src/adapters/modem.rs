//! GSM modem adapters.
//!
//! - [`LogModem`]: host backend; logs every directive and keeps a copy of
//!   the bytes so a simulation run can be inspected.
//! - [`UartModem`] (feature `rpi`): writes to the modem over the Pi's UART
//!   in non-blocking mode.  Nothing is ever read back.

use log::info;

use crate::app::ports::ModemPort;
use crate::error::ModemError;

/// Simulated modem that logs what it is sent.
#[derive(Debug, Default)]
pub struct LogModem {
    written: Vec<u8>,
}

impl LogModem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every byte sent since start.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl ModemPort for LogModem {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
        info!("SMS | modem <- {}", printable(bytes));
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}

/// Render control bytes so a directive fits on one log line.
fn printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\r' => out.push_str("\\r"),
            b'\n' => out.push_str("\\n"),
            0x1A => out.push_str("<SUB>"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}

#[cfg(feature = "rpi")]
pub use uart::UartModem;

#[cfg(feature = "rpi")]
mod uart {
    use log::{info, warn};
    use rppal::uart::{Parity, Uart};

    use crate::app::ports::ModemPort;
    use crate::error::ModemError;

    pub struct UartModem {
        uart: Uart,
    }

    impl UartModem {
        pub fn open(device: &str, baud_rate: u32) -> anyhow::Result<Self> {
            let mut uart = Uart::with_path(device, baud_rate, Parity::None, 8, 1)?;
            uart.set_write_mode(false)?;
            info!("SMS | UART modem on {device} @ {baud_rate} baud");
            Ok(Self { uart })
        }
    }

    impl ModemPort for UartModem {
        fn send(&mut self, bytes: &[u8]) -> Result<(), ModemError> {
            match self.uart.write(bytes) {
                Ok(n) if n == bytes.len() => Ok(()),
                Ok(n) => {
                    warn!("SMS | UART accepted {n} of {} bytes", bytes.len());
                    Err(ModemError::ShortWrite)
                }
                Err(e) => {
                    warn!("SMS | UART write failed: {e}");
                    Err(ModemError::Io)
                }
            }
        }
    }
}
