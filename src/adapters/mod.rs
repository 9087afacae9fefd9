//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `clock`     | ClockPort          | `Instant` + local wall clock  |
//! | `hardware`  | SensorPort         | sensor backend                |
//! |             | ModemPort          | modem backend                 |
//! |             | ConnectivityPort   | network link                  |
//! | `log_sink`  | EventSink          | `log` facade                  |
//! | `modem`     | ModemPort          | log output / Pi UART (`rpi`)  |
//! | `network`   | ConnectivityPort   | sysfs operstate + command     |

pub mod clock;
pub mod hardware;
pub mod log_sink;
pub mod modem;
pub mod network;
