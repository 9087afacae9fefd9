//! Error types for the HiveWatch monitor.
//!
//! One enum per subsystem, each returned from the port or store call that
//! produces it.  None of these are fatal once the monitor is running: the
//! tick logs them and carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Device did not answer or is not ready (e.g. load-cell ADC busy).
    NotReady,
    /// Device answered with a value that is not a number.
    Malformed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "device not ready"),
            Self::Malformed => write!(f, "malformed reading"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Modem errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// Fewer bytes were accepted than were offered.
    ShortWrite,
    /// The underlying serial driver returned an error.
    Io,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortWrite => write!(f, "short write to modem"),
            Self::Io => write!(f, "modem I/O error"),
        }
    }
}

impl std::error::Error for ModemError {}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StorageError {
    /// SQLite open, prepare or step failed.
    Database(sqlx::Error),
    /// The settings singleton row is missing after `open()`.
    MissingSettings,
    /// A stored settings row no longer passes validation.
    CorruptSettings(SettingsError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "database: {e}"),
            Self::MissingSettings => write!(f, "settings row missing"),
            Self::CorruptSettings(e) => write!(f, "stored settings invalid: {e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::CorruptSettings(e) => Some(e),
            Self::MissingSettings => None,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

// ---------------------------------------------------------------------------
// Settings validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}
