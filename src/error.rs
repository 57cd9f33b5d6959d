//! Unified error types for the TankWatch firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the service and event sink without allocation.
//!
//! | Error              | Raised by           | Handling                          |
//! |--------------------|---------------------|-----------------------------------|
//! | `EchoTimeout`      | one ultrasonic ping | excluded from the median set      |
//! | `InsufficientData` | a sampling round    | cycle skipped, last reading kept  |
//! | `Config`           | startup validation  | fatal, initialisation halts       |
//! | `Persistence`      | flag store          | logged, retried on next toggle    |

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Ranging failed for a single ping or a whole sampling round.
    Sensor(SensorError),
    /// Build-time configuration is invalid.
    Config(ConfigError),
    /// Enable flags could not be read from or written to storage.
    Persistence(PersistenceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Persistence(e) => write!(f, "persistence: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No echo edge arrived inside the bounded echo window.
    EchoTimeout,
    /// Reading or driving the trigger/echo pin failed.
    PinFault,
    /// More than half the pings of a sampling round failed.
    InsufficientData { valid: u8, iterations: u8 },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoTimeout => write!(f, "echo timeout"),
            Self::PinFault => write!(f, "trigger/echo pin fault"),
            Self::InsufficientData { valid, iterations } => {
                write!(f, "insufficient data ({valid}/{iterations} valid pings)")
            }
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Invalid build-time configuration.  The `&'static str` names the field
/// and the rule it broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Tank geometry cannot produce a percentage (e.g. bottom <= top).
    InvalidGeometry(&'static str),
    /// Threshold, hysteresis, or safety-bound values are out of range.
    InvalidThreshold(&'static str),
    /// Sampling parameters are out of range.
    InvalidSampling(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            Self::InvalidThreshold(msg) => write!(f, "invalid threshold: {msg}"),
            Self::InvalidSampling(msg) => write!(f, "invalid sampling: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceError {
    /// Requested key does not exist (first boot).
    NotFound,
    /// Stored record failed to decode or carries an unknown version.
    Corrupted,
    /// Storage partition is full.
    Full,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "stored record corrupted"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<PersistenceError> for Error {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
