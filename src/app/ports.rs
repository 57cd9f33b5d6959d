//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ultrasonic sensor, buzzer/relay outputs, event sinks,
//! flag storage, clock) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the domain core never touches hardware directly.

use crate::control::actuator::EnableFlags;
use crate::error::{PersistenceError, SensorError};
use crate::sensors::ultrasonic::RawSample;

// ───────────────────────────────────────────────────────────────
// Ranging port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One ultrasonic ping.
pub trait RangingPort {
    /// Fire a trigger pulse and time the echo.
    ///
    /// Must return within the configured echo window; a missing echo is
    /// [`SensorError::EchoTimeout`], never a hang.
    fn measure_once(&mut self) -> Result<RawSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the two binary outputs.
pub trait OutputPort {
    /// Sound or silence the buzzer.
    fn set_buzzer(&mut self, on: bool);

    /// Engage or release the engine/pump self-stop relay.
    fn set_relay(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → display / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, LCD,
/// alternate display).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Flag store port (driven adapter: domain ↔ persisted enable flags)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the two user enable flags.
///
/// Callers treat every error as soft: a failed load falls back to
/// [`EnableFlags::default()`], a failed save is retried later.
pub trait FlagStore {
    /// Load the flags.  [`PersistenceError::NotFound`] on first boot,
    /// [`PersistenceError::Corrupted`] if the record cannot be decoded.
    fn load(&self) -> Result<EnableFlags, PersistenceError>;

    /// Persist the flags.
    fn save(&mut self, flags: &EnableFlags) -> Result<(), PersistenceError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage.
///
/// Keys are namespaced to prevent collisions between subsystems.  Writes
/// MUST be atomic: no partial record on power loss.  ESP-IDF NVS
/// guarantees this per `nvs_commit()`.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, PersistenceError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), PersistenceError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait Clock {
    /// Microseconds since boot.
    fn now_us(&self) -> u64;

    /// Milliseconds since boot.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
