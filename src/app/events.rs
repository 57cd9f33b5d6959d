//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, drive an LCD, etc.

use crate::control::actuator::EnableFlags;
use crate::error::{PersistenceError, SensorError};
use crate::sensors::level::FillPercentage;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the boot-time flags).
    Started(EnableFlags),

    /// Per-cycle status for the display collaborator.
    Status(StatusSnapshot),

    /// Buzzer output changed level.
    BuzzerChanged(bool),

    /// Self-stop relay output changed level.
    RelayChanged(bool),

    /// The relay hit its maximum on-time and was released.
    SafetyTimeout,

    /// A sampling round failed; the previous reading was kept.
    CycleSkipped { consecutive: u32, error: SensorError },

    /// A user toggle changed the enable flags.
    FlagsChanged(EnableFlags),

    /// Saving the enable flags failed; will retry.
    PersistFailed(PersistenceError),
}

/// Point-in-time status, produced once per control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    /// Last good fill level; `None` until the first successful round.
    pub fill: Option<FillPercentage>,
    pub volume_litres: Option<f32>,
    pub buzzer_on: bool,
    pub relay_on: bool,
    pub safety_timeout_fired: bool,
    pub buzzer_enabled: bool,
    pub self_stop_enabled: bool,
    /// The most recent round failed and `fill` is from an earlier cycle.
    pub stale: bool,
    pub consecutive_skips: u32,
    /// [`StatusFault`](crate::safety::StatusFault) bitmask.
    pub status_flags: u8,
}
