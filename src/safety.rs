//! Status supervisor.
//!
//! Runs once per control cycle, after the actuator decision, and folds
//! the cycle's health signals into a bitmask for the status display.
//! None of these faults stop the loop.  The relay safety bound itself
//! lives in the actuator controller; this module only reports it.
//!
//! | Fault               | Set when                              | Cleared when              |
//! |---------------------|---------------------------------------|---------------------------|
//! | `ReadingStale`      | the last sampling round failed        | a round succeeds          |
//! | `RelayTimeout`      | the relay safety bound has fired      | the safety latch clears   |
//! | `PersistencePending`| enable flags are not yet in storage   | a save succeeds           |

use core::fmt;

use log::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusFault {
    ReadingStale = 0b0000_0001,
    RelayTimeout = 0b0000_0010,
    PersistencePending = 0b0000_0100,
}

impl StatusFault {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for StatusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadingStale => write!(f, "reading stale"),
            Self::RelayTimeout => write!(f, "relay safety timeout"),
            Self::PersistencePending => write!(f, "flags not persisted"),
        }
    }
}

/// Inputs for one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleHealth {
    pub reading_stale: bool,
    pub safety_timeout_fired: bool,
    pub flags_dirty: bool,
}

#[derive(Debug, Default)]
pub struct SafetySupervisor {
    faults: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, health: CycleHealth) -> u8 {
        self.eval_fault(StatusFault::ReadingStale, health.reading_stale);
        self.eval_fault(StatusFault::RelayTimeout, health.safety_timeout_fired);
        self.eval_fault(StatusFault::PersistencePending, health.flags_dirty);
        self.faults
    }

    pub fn faults(&self) -> u8 {
        self.faults
    }

    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: StatusFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    fn eval_fault(&mut self, fault: StatusFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("STATUS FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("STATUS FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
