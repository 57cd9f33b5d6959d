//! Inbound commands to the application service.
//!
//! Button toggles arrive through the ISR queue and are translated into
//! these by [`AppService::drain_toggles`](super::service::AppService::drain_toggles);
//! a serial console or test harness can send them directly.

use crate::events::ToggleEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Flip the buzzer enable flag.
    ToggleBuzzer,

    /// Flip the self-stop enable flag.
    ToggleSelfStop,

    /// Retry persisting the enable flags if an earlier save failed.
    FlushFlags,
}

impl From<ToggleEvent> for AppCommand {
    fn from(event: ToggleEvent) -> Self {
        match event {
            ToggleEvent::Buzzer => Self::ToggleBuzzer,
            ToggleEvent::SelfStop => Self::ToggleSelfStop,
        }
    }
}
