//! Buzzer and self-stop relay decision logic.
//!
//! Two independent two-state machines share one percentage input; both
//! outputs may be on at once.
//!
//! ```text
//!  Buzzer:  IDLE ──[pct ≥ buzz]──▶ ARMED ──[pct < buzz − h]──▶ IDLE
//!           output = enabled ∧ ARMED
//!
//!  Relay:   IDLE ──[pct ≥ stop]──▶ ARMED ──[pct < stop − h]──▶ IDLE
//!           output = enabled ∧ ARMED ∧ ¬latched
//!           output on for max_relay_on_ms ──▶ output off + safety latch
//! ```
//!
//! The hysteresis memory (ARMED) keeps tracking the level while an output
//! is disabled, so toggling an enable flag off and on again with the same
//! level restores the same decision, inside the margin band included.
//!
//! Threshold comparisons use [`FillPercentage::whole`] (half-up rounding).
//! The safety latch keeps the relay from re-engaging on the same stuck
//! reading; it clears when the level falls below `stop − h` or when the
//! user disables self-stop.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::events::ToggleEvent;
use crate::sensors::level::FillPercentage;

/// User-toggleable enables, persisted across power cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableFlags {
    pub buzzer_enabled: bool,
    pub self_stop_enabled: bool,
}

impl Default for EnableFlags {
    fn default() -> Self {
        Self {
            buzzer_enabled: true,
            self_stop_enabled: true,
        }
    }
}

/// Output levels the controller wants applied this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorCommands {
    pub buzzer_on: bool,
    pub relay_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub flags: EnableFlags,
    pub buzzer_on: bool,
    pub relay_on: bool,
    /// Monotonic ms at which the relay last engaged.
    pub relay_on_since: Option<u64>,
    pub safety_timeout_fired: bool,
}

/// One threshold with a release margin below it.
fn hysteresis(armed: bool, pct: u8, threshold: u8, margin: u8) -> bool {
    if armed { pct >= threshold.saturating_sub(margin) } else { pct >= threshold }
}

pub struct ActuatorController {
    thresholds: ThresholdConfig,
    state: ActuatorState,
    last_pct: Option<FillPercentage>,
    /// Level-side state of each sub-machine, independent of its enable.
    buzzer_armed: bool,
    relay_armed: bool,
}

impl ActuatorController {
    pub fn new(thresholds: ThresholdConfig, flags: EnableFlags) -> Self {
        Self {
            thresholds,
            state: ActuatorState {
                flags,
                buzzer_on: false,
                relay_on: false,
                relay_on_since: None,
                safety_timeout_fired: false,
            },
            last_pct: None,
            buzzer_armed: false,
            relay_armed: false,
        }
    }

    /// Feed one cycle's percentage and return the resulting commands.
    pub fn update(&mut self, pct: FillPercentage, now_ms: u64) -> ActuatorCommands {
        self.last_pct = Some(pct);
        let whole = pct.whole();
        self.buzzer_armed = hysteresis(
            self.buzzer_armed,
            whole,
            self.thresholds.buzzer_threshold_pct,
            self.thresholds.hysteresis_pct,
        );
        self.relay_armed = hysteresis(
            self.relay_armed,
            whole,
            self.thresholds.stop_threshold_pct,
            self.thresholds.hysteresis_pct,
        );
        self.eval_buzzer(Some(whole));
        self.eval_relay(Some(whole), now_ms);
        self.commands()
    }

    /// Apply the relay on-time bound without a fresh reading.
    ///
    /// Called on cycles whose sampling failed so a dead sensor cannot hold
    /// the relay engaged.  Returns `true` if the bound fired now.
    pub fn enforce_safety_bound(&mut self, now_ms: u64) -> bool {
        let Some(since) = self.state.relay_on_since else {
            return false;
        };
        if !self.state.relay_on || now_ms.saturating_sub(since) < self.thresholds.max_relay_on_ms {
            return false;
        }
        self.state.relay_on = false;
        self.state.relay_on_since = None;
        self.state.safety_timeout_fired = true;
        warn!(
            "relay: engaged for {} ms, released by safety bound",
            now_ms.saturating_sub(since)
        );
        true
    }

    /// Flip the enable flag named by `event` and re-evaluate that output
    /// against the last known level.  Returns the new flags.
    pub fn toggle(&mut self, event: ToggleEvent, now_ms: u64) -> EnableFlags {
        match event {
            ToggleEvent::Buzzer => self.set_buzzer_enabled(!self.state.flags.buzzer_enabled),
            ToggleEvent::SelfStop => {
                self.set_self_stop_enabled(!self.state.flags.self_stop_enabled, now_ms);
            }
        }
        self.state.flags
    }

    pub fn set_buzzer_enabled(&mut self, enabled: bool) {
        self.state.flags.buzzer_enabled = enabled;
        info!("buzzer: {}", if enabled { "enabled" } else { "disabled" });
        self.eval_buzzer(self.last_pct.map(FillPercentage::whole));
    }

    pub fn set_self_stop_enabled(&mut self, enabled: bool, now_ms: u64) {
        self.state.flags.self_stop_enabled = enabled;
        info!("self-stop: {}", if enabled { "enabled" } else { "disabled" });
        self.eval_relay(self.last_pct.map(FillPercentage::whole), now_ms);
    }

    pub fn commands(&self) -> ActuatorCommands {
        ActuatorCommands {
            buzzer_on: self.state.buzzer_on,
            relay_on: self.state.relay_on,
        }
    }

    pub fn state(&self) -> &ActuatorState {
        &self.state
    }

    pub fn flags(&self) -> EnableFlags {
        self.state.flags
    }

    // ── Sub-machines ──────────────────────────────────────────

    /// `pct` only labels the log lines; the decision comes from
    /// `buzzer_armed`.
    fn eval_buzzer(&mut self, pct: Option<u8>) {
        let want = self.state.flags.buzzer_enabled && self.buzzer_armed;
        if want == self.state.buzzer_on {
            return;
        }
        self.state.buzzer_on = want;
        let word = if want { "ON" } else { "OFF" };
        if !self.state.flags.buzzer_enabled {
            info!("buzzer: OFF (disabled)");
        } else if let Some(pct) = pct {
            info!("buzzer: {word} at {pct}%");
        } else {
            info!("buzzer: {word}");
        }
    }

    fn eval_relay(&mut self, pct: Option<u8>, now_ms: u64) {
        if !self.state.flags.self_stop_enabled {
            if self.state.relay_on {
                info!("relay: released (self-stop disabled)");
            }
            self.release_relay();
            self.state.safety_timeout_fired = false;
            return;
        }
        let Some(pct) = pct else {
            return;
        };

        if !self.relay_armed {
            if self.state.relay_on {
                info!("relay: released at {pct}%");
            }
            self.release_relay();
            if self.state.safety_timeout_fired {
                info!("relay: safety latch cleared at {pct}%");
                self.state.safety_timeout_fired = false;
            }
            return;
        }

        if self.state.relay_on {
            self.enforce_safety_bound(now_ms);
        } else if !self.state.safety_timeout_fired {
            self.state.relay_on = true;
            self.state.relay_on_since = Some(now_ms);
            info!("relay: engaged at {pct}%");
        }
    }

    fn release_relay(&mut self) {
        self.state.relay_on = false;
        self.state.relay_on_since = None;
    }
}
