//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the sensing pipeline, the actuator controller, and
//! the status supervisor.  It exposes a hardware-agnostic API; all I/O
//! flows through port traits injected at call sites, so the whole
//! service is testable with mock adapters.
//!
//! ```text
//!  RangingPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          AppService           │
//!   OutputPort ◀── │ Median · Level · Actuator     │ ◀─▶ FlagStore
//!                  └──────────────────────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Run one sampling round through the median filter.
//! 2. On success, convert to a fill percentage and feed the controller.
//!    On failure, keep the previous reading and outputs, raise *stale*,
//!    and apply only the relay safety bound.
//! 3. Drive the outputs, evaluate status faults, emit a snapshot.
//!
//! Toggles are applied between cycles, never during one.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::actuator::{ActuatorCommands, ActuatorController, EnableFlags};
use crate::error::{Error, PersistenceError};
use crate::events::{ToggleEvent, ToggleQueue};
use crate::safety::{CycleHealth, SafetySupervisor};
use crate::sensors::level::{FillPercentage, LevelModel};
use crate::sensors::median::MedianFilter;

use super::commands::AppCommand;
use super::events::{AppEvent, StatusSnapshot};
use super::ports::{EventSink, FlagStore, OutputPort, RangingPort};

/// Last successful level reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelReading {
    pub distance_cm: f32,
    pub fill: FillPercentage,
    pub volume_litres: f32,
    pub valid_samples: u8,
    pub at_ms: u64,
}

pub struct AppService {
    filter: MedianFilter,
    level: LevelModel,
    controller: ActuatorController,
    supervisor: SafetySupervisor,
    last_reading: Option<LevelReading>,
    stale: bool,
    consecutive_skips: u32,
    cycle_count: u64,
    /// Outputs as last written to the [`OutputPort`].
    applied: ActuatorCommands,
    flags_dirty: bool,
}

impl AppService {
    /// Validate `config` and build the service.  Outputs start off.
    pub fn new(config: SystemConfig, flags: EnableFlags) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            filter: MedianFilter::new(config.sampling.iterations)?,
            level: LevelModel::new(config.geometry)?,
            controller: ActuatorController::new(config.thresholds, flags),
            supervisor: SafetySupervisor::new(),
            last_reading: None,
            stale: false,
            consecutive_skips: 0,
            cycle_count: 0,
            applied: ActuatorCommands::default(),
            flags_dirty: false,
        })
    }

    /// Load persisted flags, falling back to defaults.
    ///
    /// The second element is `true` when the defaults should be written
    /// back (first boot or an unreadable record).
    pub fn load_flags(store: &impl FlagStore) -> (EnableFlags, bool) {
        match store.load() {
            Ok(flags) => (flags, false),
            Err(PersistenceError::NotFound) => {
                info!("flags: none stored, using defaults");
                (EnableFlags::default(), true)
            }
            Err(e) => {
                warn!("flags: load failed ({e}), using defaults");
                (EnableFlags::default(), true)
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let flags = self.controller.flags();
        sink.emit(&AppEvent::Started(flags));
        info!(
            "AppService started (buzzer={}, self_stop={})",
            flags.buzzer_enabled, flags.self_stop_enabled
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle at monotonic time `now_ms`.
    ///
    /// `hw` satisfies **both** [`RangingPort`] and [`OutputPort`], which
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl RangingPort + OutputPort),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> StatusSnapshot {
        self.cycle_count += 1;

        match self.filter.sample(hw) {
            Ok(filtered) => {
                let fill = self.level.to_percentage(filtered.cm);
                self.last_reading = Some(LevelReading {
                    distance_cm: filtered.cm,
                    fill,
                    volume_litres: self.level.water_volume_litres(filtered.cm),
                    valid_samples: filtered.valid_samples,
                    at_ms: now_ms,
                });
                if self.stale {
                    info!("level: readings recovered after {} skipped cycles", self.consecutive_skips);
                }
                self.stale = false;
                self.consecutive_skips = 0;
                self.controller.update(fill, now_ms);
            }
            Err(e) => {
                self.stale = true;
                self.consecutive_skips = self.consecutive_skips.saturating_add(1);
                warn!("level: cycle skipped ({e}), {} in a row", self.consecutive_skips);
                sink.emit(&AppEvent::CycleSkipped {
                    consecutive: self.consecutive_skips,
                    error: e,
                });
                self.controller.enforce_safety_bound(now_ms);
            }
        }

        self.apply_outputs(hw, sink);
        self.supervisor.evaluate(CycleHealth {
            reading_stale: self.stale,
            safety_timeout_fired: self.controller.state().safety_timeout_fired,
            flags_dirty: self.flags_dirty,
        });

        let snap = self.snapshot();
        sink.emit(&AppEvent::Status(snap));
        snap
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl OutputPort,
        store: &mut impl FlagStore,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        match cmd {
            AppCommand::ToggleBuzzer => self.apply_toggle(ToggleEvent::Buzzer, hw, store, sink, now_ms),
            AppCommand::ToggleSelfStop => {
                self.apply_toggle(ToggleEvent::SelfStop, hw, store, sink, now_ms);
            }
            AppCommand::FlushFlags => {
                self.force_save_if_dirty(store, sink);
            }
        }
    }

    /// Apply every toggle the ISRs queued since the last call.
    /// Returns how many were applied.
    pub fn drain_toggles(
        &mut self,
        queue: &ToggleQueue,
        hw: &mut impl OutputPort,
        store: &mut impl FlagStore,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> usize {
        let mut applied = 0;
        while let Some(event) = queue.pop() {
            self.handle_command(event.into(), hw, store, sink, now_ms);
            applied += 1;
        }
        applied
    }

    // ── Flag persistence ──────────────────────────────────────

    /// Mark the flags as needing a save (e.g. boot save of defaults).
    pub fn mark_flags_dirty(&mut self) {
        self.flags_dirty = true;
    }

    /// Save the flags if a previous save failed or was never made.
    /// Returns `true` if the store now matches the live flags.
    pub fn force_save_if_dirty(&mut self, store: &mut impl FlagStore, sink: &mut impl EventSink) -> bool {
        if !self.flags_dirty {
            return true;
        }
        self.persist_flags(store, sink)
    }

    pub fn is_flags_dirty(&self) -> bool {
        self.flags_dirty
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StatusSnapshot {
        let state = self.controller.state();
        StatusSnapshot {
            fill: self.last_reading.map(|r| r.fill),
            volume_litres: self.last_reading.map(|r| r.volume_litres),
            buzzer_on: state.buzzer_on,
            relay_on: state.relay_on,
            safety_timeout_fired: state.safety_timeout_fired,
            buzzer_enabled: state.flags.buzzer_enabled,
            self_stop_enabled: state.flags.self_stop_enabled,
            stale: self.stale,
            consecutive_skips: self.consecutive_skips,
            status_flags: self.supervisor.faults(),
        }
    }

    pub fn last_reading(&self) -> Option<&LevelReading> {
        self.last_reading.as_ref()
    }

    pub fn controller(&self) -> &ActuatorController {
        &self.controller
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_toggle(
        &mut self,
        event: ToggleEvent,
        hw: &mut impl OutputPort,
        store: &mut impl FlagStore,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        let flags = self.controller.toggle(event, now_ms);
        sink.emit(&AppEvent::FlagsChanged(flags));
        self.flags_dirty = true;
        self.persist_flags(store, sink);
        self.apply_outputs(hw, sink);
    }

    fn persist_flags(&mut self, store: &mut impl FlagStore, sink: &mut impl EventSink) -> bool {
        match store.save(&self.controller.flags()) {
            Ok(()) => {
                self.flags_dirty = false;
                true
            }
            Err(e) => {
                warn!("flags: save failed ({e}), will retry");
                sink.emit(&AppEvent::PersistFailed(e));
                false
            }
        }
    }

    /// Write the controller's commands to the outputs and report changes.
    fn apply_outputs(&mut self, hw: &mut impl OutputPort, sink: &mut impl EventSink) {
        let cmds = self.controller.commands();
        hw.set_buzzer(cmds.buzzer_on);
        hw.set_relay(cmds.relay_on);

        if cmds.buzzer_on != self.applied.buzzer_on {
            sink.emit(&AppEvent::BuzzerChanged(cmds.buzzer_on));
        }
        if cmds.relay_on != self.applied.relay_on {
            sink.emit(&AppEvent::RelayChanged(cmds.relay_on));
            if !cmds.relay_on && self.controller.state().safety_timeout_fired {
                sink.emit(&AppEvent::SafetyTimeout);
            }
        }
        self.applied = cmds;
    }
}
