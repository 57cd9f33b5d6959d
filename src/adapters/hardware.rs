//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ultrasonic ranger and both switched outputs, exposing them
//! through [`RangingPort`] and [`OutputPort`].  On non-espidf targets the
//! output drivers use cfg-gated simulation stubs and the ranger is any
//! `RangingPort` (a scripted one in tests).

use crate::app::ports::{OutputPort, RangingPort};
use crate::drivers::output::SwitchedOutput;
use crate::error::SensorError;
use crate::sensors::ultrasonic::RawSample;

pub struct HardwareAdapter<R> {
    ranger: R,
    buzzer: SwitchedOutput,
    relay: SwitchedOutput,
}

impl<R: RangingPort> HardwareAdapter<R> {
    pub fn new(ranger: R, buzzer: SwitchedOutput, relay: SwitchedOutput) -> Self {
        Self { ranger, buzzer, relay }
    }

    pub fn buzzer_on(&self) -> bool {
        self.buzzer.is_on()
    }

    pub fn relay_on(&self) -> bool {
        self.relay.is_on()
    }

    /// Drive both outputs inactive.
    pub fn all_off(&mut self) {
        self.buzzer.set(false);
        self.relay.set(false);
    }
}

impl<R: RangingPort> RangingPort for HardwareAdapter<R> {
    fn measure_once(&mut self) -> Result<RawSample, SensorError> {
        self.ranger.measure_once()
    }
}

impl<R: RangingPort> OutputPort for HardwareAdapter<R> {
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }
}
