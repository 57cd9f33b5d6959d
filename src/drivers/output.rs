//! Binary switched output (buzzer, relay).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers, honouring the
//! board's active level.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct SwitchedOutput {
    gpio: i32,
    active_high: bool,
    on: bool,
}

impl SwitchedOutput {
    /// Wraps an already-configured output pin and drives it inactive.
    pub fn new(gpio: i32, active_high: bool) -> Self {
        let mut out = Self {
            gpio,
            active_high,
            on: true,
        };
        out.set(false);
        out
    }

    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        hw_init::gpio_write(self.gpio, on == self.active_high);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}
