//! Actuator drivers, hardware initialisation, and interrupt entry points.

pub mod button;
pub mod hw_init;
pub mod output;
pub mod watchdog;
