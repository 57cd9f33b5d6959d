//! Actuator decision logic.

pub mod actuator;

pub use actuator::{ActuatorCommands, ActuatorController, ActuatorState, EnableFlags};
