//! GPIO pin assignments for the TankWatch controller board.
//!
//! Target: ESP32-S3 (GPIO 26-32 are reserved for SPI flash/PSRAM there).
//!
//! Single source of truth.  Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Ultrasonic ranger (HC-SR04, 5 V echo through a divider)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a ping.
pub const TRIGGER_GPIO: i32 = 6;
/// Digital input: HIGH for the round-trip time of the ping.
pub const ECHO_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Piezo buzzer driver transistor (active HIGH).
pub const BUZZER_GPIO: i32 = 7;
/// Self-stop relay coil.  Energised = pump supply cut.
pub const RELAY_GPIO: i32 = 8;
/// Relay board input polarity.  Common opto-isolated boards are active LOW.
pub const RELAY_ACTIVE_HIGH: bool = true;

// ---------------------------------------------------------------------------
// User buttons (active-low, pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

pub const BUZZER_BUTTON_GPIO: i32 = 2;
pub const SELF_STOP_BUTTON_GPIO: i32 = 4;
