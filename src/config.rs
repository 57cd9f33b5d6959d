//! System configuration parameters
//!
//! Tank geometry, actuator thresholds, and sampling timing.  These are
//! build-time constants gathered into a [`SystemConfig`] so they can be
//! validated once at startup and tuned without touching control logic.

use crate::error::ConfigError;

// --- Ranging ---

/// Speed of sound in air (cm/µs).
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.034;
/// Pings per sampling round fed to the median filter.
pub const MEDIAN_ITERATIONS: usize = 10;
/// Upper bound on pings per round (sizes the stack buffer).
pub const MAX_MEDIAN_ITERATIONS: usize = 32;
/// Settling gap between pings so stray echoes die out.
pub const PING_INTERVAL_MS: u32 = 30;

// --- Tank geometry ---

/// Sensor-to-surface distance when the tank is empty (cm).
pub const TANK_BOTTOM_DISTANCE_CM: f32 = 104.0;
/// Sensor-to-surface distance when the tank is full (cm).
pub const TANK_TOP_DISTANCE_CM: f32 = 25.0;
/// Inner radius of the (cylindrical) tank (cm).
pub const TANK_RADIUS_CM: f32 = 50.0;

// --- Thresholds ---

/// Fill percentage at which the buzzer sounds.
pub const BUZZER_THRESHOLD_PCT: u8 = 95;
/// Fill percentage at which the self-stop relay engages.
pub const STOP_THRESHOLD_PCT: u8 = 99;
/// Points below a threshold the level must fall before an output releases.
pub const HYSTERESIS_MARGIN_PCT: u8 = 3;
/// Longest the self-stop relay may stay engaged (10 minutes).
pub const MAX_RELAY_ON_MS: u64 = 600_000;

// --- Timing ---

/// Main loop cadence.
pub const CONTROL_LOOP_INTERVAL_MS: u32 = 1000;

/// Echo window for a tank whose empty surface sits `bottom_cm` away:
/// the full round trip plus 50 % margin.
pub const fn echo_window_us(bottom_cm: f32) -> u32 {
    (2.0 * bottom_cm / SPEED_OF_SOUND_CM_PER_US * 1.5) as u32
}

/// Physical tank dimensions as seen from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankGeometry {
    pub bottom_distance_cm: f32,
    pub top_distance_cm: f32,
    /// Reserved for the volumetric reading; 0 disables it.
    pub radius_cm: f32,
}

impl Default for TankGeometry {
    fn default() -> Self {
        Self {
            bottom_distance_cm: TANK_BOTTOM_DISTANCE_CM,
            top_distance_cm: TANK_TOP_DISTANCE_CM,
            radius_cm: TANK_RADIUS_CM,
        }
    }
}

impl TankGeometry {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self { bottom_distance_cm: bottom, top_distance_cm: top, radius_cm } = *self;
        if !bottom.is_finite() || !top.is_finite() {
            return Err(ConfigError::InvalidGeometry("distances must be finite"));
        }
        if top < 0.0 {
            return Err(ConfigError::InvalidGeometry("top distance must be >= 0"));
        }
        if bottom <= top {
            return Err(ConfigError::InvalidGeometry(
                "bottom distance must be greater than top distance",
            ));
        }
        if !radius_cm.is_finite() || radius_cm < 0.0 {
            return Err(ConfigError::InvalidGeometry("radius must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Output thresholds and the relay safety bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub buzzer_threshold_pct: u8,
    pub stop_threshold_pct: u8,
    pub hysteresis_pct: u8,
    pub max_relay_on_ms: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            buzzer_threshold_pct: BUZZER_THRESHOLD_PCT,
            stop_threshold_pct: STOP_THRESHOLD_PCT,
            hysteresis_pct: HYSTERESIS_MARGIN_PCT,
            max_relay_on_ms: MAX_RELAY_ON_MS,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.buzzer_threshold_pct) {
            return Err(ConfigError::InvalidThreshold("buzzer_threshold_pct must be 1–100"));
        }
        if !(1..=100).contains(&self.stop_threshold_pct) {
            return Err(ConfigError::InvalidThreshold("stop_threshold_pct must be 1–100"));
        }
        if self.buzzer_threshold_pct > self.stop_threshold_pct {
            return Err(ConfigError::InvalidThreshold(
                "buzzer_threshold_pct must be <= stop_threshold_pct",
            ));
        }
        if self.hysteresis_pct == 0 || self.hysteresis_pct >= self.buzzer_threshold_pct {
            return Err(ConfigError::InvalidThreshold(
                "hysteresis_pct must be > 0 and below buzzer_threshold_pct",
            ));
        }
        if self.max_relay_on_ms == 0 {
            return Err(ConfigError::InvalidThreshold("max_relay_on_ms must be > 0"));
        }
        Ok(())
    }
}

/// Ranging round parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    pub iterations: usize,
    pub echo_timeout_us: u32,
    pub ping_interval_ms: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            iterations: MEDIAN_ITERATIONS,
            echo_timeout_us: echo_window_us(TANK_BOTTOM_DISTANCE_CM),
            ping_interval_ms: PING_INTERVAL_MS,
        }
    }
}

impl SamplingConfig {
    /// Longest a full round can take: every ping waits out the rise and
    /// fall windows, then the settle gap.
    pub fn worst_case_round_ms(&self) -> u64 {
        let per_ping_us = 2 * u64::from(self.echo_timeout_us);
        let per_ping_ms = per_ping_us.div_ceil(1000) + u64::from(self.ping_interval_ms);
        self.iterations as u64 * per_ping_ms
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_MEDIAN_ITERATIONS).contains(&self.iterations) {
            return Err(ConfigError::InvalidSampling("iterations must be 1–32"));
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::InvalidSampling("echo_timeout_us must be > 0"));
        }
        Ok(())
    }
}

/// Core system configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemConfig {
    pub geometry: TankGeometry,
    pub thresholds: ThresholdConfig,
    pub sampling: SamplingConfig,
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            geometry: TankGeometry::default(),
            thresholds: ThresholdConfig::default(),
            sampling: SamplingConfig::default(),
            control_loop_interval_ms: CONTROL_LOOP_INTERVAL_MS,
        }
    }
}

impl SystemConfig {
    /// Check every section.  A failure here halts initialisation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        self.thresholds.validate()?;
        self.sampling.validate()?;
        if u64::from(self.control_loop_interval_ms) < self.sampling.worst_case_round_ms() {
            return Err(ConfigError::InvalidSampling(
                "control_loop_interval_ms shorter than a worst-case sampling round",
            ));
        }
        Ok(())
    }
}
