//! HC-SR04 style ultrasonic ranger.
//!
//! A 10 µs trigger pulse starts a burst; the sensor then holds its echo
//! line high for the round-trip time of the sound.  Both edges are
//! polled against a bounded window so a missing or stuck echo can never
//! stall the control loop.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` 1.0 pin and delay traits plus a [`Clock`].
//! On ESP-IDF the main binary passes `PinDriver`s and the `Ets` delay; on
//! host the tests pass scripted mock pins driven by a fake clock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{Clock, RangingPort};
use crate::config::{SPEED_OF_SOUND_CM_PER_US, SamplingConfig};
use crate::error::SensorError;

/// One echo-pulse duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub duration_us: u32,
}

impl RawSample {
    pub fn new(duration_us: u32) -> Self {
        Self { duration_us }
    }

    /// Sound travels to the surface and back, so the distance is half
    /// the path covered in `duration_us`.
    pub fn to_distance(self) -> DistanceCm {
        DistanceCm(self.duration_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0)
    }
}

/// Sensor-to-surface distance in centimetres (never negative).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DistanceCm(pub f32);

pub struct UltrasonicSensor<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    echo_timeout_us: u32,
    ping_interval_ms: u32,
}

impl<T, E, D, C> UltrasonicSensor<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C, sampling: &SamplingConfig) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            echo_timeout_us: sampling.echo_timeout_us,
            ping_interval_ms: sampling.ping_interval_ms,
        }
    }

    fn pulse_trigger(&mut self) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(10);
        self.trigger.set_low().map_err(|_| SensorError::PinFault)
    }

    /// Spin until the echo line reads `high`, returning the timestamp of
    /// the edge, or give up once the window measured from `since` closes.
    fn wait_for_level(&mut self, high: bool, since: u64) -> Result<u64, SensorError> {
        loop {
            let level = self.echo.is_high().map_err(|_| SensorError::PinFault)?;
            let now = self.clock.now_us();
            if level == high {
                return Ok(now);
            }
            if now.saturating_sub(since) > u64::from(self.echo_timeout_us) {
                return Err(SensorError::EchoTimeout);
            }
        }
    }

    fn time_echo(&mut self) -> Result<RawSample, SensorError> {
        self.pulse_trigger()?;
        let armed = self.clock.now_us();
        let rise = self.wait_for_level(true, armed)?;
        let fall = self.wait_for_level(false, rise)?;
        Ok(RawSample::new(fall.saturating_sub(rise) as u32))
    }
}

impl<T, E, D, C> RangingPort for UltrasonicSensor<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    fn measure_once(&mut self) -> Result<RawSample, SensorError> {
        let result = self.time_echo();
        // Let late reflections die out before the next ping.
        self.delay.delay_ms(self.ping_interval_ms);
        if let Err(e) = result {
            log::debug!("ultrasonic: ping failed ({e})");
        }
        result
    }
}
