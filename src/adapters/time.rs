//! ESP32 time adapter.
//!
//! Implements [`Clock`] for the control loop and the ultrasonic driver.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.

use crate::app::ports::Clock;

#[derive(Clone, Copy)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for Esp32TimeAdapter {
    #[cfg(target_os = "espidf")]
    fn now_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the monotonic system timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
