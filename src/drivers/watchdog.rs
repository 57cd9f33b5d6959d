//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls.  The main loop calls
//! `feed()` once per iteration, after actuator outputs are applied, so a
//! hung ranger or a wedged flash write cannot leave the relay in limbo.

use core::cell::Cell;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::config::SystemConfig;

/// Floor for the stall budget.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

/// Allowance for one NVS commit on top of a control iteration.
const FLASH_COMMIT_ALLOWANCE_MS: u64 = 500;

/// Stall budget for `config`: twice the longest legitimate iteration
/// (loop interval plus a worst-case sampling round and a flash commit),
/// never below [`WATCHDOG_TIMEOUT_MS`].
pub fn budget_ms(config: &SystemConfig) -> u32 {
    let iteration = u64::from(config.control_loop_interval_ms)
        + config.sampling.worst_case_round_ms()
        + FLASH_COMMIT_ALLOWANCE_MS;
    let budget = iteration.saturating_mul(2).min(u64::from(u32::MAX)) as u32;
    budget.max(WATCHDOG_TIMEOUT_MS)
}

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    feeds: Cell<u32>,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain FFI calls on the current task; the config
            // struct outlives the call.
            let subscribed = unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("watchdog: reconfigure returned {ret} (may already be configured)");
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
            };
            if subscribed {
                log::info!("watchdog: subscribed ({timeout_ms} ms, panic on trigger)");
            } else {
                log::warn!("watchdog: failed to subscribe, loop stalls will not reset");
            }
            Self { timeout_ms, subscribed, feeds: Cell::new(0) }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("watchdog(sim): {timeout_ms} ms budget, not armed");
            Self { timeout_ms, feeds: Cell::new(0) }
        }
    }

    pub fn for_config(config: &SystemConfig) -> Self {
        Self::new(budget_ms(config))
    }

    pub fn feed(&self) {
        self.feeds.set(self.feeds.get().wrapping_add(1));
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the TWDT entry of the subscribed current task.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Number of feeds since construction.
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}
