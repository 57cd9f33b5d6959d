//! TankWatch Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LogEventSink   ConfigStore<NvsAdapter>    │
//! │  (Ranging+Output)    (EventSink)    (FlagStore)                │
//! │  Esp32TimeAdapter    InterruptRouter → ToggleQueue (ISR)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Median · Level · Actuator · Status                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use log::{error, info, warn};

use tankwatch::adapters::hardware::HardwareAdapter;
use tankwatch::adapters::log_sink::LogEventSink;
use tankwatch::adapters::nvs::NvsAdapter;
use tankwatch::adapters::time::Esp32TimeAdapter;
use tankwatch::app::ports::Clock;
use tankwatch::app::service::AppService;
use tankwatch::config::SystemConfig;
use tankwatch::drivers::output::SwitchedOutput;
use tankwatch::drivers::watchdog::Watchdog;
use tankwatch::drivers::hw_init;
use tankwatch::events::TOGGLE_QUEUE;
use tankwatch::pins;
use tankwatch::sensors::UltrasonicSensor;
use tankwatch::storage::ConfigStore;

/// Control cycles between retries of a failed flag save.
const FLAG_RETRY_CYCLES: u64 = 30;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TankWatch v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (fatal if invalid) ───────────────────
    let config = SystemConfig::default();
    config.validate()?;

    // ── 3. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Outputs may be floating; let the watchdog reset us.
        error!("HAL init failed: {e}, halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {e}, buttons disabled");
    }
    let watchdog = Watchdog::for_config(&config);

    // SAFETY: each ranger pin is claimed exactly once, here; the buzzer,
    // relay and button drivers use the other numbers in `pins`.
    let trigger = PinDriver::output(unsafe { AnyOutputPin::new(pins::TRIGGER_GPIO) })?;
    let echo = PinDriver::input(unsafe { AnyInputPin::new(pins::ECHO_GPIO) })?;
    let clock = Esp32TimeAdapter::new();
    let ranger = UltrasonicSensor::new(trigger, echo, Ets, clock, &config.sampling);

    let mut hw = HardwareAdapter::new(
        ranger,
        SwitchedOutput::new(pins::BUZZER_GPIO, true),
        SwitchedOutput::new(pins::RELAY_GPIO, pins::RELAY_ACTIVE_HIGH),
    );

    // ── 4. Persisted flags (soft-fail to defaults) ────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({e}), flags will not persist this session");
            NvsAdapter::default()
        }
    };
    let mut store = ConfigStore::new(nvs);
    let (flags, boot_save) = AppService::load_flags(&store);

    // ── 5. App service ────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(config, flags)?;
    app.start(&mut log_sink);
    if boot_save {
        app.mark_flags_dirty();
        app.force_save_if_dirty(&mut store, &mut log_sink);
    }

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let interval_ms = u64::from(config.control_loop_interval_ms);

    loop {
        let started_ms = clock.now_ms();

        // Button toggles queued by the ISRs since the last iteration.
        app.drain_toggles(&TOGGLE_QUEUE, &mut hw, &mut store, &mut log_sink, started_ms);

        app.tick(&mut hw, &mut log_sink, clock.now_ms());

        if app.is_flags_dirty() && app.cycle_count() % FLAG_RETRY_CYCLES == 0 {
            app.force_save_if_dirty(&mut store, &mut log_sink);
        }

        watchdog.feed();

        let elapsed_ms = clock.now_ms().saturating_sub(started_ms);
        FreeRtos::delay_ms(interval_ms.saturating_sub(elapsed_ms) as u32);
    }
}
