//! One-shot hardware peripheral initialization.
//!
//! Configures actuator outputs, button inputs, and the GPIO ISR service
//! using raw ESP-IDF sys calls.  The ultrasonic trigger/echo pins are
//! owned by `esp-idf-hal` `PinDriver`s and are not touched here.  Called
//! once from `main()` before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={rc})"),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let outputs = [
        (pins::BUZZER_GPIO, true),
        (pins::RELAY_GPIO, pins::RELAY_ACTIVE_HIGH),
    ];

    for &(pin, active_high) in &outputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        // Inactive level before anything else runs.
        unsafe { gpio_set_level(pin, u32::from(!active_high)) };
    }

    info!("hw_init: outputs configured (buzzer={}, relay={})", pins::BUZZER_GPIO, pins::RELAY_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was configured during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for &pin in &[pins::BUZZER_BUTTON_GPIO, pins::SELF_STOP_BUTTON_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: button inputs configured");
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::button_isr_handler;
#[cfg(target_os = "espidf")]
use crate::events::ToggleEvent;

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is a RTC counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn buzzer_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ToggleEvent::Buzzer, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn self_stop_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ToggleEvent::SelfStop, isr_now_ms());
}

/// Install the per-pin GPIO ISR service and register both button handlers.
/// Call after init_peripherals() and before the control loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service was already installed
    // (acceptable). The handlers only write lock-free atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_isr_handler_add(pins::BUZZER_BUTTON_GPIO, Some(buzzer_button_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::BUZZER_BUTTON_GPIO);

        gpio_isr_handler_add(pins::SELF_STOP_BUTTON_GPIO, Some(self_stop_button_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::SELF_STOP_BUTTON_GPIO);

        info!("hw_init: ISR service installed (buzzer button, self-stop button)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
