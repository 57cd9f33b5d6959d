//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  An LCD or other
//! display adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                let fill = s.fill.map_or(-1.0, |f| f.value());
                info!(
                    "LEVEL | fill={:.1}% vol={:.0}L{} | buzzer={} relay={} | \
                     enabled: buzzer={} self_stop={} | status=0b{:08b}",
                    fill,
                    s.volume_litres.unwrap_or(0.0),
                    if s.stale { " (stale)" } else { "" },
                    on_off(s.buzzer_on),
                    on_off(s.relay_on),
                    s.buzzer_enabled,
                    s.self_stop_enabled,
                    s.status_flags,
                );
            }
            AppEvent::BuzzerChanged(on) => info!("BUZZER | {}", on_off(*on)),
            AppEvent::RelayChanged(on) => info!("RELAY | {}", on_off(*on)),
            AppEvent::SafetyTimeout => warn!("SAFETY | relay released by max on-time bound"),
            AppEvent::CycleSkipped { consecutive, error } => {
                warn!("SKIP | {error} ({consecutive} consecutive)");
            }
            AppEvent::FlagsChanged(f) => {
                info!("FLAGS | buzzer={} self_stop={}", f.buzzer_enabled, f.self_stop_enabled);
            }
            AppEvent::PersistFailed(e) => warn!("FLAGS | save failed: {e}"),
            AppEvent::Started(f) => {
                info!("START | buzzer={} self_stop={}", f.buzzer_enabled, f.self_stop_enabled);
            }
        }
    }
}
