//! ISR entry point for the two enable-toggle buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups, one per flag.  Each GPIO
//! fires on its falling edge; the ISR passes the edge and a millisecond
//! timestamp to [`InterruptRouter::on_edge`], which debounces it against
//! the last accepted edge of the same button and queues a toggle.
//!
//! Nothing here touches actuator state.  The router only writes atomics,
//! so it is safe to call from interrupt context.
//!
//! | Button    | GPIO                       | Toggle                   |
//! |-----------|----------------------------|--------------------------|
//! | Buzzer    | `pins::BUZZER_BUTTON_GPIO` | `ToggleEvent::Buzzer`    |
//! | Self-stop | `pins::SELF_STOP_BUTTON_GPIO` | `ToggleEvent::SelfStop` |

use core::sync::atomic::{AtomicU32, Ordering};

use crate::events::{TOGGLE_QUEUE, ToggleEvent, ToggleQueue};

pub const DEBOUNCE_MS: u32 = 50;

/// Sentinel for "no edge accepted yet".
const NEVER: u32 = u32::MAX;

pub struct InterruptRouter<'q> {
    queue: &'q ToggleQueue,
    /// Timestamp of the last accepted edge, per button.
    last_edge_ms: [AtomicU32; 2],
    debounce_ms: u32,
}

impl<'q> InterruptRouter<'q> {
    pub const fn new(queue: &'q ToggleQueue, debounce_ms: u32) -> Self {
        Self {
            queue,
            last_edge_ms: [AtomicU32::new(NEVER), AtomicU32::new(NEVER)],
            debounce_ms,
        }
    }

    /// Handle one falling edge.  Returns `true` if a toggle was queued;
    /// `false` for a bounce or a press that coalesced into a pending one.
    pub fn on_edge(&self, button: ToggleEvent, now_ms: u32) -> bool {
        let slot = &self.last_edge_ms[button.index()];
        let last = slot.load(Ordering::Acquire);
        if last != NEVER && now_ms.wrapping_sub(last) < self.debounce_ms {
            return false;
        }
        slot.store(now_ms, Ordering::Release);
        self.queue.push(button)
    }

    pub fn queue(&self) -> &ToggleQueue {
        self.queue
    }
}

/// Router the GPIO ISRs call on target.
pub static ROUTER: InterruptRouter<'static> = InterruptRouter::new(&TOGGLE_QUEUE, DEBOUNCE_MS);

/// ISR handler: register on each button's falling edge.
pub fn button_isr_handler(button: ToggleEvent, now_ms: u32) {
    ROUTER.on_edge(button, now_ms);
}
