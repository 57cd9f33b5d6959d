//! Interrupt-to-main-loop toggle queue.
//!
//! Button ISRs must not touch actuator state.  They mark a pending toggle
//! here and return; the main loop drains the queue at the top of every
//! iteration and applies each toggle synchronously.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Buzzer ISR   │────▶│ ToggleQueue  │────▶│  Main Loop   │
//! │ Self-stop ISR│────▶│ (AtomicU8)   │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! One pending bit per button gives a fixed capacity of two.  A second
//! press of the same button while its toggle is still pending coalesces
//! into the first, so a burst of bounces can never flip a flag twice
//! behind the main loop's back.

use core::sync::atomic::{AtomicU8, Ordering};

/// A user request to flip one enable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ToggleEvent {
    Buzzer = 0b01,
    SelfStop = 0b10,
}

impl ToggleEvent {
    /// Drain order: buzzer first.
    pub const ALL: [Self; 2] = [Self::Buzzer, Self::SelfStop];

    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Debounce slot index for this button.
    pub const fn index(self) -> usize {
        match self {
            Self::Buzzer => 0,
            Self::SelfStop => 1,
        }
    }
}

/// Lock-free pending-toggle set.  Safe to push from ISR context.
pub struct ToggleQueue {
    pending: AtomicU8,
}

impl ToggleQueue {
    pub const CAPACITY: usize = ToggleEvent::ALL.len();

    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Mark `event` pending.  Returns `false` if it was already pending
    /// (coalesced).
    pub fn push(&self, event: ToggleEvent) -> bool {
        let prev = self.pending.fetch_or(event.mask(), Ordering::AcqRel);
        prev & event.mask() == 0
    }

    /// Take the next pending toggle, if any.
    pub fn pop(&self) -> Option<ToggleEvent> {
        for event in ToggleEvent::ALL {
            let prev = self.pending.fetch_and(!event.mask(), Ordering::AcqRel);
            if prev & event.mask() != 0 {
                return Some(event);
            }
        }
        None
    }

    /// Hand every pending toggle to `handler`, buzzer first.
    pub fn drain(&self, mut handler: impl FnMut(ToggleEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire).count_ones() as usize
    }
}

impl Default for ToggleQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The queue the GPIO ISRs feed on target.
pub static TOGGLE_QUEUE: ToggleQueue = ToggleQueue::new();
