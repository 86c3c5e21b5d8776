//! Operator intent queue.
//!
//! Intents are produced by input tasks (the serial console reader today,
//! a touch UI task on display builds) and consumed by the main loop, which
//! hands them to the engine one at a time in FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Console task │────▶│ Intent Queue │────▶│  Main Loop   │
//! │ UI task      │────▶│  (CS-guarded)│     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::app::commands::Intent;

/// Maximum number of pending intents.
pub const INTENT_QUEUE_CAP: usize = 16;

// ── Queue ─────────────────────────────────────────────────────

/// Fixed-capacity FIFO of intents that counts what it had to drop.
pub struct IntentQueue {
    pending: Deque<Intent, INTENT_QUEUE_CAP>,
    dropped: u32,
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentQueue {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            dropped: 0,
        }
    }

    /// Enqueue `intent`.  Returns `false` if the queue is full (intent
    /// dropped).
    pub fn push(&mut self, intent: Intent) -> bool {
        if self.pending.push_back(intent).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        true
    }

    pub fn pop(&mut self) -> Option<Intent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Intents refused because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

// ── Shared instance ───────────────────────────────────────────
//
// Producers run on their own FreeRTOS tasks; the main loop is the only
// consumer.  Every access goes through a critical section, so the lock is
// held only for one push or pop.

static INTENTS: Mutex<RefCell<IntentQueue>> = Mutex::new(RefCell::new(IntentQueue::new()));

/// Push an intent into the shared queue.
/// Returns `false` if the queue is full (intent dropped).
pub fn push_intent(intent: Intent) -> bool {
    critical_section::with(|cs| INTENTS.borrow_ref_mut(cs).push(intent))
}

/// Pop the next intent from the shared queue.
pub fn pop_intent() -> Option<Intent> {
    critical_section::with(|cs| INTENTS.borrow_ref_mut(cs).pop())
}

/// Drain all pending intents into a callback, oldest first.
///
/// The lock is released between intents, so `handler` may push.
pub fn drain_intents(mut handler: impl FnMut(Intent)) {
    while let Some(intent) = pop_intent() {
        handler(intent);
    }
}

/// Number of pending intents in the shared queue.
pub fn queue_len() -> usize {
    critical_section::with(|cs| INTENTS.borrow_ref(cs).len())
}
