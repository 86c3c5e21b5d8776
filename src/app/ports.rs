//! Port traits — the hexagonal boundary between the session engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SessionEngine (domain)
//! ```
//!
//! Timers, the wall clock and notification sinks implement these traits.
//! The [`SessionEngine`](super::service::SessionEngine) consumes them via
//! generics at each call site, so the domain core owns no timer or clock
//! of its own.

use crate::log_buffer::Timestamp;

// ───────────────────────────────────────────────────────────────
// Timer events (scheduler → domain)
// ───────────────────────────────────────────────────────────────

/// What a scheduled task asks the engine to do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// Periodic retransmission of the active frame.
    RepeatTick,
    /// Simulated response to an Auto-mode frame.
    AckAuto,
    /// Simulated response to a Manual-mode frame.
    AckManual,
}

/// Opaque handle to one scheduled task.
///
/// Handle ids are unique for the lifetime of the scheduler that issued
/// them, so cancelling a handle whose task already fired (or was replaced)
/// is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u32);

impl TaskHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: domain ↔ cooperative scheduler)
// ───────────────────────────────────────────────────────────────

/// Cooperative single-threaded timer facility.
///
/// Fired events come back into the engine through
/// [`SessionEngine::on_timer`](super::service::SessionEngine::on_timer) on
/// the same thread that scheduled them.
pub trait TimerPort {
    /// Fire `event` once after `delay_ms`.  `None` if no slot is free.
    fn schedule_once(&mut self, delay_ms: u32, event: TimerEvent) -> Option<TaskHandle>;

    /// Fire `event` every `period_ms` until cancelled.  `None` if no slot
    /// is free.
    fn schedule_periodic(&mut self, period_ms: u32, event: TimerEvent) -> Option<TaskHandle>;

    /// Cancel a task.  Must take effect before this call returns.
    fn cancel(&mut self, handle: TaskHandle);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for log timestamps.
pub trait ClockPort {
    fn now(&self) -> Timestamp;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → presentation / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`SessionEvent`](super::events::SessionEvent)s through
/// this port.  Adapters decide where they go (serial log, display refresh,
/// test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::SessionEvent);
}
