//! Cooperative runtime adapter.
//!
//! Bundles the [`Scheduler`] with a [`ClockPort`] so one value satisfies
//! both ports the engine needs at transmit / timer call sites, and drains
//! queued intents and due timers back into the engine.

use log::warn;

use crate::app::events::SessionEvent;
use crate::app::ports::{ClockPort, EventSink, TaskHandle, TimerEvent, TimerPort};
use crate::app::service::SessionEngine;
use crate::intents::drain_intents;
use crate::log_buffer::Timestamp;
use crate::scheduler::Scheduler;

/// Scheduler + wall clock, passed to the engine as `rt`.
pub struct PanelRuntime<C: ClockPort> {
    pub scheduler: Scheduler,
    pub clock: C,
}

impl<C: ClockPort> PanelRuntime<C> {
    pub fn new(clock: C) -> Self {
        Self {
            scheduler: Scheduler::new(),
            clock,
        }
    }

    /// One pass of the device loop: every queued intent, oldest first,
    /// then every timer due at `now_ms`.  Returns the number of timer
    /// events dispatched.
    pub fn run_pass(
        &mut self,
        now_ms: u64,
        engine: &mut SessionEngine,
        sink: &mut impl EventSink,
    ) -> usize {
        drain_intents(|intent| {
            if let Err(e) = engine.handle_intent(intent, self, sink) {
                warn!("Intent rejected: {}", e);
            }
        });
        self.run_due(now_ms, engine, sink)
    }

    /// Feed every timer due at `now_ms` into `engine`, one at a time.
    /// Returns the number of events dispatched.
    pub fn run_due(
        &mut self,
        now_ms: u64,
        engine: &mut SessionEngine,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut fired = 0;
        while let Some(event) = self.scheduler.poll(now_ms) {
            engine.on_timer(event, self, sink);
            fired += 1;
        }
        fired
    }
}

impl<C: ClockPort> TimerPort for PanelRuntime<C> {
    fn schedule_once(&mut self, delay_ms: u32, event: TimerEvent) -> Option<TaskHandle> {
        self.scheduler.schedule_once(delay_ms, event)
    }

    fn schedule_periodic(&mut self, period_ms: u32, event: TimerEvent) -> Option<TaskHandle> {
        self.scheduler.schedule_periodic(period_ms, event)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.scheduler.cancel(handle);
    }
}

impl<C: ClockPort> ClockPort for PanelRuntime<C> {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

/// Sink that drops every notification.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SessionEvent) {}
}
