//! Cooperative timer scheduler.
//!
//! Backs the [`TimerPort`] the session engine schedules its repeat and ACK
//! timers on.  The scheduler never calls into the engine itself: the main
//! loop polls it and feeds every released [`TimerEvent`] back through
//! `SessionEngine::on_timer` on the same thread.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SessionEngine                           │
//! │        schedule_once / schedule_periodic / cancel            │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Scheduler   [slot 0] [slot 1] [slot 2] [slot 3]             │
//! │              handle · event · due_ms · OneShot | Periodic    │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │ poll(now_ms) → one due event
//!                             ▼
//!                 main loop → SessionEngine::on_timer()
//! ```
//!
//! `poll` releases at most one event per call, earliest deadline first
//! (ties broken by scheduling order), so a cancel issued while handling
//! one fire always lands before the next fire is released.

use crate::app::ports::{TaskHandle, TimerEvent, TimerPort};
use log::{debug, warn};

// ═══════════════════════════════════════════════════════════════
//  Task types
// ═══════════════════════════════════════════════════════════════

/// How a task re-arms after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Fire once, then free the slot.
    OneShot,
    /// Fire every `period_ms` until cancelled.
    Periodic { period_ms: u32 },
}

/// Internal bookkeeping for a live task.
#[derive(Debug, Clone, Copy)]
struct TaskEntry {
    handle: TaskHandle,
    event: TimerEvent,
    kind: TaskKind,
    /// Absolute deadline on the scheduler's millisecond clock.
    due_ms: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent tasks (stack-allocated).
const MAX_TASKS: usize = 4;

/// The scheduler engine.
pub struct Scheduler {
    /// Live tasks.
    tasks: [Option<TaskEntry>; MAX_TASKS],
    /// Time new tasks are scheduled relative to.  Follows `poll`, and is
    /// set to a task's deadline while that task's event is being handled.
    now_ms: u64,
    /// Id handed to the next scheduled task.
    next_id: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None; MAX_TASKS],
            now_ms: 0,
            next_id: 1,
        }
    }

    /// Release the earliest task due at or before `now_ms`.
    ///
    /// Call repeatedly until it returns `None`; each released event should
    /// be handled before the next call.
    pub fn poll(&mut self, now_ms: u64) -> Option<TimerEvent> {
        let next = self
            .tasks
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (i, t)))
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle.id()))
            .map(|(i, _)| i);

        let Some(idx) = next else {
            self.now_ms = self.now_ms.max(now_ms);
            return None;
        };

        let slot = &mut self.tasks[idx];
        let entry = (*slot)?;
        self.now_ms = self.now_ms.max(entry.due_ms);

        match entry.kind {
            TaskKind::OneShot => *slot = None,
            TaskKind::Periodic { period_ms } => {
                if let Some(task) = slot.as_mut() {
                    task.due_ms += u64::from(period_ms);
                }
            }
        }

        debug!(
            "Scheduler: task {} fired {:?} at {} ms",
            entry.handle.id(),
            entry.event,
            entry.due_ms
        );
        Some(entry.event)
    }

    /// Deadline of the earliest live task, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks.iter().flatten().map(|t| t.due_ms).min()
    }

    /// Whether `handle` still refers to a live task.
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().flatten().any(|t| t.handle == handle)
    }

    /// Number of live tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().flatten().count()
    }

    /// The scheduler's current notion of time.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn insert(&mut self, delay_ms: u32, event: TimerEvent, kind: TaskKind) -> Option<TaskHandle> {
        let Some(slot) = self.tasks.iter_mut().find(|s| s.is_none()) else {
            warn!("Scheduler: no free slot for {:?}", event);
            return None;
        };

        let handle = TaskHandle::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        *slot = Some(TaskEntry {
            handle,
            event,
            kind,
            due_ms: self.now_ms + u64::from(delay_ms),
        });
        debug!(
            "Scheduler: task {} {:?} {:?} due in {} ms",
            handle.id(),
            event,
            kind,
            delay_ms
        );
        Some(handle)
    }
}

impl TimerPort for Scheduler {
    fn schedule_once(&mut self, delay_ms: u32, event: TimerEvent) -> Option<TaskHandle> {
        self.insert(delay_ms, event, TaskKind::OneShot)
    }

    fn schedule_periodic(&mut self, period_ms: u32, event: TimerEvent) -> Option<TaskHandle> {
        // A zero period would make `poll` spin on the same task forever.
        let period_ms = period_ms.max(1);
        self.insert(period_ms, event, TaskKind::Periodic { period_ms })
    }

    fn cancel(&mut self, handle: TaskHandle) {
        for slot in self.tasks.iter_mut() {
            if slot.is_some_and(|t| t.handle == handle) {
                *slot = None;
                debug!("Scheduler: task {} cancelled", handle.id());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
