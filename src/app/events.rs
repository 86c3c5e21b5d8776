//! Outbound session notifications.
//!
//! The [`SessionEngine`](super::service::SessionEngine) emits these through
//! the [`EventSink`](super::ports::EventSink) port after every mutation.
//! The presentation layer uses them to decide what to re-render; the
//! [`LogEventSink`](crate::adapters::log_sink::LogEventSink) writes them to
//! the serial log.

use crate::catalog::{Category, Scene};
use crate::fsm::TxState;
use crate::fsm::context::Mode;
use crate::log_buffer::LogKind;

/// Structured events emitted by the session engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The engine has started (carries the initial transmit state).
    Started(TxState),

    /// The connection switch changed.
    ConnectionChanged(bool),

    /// Scene, category or function selection changed.
    SelectionChanged {
        scene: Scene,
        category: Category,
        function: usize,
    },

    /// The active view changed.
    ModeChanged(Mode),

    /// One of the manual frame fields was written.
    ManualFrameChanged,

    /// The transmit state machine moved.
    StatusChanged { from: TxState, to: TxState },

    /// A log entry was appended.
    LogAppended { id: u64, kind: LogKind },

    /// The log was cleared.
    LogsCleared,
}
