//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing session notifications to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).  A display
//! adapter would implement the same trait and re-render instead.

use log::info;

use crate::app::events::SessionEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SessionEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            SessionEvent::ConnectionChanged(connected) => {
                info!("CONN  | {}", if *connected { "connected" } else { "disconnected" });
            }
            SessionEvent::SelectionChanged {
                scene,
                category,
                function,
            } => {
                info!("SEL   | scene={} category={:?} function={}", scene, category, function);
            }
            SessionEvent::ModeChanged(mode) => {
                info!("MODE  | {:?}", mode);
            }
            SessionEvent::ManualFrameChanged => {
                info!("FRAME | manual fields updated");
            }
            SessionEvent::StatusChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            SessionEvent::LogAppended { id, kind } => {
                info!("LOG   | #{} {}", id, kind.as_str());
            }
            SessionEvent::LogsCleared => {
                info!("LOG   | cleared");
            }
        }
    }
}
