//! Inbound operator intents.
//!
//! These represent actions requested by the presentation layer (buttons,
//! dropdowns, text fields) that the
//! [`SessionEngine`](super::service::SessionEngine) interprets and acts upon.

use crate::catalog::{Category, Scene};
use crate::fsm::context::{MANUAL_DATA_MAX, MANUAL_ID_MAX, Mode};
use crate::log_buffer::bounded;

/// Intents that the presentation layer can send into the session engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Flip the bus connection switch.
    SetConnected(bool),

    /// Pick a scene button.
    SelectScene(Scene),

    /// Pick a category (function index falls back to 0).
    SelectCategory(Category),

    /// Pick a function within the current category.
    SelectFunction(usize),

    /// Switch between the Auto and Manual views.
    SetMode(Mode),

    /// Edit the manual CAN ID field.
    SetManualId(heapless::String<MANUAL_ID_MAX>),

    /// Edit the manual data field.
    SetManualData(heapless::String<MANUAL_DATA_MAX>),

    /// Toggle manual repeat and set its interval in one step.
    SetManualRepeat { repeat: bool, interval_ms: u32 },

    /// Edit the manual repeat interval only.
    SetManualInterval(u32),

    /// Press Transmit.
    Transmit,

    /// Press Stop.
    Stop,

    /// Press Clear on the log panel.
    ClearLogs,
}

impl Intent {
    /// Manual ID edit from free text (truncated to the field bound).
    pub fn manual_id(text: &str) -> Self {
        Self::SetManualId(bounded(text))
    }

    /// Manual data edit from free text (truncated to the field bound).
    pub fn manual_data(text: &str) -> Self {
        Self::SetManualData(bounded(text))
    }
}
