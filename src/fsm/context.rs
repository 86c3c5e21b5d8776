//! Session state threaded through every FSM handler.
//!
//! `SessionState` is the single mutable model of the panel: connection
//! flag, view mode, Auto-mode selection, Manual-mode frame fields, transmit
//! status, and the TX/RX log.  The engine owns it; the presentation layer
//! only ever sees `&SessionState`.

use crate::catalog::{self, Category, Scene};
use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::log_buffer::{LOG_TEXT_MAX, LogBuffer, bounded, bounded_fmt};

/// Maximum byte length of the manual CAN ID field.
pub const MANUAL_ID_MAX: usize = 31;

/// Maximum byte length of the manual data field.
pub const MANUAL_DATA_MAX: usize = 127;

// ---------------------------------------------------------------------------
// View mode
// ---------------------------------------------------------------------------

/// Which transmit surface is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Scene / category / function picked from the catalog.
    #[default]
    Auto,
    /// Operator-entered raw CAN ID and data.
    Manual,
}

// ---------------------------------------------------------------------------
// Auto-mode selection
// ---------------------------------------------------------------------------

/// Scene, category and function currently selected in Auto mode.
///
/// The function index is always valid for the selected category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    scene: Scene,
    category: Category,
    function: usize,
}

impl SelectionState {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            category: Category::Display,
            function: 0,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn function(&self) -> usize {
        self.function
    }

    /// Catalog name of the selected function.
    pub fn function_name(&self) -> &'static str {
        // The index is validated on every write, so the lookup cannot miss.
        catalog::function_name(self.category, self.function).unwrap_or_default()
    }

    /// Catalog repeat interval of the selected function.
    pub fn repeat_interval(&self) -> Option<u32> {
        catalog::repeat_interval(self.category, self.function)
    }

    pub(crate) fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    /// Switch category; the function index falls back to the first entry.
    pub(crate) fn set_category(&mut self, category: Category) {
        self.category = category;
        self.function = 0;
    }

    pub(crate) fn set_function(&mut self, index: usize) -> Result<()> {
        if index >= catalog::function_count(self.category) {
            return Err(Error::OutOfRange);
        }
        self.function = index;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Manual frame
// ---------------------------------------------------------------------------

/// Raw frame fields typed into the Manual view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualFrame {
    id_text: heapless::String<MANUAL_ID_MAX>,
    data_text: heapless::String<MANUAL_DATA_MAX>,
    repeat: bool,
    interval_ms: u32,
    /// Floor applied on every interval write.
    min_interval_ms: u32,
}

impl ManualFrame {
    pub fn new(interval_ms: u32, min_interval_ms: u32) -> Self {
        Self {
            id_text: heapless::String::new(),
            data_text: heapless::String::new(),
            repeat: false,
            interval_ms: interval_ms.max(min_interval_ms),
            min_interval_ms,
        }
    }

    /// CAN ID as typed, e.g. `0x123`.
    pub fn id_text(&self) -> &str {
        &self.id_text
    }

    /// Payload as typed, e.g. `[0x01, 0x02]`.
    pub fn data_text(&self) -> &str {
        &self.data_text
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Both the ID and the data field hold something.
    pub fn is_complete(&self) -> bool {
        !self.id_text.is_empty() && !self.data_text.is_empty()
    }

    pub(crate) fn set_id_text(&mut self, text: &str) {
        self.id_text = bounded(text);
    }

    pub(crate) fn set_data_text(&mut self, text: &str) {
        self.data_text = bounded(text);
    }

    pub(crate) fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    /// Store `interval_ms`, clamped to the configured minimum.
    pub(crate) fn set_interval_ms(&mut self, interval_ms: u32) -> u32 {
        self.interval_ms = interval_ms.max(self.min_interval_ms);
        self.interval_ms
    }
}

// ---------------------------------------------------------------------------
// Transmit status
// ---------------------------------------------------------------------------

/// Flags the footer renders.  `is_repeating` implies `is_transmitting`;
/// only the three constants below can be constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitStatus {
    is_transmitting: bool,
    is_repeating: bool,
}

impl TransmitStatus {
    pub const IDLE: Self = Self {
        is_transmitting: false,
        is_repeating: false,
    };
    pub const ONE_SHOT: Self = Self {
        is_transmitting: true,
        is_repeating: false,
    };
    pub const REPEATING: Self = Self {
        is_transmitting: true,
        is_repeating: true,
    };

    pub fn is_transmitting(&self) -> bool {
        self.is_transmitting
    }

    pub fn is_repeating(&self) -> bool {
        self.is_repeating
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The mutable model behind the panel.
pub struct SessionState {
    /// Bus connection switch.
    pub is_connected: bool,
    /// Active view.
    pub mode: Mode,
    /// Auto-mode selection.
    pub selection: SelectionState,
    /// Manual-mode frame fields.
    pub manual: ManualFrame,
    /// Written only by FSM enter handlers.
    pub status: TransmitStatus,
    /// TX/RX history.
    pub log: LogBuffer,
}

impl SessionState {
    /// Fresh session: disconnected, Auto mode, first function of Display.
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            is_connected: false,
            mode: Mode::Auto,
            selection: SelectionState::new(config.default_scene),
            manual: ManualFrame::new(
                config.default_manual_interval_ms,
                config.min_manual_interval_ms,
            ),
            status: TransmitStatus::IDLE,
            log: LogBuffer::new(),
        }
    }

    /// Whether the Transmit button should be enabled.
    pub fn can_transmit(&self) -> bool {
        if !self.is_connected || self.status.is_transmitting() || self.status.is_repeating() {
            return false;
        }
        match self.mode {
            Mode::Auto => true,
            Mode::Manual => self.manual.is_complete(),
        }
    }

    /// TX log text for the frame the active mode would send right now,
    /// cut at the log's text bound.
    pub fn frame_text(&self) -> heapless::String<LOG_TEXT_MAX> {
        match self.mode {
            Mode::Auto => bounded_fmt(format_args!(
                "{} - {}",
                self.selection.category().label(),
                self.selection.function_name()
            )),
            Mode::Manual => bounded_fmt(format_args!(
                "CAN ID: {} | Data: {}",
                self.manual.id_text(),
                self.manual.data_text()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> SessionState {
        SessionState::new(&PanelConfig::default())
    }

    #[test]
    fn fresh_session_defaults() {
        let s = fresh();
        assert!(!s.is_connected);
        assert_eq!(s.mode, Mode::Auto);
        assert_eq!(s.selection.scene(), Scene::B);
        assert_eq!(s.selection.category(), Category::Display);
        assert_eq!(s.selection.function(), 0);
        assert_eq!(s.manual.interval_ms(), 1000);
        assert!(s.log.is_empty());
        assert_eq!(s.status, TransmitStatus::IDLE);
    }

    #[test]
    fn category_change_resets_function() {
        for from in Category::ALL {
            for to in Category::ALL {
                if from == to {
                    continue;
                }
                let mut sel = SelectionState::new(Scene::B);
                sel.set_category(from);
                sel.set_function(2).unwrap();
                sel.set_category(to);
                assert_eq!(sel.function(), 0, "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn set_function_rejects_out_of_range() {
        let mut sel = SelectionState::new(Scene::B);
        sel.set_function(1).unwrap();
        assert_eq!(sel.set_function(3), Err(Error::OutOfRange));
        assert_eq!(sel.function(), 1, "failed write must not change the index");
    }

    #[test]
    fn manual_interval_is_clamped_on_every_write() {
        let mut m = ManualFrame::new(1000, 100);
        assert_eq!(m.set_interval_ms(20), 100);
        assert_eq!(m.set_interval_ms(250), 250);
        assert_eq!(ManualFrame::new(5, 100).interval_ms(), 100);
    }

    #[test]
    fn manual_fields_are_bounded() {
        let mut m = ManualFrame::new(1000, 100);
        m.set_id_text(&"F".repeat(64));
        m.set_data_text(&"0".repeat(300));
        assert_eq!(m.id_text().len(), MANUAL_ID_MAX);
        assert_eq!(m.data_text().len(), MANUAL_DATA_MAX);
    }

    #[test]
    fn can_transmit_follows_button_rule() {
        let mut s = fresh();
        assert!(!s.can_transmit(), "disconnected");
        s.is_connected = true;
        assert!(s.can_transmit());

        s.mode = Mode::Manual;
        assert!(!s.can_transmit(), "manual fields empty");
        s.manual.set_id_text("0x123");
        s.manual.set_data_text("[0x01]");
        assert!(s.can_transmit());

        s.status = TransmitStatus::ONE_SHOT;
        assert!(!s.can_transmit(), "already transmitting");
    }

    #[test]
    fn frame_text_per_mode() {
        let mut s = fresh();
        s.selection.set_category(Category::Sound);
        s.selection.set_function(2).unwrap();
        assert_eq!(s.frame_text(), "声音 (Sound) - 调节座椅");

        s.mode = Mode::Manual;
        s.manual.set_id_text("0x123");
        s.manual.set_data_text("[0x01,0x02,0x03]");
        assert_eq!(s.frame_text(), "CAN ID: 0x123 | Data: [0x01,0x02,0x03]");
    }

    #[test]
    fn manual_frame_text_is_cut_at_log_bound() {
        let mut s = fresh();
        s.mode = Mode::Manual;
        s.manual.set_id_text(&"F".repeat(MANUAL_ID_MAX));
        s.manual.set_data_text(&"0".repeat(MANUAL_DATA_MAX));
        let text = s.frame_text();
        assert_eq!(text.len(), LOG_TEXT_MAX);
        assert!(text.starts_with("CAN ID: FFFF"));
    }
}
