//! Session engine — the hexagonal core.
//!
//! [`SessionEngine`] owns the transmit FSM, the session state and the two
//! scheduled-task handles.  It exposes one method per operator intent plus
//! one per timer fire.  Timers, the clock and the notification sink are
//! injected at call sites, making the whole engine testable with mocks.
//!
//! ```text
//!  Intent ─────▶ ┌────────────────────────┐ ──▶ EventSink
//!                │     SessionEngine       │
//!  TimerEvent ──▶│  FSM · SessionState     │ ──▶ TimerPort
//!                └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::catalog::{Category, Scene};
use crate::config::PanelConfig;
use crate::error::{Error, Result};
use crate::fsm::context::{Mode, SessionState};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, TxSignal, TxState};
use crate::log_buffer::{LogEntry, LogKind};

use super::commands::Intent;
use super::events::SessionEvent;
use super::ports::{ClockPort, EventSink, TaskHandle, TimerEvent, TimerPort};

/// RX text for an acknowledged Auto-mode frame.
pub const ACK_AUTO_TEXT: &str = "CAN ID: 0x123 | Data: [0x01, 0x02, 0x03]";

/// RX text for an acknowledged Manual-mode frame.
pub const ACK_MANUAL_TEXT: &str = "ACK: OK";

/// TX notice appended by every Stop.
pub const STOP_NOTICE: &str = "停止发送";

// ───────────────────────────────────────────────────────────────
// SessionEngine
// ───────────────────────────────────────────────────────────────

/// The session engine orchestrates all panel logic.
pub struct SessionEngine {
    fsm: Fsm,
    state: SessionState,
    config: PanelConfig,
    /// Periodic retransmission task, alive only while `Repeating`.
    repeat_task: Option<TaskHandle>,
    /// Pending simulated ACK, at most one at a time.
    ack_task: Option<TaskHandle>,
}

impl SessionEngine {
    /// Construct the engine from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: PanelConfig) -> Self {
        let state = SessionState::new(&config);
        let fsm = Fsm::new(build_state_table(), TxState::Idle);
        Self {
            fsm,
            state,
            config,
            repeat_task: None,
            ack_task: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.state);
        sink.emit(&SessionEvent::Started(self.fsm.current_state()));
        info!("SessionEngine started in {:?}", self.fsm.current_state());
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Route an operator intent to its operation.
    pub fn handle_intent<R>(
        &mut self,
        intent: Intent,
        rt: &mut R,
        sink: &mut impl EventSink,
    ) -> Result<()>
    where
        R: TimerPort + ClockPort,
    {
        match intent {
            Intent::SetConnected(connected) => self.set_connected(connected, sink),
            Intent::SelectScene(scene) => self.set_scene(scene, &*rt, sink),
            Intent::SelectCategory(category) => self.set_category(category, sink),
            Intent::SelectFunction(index) => return self.set_function(index, sink),
            Intent::SetMode(mode) => self.set_mode(mode, sink),
            Intent::SetManualId(text) => self.set_manual_id(&text, sink),
            Intent::SetManualData(text) => self.set_manual_data(&text, sink),
            Intent::SetManualRepeat {
                repeat,
                interval_ms,
            } => self.set_manual_repeat(repeat, interval_ms, sink),
            Intent::SetManualInterval(interval_ms) => self.set_manual_interval(interval_ms, sink),
            Intent::Transmit => return self.transmit(rt, sink),
            Intent::Stop => self.stop(rt, sink),
            Intent::ClearLogs => self.clear_logs(sink),
        }
        Ok(())
    }

    /// Route a timer fire to RepeatTick / AckAuto / AckManual.
    pub fn on_timer<R>(&mut self, event: TimerEvent, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        match event {
            TimerEvent::RepeatTick => self.repeat_tick(rt, sink),
            TimerEvent::AckAuto => self.ack_auto(rt, sink),
            TimerEvent::AckManual => self.ack_manual(rt, sink),
        }
    }

    // ── Connection & selection ────────────────────────────────

    /// Flip the connection switch.  Never touches transmit state: a
    /// repeating session keeps running until Stop.
    pub fn set_connected(&mut self, connected: bool, sink: &mut impl EventSink) {
        if self.state.is_connected == connected {
            return;
        }
        self.state.is_connected = connected;
        info!("Connection {}", if connected { "opened" } else { "closed" });
        sink.emit(&SessionEvent::ConnectionChanged(connected));
    }

    /// Select a scene; while connected the scene name is logged as TX.
    pub fn set_scene(&mut self, scene: Scene, clock: &impl ClockPort, sink: &mut impl EventSink) {
        self.state.selection.set_scene(scene);
        self.emit_selection(sink);
        if self.state.is_connected {
            self.append(LogKind::Tx, scene.as_str(), clock, sink);
        }
    }

    /// Select a category; the function index falls back to 0.
    pub fn set_category(&mut self, category: Category, sink: &mut impl EventSink) {
        self.state.selection.set_category(category);
        self.emit_selection(sink);
    }

    /// Select a function within the current category.
    pub fn set_function(&mut self, index: usize, sink: &mut impl EventSink) -> Result<()> {
        if let Err(e) = self.state.selection.set_function(index) {
            warn!(
                "Rejected function {} for {:?}: {}",
                index,
                self.state.selection.category(),
                e
            );
            return Err(e);
        }
        self.emit_selection(sink);
        Ok(())
    }

    /// Switch view.  An in-flight transmission is left running.
    pub fn set_mode(&mut self, mode: Mode, sink: &mut impl EventSink) {
        if self.state.mode == mode {
            return;
        }
        self.state.mode = mode;
        sink.emit(&SessionEvent::ModeChanged(mode));
    }

    // ── Manual frame fields ───────────────────────────────────

    pub fn set_manual_id(&mut self, text: &str, sink: &mut impl EventSink) {
        self.state.manual.set_id_text(text);
        sink.emit(&SessionEvent::ManualFrameChanged);
    }

    pub fn set_manual_data(&mut self, text: &str, sink: &mut impl EventSink) {
        self.state.manual.set_data_text(text);
        sink.emit(&SessionEvent::ManualFrameChanged);
    }

    /// Set the repeat flag and interval together (interval clamped).
    pub fn set_manual_repeat(&mut self, repeat: bool, interval_ms: u32, sink: &mut impl EventSink) {
        self.state.manual.set_repeat(repeat);
        self.store_interval(interval_ms);
        sink.emit(&SessionEvent::ManualFrameChanged);
    }

    pub fn set_manual_interval(&mut self, interval_ms: u32, sink: &mut impl EventSink) {
        self.store_interval(interval_ms);
        sink.emit(&SessionEvent::ManualFrameChanged);
    }

    // ── Transmission ──────────────────────────────────────────

    /// Send the active frame.
    ///
    /// Manual mode with an empty field fails with `InvalidInput`; a
    /// disconnected or busy session fails with `InvalidState`, as does a
    /// timer port with no free slot.  No failure touches the log, the
    /// FSM or the timers.
    pub fn transmit<R>(&mut self, rt: &mut R, sink: &mut impl EventSink) -> Result<()>
    where
        R: TimerPort + ClockPort,
    {
        if self.state.mode == Mode::Manual && !self.state.manual.is_complete() {
            warn!("Transmit rejected: manual CAN ID and data are required");
            return Err(Error::InvalidInput);
        }
        if !self.state.is_connected || self.fsm.current_state() != TxState::Idle {
            warn!(
                "Transmit rejected: connected={} state={:?}",
                self.state.is_connected,
                self.fsm.current_state()
            );
            return Err(Error::InvalidState);
        }

        let (period_ms, ack_event) = match self.state.mode {
            Mode::Auto => (self.state.selection.repeat_interval(), TimerEvent::AckAuto),
            Mode::Manual => (
                self.state
                    .manual
                    .repeat()
                    .then_some(self.state.manual.interval_ms()),
                TimerEvent::AckManual,
            ),
        };

        // Timers first: a refused slot must leave the session Idle.
        let (signal, ack_delay_ms) = match period_ms {
            Some(period_ms) => {
                self.replace_repeat(rt, period_ms)?;
                (TxSignal::SendRepeating, self.config.repeat_ack_delay_ms)
            }
            None => (TxSignal::Send, self.config.oneshot_ack_delay_ms),
        };
        if let Err(e) = self.replace_ack(rt, ack_delay_ms, ack_event) {
            if let Some(handle) = self.repeat_task.take() {
                rt.cancel(handle);
            }
            return Err(e);
        }

        self.signal(signal, sink);
        let text = self.state.frame_text();
        self.append(LogKind::Tx, &text, &*rt, sink);
        Ok(())
    }

    /// Periodic retransmission.  Uses the live selection / manual fields,
    /// so edits made while repeating show up on the next tick.
    pub fn repeat_tick<R>(&mut self, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        if self.fsm.current_state() != TxState::Repeating {
            debug!("RepeatTick ignored in {:?}", self.fsm.current_state());
            return;
        }
        let text = self.state.frame_text();
        self.append(LogKind::Tx, &text, &*rt, sink);
        let ack_event = match self.state.mode {
            Mode::Auto => TimerEvent::AckAuto,
            Mode::Manual => TimerEvent::AckManual,
        };
        // Already warned; the next tick tries again.
        let _ = self.replace_ack(rt, self.config.repeat_ack_delay_ms, ack_event);
    }

    pub fn ack_auto<R>(&mut self, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        self.acknowledge(ACK_AUTO_TEXT, rt, sink);
    }

    pub fn ack_manual<R>(&mut self, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        self.acknowledge(ACK_MANUAL_TEXT, rt, sink);
    }

    /// Cancel both timers, log the stop notice and return to Idle.  Runs
    /// the same way when already Idle.
    pub fn stop<R>(&mut self, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        if let Some(handle) = self.repeat_task.take() {
            rt.cancel(handle);
        }
        if let Some(handle) = self.ack_task.take() {
            rt.cancel(handle);
        }
        self.append(LogKind::Tx, STOP_NOTICE, &*rt, sink);
        self.signal(TxSignal::Stop, sink);
    }

    /// Empty the log.  Transmit state and timers are untouched.
    pub fn clear_logs(&mut self, sink: &mut impl EventSink) {
        self.state.log.clear();
        sink.emit(&SessionEvent::LogsCleared);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Full session state for re-rendering.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Live log entries, oldest still present first.
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.state.log.iter()
    }

    /// Current transmit FSM state.
    pub fn tx_state(&self) -> TxState {
        self.fsm.current_state()
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Handle of the periodic retransmission task, if armed.
    pub fn repeat_task(&self) -> Option<TaskHandle> {
        self.repeat_task
    }

    /// Handle of the pending ACK task, if armed.
    pub fn ack_task(&self) -> Option<TaskHandle> {
        self.ack_task
    }

    // ── Internal ──────────────────────────────────────────────

    fn acknowledge<R>(&mut self, text: &str, rt: &mut R, sink: &mut impl EventSink)
    where
        R: TimerPort + ClockPort,
    {
        // Normally this is the task that just fired; cancelling it is a
        // no-op then.  A direct call must not leave a second ACK queued.
        if let Some(handle) = self.ack_task.take() {
            rt.cancel(handle);
        }
        self.append(LogKind::Rx, text, &*rt, sink);
        self.signal(TxSignal::Ack, sink);
    }

    /// Feed `signal` to the FSM and report any transition.
    fn signal(&mut self, signal: TxSignal, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        if let Some(to) = self.fsm.dispatch(signal, &mut self.state) {
            sink.emit(&SessionEvent::StatusChanged { from, to });
        }
    }

    fn append(
        &mut self,
        kind: LogKind,
        text: &str,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> u64 {
        let id = self.state.log.append(kind, text, clock.now());
        sink.emit(&SessionEvent::LogAppended { id, kind });
        id
    }

    /// Cancel the pending ACK (if any) and arm a fresh one.
    fn replace_ack(
        &mut self,
        timers: &mut impl TimerPort,
        delay_ms: u32,
        event: TimerEvent,
    ) -> Result<()> {
        if let Some(old) = self.ack_task.take() {
            timers.cancel(old);
        }
        let Some(handle) = timers.schedule_once(delay_ms, event) else {
            warn!("No timer slot for {:?}", event);
            return Err(Error::InvalidState);
        };
        debug!("{:?} armed in {} ms (task {})", event, delay_ms, handle.id());
        self.ack_task = Some(handle);
        Ok(())
    }

    /// Cancel the periodic task (if any) and arm a fresh one.
    fn replace_repeat(&mut self, timers: &mut impl TimerPort, period_ms: u32) -> Result<()> {
        if let Some(old) = self.repeat_task.take() {
            timers.cancel(old);
        }
        let Some(handle) = timers.schedule_periodic(period_ms, TimerEvent::RepeatTick) else {
            warn!("No timer slot for RepeatTick");
            return Err(Error::InvalidState);
        };
        debug!("RepeatTick every {} ms (task {})", period_ms, handle.id());
        self.repeat_task = Some(handle);
        Ok(())
    }

    fn store_interval(&mut self, interval_ms: u32) {
        let stored = self.state.manual.set_interval_ms(interval_ms);
        if stored != interval_ms {
            debug!("Manual interval {} ms clamped to {} ms", interval_ms, stored);
        }
    }

    fn emit_selection(&self, sink: &mut impl EventSink) {
        let sel = &self.state.selection;
        sink.emit(&SessionEvent::SelectionChanged {
            scene: sel.scene(),
            category: sel.category(),
            function: sel.function(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::context::TransmitStatus;
    use crate::log_buffer::Timestamp;

    /// Timer port that only records what it was asked to do.
    #[derive(Default)]
    struct Recorder {
        next_id: u32,
        once: Vec<(u32, TimerEvent, TaskHandle)>,
        periodic: Vec<(u32, TaskHandle)>,
        cancelled: Vec<TaskHandle>,
    }

    impl TimerPort for Recorder {
        fn schedule_once(&mut self, delay_ms: u32, event: TimerEvent) -> Option<TaskHandle> {
            self.next_id += 1;
            let h = TaskHandle::new(self.next_id);
            self.once.push((delay_ms, event, h));
            Some(h)
        }
        fn schedule_periodic(&mut self, period_ms: u32, _event: TimerEvent) -> Option<TaskHandle> {
            self.next_id += 1;
            let h = TaskHandle::new(self.next_id);
            self.periodic.push((period_ms, h));
            Some(h)
        }
        fn cancel(&mut self, handle: TaskHandle) {
            self.cancelled.push(handle);
        }
    }

    impl ClockPort for Recorder {
        fn now(&self) -> Timestamp {
            Timestamp::from_hms(12, 0, 0)
        }
    }

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &SessionEvent) {}
    }

    fn connected_engine() -> SessionEngine {
        let mut engine = SessionEngine::new(PanelConfig::default());
        engine.start(&mut NullSink);
        engine.set_connected(true, &mut NullSink);
        engine
    }

    #[test]
    fn one_shot_schedules_single_long_ack() {
        let mut engine = connected_engine();
        let mut rt = Recorder::default();
        engine.transmit(&mut rt, &mut NullSink).unwrap();

        assert_eq!(engine.tx_state(), TxState::AwaitingAck);
        assert!(rt.periodic.is_empty());
        assert_eq!(rt.once.len(), 1);
        assert_eq!(rt.once[0].0, 1000);
        assert_eq!(rt.once[0].1, TimerEvent::AckAuto);
        assert_eq!(engine.ack_task(), Some(rt.once[0].2));
    }

    #[test]
    fn repeat_tick_replaces_pending_ack() {
        let mut engine = connected_engine();
        let mut rt = Recorder::default();
        engine.set_category(Category::Display, &mut NullSink);
        engine.set_function(1, &mut NullSink).unwrap();
        engine.transmit(&mut rt, &mut NullSink).unwrap();

        assert_eq!(rt.periodic[0].0, 1500);
        let first_ack = rt.once[0].2;

        engine.repeat_tick(&mut rt, &mut NullSink);
        assert_eq!(rt.cancelled, [first_ack]);
        assert_eq!(rt.once.len(), 2);
        assert_eq!(rt.once[1].0, 500);
        assert_eq!(engine.ack_task(), Some(rt.once[1].2));
    }

    #[test]
    fn stop_cancels_both_tasks() {
        let mut engine = connected_engine();
        let mut rt = Recorder::default();
        engine.set_mode(Mode::Manual, &mut NullSink);
        engine.set_manual_id("0x7DF", &mut NullSink);
        engine.set_manual_data("[0x02]", &mut NullSink);
        engine.set_manual_repeat(true, 250, &mut NullSink);
        engine.transmit(&mut rt, &mut NullSink).unwrap();

        let repeat = engine.repeat_task().unwrap();
        let ack = engine.ack_task().unwrap();
        engine.stop(&mut rt, &mut NullSink);

        assert_eq!(rt.cancelled, [repeat, ack]);
        assert!(engine.repeat_task().is_none());
        assert!(engine.ack_task().is_none());
        assert_eq!(engine.tx_state(), TxState::Idle);
    }

    /// Timer port with a limited number of free slots.
    struct Starved {
        free: usize,
        next_id: u32,
        cancelled: Vec<TaskHandle>,
    }

    impl Starved {
        fn with_slots(free: usize) -> Self {
            Self {
                free,
                next_id: 0,
                cancelled: Vec::new(),
            }
        }

        fn take(&mut self) -> Option<TaskHandle> {
            self.free = self.free.checked_sub(1)?;
            self.next_id += 1;
            Some(TaskHandle::new(self.next_id))
        }
    }

    impl TimerPort for Starved {
        fn schedule_once(&mut self, _delay_ms: u32, _event: TimerEvent) -> Option<TaskHandle> {
            self.take()
        }
        fn schedule_periodic(&mut self, _period_ms: u32, _event: TimerEvent) -> Option<TaskHandle> {
            self.take()
        }
        fn cancel(&mut self, handle: TaskHandle) {
            self.cancelled.push(handle);
        }
    }

    impl ClockPort for Starved {
        fn now(&self) -> Timestamp {
            Timestamp::from_hms(12, 0, 0)
        }
    }

    #[test]
    fn one_shot_without_timer_slot_stays_idle() {
        let mut engine = connected_engine();
        let mut rt = Starved::with_slots(0);

        assert_eq!(engine.transmit(&mut rt, &mut NullSink), Err(Error::InvalidState));
        assert_eq!(engine.tx_state(), TxState::Idle);
        assert_eq!(engine.state().status, TransmitStatus::IDLE);
        assert!(engine.ack_task().is_none());
        assert!(engine.state().log.is_empty());
    }

    #[test]
    fn repeat_without_ack_slot_releases_periodic_task() {
        let mut engine = connected_engine();
        let mut rt = Starved::with_slots(1);
        engine.set_category(Category::Display, &mut NullSink);
        engine.set_function(1, &mut NullSink).unwrap();

        assert_eq!(engine.transmit(&mut rt, &mut NullSink), Err(Error::InvalidState));
        assert_eq!(rt.cancelled, [TaskHandle::new(1)]);
        assert!(engine.repeat_task().is_none());
        assert_eq!(engine.tx_state(), TxState::Idle);
        assert!(engine.state().log.is_empty());

        // With slots available again the same press goes through.
        let mut rt = Starved::with_slots(2);
        engine.transmit(&mut rt, &mut NullSink).unwrap();
        assert_eq!(engine.tx_state(), TxState::Repeating);
    }

    #[test]
    fn disconnected_transmit_never_reaches_the_fsm() {
        let mut engine = SessionEngine::new(PanelConfig::default());
        let mut rt = Recorder::default();
        engine.start(&mut NullSink);

        assert_eq!(engine.transmit(&mut rt, &mut NullSink), Err(Error::InvalidState));
        assert_eq!(engine.tx_state(), TxState::Idle);
        assert!(rt.once.is_empty() && rt.periodic.is_empty());
    }

    #[test]
    fn repeat_tick_outside_repeating_is_ignored() {
        let mut engine = connected_engine();
        let mut rt = Recorder::default();
        engine.repeat_tick(&mut rt, &mut NullSink);
        assert!(engine.state().log.is_empty());
        assert!(rt.once.is_empty());
    }
}
