//! Function-pointer finite state machine for the transmit subsystem.
//!
//! Classic embedded FSM pattern in Rust:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌─────────────┬───────────┬──────────┬──────────────────┐  │
//! │  │ TxState     │ on_enter  │ on_exit  │ on_signal        │  │
//! │  ├─────────────┼───────────┼──────────┼──────────────────┤  │
//! │  │ Idle        │ fn(ctx)   │ -        │ fn(ctx,sig)->Opt │  │
//! │  │ AwaitingAck │ fn(ctx)   │ -        │ fn(ctx,sig)->Opt │  │
//! │  │ Repeating   │ fn(ctx)   │ fn(ctx)  │ fn(ctx,sig)->Opt │  │
//! │  └─────────────┴───────────┴──────────┴──────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine feeds [`TxSignal`]s in.  If the current state's `on_signal`
//! returns `Some(next_id)`, the machine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! Enter handlers own the [`TransmitStatus`](context::TransmitStatus)
//! flags, so the flags can never disagree with the state.

pub mod context;
pub mod states;

use context::SessionState;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// States of the transmit subsystem.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxState {
    /// Nothing in flight.
    Idle = 0,
    /// One-shot frame sent, simulated ACK pending.
    AwaitingAck = 1,
    /// Periodic frames being sent.
    Repeating = 2,
}

impl TxState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `TxState`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::AwaitingAck,
            2 => Self::Repeating,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

/// Inputs the engine feeds into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxSignal {
    /// Operator pressed Transmit on a one-shot frame.
    Send,
    /// Operator pressed Transmit on a repeating frame.
    SendRepeating,
    /// Simulated acknowledgement arrived.
    Ack,
    /// Operator pressed Stop.
    Stop,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut SessionState);

/// Signature for the signal handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateSignalFn = fn(&SessionState, TxSignal) -> Option<TxState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: TxState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_signal: StateSignalFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `TxState as usize`.
    table: [StateDescriptor; TxState::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; TxState::COUNT], initial: TxState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut SessionState) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Offer `signal` to the current state.
    ///
    /// Returns the new state if the signal caused a transition, `None` if
    /// the current state ignored it.
    pub fn dispatch(&mut self, signal: TxSignal, ctx: &mut SessionState) -> Option<TxState> {
        let next = (self.table[self.current].on_signal)(ctx, signal)?;
        self.transition(next, ctx);
        Some(next)
    }

    /// The current state's identity.
    pub fn current_state(&self) -> TxState {
        TxState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: TxState, ctx: &mut SessionState) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}


#[cfg(all(test, not(target_os = "espidf")))]
mod proptests {
    use super::context::SessionState;
    use super::*;
    use crate::config::PanelConfig;
    use proptest::prelude::*;

    fn arb_signal() -> impl Strategy<Value = TxSignal> {
        prop_oneof![
            Just(TxSignal::Send),
            Just(TxSignal::SendRepeating),
            Just(TxSignal::Ack),
            Just(TxSignal::Stop),
        ]
    }

    proptest! {
        #[test]
        fn status_flags_always_match_state(
            signals in proptest::collection::vec(arb_signal(), 1..100),
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), TxState::Idle);
            let mut ctx = SessionState::new(&PanelConfig::default());
            fsm.start(&mut ctx);

            for signal in signals {
                fsm.dispatch(signal, &mut ctx);

                let status = ctx.status;
                prop_assert!(!status.is_repeating() || status.is_transmitting());
                prop_assert_eq!(status.is_transmitting(), fsm.current_state() != TxState::Idle);
                prop_assert_eq!(status.is_repeating(), fsm.current_state() == TxState::Repeating);
            }
        }
    }
}
