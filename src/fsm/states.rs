//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers.  No closures, no heap.
//!
//! ```text
//!            ┌──[Send]──────▶ AWAITING_ACK ──[Ack | Stop]──┐
//!            │                                             ▼
//!  IDLE ◀────┴─────────────────────────────────────────── IDLE
//!    │
//!    └──[SendRepeating]──▶ REPEATING ──[Stop]──▶ IDLE
//!                            │   ▲
//!                            └───┘ [Ack]
//!
//!  The engine checks the connection before it sends either signal.
//! ```

use super::context::{SessionState, TransmitStatus};
use super::{StateDescriptor, TxSignal, TxState};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per engine.
pub fn build_state_table() -> [StateDescriptor; TxState::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: TxState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_signal: idle_signal,
        },
        // Index 1: AwaitingAck
        StateDescriptor {
            id: TxState::AwaitingAck,
            name: "AwaitingAck",
            on_enter: Some(awaiting_ack_enter),
            on_exit: None,
            on_signal: awaiting_ack_signal,
        },
        // Index 2: Repeating
        StateDescriptor {
            id: TxState::Repeating,
            name: "Repeating",
            on_enter: Some(repeating_enter),
            on_exit: Some(repeating_exit),
            on_signal: repeating_signal,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SessionState) {
    ctx.status = TransmitStatus::IDLE;
    debug!("IDLE: transmit controls released");
}

fn idle_signal(_ctx: &SessionState, signal: TxSignal) -> Option<TxState> {
    match signal {
        TxSignal::Send => Some(TxState::AwaitingAck),
        TxSignal::SendRepeating => Some(TxState::Repeating),
        TxSignal::Ack | TxSignal::Stop => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_ACK state: one-shot frame sent, response pending
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_ack_enter(ctx: &mut SessionState) {
    ctx.status = TransmitStatus::ONE_SHOT;
}

fn awaiting_ack_signal(_ctx: &SessionState, signal: TxSignal) -> Option<TxState> {
    match signal {
        TxSignal::Ack | TxSignal::Stop => Some(TxState::Idle),
        TxSignal::Send | TxSignal::SendRepeating => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  REPEATING state: periodic frames, each followed by a pending ACK
// ═══════════════════════════════════════════════════════════════════════════

fn repeating_enter(ctx: &mut SessionState) {
    ctx.status = TransmitStatus::REPEATING;
    info!("REPEATING: periodic transmission armed");
}

fn repeating_exit(_ctx: &mut SessionState) {
    info!("REPEATING: periodic transmission ended");
}

fn repeating_signal(_ctx: &SessionState, signal: TxSignal) -> Option<TxState> {
    match signal {
        TxSignal::Stop => Some(TxState::Idle),
        // An ACK confirms one repeated frame; the session keeps going.
        TxSignal::Ack | TxSignal::Send | TxSignal::SendRepeating => None,
    }
}
