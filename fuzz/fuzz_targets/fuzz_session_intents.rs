//! Fuzz target: session engine intent / timer sequences
//!
//! Decodes the input as a byte-code of operator intents and clock
//! advances, drives them through `SessionEngine` + `Scheduler`, and
//! verifies after every step:
//! - No panics under arbitrary input
//! - `is_repeating` implies `is_transmitting`, and both match the FSM
//! - The log never holds more than `LOG_CAPACITY` entries
//! - At most two timer tasks (repeat + ACK) are ever alive
//!
//! cargo fuzz run fuzz_session_intents

#![no_main]

use libfuzzer_sys::fuzz_target;

use canpanel::adapters::runtime::{NullSink, PanelRuntime};
use canpanel::app::commands::Intent;
use canpanel::app::ports::ClockPort;
use canpanel::app::service::SessionEngine;
use canpanel::catalog::{Category, Scene};
use canpanel::config::PanelConfig;
use canpanel::fsm::TxState;
use canpanel::fsm::context::Mode;
use canpanel::log_buffer::{LOG_CAPACITY, Timestamp};

struct ZeroClock;

impl ClockPort for ZeroClock {
    fn now(&self) -> Timestamp {
        Timestamp::default()
    }
}

/// One step decoded from the input.
enum Step {
    Intent(Intent),
    Advance(u64),
}

fn decode(op: u8, arg: u8) -> Step {
    let a = arg as usize;
    match op % 14 {
        0 => Step::Intent(Intent::SetConnected(arg & 1 == 1)),
        1 => Step::Intent(Intent::SelectScene(Scene::ALL[a % Scene::ALL.len()])),
        2 => Step::Intent(Intent::SelectCategory(Category::ALL[a % Category::COUNT])),
        3 => Step::Intent(Intent::SelectFunction(a % 5)),
        4 => Step::Intent(Intent::SetMode(if arg & 1 == 1 { Mode::Manual } else { Mode::Auto })),
        5 => Step::Intent(Intent::manual_id(&"7".repeat(a % 40))),
        6 => Step::Intent(Intent::manual_data(&"停".repeat(a % 50))),
        7 => Step::Intent(Intent::SetManualRepeat {
            repeat: arg & 1 == 1,
            interval_ms: u32::from(arg) * 20,
        }),
        8 => Step::Intent(Intent::SetManualInterval(u32::from(arg) * 20)),
        9 | 10 => Step::Intent(Intent::Transmit),
        11 => Step::Intent(Intent::Stop),
        12 => Step::Intent(Intent::ClearLogs),
        _ => Step::Advance(u64::from(arg) * 50),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut engine = SessionEngine::new(PanelConfig::default());
    let mut rt = PanelRuntime::new(ZeroClock);
    let mut sink = NullSink;
    engine.start(&mut sink);
    let mut now_ms = 0u64;

    for pair in data.chunks_exact(2) {
        match decode(pair[0], pair[1]) {
            Step::Intent(intent) => {
                let _ = engine.handle_intent(intent, &mut rt, &mut sink);
            }
            Step::Advance(ms) => {
                now_ms += ms;
                rt.run_due(now_ms, &mut engine, &mut sink);
            }
        }

        let status = engine.state().status;
        assert!(!status.is_repeating() || status.is_transmitting());
        assert_eq!(status.is_transmitting(), engine.tx_state() != TxState::Idle);
        assert_eq!(status.is_repeating(), engine.tx_state() == TxState::Repeating);
        assert!(engine.state().log.len() <= LOG_CAPACITY);
        assert!(rt.scheduler.active_count() <= 2);
    }
});
