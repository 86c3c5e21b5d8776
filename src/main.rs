//! CAN Panel Firmware — Main Entry Point
//!
//! Hexagonal architecture with a cooperative single-threaded loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PanelRuntime            LogEventSink        PanelClock        │
//! │  (Timer + Clock)         (EventSink)         (ClockPort)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              SessionEngine (pure logic)                │    │
//! │  │  FSM · SessionState · LogBuffer                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Console task ─▶ intent queue ─▶ event loop ◀─ Scheduler       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use log::{info, warn};

use canpanel::adapters::console;
use canpanel::adapters::log_sink::LogEventSink;
use canpanel::adapters::runtime::PanelRuntime;
use canpanel::adapters::time::PanelClock;
use canpanel::app::service::SessionEngine;
use canpanel::config::PanelConfig;

/// Loop yield between scheduler polls (milliseconds).
const LOOP_YIELD_MS: u32 = 5;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CAN Panel v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    // Optional JSON baked in at build time; anything invalid falls back.
    let config = match option_env!("CANPANEL_CONFIG_JSON") {
        Some(json) => PanelConfig::from_json(json).unwrap_or_else(|e| {
            warn!("Panel config rejected ({}), using defaults", e);
            PanelConfig::default()
        }),
        None => PanelConfig::default(),
    };
    info!("Config: {:?}", config);

    // ── 3. Construct adapters ─────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut rt = PanelRuntime::new(PanelClock::new());

    // ── 4. Construct session engine ───────────────────────────
    let mut engine = SessionEngine::new(config);
    engine.start(&mut log_sink);

    // ── 5. Input task ─────────────────────────────────────────
    // Console lines become intents on the shared queue.
    let _console = console::spawn_reader()?;

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        let now_ms = rt.clock.uptime_ms();
        rt.run_pass(now_ms, &mut engine, &mut log_sink);
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
