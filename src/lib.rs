//! CAN signal panel library.
//!
//! Exposes the pure-logic modules (catalog, log buffer, session state,
//! transmit FSM, session engine, scheduler, intent queue) for integration testing and
//! for the device binary.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod catalog;
pub mod config;
pub mod fsm;
pub mod intents;
pub mod log_buffer;
pub mod scheduler;

mod error;

pub use error::{Error, Result};
