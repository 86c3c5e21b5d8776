//! Application core — pure session logic, zero I/O.
//!
//! This module contains the rules of the CAN signal panel: intent
//! handling, transmit orchestration and timer re-entry.  All interaction
//! with timers, the clock and the display happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable on the host.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
