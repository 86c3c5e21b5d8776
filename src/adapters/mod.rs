//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `console`  | intent producer    | UART / USB-CDC stdin         |
//! | `log_sink` | EventSink          | Serial log output            |
//! | `runtime`  | TimerPort          | Cooperative [`Scheduler`]    |
//! |            | ClockPort          | Wrapped clock adapter        |
//! | `time`     | ClockPort          | ESP32 RTC / host clock       |
//!
//! [`Scheduler`]: crate::scheduler::Scheduler

pub mod console;
pub mod log_sink;
pub mod runtime;
pub mod time;
