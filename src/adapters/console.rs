//! Serial console input adapter.
//!
//! Reads operator commands line by line from stdin (UART0 / USB-CDC on the
//! ESP32-S3) and pushes the matching [`Intent`] into the shared queue.
//! Panels without a touch display are driven entirely from here.
//!
//! | Line                    | Intent                           |
//! |-------------------------|----------------------------------|
//! | `connect` / `disconnect`| `SetConnected`                   |
//! | `scene <B..ACC>`        | `SelectScene`                    |
//! | `category <0..2>`       | `SelectCategory`                 |
//! | `function <n>`          | `SelectFunction`                 |
//! | `mode <auto\|manual>`   | `SetMode`                        |
//! | `id <text>`             | `SetManualId`                    |
//! | `data <text>`           | `SetManualData`                  |
//! | `repeat <on\|off> <ms>` | `SetManualRepeat`                |
//! | `interval <ms>`         | `SetManualInterval`              |
//! | `tx` / `stop` / `clear` | `Transmit` / `Stop` / `ClearLogs`|

use std::io::BufRead;
use std::thread::JoinHandle;

use log::{info, warn};

use crate::app::commands::Intent;
use crate::catalog::{Category, Scene};
use crate::error::{Error, Result};
use crate::fsm::context::Mode;
use crate::intents::push_intent;

/// Stack for the reader task (KiB).
const CONSOLE_STACK_KB: usize = 6;

/// Parse one console line.  Blank lines and unknown commands are
/// `InvalidInput`; out-of-range selections are `OutOfRange`.
pub fn parse_line(line: &str) -> Result<Intent> {
    let line = line.trim();
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let intent = match cmd {
        "connect" => Intent::SetConnected(true),
        "disconnect" => Intent::SetConnected(false),
        "scene" => Intent::SelectScene(rest.parse::<Scene>()?),
        "category" => Intent::SelectCategory(Category::from_index(number(rest)?)?),
        "function" => Intent::SelectFunction(number(rest)?),
        "mode" => Intent::SetMode(match rest {
            "auto" => Mode::Auto,
            "manual" => Mode::Manual,
            _ => return Err(Error::InvalidInput),
        }),
        "id" => Intent::manual_id(rest),
        "data" => Intent::manual_data(rest),
        "repeat" => {
            let (flag, ms) = rest.split_once(char::is_whitespace).ok_or(Error::InvalidInput)?;
            let repeat = match flag {
                "on" => true,
                "off" => false,
                _ => return Err(Error::InvalidInput),
            };
            Intent::SetManualRepeat {
                repeat,
                interval_ms: number(ms.trim())?,
            }
        }
        "interval" => Intent::SetManualInterval(number(rest)?),
        "tx" => Intent::Transmit,
        "stop" => Intent::Stop,
        "clear" => Intent::ClearLogs,
        _ => return Err(Error::InvalidInput),
    };
    Ok(intent)
}

fn number<T: core::str::FromStr>(text: &str) -> Result<T> {
    text.parse().map_err(|_| Error::InvalidInput)
}

/// Read `input` until EOF, pushing every parsed line into the intent
/// queue.  Returns the number of intents queued.
pub fn pump(input: impl BufRead) -> usize {
    let mut queued = 0;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(intent) => {
                if push_intent(intent) {
                    queued += 1;
                } else {
                    warn!("Intent queue full, dropped '{}'", line.trim());
                }
            }
            Err(e) => warn!("Console: '{}' ignored ({})", line.trim(), e),
        }
    }
    queued
}

/// Spawn the console reader task on stdin.
pub fn spawn_reader() -> std::io::Result<JoinHandle<()>> {
    info!("Spawning 'console' (stack={}KB)", CONSOLE_STACK_KB);
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(CONSOLE_STACK_KB * 1024)
        .spawn(|| {
            let queued = pump(std::io::stdin().lock());
            info!("Console closed after {} intents", queued);
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!(parse_line("connect"), Ok(Intent::SetConnected(true)));
        assert_eq!(parse_line("  disconnect "), Ok(Intent::SetConnected(false)));
        assert_eq!(parse_line("scene IGR"), Ok(Intent::SelectScene(Scene::IGR)));
        assert_eq!(
            parse_line("category 1"),
            Ok(Intent::SelectCategory(Category::Sound))
        );
        assert_eq!(parse_line("function 2"), Ok(Intent::SelectFunction(2)));
        assert_eq!(parse_line("mode manual"), Ok(Intent::SetMode(Mode::Manual)));
        assert_eq!(parse_line("id 0x7DF"), Ok(Intent::manual_id("0x7DF")));
        assert_eq!(
            parse_line("data [0x02, 0x01]"),
            Ok(Intent::manual_data("[0x02, 0x01]"))
        );
        assert_eq!(
            parse_line("repeat on 250"),
            Ok(Intent::SetManualRepeat {
                repeat: true,
                interval_ms: 250
            })
        );
        assert_eq!(parse_line("interval 80"), Ok(Intent::SetManualInterval(80)));
        assert_eq!(parse_line("tx"), Ok(Intent::Transmit));
        assert_eq!(parse_line("stop"), Ok(Intent::Stop));
        assert_eq!(parse_line("clear"), Ok(Intent::ClearLogs));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line(""), Err(Error::InvalidInput));
        assert_eq!(parse_line("launch"), Err(Error::InvalidInput));
        assert_eq!(parse_line("mode turbo"), Err(Error::InvalidInput));
        assert_eq!(parse_line("repeat on"), Err(Error::InvalidInput));
        assert_eq!(parse_line("interval soon"), Err(Error::InvalidInput));
        assert_eq!(parse_line("scene XYZ"), Err(Error::OutOfRange));
        assert_eq!(parse_line("category 3"), Err(Error::OutOfRange));
    }
}
