//! Unified error type for the session engine.
//!
//! Every rejected operator intent funnels into this single `Error` enum so
//! the presentation layer can handle failures uniformly.  All variants are
//! `Copy`; nothing here allocates.

use core::fmt;

// ---------------------------------------------------------------------------
// Engine error
// ---------------------------------------------------------------------------

/// Reasons an engine operation can be rejected.
///
/// None of these are fatal and the engine never retries on its own; the
/// operator re-invokes the intent once the condition is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A category, function, or scene index/name outside the catalog.
    OutOfRange,
    /// Manual transmit attempted with an empty CAN ID or data field, or a
    /// configuration value that fails validation.
    InvalidInput,
    /// Transmit attempted while disconnected or while a transmission is
    /// already in flight.
    InvalidState,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "index out of range"),
            Self::InvalidInput => write!(f, "invalid input"),
            Self::InvalidState => write!(f, "invalid state for operation"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        assert_eq!(Error::OutOfRange.to_string(), "index out of range");
        assert_eq!(Error::InvalidInput.to_string(), "invalid input");
        assert_eq!(Error::InvalidState.to_string(), "invalid state for operation");
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = Error::InvalidState.into();
        assert!(err.downcast_ref::<Error>().is_some());
    }
}
