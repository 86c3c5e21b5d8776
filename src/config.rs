//! Panel configuration parameters
//!
//! Timing constants for the simulated bus session and the defaults a fresh
//! session starts with.

use serde::{Deserialize, Serialize};

use crate::catalog::Scene;
use crate::error::{Error, Result};

/// Core panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    // --- Acknowledgement timing ---
    /// Delay before the simulated ACK of a one-shot frame (milliseconds)
    pub oneshot_ack_delay_ms: u32,
    /// Delay before the simulated ACK of each repeated frame (milliseconds)
    pub repeat_ack_delay_ms: u32,

    // --- Manual frames ---
    /// Lower bound applied to every manual repeat interval write (milliseconds)
    pub min_manual_interval_ms: u32,
    /// Manual repeat interval a fresh session starts with (milliseconds)
    pub default_manual_interval_ms: u32,

    // --- Selection ---
    /// Scene selected at startup
    pub default_scene: Scene,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            oneshot_ack_delay_ms: 1000,
            repeat_ack_delay_ms: 500,

            min_manual_interval_ms: 100,
            default_manual_interval_ms: 1000,

            default_scene: Scene::B,
        }
    }
}

impl PanelConfig {
    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.oneshot_ack_delay_ms == 0 || self.repeat_ack_delay_ms == 0 {
            return Err(Error::InvalidInput);
        }
        if self.min_manual_interval_ms == 0
            || self.default_manual_interval_ms < self.min_manual_interval_ms
        {
            return Err(Error::InvalidInput);
        }
        Ok(())
    }

    /// Parse a JSON document and validate it.  Missing fields are an
    /// error; there is no partial merge with the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|_| Error::InvalidInput)?;
        config.validate()?;
        Ok(config)
    }
}
