//! Shared typing configuration.
//!
//! The host mutates speed and error rate at any time; the typing engine
//! re-reads the configuration at every character boundary, so in-flight
//! runs pick up changes without being restarted.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Upper bound of the speed scale. Speed values map inversely onto
/// per-keystroke delays: `delay = MAX_DELAY_MS - speed`.
pub const MAX_DELAY_MS: u64 = 400;

/// Per-keystroke timing and error-injection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Minimum delay before a keystroke, in milliseconds.
    pub min_delay_ms: u64,
    /// Maximum delay before a keystroke, in milliseconds.
    pub max_delay_ms: u64,
    /// Probability, in percent, that a character is preceded by an error burst.
    pub error_rate_percent: u8,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 20,
            max_delay_ms: 25,
            error_rate_percent: 0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("speed values must lie in 0..={max}, got {min_speed}..={max_speed}")]
    SpeedOutOfRange {
        min_speed: u64,
        max_speed: u64,
        max: u64,
    },

    #[error("minimum speed {min_speed} exceeds maximum speed {max_speed}")]
    InvertedSpeedRange { min_speed: u64, max_speed: u64 },

    #[error("error rate must lie in 0..=100, got {0}")]
    ErrorRateOutOfRange(u8),
}

/// Cloneable handle to the process-wide [`TypingConfig`].
///
/// Writers mutate in place; readers always observe the latest value.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<TypingConfig>>,
}

impl ConfigHandle {
    pub fn new(config: TypingConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Current configuration value.
    pub fn snapshot(&self) -> TypingConfig {
        *self.inner.read().expect("config lock poisoned")
    }

    /// Apply a speed update. Higher speed means lower delay, so the range
    /// inverts: the maximum speed produces the minimum delay.
    pub fn set_speed(&self, min_speed: u64, max_speed: u64) -> Result<(), ConfigError> {
        if min_speed > MAX_DELAY_MS || max_speed > MAX_DELAY_MS {
            return Err(ConfigError::SpeedOutOfRange {
                min_speed,
                max_speed,
                max: MAX_DELAY_MS,
            });
        }
        if min_speed > max_speed {
            return Err(ConfigError::InvertedSpeedRange {
                min_speed,
                max_speed,
            });
        }

        let mut config = self.inner.write().expect("config lock poisoned");
        config.min_delay_ms = MAX_DELAY_MS - max_speed;
        config.max_delay_ms = MAX_DELAY_MS - min_speed;
        Ok(())
    }

    /// Set the error-injection rate directly.
    pub fn set_error_rate(&self, percent: u8) -> Result<(), ConfigError> {
        if percent > 100 {
            return Err(ConfigError::ErrorRateOutOfRange(percent));
        }

        let mut config = self.inner.write().expect("config lock poisoned");
        config.error_rate_percent = percent;
        Ok(())
    }
}
