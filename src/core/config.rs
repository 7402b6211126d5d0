//! Engine configuration.
//!
//! Tunables for one engine instance: queue sizes, per-day card limits and
//! per-phase timeouts. Every field has a default, so a partial TOML
//! document (or none at all) is a valid configuration.
//!
//! ```
//! use tragedy_looper::core::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     inbound_capacity = 32
//!
//!     [timeouts]
//!     card_play_ms = 5000
//! "#).unwrap();
//!
//! assert_eq!(config.inbound_capacity, 32);
//! assert_eq!(config.timeouts.card_play_ms, 5000);
//! assert_eq!(config.mastermind_cards_per_day, 3);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::player::PlayerRole;

/// Errors raised while reading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-phase timeouts in milliseconds. `0` disables the timer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimeouts {
    pub card_play_ms: u64,
    pub abilities_ms: u64,
    /// Used by any phase that is parked on a pending choice.
    pub choice_ms: u64,
    pub guess_ms: u64,
}

impl Default for PhaseTimeouts {
    fn default() -> Self {
        Self {
            card_play_ms: 60_000,
            abilities_ms: 60_000,
            choice_ms: 30_000,
            guess_ms: 120_000,
        }
    }
}

impl PhaseTimeouts {
    /// No timers at all. Useful for tests that drive every step by hand.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            card_play_ms: 0,
            abilities_ms: 0,
            choice_ms: 0,
            guess_ms: 0,
        }
    }

    #[must_use]
    pub const fn card_play(&self) -> Duration {
        Duration::from_millis(self.card_play_ms)
    }

    #[must_use]
    pub const fn abilities(&self) -> Duration {
        Duration::from_millis(self.abilities_ms)
    }

    #[must_use]
    pub const fn choice(&self) -> Duration {
        Duration::from_millis(self.choice_ms)
    }

    #[must_use]
    pub const fn guess(&self) -> Duration {
        Duration::from_millis(self.guess_ms)
    }
}

/// Configuration for one engine instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slots in the inbound action/query queue.
    pub inbound_capacity: usize,
    /// Slots in the outbound event queue.
    pub broadcast_capacity: usize,
    pub mastermind_cards_per_day: usize,
    pub protagonist_cards_per_day: usize,
    pub timeouts: PhaseTimeouts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 100,
            broadcast_capacity: 256,
            mastermind_cards_per_day: 3,
            protagonist_cards_per_day: 1,
            timeouts: PhaseTimeouts::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Daily card limit for a side.
    #[must_use]
    pub const fn cards_per_day(&self, role: PlayerRole) -> usize {
        match role {
            PlayerRole::Mastermind => self.mastermind_cards_per_day,
            PlayerRole::Protagonist => self.protagonist_cards_per_day,
        }
    }

    /// Replace the timeouts (builder pattern).
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: PhaseTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}
