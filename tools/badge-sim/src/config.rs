//! Simulation configuration, from a TOML file and command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// One simulated badge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Username stored on the badge and sent to the peer
    pub name: String,

    /// Time of the OK press that starts the game
    #[serde(default = "default_start_at")]
    pub start_at_ms: u64,
}

fn default_start_at() -> u64 {
    100
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the link and both badges' random sources
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Probability that a frame is lost in the air
    #[serde(default)]
    pub drop_rate: f64,

    /// Scheduler tick period
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    /// Give up after this much simulated time
    #[serde(default = "default_duration")]
    pub duration_ms: u64,

    /// When the first badge long-presses MODE, if at all
    #[serde(default)]
    pub surprise_at_ms: Option<u64>,

    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,
}

fn default_seed() -> u64 {
    0x0b4d_6e
}

fn default_tick() -> u64 {
    10
}

fn default_duration() -> u64 {
    60_000
}

fn default_players() -> Vec<PlayerConfig> {
    vec![
        PlayerConfig {
            name: "alice".to_string(),
            start_at_ms: default_start_at(),
        },
        PlayerConfig {
            name: "bob".to_string(),
            start_at_ms: default_start_at() + 50,
        },
    ]
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            drop_rate: 0.0,
            tick_ms: default_tick(),
            duration_ms: default_duration(),
            surprise_at_ms: None,
            players: default_players(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.drop_rate) {
            return Err(ConfigError::Invalid(format!(
                "drop_rate {} outside 0..=1",
                self.drop_rate
            )));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".into()));
        }
        if self.players.len() != 2 {
            return Err(ConfigError::Invalid(format!(
                "exactly two players required, got {}",
                self.players.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = SimConfig::from_toml("").unwrap();
        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.players[0].name, "alice");
    }

    #[test]
    fn test_partial_file() {
        let config = SimConfig::from_toml(
            r#"
            seed = 7
            drop_rate = 0.25

            [[players]]
            name = "carol"

            [[players]]
            name = "dave"
            start_at_ms = 400
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.players[0].start_at_ms, 100);
        assert_eq!(config.players[1].start_at_ms, 400);
    }

    #[test]
    fn test_invalid_drop_rate() {
        let err = SimConfig::from_toml("drop_rate = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_one_player_rejected() {
        let err = SimConfig::from_toml("[[players]]\nname = \"solo\"").unwrap_err();
        assert!(err.to_string().contains("two players"));
    }
}
