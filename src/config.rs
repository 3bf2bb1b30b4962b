use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Prefix for every environment variable read by [`load_config`].
pub const ENV_PREFIX: &str = "MAZE_";

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seed for the simulation's random source. `None` seeds from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Level a started session begins on
    #[serde(default = "default_start_level")]
    pub start_level: u32,
    /// Lives at the start of a session
    #[serde(default = "default_lives")]
    pub lives: u8,
    /// Previously persisted high score
    #[serde(default)]
    pub high_score: u32,
    /// Idle time on the intro screen before the demo starts
    #[serde(default = "default_intro_seconds")]
    pub intro_seconds: f32,
    /// Length of a demo run before returning to the intro screen
    #[serde(default = "default_demo_seconds")]
    pub demo_seconds: f32,
    /// Let the pilot steer during real sessions too
    #[serde(default)]
    pub autopilot: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: default_start_level(),
            lives: default_lives(),
            high_score: 0,
            intro_seconds: default_intro_seconds(),
            demo_seconds: default_demo_seconds(),
            autopilot: false,
        }
    }
}

impl GameConfig {
    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_level == 0 {
            return Err(ConfigError::Invalid {
                field: "start_level",
                reason: "levels start at 1".to_string(),
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::Invalid {
                field: "lives",
                reason: "a session needs at least one life".to_string(),
            });
        }
        for (field, value) in [("intro_seconds", self.intro_seconds), ("demo_seconds", self.demo_seconds)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a non-negative duration, got {value}"),
                });
            }
        }
        Ok(())
    }
}

fn default_start_level() -> u32 {
    1
}

fn default_lives() -> u8 {
    3
}

fn default_intro_seconds() -> f32 {
    5.0
}

fn default_demo_seconds() -> f32 {
    30.0
}

/// The layered configuration source: defaults, overridden by `MAZE_*` environment variables.
pub fn figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GameConfig::default()))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Loads and validates configuration from the environment.
///
/// # Errors
///
/// Returns `ConfigError` if a variable cannot be parsed or a value is out of range.
pub fn load_config() -> Result<GameConfig, ConfigError> {
    let config: GameConfig = figment().extract()?;
    config.validate()?;
    debug!(?config, "Configuration loaded");
    Ok(config)
}

/// A deterministic configuration for tests and reproducible runs.
pub fn seeded_config(seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    }
}
