//! Tunable physics and game settings.
//!
//! Every field has a default matching the stock game, so a JSON config file only
//! needs to list the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Constants driving the player body.
///
/// Units are world units per tick (velocities) and world units per tick²
/// (gravity). Y grows downwards, so `jump_strength` is negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub speed: f32,
    pub jump_strength: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub player_size: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            jump_strength: -15.0,
            gravity: 0.8,
            terminal_velocity: 20.0,
            player_size: Vec2::new(32.0, 32.0),
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("speed", self.speed)?;
        finite("jump_strength", self.jump_strength)?;
        finite("gravity", self.gravity)?;
        finite("terminal_velocity", self.terminal_velocity)?;

        if self.speed < 0.0 {
            return Err(invalid("speed", "must not be negative"));
        }
        if self.jump_strength >= 0.0 {
            return Err(invalid("jump_strength", "must be negative (y grows downwards)"));
        }
        if self.gravity < 0.0 {
            return Err(invalid("gravity", "must not be negative"));
        }
        if self.terminal_velocity <= 0.0 {
            return Err(invalid("terminal_velocity", "must be positive"));
        }
        positive_size("player_size", self.player_size)
    }
}

/// Top-level game settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub viewport: Vec2,
    pub fps: u32,
    pub physics: PhysicsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "16-bit Platformer".into(),
            viewport: Vec2::new(1024.0, 768.0),
            fps: 60,
            physics: PhysicsConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_size("viewport", self.viewport)?;
        if self.fps == 0 {
            return Err(invalid("fps", "must be at least 1"));
        }
        self.physics.validate()
    }

    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file from disk.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite number"))
    }
}

fn positive_size(field: &'static str, size: Vec2) -> Result<(), ConfigError> {
    if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "width and height must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "fps": 30, "physics": { "gravity": 1.5 } }"#).unwrap();
        assert_eq!(config.fps, 30);
        assert_eq!(config.physics.gravity, 1.5);
        assert_eq!(config.physics.speed, 5.0);
        assert_eq!(config.viewport, Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn positive_jump_strength_is_rejected() {
        let err = GameConfig::from_json(r#"{ "physics": { "jump_strength": 15.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "jump_strength", .. }));
    }

    #[test]
    fn zero_viewport_is_rejected() {
        let err = GameConfig::from_json(r#"{ "viewport": { "x": 0.0, "y": 768.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "viewport", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(GameConfig::from_json("{ fps: "), Err(ConfigError::Json(_))));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        let mut config = GameConfig::default();
        config.title = "Test".into();
        std::fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(GameConfig::load_from_file(&path).unwrap(), config);
    }
}
