//! Level descriptions: the spawn point and the static platform list.
//!
//! Levels can be built in code or loaded from JSON. Platform order in the file
//! is preserved; collision resolution walks platforms in that order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;
use crate::physics::Platform;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level: {0}")]
    Json(#[from] serde_json::Error),
    #[error("platform {index} has a non-positive or non-finite size")]
    InvalidPlatform { index: usize },
    #[error("spawn point is not finite")]
    InvalidSpawn,
}

/// A complete level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Level format version for migration support.
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub spawn: Vec2,
    pub platforms: Vec<Platform>,
}

fn default_version() -> u32 {
    1
}

impl Level {
    pub fn new(name: impl Into<String>, spawn: Vec2) -> Self {
        Self {
            version: default_version(),
            name: name.into(),
            spawn,
            platforms: Vec::new(),
        }
    }

    /// Append a platform, builder style.
    #[must_use]
    pub fn with_platform(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.platforms.push(Platform::new(x, y, width, height));
        self
    }

    /// The stock level: a ground strip as wide as the screen, a staircase of
    /// floating ledges, and a tall wall far to the right.
    pub fn default_level(screen_width: f32, screen_height: f32) -> Self {
        let ground_height = 50.0;
        let ground_y = screen_height - ground_height;

        Self::new("Default", Vec2::new(100.0, 100.0))
            .with_platform(0.0, ground_y, screen_width, ground_height)
            .with_platform(300.0, ground_y - 150.0, 200.0, 30.0)
            .with_platform(600.0, ground_y - 250.0, 200.0, 30.0)
            .with_platform(900.0, ground_y - 350.0, 200.0, 30.0)
            .with_platform(1200.0, ground_y - 200.0, 200.0, 30.0)
            .with_platform(1500.0, ground_y - 300.0, 200.0, 30.0)
            .with_platform(2000.0, ground_y - 400.0, 30.0, 400.0)
    }

    /// Check that every platform has a usable size and the spawn is finite.
    pub fn validate(&self) -> Result<(), LevelError> {
        if !self.spawn.is_finite() {
            return Err(LevelError::InvalidSpawn);
        }
        for (index, platform) in self.platforms.iter().enumerate() {
            let rect = platform.rect;
            let ok = rect.position.is_finite()
                && rect.size.is_finite()
                && rect.size.x > 0.0
                && rect.size.y > 0.0;
            if !ok {
                return Err(LevelError::InvalidPlatform { index });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), LevelError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level '{}' ({} platforms) from {}",
            level.name,
            level.platforms.len(),
            path.display()
        );
        Ok(level)
    }
}
