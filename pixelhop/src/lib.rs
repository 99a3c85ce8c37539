//! Pixel Hop - a tiny side-scrolling platformer core.
//!
//! The simulation (player physics and the follow camera) is pure and
//! single-threaded. Input, drawing and frame pacing are reached through the
//! [`InputSource`] and [`RenderTarget`] traits so front ends stay thin.

pub mod camera;
pub mod config;
pub mod engine;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod render;
pub mod sandbox;
pub mod world;

pub use crate::camera::Camera;
pub use crate::config::{ConfigError, GameConfig, PhysicsConfig};
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::input::{InputSnapshot, InputSource, InputState, Key, KeyBindings, ScriptedInput};
pub use crate::level::{Level, LevelError};
pub use crate::math::{Rect, Vec2};
pub use crate::physics::{step, Platform, PlayerBody};
pub use crate::render::{DrawCommand, FrameRecorder, RenderTarget, Visual};
pub use crate::sandbox::Sandbox;
pub use crate::world::World;
