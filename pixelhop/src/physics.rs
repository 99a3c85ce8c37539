//! Player body and collision resolution against static platforms.
//!
//! Movement is axis-separated: the horizontal displacement is applied and fully
//! resolved before the vertical one. Both resolution passes walk the platform
//! list in declaration order and apply each correction as they go, so when the
//! player overlaps several platforms at once the outcome depends on that order.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::input::InputSnapshot;
use crate::math::{Rect, Vec2};

/// Static level geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
        }
    }
}

/// Outcome of the vertical resolution pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalResolution {
    pub rect: Rect,
    pub velocity_y: f32,
    pub grounded: bool,
}

/// Push `rect` out of every platform it overlaps, on the side opposite to its
/// horizontal motion.
///
/// Overlaps while `velocity_x == 0` are left alone.
pub fn resolve_horizontal(mut rect: Rect, velocity_x: f32, platforms: &[Platform]) -> Rect {
    for platform in platforms {
        if !rect.intersects(&platform.rect) {
            continue;
        }
        if velocity_x > 0.0 {
            rect.set_right(platform.rect.left());
        } else if velocity_x < 0.0 {
            rect.set_left(platform.rect.right());
        }
    }
    rect
}

/// Push `rect` out of every platform it overlaps vertically.
///
/// Falling onto a platform lands on it (`grounded`); rising into one bumps the
/// head. Either way the vertical velocity is zeroed. Overlaps while
/// `velocity_y == 0` are left alone.
pub fn resolve_vertical(
    mut rect: Rect,
    mut velocity_y: f32,
    platforms: &[Platform],
) -> VerticalResolution {
    let mut grounded = false;
    for platform in platforms {
        if !rect.intersects(&platform.rect) {
            continue;
        }
        if velocity_y > 0.0 {
            rect.set_bottom(platform.rect.top());
            velocity_y = 0.0;
            grounded = true;
        } else if velocity_y < 0.0 {
            rect.set_top(platform.rect.bottom());
            velocity_y = 0.0;
        }
    }
    VerticalResolution {
        rect,
        velocity_y,
        grounded,
    }
}

/// The player's physical state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Top-left corner of the bounding box.
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
}

impl PlayerBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            grounded: false,
        }
    }

    /// Spawn a player at `position` with the configured size.
    pub fn spawn(position: Vec2, config: &PhysicsConfig) -> Self {
        Self::new(position, config.player_size)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Start a jump. Does nothing unless the player is standing on a platform.
    pub fn jump(&mut self, config: &PhysicsConfig) {
        if self.grounded {
            self.velocity.y = config.jump_strength;
            self.grounded = false;
            log::trace!("jump from y={}", self.position.y);
        }
    }

    /// Advance the body by one tick.
    pub fn update(&mut self, input: &InputSnapshot, platforms: &[Platform], config: &PhysicsConfig) {
        self.velocity.x = 0.0;
        if input.left {
            self.velocity.x = -config.speed;
        }
        if input.right {
            self.velocity.x = config.speed;
        }

        self.velocity.y += config.gravity;

        self.position.x += self.velocity.x;
        self.position = resolve_horizontal(self.rect(), self.velocity.x, platforms).position;

        self.grounded = false;
        self.position.y += self.velocity.y;
        let vertical = resolve_vertical(self.rect(), self.velocity.y, platforms);
        self.position = vertical.rect.position;
        self.velocity.y = vertical.velocity_y;
        self.grounded = vertical.grounded;

        if self.velocity.y > config.terminal_velocity {
            self.velocity.y = config.terminal_velocity;
        }
    }
}

/// One full tick as a pure function: the jump request (if any) followed by
/// [`PlayerBody::update`]. Returns the next state instead of mutating in place.
pub fn step(
    state: PlayerBody,
    input: &InputSnapshot,
    platforms: &[Platform],
    config: &PhysicsConfig,
) -> PlayerBody {
    let mut next = state;
    if input.jump {
        next.jump(config);
    }
    next.update(input, platforms, config);
    next
}
