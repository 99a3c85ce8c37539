use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

/// 2D vector type used throughout Pixel Hop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_glam(&self) -> GlamVec2 {
        GlamVec2::new(self.x, self.y)
    }

    /// Returns true when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle described by its top-left corner and size.
///
/// Y grows downwards, so `top < bottom` for any rectangle with a positive height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.size.x / 2.0,
            self.position.y + self.size.y / 2.0,
        )
    }

    /// Move the rectangle so its left edge sits at `x`.
    pub fn set_left(&mut self, x: f32) {
        self.position.x = x;
    }

    /// Move the rectangle so its right edge sits at `x`.
    pub fn set_right(&mut self, x: f32) {
        self.position.x = x - self.size.x;
    }

    /// Move the rectangle so its top edge sits at `y`.
    pub fn set_top(&mut self, y: f32) {
        self.position.y = y;
    }

    /// Move the rectangle so its bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.position.y = y - self.size.y;
    }

    /// Returns a copy shifted by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            position: self.position + delta,
            size: self.size,
        }
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Clamp the rectangle's position so it stays inside `bounds`.
    ///
    /// When the rectangle is larger than `bounds` on an axis it is pinned to the
    /// bounds' leading edge.
    pub fn clamped_inside(&self, bounds: &Rect) -> Self {
        let max_x = (bounds.right() - self.size.x).max(bounds.left());
        let max_y = (bounds.bottom() - self.size.y).max(bounds.top());
        Self {
            position: Vec2::new(
                self.position.x.clamp(bounds.left(), max_x),
                self.position.y.clamp(bounds.top(), max_y),
            ),
            size: self.size,
        }
    }
}
