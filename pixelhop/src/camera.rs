//! Camera that keeps its target centered in the viewport.

use glam::{Mat4, Vec3};

use crate::math::{Rect, Vec2};

/// Screen-space camera.
///
/// The offset is recomputed from scratch on every [`Camera::update`]; there is
/// no smoothing and no clamping to level bounds, so the view can run past the
/// edges of the level geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Vec2,
    offset: Vec2,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Vec2::new(width, height),
            offset: Vec2::ZERO,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Translation added to world positions to obtain screen positions.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Center the view on `target_center` and return the new offset.
    pub fn update(&mut self, target_center: Vec2) -> Vec2 {
        self.offset = Vec2::new(
            -target_center.x + self.viewport.x / 2.0,
            -target_center.y + self.viewport.y / 2.0,
        );
        self.offset
    }

    /// Center the view on a rectangle.
    pub fn follow(&mut self, target: &Rect) -> Vec2 {
        self.update(target.center())
    }

    /// Convert a world position to screen space.
    pub fn apply(&self, world_pos: Vec2) -> Vec2 {
        world_pos + self.offset
    }

    /// Convert a world rectangle to screen space.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        rect.translated(self.offset)
    }

    /// Convert a screen position back to world space.
    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        screen_pos - self.offset
    }

    /// Returns true when any part of `rect` is inside the viewport.
    pub fn is_visible(&self, rect: &Rect) -> bool {
        let screen = Rect::from_position_size(Vec2::ZERO, self.viewport);
        self.apply_rect(rect).intersects(&screen)
    }

    /// Orthographic view-projection for GPU renderers (y down, origin top-left).
    pub fn view_projection(&self) -> Mat4 {
        let projection =
            Mat4::orthographic_rh_gl(0.0, self.viewport.x, self.viewport.y, 0.0, -1.0, 1.0);
        let translation = Mat4::from_translation(Vec3::new(self.offset.x, self.offset.y, 0.0));

        projection * translation
    }
}
