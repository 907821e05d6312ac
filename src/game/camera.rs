use super::constants::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WORLD_SIZE};
use super::math::clamp;
use super::types::Point;

/// Top-left corner of the viewport in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

impl Camera {
    pub fn follow(&mut self, focus: Point) {
        self.x = clamp(focus.x - VIEWPORT_WIDTH / 2.0, 0.0, WORLD_SIZE - VIEWPORT_WIDTH);
        self.y = clamp(focus.y - VIEWPORT_HEIGHT / 2.0, 0.0, WORLD_SIZE - VIEWPORT_HEIGHT);
    }
}
