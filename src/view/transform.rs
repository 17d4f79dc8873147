//! Pan/zoom transform of the main view.
//!
//! Screen = world * scale + translate. The transform is owned by the session
//! and read by the viewport syncer and the hit tester.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn new(translate_x: f32, translate_y: f32, scale: f32) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    /// World to screen.
    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    /// Screen to world.
    #[inline]
    pub fn invert(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.translate_x) / self.scale,
            (y - self.translate_y) / self.scale,
        )
    }

    /// Translate by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Multiply the scale by `factor`, clamped to `extent`, keeping the world
    /// point under the screen pointer `(x, y)` fixed.
    pub fn zoom_about(&mut self, factor: f32, x: f32, y: f32, extent: [f32; 2]) {
        let scale = (self.scale * factor).clamp(extent[0], extent[1]);
        let (world_x, world_y) = self.invert(x, y);
        self.scale = scale;
        self.translate_x = x - world_x * scale;
        self.translate_y = y - world_y * scale;
    }

    /// Translate so the world point `(x, y)` sits in the middle of a view of
    /// the given size. Scale is unchanged.
    pub fn center_on(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.translate_x = width / 2.0 - x * self.scale;
        self.translate_y = height / 2.0 - y * self.scale;
    }
}
