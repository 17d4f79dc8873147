//! Overview rectangle tracking the visible part of the main view.

use serde::Serialize;

use super::transform::ViewTransform;

/// Rectangle in overview coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Maps the main-view transform to the overview rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSyncer {
    main_size: (f32, f32),
    overview_size: (f32, f32),
}

impl ViewportSyncer {
    pub fn new(main_size: (f32, f32), overview_size: (f32, f32)) -> Self {
        Self {
            main_size,
            overview_size,
        }
    }

    pub fn main_size(&self) -> (f32, f32) {
        self.main_size
    }

    pub fn overview_size(&self) -> (f32, f32) {
        self.overview_size
    }

    /// Overview units per main-view unit, per axis.
    pub fn scale_factor(&self) -> (f32, f32) {
        (
            self.overview_size.0 / self.main_size.0,
            self.overview_size.1 / self.main_size.1,
        )
    }

    pub fn sync(&self, transform: &ViewTransform) -> ViewportRect {
        let (factor_x, factor_y) = self.scale_factor();
        let k = transform.scale;
        ViewportRect {
            x: -transform.translate_x * factor_x / k,
            y: -transform.translate_y * factor_y / k,
            width: self.overview_size.0 / k,
            height: self.overview_size.1 / k,
        }
    }
}
