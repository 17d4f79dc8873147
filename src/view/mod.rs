//! Main view, overview (minimap) and the coordinate sync between them.
//!
//! - `DualViewRenderer` draws both surfaces from one `LayoutState` in a
//!   single call, reconciling against what each surface already shows
//! - `ViewTransform` holds the main view's pan/zoom
//! - `ViewportSyncer` turns that transform into the overview rectangle

mod reconcile;
mod renderer;
mod shape;
mod target;
mod transform;
mod viewport;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use reconcile::{Reconciliation, reconcile};
pub use renderer::{DrawStats, DualViewRenderer, OVERVIEW_PALETTE};
pub use shape::NodeShape;
pub use target::{
    CommandBuffer, DrawCommand, PointerEvents, RenderTarget, Shape, ShapeKey, Style, Surface,
};
pub use transform::ViewTransform;
pub use viewport::{ViewportRect, ViewportSyncer};

/// Configuration for both views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub main_width: f32,
    pub main_height: f32,
    /// Main-view units per overview unit.
    pub overview_ratio: f32,
    /// Overview pixel size; each defaults to the main size over the ratio.
    pub overview_width: Option<f32>,
    pub overview_height: Option<f32>,
    /// Allowed main-view zoom range, `[min, max]`.
    pub scale_extent: [f32; 2],
    pub node_shape: NodeShape,
    pub node_radius: f32,
    pub overview_node_radius: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            main_width: 800.0,
            main_height: 600.0,
            overview_ratio: 5.0,
            overview_width: None,
            overview_height: None,
            scale_extent: [1.0, 10.0],
            node_shape: NodeShape::SimpleCircle,
            node_radius: 15.0,
            overview_node_radius: 3.0,
        }
    }
}

impl ViewConfig {
    pub fn main_size(&self) -> (f32, f32) {
        (self.main_width, self.main_height)
    }

    pub fn overview_size(&self) -> (f32, f32) {
        (
            self.overview_width
                .unwrap_or(self.main_width / self.overview_ratio),
            self.overview_height
                .unwrap_or(self.main_height / self.overview_ratio),
        )
    }

    /// Centre of the main view, where the layout gathers.
    pub fn center(&self) -> (f32, f32) {
        (self.main_width / 2.0, self.main_height / 2.0)
    }

    /// Reject sizes, ratios and zoom ranges the views cannot work with.
    pub fn validate(&self) -> Result<()> {
        positive("main_width", self.main_width)?;
        positive("main_height", self.main_height)?;
        positive("overview_ratio", self.overview_ratio)?;
        if let Some(width) = self.overview_width {
            positive("overview_width", width)?;
        }
        if let Some(height) = self.overview_height {
            positive("overview_height", height)?;
        }
        positive("node_radius", self.node_radius)?;
        positive("overview_node_radius", self.overview_node_radius)?;

        let [min, max] = self.scale_extent;
        positive("scale_extent[0]", min)?;
        positive("scale_extent[1]", max)?;
        if min > max {
            return Err(Error::Config(format!(
                "scale_extent is inverted: [{min}, {max}]"
            )));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_size_follows_ratio() {
        let config = ViewConfig::default();
        assert_eq!(config.overview_size(), (160.0, 120.0));
    }

    #[test]
    fn test_overview_size_override() {
        let config = ViewConfig {
            overview_width: Some(200.0),
            ..ViewConfig::default()
        };
        assert_eq!(config.overview_size(), (200.0, 120.0));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ViewConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_scale_extent() {
        let config = ViewConfig {
            scale_extent: [10.0, 1.0],
            ..ViewConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_finite_scale_extent() {
        for extent in [[f32::NAN, 10.0], [1.0, f32::INFINITY], [0.0, 10.0]] {
            let config = ViewConfig {
                scale_extent: extent,
                ..ViewConfig::default()
            };
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{extent:?}");
        }
    }

    #[test]
    fn test_rejects_non_positive_sizes() {
        let cases = [
            ViewConfig {
                main_width: 0.0,
                ..ViewConfig::default()
            },
            ViewConfig {
                main_height: -600.0,
                ..ViewConfig::default()
            },
            ViewConfig {
                overview_ratio: 0.0,
                ..ViewConfig::default()
            },
            ViewConfig {
                overview_height: Some(-1.0),
                ..ViewConfig::default()
            },
            ViewConfig {
                node_radius: f32::NAN,
                ..ViewConfig::default()
            },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{config:?}");
        }
    }
}
