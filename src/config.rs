//! Session configuration.
//!
//! Every section and field has a default, so `{}` is a valid configuration
//! and hosts only spell out what they change:
//!
//! ```json
//! { "force": { "link_distance": 80.0 },
//!   "view": { "main_width": 1200.0, "node_shape": "boxedWithAttributes" },
//!   "tree": { "cyclic_fallback": "first_source" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::ForceConfig;
use crate::tree::TreeConfig;
use crate::view::ViewConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub force: ForceConfig,
    pub view: ViewConfig,
    pub tree: TreeConfig,
}

impl ExplorerConfig {
    /// Parse and validate a configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.view.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CyclicFallback;
    use crate::view::NodeShape;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(ExplorerConfig::from_json_str("{}").unwrap(), ExplorerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ExplorerConfig::from_json_str(
            r#"{ "force": { "link_distance": 80.0 },
                 "view": { "main_width": 1200.0, "node_shape": "boxedWithAttributes" },
                 "tree": { "cyclic_fallback": "first_source" } }"#,
        )
        .unwrap();

        assert_eq!(config.force.link_distance, 80.0);
        assert_eq!(config.force.charge_strength, -30.0);
        assert_eq!(config.view.main_width, 1200.0);
        assert_eq!(config.view.main_height, 600.0);
        assert_eq!(config.view.node_shape, NodeShape::BoxedWithAttributes);
        assert_eq!(config.tree.cyclic_fallback, CyclicFallback::FirstSource);
    }

    #[test]
    fn test_inverted_scale_extent_rejected() {
        let result =
            ExplorerConfig::from_json_str(r#"{ "view": { "scale_extent": [10.0, 1.0] } }"#);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_non_positive_view_sizes_rejected() {
        for json in [
            r#"{ "view": { "overview_ratio": 0.0 } }"#,
            r#"{ "view": { "main_width": -800.0 } }"#,
            r#"{ "view": { "main_height": 0.0 } }"#,
            r#"{ "view": { "overview_width": 0.0 } }"#,
        ] {
            let result = ExplorerConfig::from_json_str(json);
            assert!(matches!(result, Err(crate::Error::Config(_))), "{json}");
        }
    }

    #[test]
    fn test_explicit_overview_size() {
        let config = ExplorerConfig::from_json_str(
            r#"{ "view": { "overview_width": 240.0, "overview_height": 90.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.view.overview_size(), (240.0, 90.0));
    }

    #[test]
    fn test_bad_config_is_a_document_error() {
        let result = ExplorerConfig::from_json_str(r#"{ "view": { "overview_ratio": "five" } }"#);
        assert!(matches!(result, Err(crate::Error::Document(_))));
    }
}
