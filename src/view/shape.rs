//! Node drawing strategies for the main view.

use serde::{Deserialize, Serialize};

use super::target::Shape;
use crate::graph::Node;

/// Boxes are anchored at the node position, shifted up by this much.
const BOX_TOP_OFFSET: f32 = 10.0;
const BOX_MIN_CHARS: usize = 10;
const BOX_CHAR_WIDTH: f32 = 9.0;
const BOX_PADDING: f32 = 5.0;
const BOX_LINE_HEIGHT: f32 = 16.0;

/// How a node is drawn in the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeShape {
    /// Circle labelled with the node id.
    #[default]
    SimpleCircle,
    /// Box with the node id as title and one line per attribute.
    BoxedWithAttributes,
}

impl NodeShape {
    /// Shape for `node` anchored at `(x, y)`.
    pub fn shape(self, node: &Node, x: f32, y: f32, radius: f32) -> Shape {
        match self {
            Self::SimpleCircle => Shape::Circle {
                cx: x,
                cy: y,
                r: radius,
                label: Some(node.id().to_owned()),
            },
            Self::BoxedWithAttributes => {
                let (width, height) = box_size(node);
                Shape::Box {
                    x,
                    y: y - BOX_TOP_OFFSET,
                    width,
                    height,
                    title: node.id().to_owned(),
                    lines: node
                        .attributes()
                        .iter()
                        .map(|(key, value)| format!("-{key} : {value}"))
                        .collect(),
                }
            }
        }
    }

    /// Furthest distance from the anchor that the shape covers.
    pub fn reach(self, node: &Node, radius: f32) -> f32 {
        match self {
            Self::SimpleCircle => radius,
            Self::BoxedWithAttributes => {
                let (width, height) = box_size(node);
                let below = height - BOX_TOP_OFFSET;
                let vertical = below.max(BOX_TOP_OFFSET);
                (width * width + vertical * vertical).sqrt()
            }
        }
    }

    /// Whether the shape anchored at `anchor` covers `point`.
    pub fn contains(self, node: &Node, anchor: (f32, f32), point: (f32, f32), radius: f32) -> bool {
        match self {
            Self::SimpleCircle => {
                let dx = point.0 - anchor.0;
                let dy = point.1 - anchor.1;
                dx * dx + dy * dy <= radius * radius
            }
            Self::BoxedWithAttributes => {
                let (width, height) = box_size(node);
                let left = anchor.0;
                let top = anchor.1 - BOX_TOP_OFFSET;
                point.0 >= left
                    && point.0 <= left + width
                    && point.1 >= top
                    && point.1 <= top + height
            }
        }
    }
}

/// Width from the longest attribute (key plus value characters, at least
/// ten), height from the attribute count plus the title lines.
fn box_size(node: &Node) -> (f32, f32) {
    let longest = node
        .attributes()
        .iter()
        .map(|(key, value)| key.chars().count() + value.chars().count())
        .max()
        .unwrap_or(0)
        .max(BOX_MIN_CHARS);
    let lines = node.attributes().len() + 2;
    (
        longest as f32 * BOX_CHAR_WIDTH + BOX_PADDING,
        lines as f32 * BOX_LINE_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn node(attributes: &[(&str, &str)]) -> Node {
        let attributes: IndexMap<String, String> = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Node::new("n1", attributes)
    }

    #[test]
    fn test_box_size_from_attributes() {
        let n = node(&[("name", "a fairly long value"), ("k", "v")]);
        let shape = NodeShape::BoxedWithAttributes.shape(&n, 100.0, 50.0, 15.0);
        match shape {
            Shape::Box {
                x,
                y,
                width,
                height,
                title,
                lines,
            } => {
                assert_eq!((x, y), (100.0, 40.0));
                // "name" + "a fairly long value" = 23 chars.
                assert_eq!(width, 23.0 * 9.0 + 5.0);
                assert_eq!(height, 4.0 * 16.0);
                assert_eq!(title, "n1");
                assert_eq!(lines, vec!["-name : a fairly long value", "-k : v"]);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_box_minimum_width() {
        let n = node(&[]);
        let (width, height) = box_size(&n);
        assert_eq!(width, 95.0);
        assert_eq!(height, 32.0);
    }

    #[test]
    fn test_circle_hit() {
        let n = node(&[]);
        let shape = NodeShape::SimpleCircle;
        assert!(shape.contains(&n, (0.0, 0.0), (10.0, 10.0), 15.0));
        assert!(!shape.contains(&n, (0.0, 0.0), (12.0, 12.0), 15.0));
        assert_eq!(shape.reach(&n, 15.0), 15.0);
    }

    #[test]
    fn test_box_hit_is_offset_from_anchor() {
        let n = node(&[("k", "v")]);
        let shape = NodeShape::BoxedWithAttributes;
        assert!(shape.contains(&n, (0.0, 0.0), (50.0, 20.0), 15.0));
        assert!(!shape.contains(&n, (0.0, 0.0), (-1.0, 0.0), 15.0));
        assert!(!shape.contains(&n, (0.0, 0.0), (10.0, -11.0), 15.0));
        assert!(shape.reach(&n, 15.0) >= 95.0);
    }
}
