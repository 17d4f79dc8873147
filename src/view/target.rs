//! Drawing surface capability.
//!
//! The renderer and the tree view never touch a DOM or canvas directly. They
//! issue keyed operations against a `RenderTarget`; the host decides how a
//! circle or a tree entry actually appears.

use serde::Serialize;

use super::transform::ViewTransform;
use super::viewport::ViewportRect;
use crate::tree::{EntryId, EntryView};

/// The two graph surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    Main,
    Overview,
}

/// Identity of a drawn element, stable across frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeKey {
    Node {
        id: String,
    },
    /// Parallel edges are told apart by their occurrence among edges with
    /// the same endpoints.
    Edge {
        source: String,
        target: String,
        occurrence: u32,
    },
}

impl ShapeKey {
    pub fn node(id: impl Into<String>) -> Self {
        Self::Node { id: id.into() }
    }
}

/// Geometry in surface coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        label: Option<String>,
    },
    /// Box with a bold title line and one text line per attribute.
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        title: String,
        lines: Vec<String>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        arrow: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "camelCase")]
pub enum Style {
    Node,
    FocusedNode,
    Link,
    OverviewNode { fill: &'static str },
    OverviewLink,
}

/// Pointer handlers attached to a newly created shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerEvents {
    Drag,
    Click,
}

pub trait RenderTarget {
    /// Create or replace the element with this key.
    fn place(&mut self, surface: Surface, key: &ShapeKey, shape: &Shape, style: Style);

    fn remove(&mut self, surface: Surface, key: &ShapeKey);

    fn attach_pointer(&mut self, surface: Surface, key: &ShapeKey, events: PointerEvents);

    /// Transform of the main surface's content group.
    fn set_transform(&mut self, transform: ViewTransform);

    /// Overview rectangle marking the visible region of the main view.
    fn set_viewport(&mut self, rect: ViewportRect);

    fn create_tree_entry(&mut self, entry: &EntryView);

    fn set_tree_entry_expanded(&mut self, id: EntryId, expanded: bool);

    fn destroy_tree_entry(&mut self, id: EntryId);
}

/// A recorded `RenderTarget` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Place {
        surface: Surface,
        key: ShapeKey,
        shape: Shape,
        style: Style,
    },
    Remove {
        surface: Surface,
        key: ShapeKey,
    },
    AttachPointer {
        surface: Surface,
        key: ShapeKey,
        events: PointerEvents,
    },
    SetTransform {
        transform: ViewTransform,
    },
    SetViewport {
        rect: ViewportRect,
    },
    CreateTreeEntry {
        entry: EntryView,
    },
    SetTreeEntryExpanded {
        id: EntryId,
        expanded: bool,
    },
    DestroyTreeEntry {
        id: EntryId,
    },
}

/// Recording target. The wasm bindings drain it once per frame and hand the
/// commands to JavaScript.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every recorded command, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl RenderTarget for CommandBuffer {
    fn place(&mut self, surface: Surface, key: &ShapeKey, shape: &Shape, style: Style) {
        self.commands.push(DrawCommand::Place {
            surface,
            key: key.clone(),
            shape: shape.clone(),
            style,
        });
    }

    fn remove(&mut self, surface: Surface, key: &ShapeKey) {
        self.commands.push(DrawCommand::Remove {
            surface,
            key: key.clone(),
        });
    }

    fn attach_pointer(&mut self, surface: Surface, key: &ShapeKey, events: PointerEvents) {
        self.commands.push(DrawCommand::AttachPointer {
            surface,
            key: key.clone(),
            events,
        });
    }

    fn set_transform(&mut self, transform: ViewTransform) {
        self.commands.push(DrawCommand::SetTransform { transform });
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.commands.push(DrawCommand::SetViewport { rect });
    }

    fn create_tree_entry(&mut self, entry: &EntryView) {
        self.commands.push(DrawCommand::CreateTreeEntry {
            entry: entry.clone(),
        });
    }

    fn set_tree_entry_expanded(&mut self, id: EntryId, expanded: bool) {
        self.commands
            .push(DrawCommand::SetTreeEntryExpanded { id, expanded });
    }

    fn destroy_tree_entry(&mut self, id: EntryId) {
        self.commands.push(DrawCommand::DestroyTreeEntry { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_buffer_records_and_drains() {
        let mut buffer = CommandBuffer::new();
        let key = ShapeKey::node("a");
        buffer.place(
            Surface::Main,
            &key,
            &Shape::Circle {
                cx: 1.0,
                cy: 2.0,
                r: 15.0,
                label: Some("a".into()),
            },
            Style::Node,
        );
        buffer.remove(Surface::Overview, &key);
        assert_eq!(buffer.len(), 2);

        let drained = buffer.drain();
        assert!(buffer.is_empty());
        assert!(matches!(drained[1], DrawCommand::Remove { surface: Surface::Overview, .. }));
    }

    #[test]
    fn test_commands_serialize_tagged() {
        let command = DrawCommand::Place {
            surface: Surface::Overview,
            key: ShapeKey::Edge {
                source: "a".into(),
                target: "b".into(),
                occurrence: 1,
            },
            shape: Shape::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 1.0,
                y2: 1.0,
                arrow: false,
            },
            style: Style::OverviewNode { fill: "#1f77b4" },
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["op"], "place");
        assert_eq!(json["surface"], "overview");
        assert_eq!(json["key"]["kind"], "edge");
        assert_eq!(json["key"]["occurrence"], 1);
        assert_eq!(json["shape"]["type"], "line");
        assert_eq!(json["style"]["style"], "overviewNode");
        assert_eq!(json["style"]["fill"], "#1f77b4");
    }
}
