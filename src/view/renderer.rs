//! DualViewRenderer - draws the layout into the main and overview surfaces.
//!
//! Each draw builds the full keyed frame for both surfaces, diffs it against
//! what is mounted, and only emits the difference. Redrawing an unchanged
//! layout therefore emits nothing.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use super::ViewConfig;
use super::reconcile::{Reconciliation, reconcile};
use super::shape::NodeShape;
use super::target::{PointerEvents, RenderTarget, Shape, ShapeKey, Style, Surface};
use crate::graph::{GraphModel, NodeId};
use crate::layout::LayoutState;

/// Overview node fills, picked by node slot (d3 `schemeCategory10`).
pub const OVERVIEW_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq)]
struct Mounted {
    shape: Shape,
    style: Style,
}

type Frame = IndexMap<ShapeKey, Mounted>;

/// Number of shapes touched by a draw, over both surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl DrawStats {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }

    fn record(&mut self, diff: &Reconciliation<ShapeKey>) {
        self.created += diff.created.len();
        self.updated += diff.updated.len();
        self.removed += diff.removed.len();
    }
}

pub struct DualViewRenderer {
    node_shape: NodeShape,
    node_radius: f32,
    overview_node_radius: f32,
    overview_ratio: f32,
    /// Document id of the highlighted node. Kept by id so it survives a
    /// model rebuild.
    focused: Option<String>,
    main: Frame,
    overview: Frame,
}

impl DualViewRenderer {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            node_shape: config.node_shape,
            node_radius: config.node_radius,
            overview_node_radius: config.overview_node_radius,
            overview_ratio: config.overview_ratio,
            focused: None,
            main: Frame::new(),
            overview: Frame::new(),
        }
    }

    pub fn node_shape(&self) -> NodeShape {
        self.node_shape
    }

    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Highlight a node by document id, or clear the highlight.
    pub fn set_focus(&mut self, id: Option<String>) {
        self.focused = id;
    }

    /// Number of shapes mounted on a surface.
    pub fn mounted(&self, surface: Surface) -> usize {
        match surface {
            Surface::Main => self.main.len(),
            Surface::Overview => self.overview.len(),
        }
    }

    /// Draw both surfaces from the same layout snapshot.
    pub fn draw(
        &mut self,
        model: &GraphModel,
        state: &LayoutState,
        target: &mut dyn RenderTarget,
    ) -> DrawStats {
        let (main, overview) = self.build_frames(model, state);

        let mut stats = DrawStats::default();
        stats.record(&commit(
            Surface::Main,
            &mut self.main,
            main,
            PointerEvents::Drag,
            target,
        ));
        stats.record(&commit(
            Surface::Overview,
            &mut self.overview,
            overview,
            PointerEvents::Click,
            target,
        ));

        trace!("draw: {stats:?}");
        stats
    }

    fn build_frames(&self, model: &GraphModel, state: &LayoutState) -> (Frame, Frame) {
        let xs = state.positions_x();
        let ys = state.positions_y();
        let ratio = self.overview_ratio;

        let mut main = Frame::with_capacity(model.node_count() + model.edge_count());
        let mut overview = Frame::with_capacity(model.node_count() + model.edge_count());

        // Edges first so nodes are stacked above them.
        let mut occurrences: HashMap<(NodeId, NodeId), u32> = HashMap::new();
        for edge in model.edges() {
            let (Some(source), Some(target)) = (model.node(edge.source), model.node(edge.target))
            else {
                continue;
            };
            let occurrence = occurrences.entry((edge.source, edge.target)).or_insert(0);
            let key = ShapeKey::Edge {
                source: source.id().to_owned(),
                target: target.id().to_owned(),
                occurrence: *occurrence,
            };
            *occurrence += 1;

            let (s, t) = (edge.source.index(), edge.target.index());
            main.insert(
                key.clone(),
                Mounted {
                    shape: Shape::Line {
                        x1: xs[s],
                        y1: ys[s],
                        x2: xs[t],
                        y2: ys[t],
                        arrow: true,
                    },
                    style: Style::Link,
                },
            );
            overview.insert(
                key,
                Mounted {
                    shape: Shape::Line {
                        x1: xs[s] / ratio,
                        y1: ys[s] / ratio,
                        x2: xs[t] / ratio,
                        y2: ys[t] / ratio,
                        arrow: false,
                    },
                    style: Style::OverviewLink,
                },
            );
        }

        for (slot, node) in model.nodes().iter().enumerate() {
            let (x, y) = (xs[slot], ys[slot]);
            let key = ShapeKey::node(node.id());
            let style = if self.focused.as_deref() == Some(node.id()) {
                Style::FocusedNode
            } else {
                Style::Node
            };

            main.insert(
                key.clone(),
                Mounted {
                    shape: self.node_shape.shape(node, x, y, self.node_radius),
                    style,
                },
            );
            overview.insert(
                key,
                Mounted {
                    shape: Shape::Circle {
                        cx: x / ratio,
                        cy: y / ratio,
                        r: self.overview_node_radius,
                        label: Some(node.id().to_owned()),
                    },
                    style: Style::OverviewNode {
                        fill: OVERVIEW_PALETTE[slot % OVERVIEW_PALETTE.len()],
                    },
                },
            );
        }

        (main, overview)
    }
}

/// Emit the difference between `mounted` and `next` and mount `next`.
fn commit(
    surface: Surface,
    mounted: &mut Frame,
    next: Frame,
    events: PointerEvents,
    target: &mut dyn RenderTarget,
) -> Reconciliation<ShapeKey> {
    let diff = reconcile(mounted, &next);

    for key in &diff.removed {
        target.remove(surface, key);
    }
    for key in &diff.created {
        let entry = &next[key];
        target.place(surface, key, &entry.shape, entry.style);
        if matches!(key, ShapeKey::Node { .. }) {
            target.attach_pointer(surface, key, events);
        }
    }
    for key in &diff.updated {
        let entry = &next[key];
        target.place(surface, key, &entry.shape, entry.style);
    }

    *mounted = next;
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDocument;
    use crate::layout::{ForceConfig, ForceLayoutEngine};
    use crate::view::target::{CommandBuffer, DrawCommand};

    fn setup(doc: &GraphDocument) -> (GraphModel, ForceLayoutEngine) {
        let model = GraphModel::from_document(doc).unwrap();
        let engine = ForceLayoutEngine::new(&model, ForceConfig::default(), (400.0, 300.0));
        (model, engine)
    }

    fn triangle() -> GraphDocument {
        let mut doc = GraphDocument::default();
        for id in ["a", "b", "c"] {
            doc.add_node(id, [("kind", "test")]);
        }
        doc.add_link("a", "b");
        doc.add_link("b", "c");
        doc.add_link("a", "b");
        doc
    }

    #[test]
    fn test_first_draw_mounts_both_surfaces() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();

        let stats = renderer.draw(&model, engine.state(), &mut buffer);
        // 3 nodes + 3 edges per surface.
        assert_eq!(stats.created, 12);
        assert_eq!(renderer.mounted(Surface::Main), 6);
        assert_eq!(renderer.mounted(Surface::Overview), 6);

        let attached: Vec<_> = buffer
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::AttachPointer { surface, events, .. } => Some((*surface, *events)),
                _ => None,
            })
            .collect();
        assert_eq!(attached.len(), 6);
        assert!(attached.contains(&(Surface::Main, PointerEvents::Drag)));
        assert!(attached.contains(&(Surface::Overview, PointerEvents::Click)));
    }

    #[test]
    fn test_redraw_of_unchanged_layout_is_idempotent() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();

        renderer.draw(&model, engine.state(), &mut buffer);
        buffer.drain();

        let stats = renderer.draw(&model, engine.state(), &mut buffer);
        assert!(stats.is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_tick_updates_without_recreating() {
        let (model, mut engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();

        renderer.draw(&model, engine.state(), &mut buffer);
        engine.tick();
        let stats = renderer.draw(&model, engine.state(), &mut buffer);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.removed, 0);
        assert!(stats.updated > 0);
    }

    #[test]
    fn test_overview_is_main_over_ratio() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();
        renderer.draw(&model, engine.state(), &mut buffer);

        let (x, y) = engine.state().position(NodeId(1)).unwrap();
        let key = ShapeKey::node("b");
        let overview = buffer.commands().iter().find_map(|command| match command {
            DrawCommand::Place {
                surface: Surface::Overview,
                key: k,
                shape: Shape::Circle { cx, cy, r, .. },
                style,
            } if *k == key => Some((*cx, *cy, *r, *style)),
            _ => None,
        });
        let (cx, cy, r, style) = overview.unwrap();
        assert!((cx - x / 5.0).abs() < 1e-4);
        assert!((cy - y / 5.0).abs() < 1e-4);
        assert_eq!(r, 3.0);
        assert_eq!(style, Style::OverviewNode { fill: OVERVIEW_PALETTE[1] });
    }

    #[test]
    fn test_parallel_edges_get_distinct_keys() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();
        renderer.draw(&model, engine.state(), &mut buffer);

        let occurrences: Vec<u32> = buffer
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Place {
                    surface: Surface::Main,
                    key: ShapeKey::Edge { source, target, occurrence },
                    ..
                } if source == "a" && target == "b" => Some(*occurrence),
                _ => None,
            })
            .collect();
        assert_eq!(occurrences, vec![0, 1]);
    }

    #[test]
    fn test_focus_changes_only_style() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();
        renderer.draw(&model, engine.state(), &mut buffer);
        buffer.drain();

        renderer.set_focus(Some("c".into()));
        let stats = renderer.draw(&model, engine.state(), &mut buffer);
        assert_eq!(stats.updated, 1);
        assert!(matches!(
            buffer.commands(),
            [DrawCommand::Place { surface: Surface::Main, style: Style::FocusedNode, .. }]
        ));
    }

    #[test]
    fn test_vanished_nodes_are_removed() {
        let (model, engine) = setup(&triangle());
        let mut renderer = DualViewRenderer::new(&ViewConfig::default());
        let mut buffer = CommandBuffer::new();
        renderer.draw(&model, engine.state(), &mut buffer);
        buffer.drain();

        let mut doc = GraphDocument::default();
        doc.add_node("a", [("kind", "test")]);
        let (smaller, smaller_engine) = setup(&doc);
        let stats = renderer.draw(&smaller, smaller_engine.state(), &mut buffer);

        // b, c and all three edges on both surfaces.
        assert_eq!(stats.removed, 10);
        assert_eq!(renderer.mounted(Surface::Main), 1);
    }
}
