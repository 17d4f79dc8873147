//! Explorer - one interactive session over a loaded graph.
//!
//! The session exclusively owns the model, the layout engine, the main-view
//! transform, the renderer and the hierarchy view. Hosts drive it with
//! `frame()` once per animation frame and feed user input either as raw
//! pointer events or as explicit `Interaction` messages.

use log::{debug, info};

use crate::config::ExplorerConfig;
use crate::error::{Error, Result};
use crate::graph::{GraphModel, NodeId};
use crate::layout::ForceLayoutEngine;
use crate::spatial::SpatialIndex;
use crate::tree::{TreeCommand, TreeOutcome, TreeView};
use crate::view::{DualViewRenderer, RenderTarget, ViewTransform, ViewportRect, ViewportSyncer};

/// User input the session reacts to. Drag coordinates are in world space,
/// pan and zoom coordinates in main-view screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    DragStart { node: NodeId },
    DragMove { node: NodeId, x: f32, y: f32 },
    DragEnd { node: NodeId },
    /// Clear a node's pin.
    Release { node: NodeId },
    Pan { dx: f32, dy: f32 },
    /// Zoom by `factor` about the pointer at `(x, y)`.
    Zoom { factor: f32, x: f32, y: f32 },
    Tree(TreeCommand),
    /// Centre the main view on a node and highlight it.
    Focus { node: NodeId },
}

/// Pointer gesture in progress on the main view.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging(NodeId),
    Panning { last: (f32, f32) },
}

pub struct Explorer {
    config: ExplorerConfig,
    /// The graph as loaded; searches filter this.
    source: GraphModel,
    /// The graph currently shown.
    model: GraphModel,
    query: String,
    engine: ForceLayoutEngine,
    transform: ViewTransform,
    syncer: ViewportSyncer,
    renderer: DualViewRenderer,
    tree: TreeView,
    index: SpatialIndex,
    /// Largest distance from a node anchor that its main-view shape covers.
    hit_reach: f32,
    gesture: Gesture,
    mounted: bool,
}

impl Explorer {
    /// Start a session. `config` should already have passed
    /// `ExplorerConfig::validate`.
    pub fn new(model: GraphModel, config: ExplorerConfig) -> Self {
        let engine = ForceLayoutEngine::new(&model, config.force, config.view.center());
        let renderer = DualViewRenderer::new(&config.view);
        let tree = TreeView::new(&model, &config.tree);
        let hit_reach = hit_reach(&model, &renderer);

        info!(
            "explorer ready: {} nodes, {} edges",
            model.node_count(),
            model.edge_count()
        );

        Self {
            syncer: ViewportSyncer::new(config.view.main_size(), config.view.overview_size()),
            source: model.clone(),
            model,
            query: String::new(),
            engine,
            transform: ViewTransform::IDENTITY,
            renderer,
            tree,
            index: SpatialIndex::new(),
            hit_reach,
            gesture: Gesture::Idle,
            mounted: false,
            config,
        }
    }

    /// Parse a graph document and start a session over it.
    pub fn from_json_str(json: &str, config: ExplorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(GraphModel::from_json_str(json)?, config))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The graph currently shown.
    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn engine(&self) -> &ForceLayoutEngine {
        &self.engine
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn viewport(&self) -> ViewportRect {
        self.syncer.sync(&self.transform)
    }

    pub fn tree(&self) -> &TreeView {
        &self.tree
    }

    pub fn renderer(&self) -> &DualViewRenderer {
        &self.renderer
    }

    /// Active search text; empty when the whole graph is shown.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_at_rest(&self) -> bool {
        self.engine.is_at_rest()
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance the layout one tick and draw both views. Returns whether the
    /// layout moved. The first call also mounts the hierarchy and viewport.
    pub fn frame(&mut self, target: &mut dyn RenderTarget) -> bool {
        if !self.mounted {
            self.sync_view(target);
            self.tree.mount(&self.model, target);
            self.mounted = true;
        }

        let moved = self.engine.tick();
        if moved {
            self.index.invalidate();
        }
        self.renderer.draw(&self.model, self.engine.state(), target);
        moved
    }

    fn sync_view(&self, target: &mut dyn RenderTarget) {
        target.set_transform(self.transform);
        target.set_viewport(self.syncer.sync(&self.transform));
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    pub fn handle(
        &mut self,
        interaction: Interaction,
        target: &mut dyn RenderTarget,
    ) -> Result<()> {
        match interaction {
            Interaction::DragStart { node } => {
                self.engine.drag_start(node)?;
                self.gesture = Gesture::Dragging(node);
            }
            Interaction::DragMove { node, x, y } => {
                self.engine.drag_move(node, x, y)?;
            }
            Interaction::DragEnd { node } => {
                self.engine.drag_end(node)?;
                self.gesture = Gesture::Idle;
            }
            Interaction::Release { node } => {
                self.engine.release(node)?;
            }
            Interaction::Pan { dx, dy } => {
                self.transform.pan(dx, dy);
                self.sync_view(target);
            }
            Interaction::Zoom { factor, x, y } => {
                self.transform
                    .zoom_about(factor, x, y, self.config.view.scale_extent);
                self.sync_view(target);
            }
            Interaction::Tree(command) => {
                let TreeOutcome { focus, .. } = self.tree.handle(&self.model, command, target)?;
                if let Some(node) = focus {
                    self.focus(node, target)?;
                }
            }
            Interaction::Focus { node } => self.focus(node, target)?,
        }
        Ok(())
    }

    fn focus(&mut self, node: NodeId, target: &mut dyn RenderTarget) -> Result<()> {
        let (x, y) = self
            .engine
            .state()
            .position(node)
            .ok_or(Error::UnknownNode(node))?;
        let id = self
            .model
            .node(node)
            .map(|n| n.id().to_owned())
            .ok_or(Error::UnknownNode(node))?;

        let (width, height) = self.config.view.main_size();
        self.transform.center_on(x, y, width, height);
        self.renderer.set_focus(Some(id));
        self.sync_view(target);
        debug!("focused {node}");
        Ok(())
    }

    /// Node whose main-view shape covers the screen point, nearest anchor first.
    pub fn node_at(&mut self, x: f32, y: f32) -> Option<NodeId> {
        let point = self.transform.invert(x, y);
        self.index.refresh(self.engine.state());

        let shape = self.renderer.node_shape();
        let radius = self.renderer.node_radius();
        self.index
            .in_radius(point.0, point.1, self.hit_reach)
            .into_iter()
            .find(|&id| {
                match (self.model.node(id), self.engine.state().position(id)) {
                    (Some(node), Some(anchor)) => shape.contains(node, anchor, point, radius),
                    _ => false,
                }
            })
    }

    /// Pointer pressed on the main view: grab a node, or start panning.
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        target: &mut dyn RenderTarget,
    ) -> Result<Option<NodeId>> {
        match self.node_at(x, y) {
            Some(node) => {
                self.handle(Interaction::DragStart { node }, target)?;
                Ok(Some(node))
            }
            None => {
                self.gesture = Gesture::Panning { last: (x, y) };
                Ok(None)
            }
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, target: &mut dyn RenderTarget) -> Result<()> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            Gesture::Dragging(node) => {
                let (world_x, world_y) = self.transform.invert(x, y);
                self.handle(
                    Interaction::DragMove {
                        node,
                        x: world_x,
                        y: world_y,
                    },
                    target,
                )
            }
            Gesture::Panning { last } => {
                self.gesture = Gesture::Panning { last: (x, y) };
                self.handle(
                    Interaction::Pan {
                        dx: x - last.0,
                        dy: y - last.1,
                    },
                    target,
                )
            }
        }
    }

    pub fn pointer_up(&mut self, target: &mut dyn RenderTarget) -> Result<()> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Dragging(node) => self.handle(Interaction::DragEnd { node }, target),
            Gesture::Idle | Gesture::Panning { .. } => Ok(()),
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Show only nodes matching `text` (see `GraphModel::search`). Empty text
    /// shows the whole graph again. Nodes that stay visible keep their
    /// position and pin. Returns the number of nodes shown.
    pub fn search(&mut self, text: &str, target: &mut dyn RenderTarget) -> Result<usize> {
        let filtered = self.source.search(text);
        let mut engine =
            ForceLayoutEngine::new(&filtered, self.config.force, self.config.view.center());

        let previous = self.engine.state();
        for (slot, node) in filtered.nodes().iter().enumerate() {
            let Some(old) = self.model.node_id(node.id()) else {
                continue;
            };
            let new = NodeId(slot as u32);
            if let Some((x, y)) = previous.position(old) {
                engine.set_position(new, x, y)?;
            }
            if let Some((x, y)) = previous.fixed(old) {
                engine.pin(new, x, y)?;
            }
        }

        let focused_survives = self
            .renderer
            .focused()
            .is_some_and(|id| filtered.node_id(id).is_some());
        if !focused_survives {
            self.renderer.set_focus(None);
        }

        self.tree.unmount(target);
        self.tree = TreeView::new(&filtered, &self.config.tree);
        if self.mounted {
            self.tree.mount(&filtered, target);
        }

        self.hit_reach = hit_reach(&filtered, &self.renderer);
        self.engine = engine;
        self.model = filtered;
        self.query = text.trim().to_owned();
        self.index.invalidate();
        self.gesture = Gesture::Idle;

        info!(
            "search {:?}: showing {} of {} nodes",
            self.query,
            self.model.node_count(),
            self.source.node_count()
        );
        Ok(self.model.node_count())
    }
}

fn hit_reach(model: &GraphModel, renderer: &DualViewRenderer) -> f32 {
    let shape = renderer.node_shape();
    model
        .nodes()
        .iter()
        .map(|node| shape.reach(node, renderer.node_radius()))
        .fold(renderer.node_radius(), f32::max)
}
