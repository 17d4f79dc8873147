//! Force-directed layout engine.
//!
//! The engine runs a velocity-Verlet style simulation cooled by a scalar
//! `alpha`:
//!
//! 1. `alpha += (alpha_target - alpha) * alpha_decay`
//! 2. link, charge and centering passes (see `forces`)
//! 3. velocity decay and integration; pinned nodes snap to their pin
//!
//! Once alpha drops below `alpha_min` the engine is at rest and `tick` does
//! nothing until something (a drag, `reheat`) raises it again.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::forces::{self, ChargeParams, LinkParams};
use super::state::LayoutState;
use crate::error::{Error, Result};
use crate::graph::{GraphModel, NodeId};

/// Number of ticks the default decay takes to cool from 1 to `alpha_min`.
const DEFAULT_SETTLE_TICKS: f32 = 300.0;
const DEFAULT_ALPHA_MIN: f32 = 0.001;

/// Configuration for the force simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Rest length of every link.
    pub link_distance: f32,
    /// Link spring coefficient.
    pub link_strength: f32,
    /// Many-body strength; negative repels.
    pub charge_strength: f32,
    /// Barnes-Hut opening angle.
    pub charge_theta: f32,
    /// Distances below this are clamped in the charge pass.
    pub charge_distance_min: f32,
    /// Centering strength in [0, 1].
    pub center_strength: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Alpha target while a node is being dragged.
    pub drag_alpha_target: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            link_strength: 1.0,
            charge_strength: -30.0,
            charge_theta: 0.9,
            charge_distance_min: 1.0,
            center_strength: 1.0,
            velocity_decay: 0.4,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / DEFAULT_SETTLE_TICKS),
            drag_alpha_target: 0.3,
        }
    }
}

/// The layout engine. Exclusively owns the `LayoutState`.
pub struct ForceLayoutEngine {
    config: ForceConfig,
    state: LayoutState,
    /// Links as slot pairs, resolved once from the model.
    links: Vec<(usize, usize)>,
    /// Share of each link's correction applied to its target.
    bias: Vec<f32>,
    center: (f32, f32),
    alpha: f32,
    alpha_target: f32,
    at_rest: bool,
    ticks: u64,
}

impl ForceLayoutEngine {
    /// Create an engine for `model`, seeding nodes on a phyllotaxis spiral
    /// around `center`.
    pub fn new(model: &GraphModel, config: ForceConfig, center: (f32, f32)) -> Self {
        let node_count = model.node_count();
        let mut state = LayoutState::with_len(node_count);

        let initial_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for i in 0..node_count {
            let radius = 10.0 * (0.5 + i as f32).sqrt();
            let angle = i as f32 * initial_angle;
            state.set_position(
                i,
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
            );
        }

        let degrees = model.degrees();
        let links: Vec<(usize, usize)> = model
            .edges()
            .iter()
            .map(|edge| (edge.source.index(), edge.target.index()))
            .collect();
        let bias = links
            .iter()
            .map(|&(source, target)| {
                let source_degree = degrees[source] as f32;
                source_degree / (source_degree + degrees[target] as f32)
            })
            .collect();

        debug!(
            "force layout ready: {} nodes, {} links",
            node_count,
            links.len()
        );

        Self {
            config,
            state,
            links,
            bias,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            at_rest: false,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    pub fn set_center(&mut self, center: (f32, f32)) {
        self.center = center;
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one tick. Returns false (and does nothing) when at rest.
    pub fn tick(&mut self) -> bool {
        if self.at_rest {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let config = self.config;

        let mut buffers = self.state.buffers_mut();
        forces::apply_links(
            &mut buffers,
            &self.links,
            &self.bias,
            LinkParams {
                distance: config.link_distance,
                strength: config.link_strength,
            },
            alpha,
        );
        forces::apply_charge(
            &mut buffers,
            ChargeParams {
                strength: config.charge_strength,
                theta: config.charge_theta,
                distance_min: config.charge_distance_min,
            },
            alpha,
        );
        forces::apply_center(&mut buffers, self.center, config.center_strength);
        forces::integrate(&mut buffers, config.velocity_decay);

        self.ticks += 1;
        if self.alpha < config.alpha_min {
            self.at_rest = true;
            info!("layout at rest after {} ticks", self.ticks);
        }
        true
    }

    /// Set the temperature the simulation cools (or warms) toward.
    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
        if self.alpha_target >= self.config.alpha_min {
            self.at_rest = false;
        }
    }

    /// Restart from full temperature.
    pub fn reheat(&mut self) {
        self.alpha = 1.0;
        self.at_rest = false;
    }

    /// Let the simulation cool down; ticking continues until at rest.
    pub fn halt(&mut self) {
        self.alpha_target = 0.0;
    }

    // =========================================================================
    // Pinning and drag
    // =========================================================================

    fn slot(&self, id: NodeId) -> Result<usize> {
        if self.state.contains(id) {
            Ok(id.index())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    /// Place a node, e.g. to carry a position over from a previous layout.
    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<()> {
        let i = self.slot(id)?;
        self.state.set_position(i, x, y);
        if self.state.fixed_slots()[i].is_some() {
            self.state.set_fixed(i, Some((x, y)));
        }
        Ok(())
    }

    /// Pin a node at the given coordinates.
    pub fn pin(&mut self, id: NodeId, x: f32, y: f32) -> Result<()> {
        let i = self.slot(id)?;
        self.state.set_fixed(i, Some((x, y)));
        Ok(())
    }

    /// Clear a node's pin so forces move it again.
    pub fn release(&mut self, id: NodeId) -> Result<()> {
        let i = self.slot(id)?;
        self.state.set_fixed(i, None);
        debug!("released {id}");
        Ok(())
    }

    /// Start dragging: warm the simulation and pin the node where it is.
    pub fn drag_start(&mut self, id: NodeId) -> Result<()> {
        let i = self.slot(id)?;
        let (x, y) = (self.state.positions_x()[i], self.state.positions_y()[i]);
        self.state.set_fixed(i, Some((x, y)));
        self.set_alpha_target(self.config.drag_alpha_target);
        debug!("drag start {id} at ({x}, {y})");
        Ok(())
    }

    /// Move the dragged node's pin to the pointer.
    pub fn drag_move(&mut self, id: NodeId, x: f32, y: f32) -> Result<()> {
        let i = self.slot(id)?;
        self.state.set_fixed(i, Some((x, y)));
        Ok(())
    }

    /// End the drag. The node stays pinned until `release`.
    pub fn drag_end(&mut self, id: NodeId) -> Result<()> {
        self.slot(id)?;
        self.halt();
        debug!("drag end {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDocument;

    fn model(nodes: usize, links: &[(usize, usize)]) -> GraphModel {
        let mut doc = GraphDocument::default();
        for i in 0..nodes {
            doc.add_node(i.to_string(), Vec::<(&str, &str)>::new());
        }
        for &(source, target) in links {
            doc.add_link(source.to_string(), target.to_string());
        }
        GraphModel::from_document(&doc).unwrap()
    }

    fn engine(nodes: usize, links: &[(usize, usize)], center: (f32, f32)) -> ForceLayoutEngine {
        ForceLayoutEngine::new(&model(nodes, links), ForceConfig::default(), center)
    }

    fn run_to_rest(engine: &mut ForceLayoutEngine) -> u64 {
        let mut ticks = 0;
        while engine.tick() {
            ticks += 1;
            assert!(ticks < 10_000, "engine never came to rest");
        }
        ticks
    }

    #[test]
    fn test_default_decay_matches_300_ticks() {
        let config = ForceConfig::default();
        assert!((config.alpha_decay - 0.0228).abs() < 1e-3);
    }

    #[test]
    fn test_convergence_tick_count_independent_of_graph() {
        let mut empty = engine(0, &[], (0.0, 0.0));
        let mut small = engine(3, &[(0, 1), (1, 2)], (0.0, 0.0));
        let links: Vec<(usize, usize)> = (1..60).map(|i| (i / 3, i)).collect();
        let mut large = engine(60, &links, (400.0, 300.0));

        let empty_ticks = run_to_rest(&mut empty);
        assert!((295..=305).contains(&empty_ticks), "{empty_ticks}");
        assert_eq!(run_to_rest(&mut small), empty_ticks);
        assert_eq!(run_to_rest(&mut large), empty_ticks);
        assert!(large.alpha() < large.config().alpha_min);
        assert!(!large.tick());
    }

    #[test]
    fn test_positions_stay_finite_and_spread() {
        let links: Vec<(usize, usize)> = (1..30).map(|i| (i / 2, i)).collect();
        let mut engine = engine(30, &links, (0.0, 0.0));
        run_to_rest(&mut engine);

        let state = engine.state();
        assert_eq!(state.len(), 30);
        for i in 0..30 {
            let (x, y) = state.position(NodeId(i)).unwrap();
            assert!(x.is_finite() && y.is_finite());
        }
        let (ax, ay) = state.position(NodeId(0)).unwrap();
        let (bx, by) = state.position(NodeId(1)).unwrap();
        let linked = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
        assert!(linked > 40.0 && linked < 200.0, "link length {linked}");
    }

    #[test]
    fn test_centroid_pulled_to_center() {
        let mut engine = engine(5, &[(0, 1)], (400.0, 300.0));
        run_to_rest(&mut engine);
        let state = engine.state();
        let n = state.len() as f32;
        let cx: f32 = state.positions_x().iter().sum::<f32>() / n;
        let cy: f32 = state.positions_y().iter().sum::<f32>() / n;
        assert!((cx - 400.0).abs() < 1.0);
        assert!((cy - 300.0).abs() < 1.0);
    }

    #[test]
    fn test_pinned_node_never_moves_until_release() {
        let mut engine = engine(4, &[(0, 1), (1, 2), (2, 3)], (0.0, 0.0));
        for _ in 0..10 {
            engine.tick();
        }

        let node = NodeId(1);
        engine.drag_start(node).unwrap();
        engine.drag_move(node, 250.0, -80.0).unwrap();
        engine.drag_end(node).unwrap();

        for _ in 0..50 {
            engine.tick();
            assert_eq!(engine.state().position(node), Some((250.0, -80.0)));
        }

        engine.release(node).unwrap();
        engine.reheat();
        for _ in 0..5 {
            engine.tick();
        }
        assert_ne!(engine.state().position(node), Some((250.0, -80.0)));
    }

    #[test]
    fn test_drag_resumes_engine_at_rest() {
        let mut engine = engine(2, &[(0, 1)], (0.0, 0.0));
        run_to_rest(&mut engine);
        assert!(engine.is_at_rest());

        engine.drag_start(NodeId(0)).unwrap();
        assert!(!engine.is_at_rest());
        assert_eq!(engine.alpha_target(), 0.3);
        for _ in 0..100 {
            assert!(engine.tick());
        }
        assert!(engine.alpha() > engine.config().alpha_min);

        engine.drag_end(NodeId(0)).unwrap();
        assert_eq!(engine.alpha_target(), 0.0);
        run_to_rest(&mut engine);
        assert!(engine.is_at_rest());
        assert!(engine.state().is_pinned(NodeId(0)));
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let mut engine = engine(1, &[], (0.0, 0.0));
        assert!(matches!(engine.drag_start(NodeId(7)), Err(Error::UnknownNode(NodeId(7)))));
        assert!(engine.release(NodeId(1)).is_err());
    }

    #[test]
    fn test_state_buffers_not_reallocated() {
        let mut engine = engine(10, &[(0, 1)], (0.0, 0.0));
        let before = engine.state().positions_x().as_ptr();
        for _ in 0..20 {
            engine.tick();
        }
        assert_eq!(engine.state().positions_x().as_ptr(), before);
    }
}
