//! Per-node simulation state in SoA (Structure of Arrays) layout.
//!
//! Buffers are sized once when the engine is created and mutated in place
//! on every tick, so slices handed out to renderers or to JavaScript stay
//! valid for the lifetime of the engine.

use crate::graph::NodeId;

#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    pos_x: Vec<f32>,
    pos_y: Vec<f32>,
    vel_x: Vec<f32>,
    vel_y: Vec<f32>,
    fixed: Vec<Option<(f32, f32)>>,
}

impl LayoutState {
    pub(super) fn with_len(len: usize) -> Self {
        Self {
            pos_x: vec![0.0; len],
            pos_y: vec![0.0; len],
            vel_x: vec![0.0; len],
            vel_y: vec![0.0; len],
            fixed: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.pos_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_x.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.len()
    }

    /// Current position of a node.
    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.index();
        (i < self.len()).then(|| (self.pos_x[i], self.pos_y[i]))
    }

    pub fn velocity(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.index();
        (i < self.len()).then(|| (self.vel_x[i], self.vel_y[i]))
    }

    /// Pinned coordinates, if the node is pinned.
    pub fn fixed(&self, id: NodeId) -> Option<(f32, f32)> {
        self.fixed.get(id.index()).copied().flatten()
    }

    pub fn is_pinned(&self, id: NodeId) -> bool {
        self.fixed(id).is_some()
    }

    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    pub fn velocities_x(&self) -> &[f32] {
        &self.vel_x
    }

    pub fn velocities_y(&self) -> &[f32] {
        &self.vel_y
    }

    // =========================================================================
    // Engine-side mutation
    // =========================================================================

    pub(super) fn set_position(&mut self, i: usize, x: f32, y: f32) {
        self.pos_x[i] = x;
        self.pos_y[i] = y;
        self.vel_x[i] = 0.0;
        self.vel_y[i] = 0.0;
    }

    pub(super) fn set_fixed(&mut self, i: usize, fixed: Option<(f32, f32)>) {
        self.fixed[i] = fixed;
    }

    pub(super) fn fixed_slots(&self) -> &[Option<(f32, f32)>] {
        &self.fixed
    }

    pub(super) fn buffers_mut(&mut self) -> StateBuffers<'_> {
        StateBuffers {
            pos_x: &mut self.pos_x,
            pos_y: &mut self.pos_y,
            vel_x: &mut self.vel_x,
            vel_y: &mut self.vel_y,
            fixed: &self.fixed,
        }
    }
}

/// Split borrow of the state buffers used by the force passes.
pub(super) struct StateBuffers<'a> {
    pub(super) pos_x: &'a mut [f32],
    pub(super) pos_y: &'a mut [f32],
    pub(super) vel_x: &'a mut [f32],
    pub(super) vel_y: &'a mut [f32],
    pub(super) fixed: &'a [Option<(f32, f32)>],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_len_zeroed() {
        let state = LayoutState::with_len(3);
        assert_eq!(state.len(), 3);
        assert_eq!(state.position(NodeId(2)), Some((0.0, 0.0)));
        assert_eq!(state.position(NodeId(3)), None);
        assert!(!state.is_pinned(NodeId(0)));
    }

    #[test]
    fn test_set_position_clears_velocity() {
        let mut state = LayoutState::with_len(1);
        state.vel_x[0] = 4.0;
        state.set_position(0, 1.0, 2.0);
        assert_eq!(state.position(NodeId(0)), Some((1.0, 2.0)));
        assert_eq!(state.velocity(NodeId(0)), Some((0.0, 0.0)));
    }

    #[test]
    fn test_fixed_slot() {
        let mut state = LayoutState::with_len(2);
        state.set_fixed(1, Some((5.0, 6.0)));
        assert_eq!(state.fixed(NodeId(1)), Some((5.0, 6.0)));
        assert!(state.is_pinned(NodeId(1)));
        state.set_fixed(1, None);
        assert!(!state.is_pinned(NodeId(1)));
    }
}
