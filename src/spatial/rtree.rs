//! R-tree over node anchor positions using the rstar crate.
//!
//! The index only narrows the candidates for a pointer hit. Whether a
//! candidate's drawn shape really contains the pointer is decided by the
//! caller, which knows the shape strategy in use.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;
use crate::layout::LayoutState;

/// A node anchor in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
}

impl NodePoint {
    pub fn new(id: NodeId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index for pointer hit testing.
///
/// Positions change every tick, so the index is marked stale by the owner
/// and bulk-loaded again on the next query rather than updated in place.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
    stale: bool,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load the index from the current layout.
    pub fn rebuild(&mut self, state: &LayoutState) {
        let points: Vec<NodePoint> = state
            .positions_x()
            .iter()
            .zip(state.positions_y())
            .enumerate()
            .map(|(slot, (&x, &y))| NodePoint::new(NodeId(slot as u32), x, y))
            .collect();
        self.tree = RTree::bulk_load(points);
        self.stale = false;
    }

    /// Mark the index as out of date with the layout.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rebuild only if the layout moved since the last rebuild.
    pub fn refresh(&mut self, state: &LayoutState) {
        if self.stale || self.tree.size() != state.len() {
            self.rebuild(state);
        }
    }

    /// All node anchors within `radius` of a point, nearest first.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<NodeId> {
        let mut hits: Vec<(f32, NodeId)> = self
            .tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| (point.distance_2(&[x, y]), point.id))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
