//! Edge type and related structures.
//!
//! Edges are directed and carry their endpoints as resolved `NodeId`s.
//! Resolution from document ids happens once, in `GraphModel::from_document`.

use std::fmt;

use super::node::NodeId;

/// Edge identifier: the position of the link in the document.
///
/// Ordering by `EdgeId` is document order, which the hierarchy view relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A resolved directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}
