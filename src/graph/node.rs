//! Node type and related structures.
//!
//! A node is identified two ways:
//! - its document id (a string, unique within a graph)
//! - its slot (`NodeId`), the dense index assigned at load time and used by
//!   every per-node buffer in the layout engine

use std::fmt;

use indexmap::IndexMap;

/// Dense node identifier.
///
/// Slots are assigned in document order starting at 0 and never change for
/// the lifetime of a `GraphModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Slot index into per-node buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A graph node: document id plus ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    attributes: IndexMap<String, String>,
}

impl Node {
    pub fn new(id: impl Into<String>, attributes: IndexMap<String, String>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Case-insensitive substring match on the id and every attribute value.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.id.to_lowercase().contains(needle_lowercase)
            || self
                .attributes
                .values()
                .any(|value| value.to_lowercase().contains(needle_lowercase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_matches_id_and_values() {
        let mut attributes = IndexMap::new();
        attributes.insert("kind".to_owned(), "Router".to_owned());
        let node = Node::new("edge-01", attributes);

        assert!(node.matches("edge"));
        assert!(node.matches("router"));
        assert!(!node.matches("kind"));
    }
}
