//! GraphModel - immutable graph built from a `GraphDocument`.
//!
//! Nodes and edges live in document order in plain vectors; the petgraph
//! `StableGraph` mirrors them for adjacency queries. Node slot `i` in the
//! vectors is node index `i` in the petgraph graph because nodes are only
//! ever added, in order, during construction.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};

use super::document::{GraphDocument, LinkRecord};
use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use crate::error::{Endpoint, Error, Result};

/// The loaded graph.
#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    id_to_node: HashMap<String, NodeId>,
    /// Node weights are the node's own `NodeId`, edge weights its `EdgeId`.
    graph: StableGraph<NodeId, EdgeId, Directed>,
}

impl GraphModel {
    /// Build a model, resolving every link endpoint exactly once.
    ///
    /// Fails on duplicate node ids and on links naming a node that does not
    /// exist; nothing is dropped silently.
    pub fn from_document(document: &GraphDocument) -> Result<Self> {
        let mut model = Self::with_capacity(document.nodes.len(), document.links.len());

        for record in &document.nodes {
            let attributes = record
                .attributes
                .as_ref()
                .map(|attributes| {
                    attributes
                        .iter()
                        .map(|(key, value)| (key.clone(), value.to_string()))
                        .collect::<IndexMap<_, _>>()
                })
                .unwrap_or_default();
            model.push_node(Node::new(record.id.clone(), attributes))?;
        }

        for (position, link) in document.links.iter().enumerate() {
            let (source, target) = model.resolve_link(position, link)?;
            model.push_edge(source, target);
        }

        debug!(
            "graph loaded: {} nodes, {} edges",
            model.node_count(),
            model.edge_count()
        );
        Ok(model)
    }

    /// Parse and load a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_document(&GraphDocument::from_json_str(json)?)
    }

    fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_capacity),
            edges: Vec::with_capacity(edge_capacity),
            id_to_node: HashMap::with_capacity(node_capacity),
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
        }
    }

    fn push_node(&mut self, node: Node) -> Result<NodeId> {
        if self.id_to_node.contains_key(node.id()) {
            return Err(Error::DuplicateNode {
                id: node.id().to_owned(),
            });
        }

        let id = NodeId(self.nodes.len() as u32);
        let index = self.graph.add_node(id);
        debug_assert_eq!(index.index(), id.index());

        self.id_to_node.insert(node.id().to_owned(), id);
        self.nodes.push(node);
        Ok(id)
    }

    fn push_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.graph
            .add_edge(Self::index(source), Self::index(target), id);
        self.edges.push(Edge { id, source, target });
        id
    }

    fn resolve_link(&self, position: usize, link: &LinkRecord) -> Result<(NodeId, NodeId)> {
        let resolve = |endpoint: Endpoint, id: &str| {
            self.node_id(id).ok_or_else(|| Error::UnresolvedEndpoint {
                link: position,
                endpoint,
                id: id.to_owned(),
            })
        };
        let source = resolve(Endpoint::Source, link.source.id())?;
        let target = resolve(Endpoint::Target, link.target.id())?;
        Ok((source, target))
    }

    #[inline]
    fn index(id: NodeId) -> NodeIndex {
        NodeIndex::new(id.index())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in document order; `nodes()[i]` has slot `NodeId(i)`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in document order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Look up a slot by document id.
    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.id_to_node.get(id).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Outgoing edges of `id` in document order, parallel edges included.
    pub fn outgoing_edges(&self, id: NodeId) -> Vec<Edge> {
        if id.index() >= self.nodes.len() {
            return Vec::new();
        }

        let mut edge_ids: Vec<EdgeId> = self
            .graph
            .edges_directed(Self::index(id), Direction::Outgoing)
            .map(|edge| *edge.weight())
            .collect();
        // petgraph walks its adjacency list newest-first.
        edge_ids.sort_unstable();
        edge_ids
            .into_iter()
            .map(|edge_id| self.edges[edge_id.0 as usize])
            .collect()
    }

    pub fn has_incoming(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
            && self
                .graph
                .neighbors_directed(Self::index(id), Direction::Incoming)
                .next()
                .is_some()
    }

    pub fn has_outgoing(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
            && self
                .graph
                .neighbors_directed(Self::index(id), Direction::Outgoing)
                .next()
                .is_some()
    }

    /// Number of edges touching each node, counting both directions.
    pub fn degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.nodes.len()];
        for edge in self.graph.edge_references() {
            degrees[edge.source().index()] += 1;
            degrees[edge.target().index()] += 1;
        }
        degrees
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Sub-model of nodes whose id or any attribute value contains `text`,
    /// case-insensitively, with the links whose endpoints both survive.
    ///
    /// Empty text returns a copy of the whole model.
    pub fn search(&self, text: &str) -> GraphModel {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let mut result = Self::with_capacity(0, 0);
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        for (slot, node) in self.nodes.iter().enumerate() {
            if !node.matches(&needle) {
                continue;
            }
            // Ids are unique in `self`, so re-inserting cannot collide.
            if let Ok(new_id) = result.push_node(node.clone()) {
                remap.insert(NodeId(slot as u32), new_id);
            }
        }

        for edge in &self.edges {
            let source = remap.get(&edge.source);
            let target = remap.get(&edge.target);
            if let (Some(&source), Some(&target)) = (source, target) {
                result.push_edge(source, target);
            }
        }

        debug!(
            "search {:?}: {} of {} nodes kept",
            text,
            result.node_count(),
            self.node_count()
        );
        result
    }
}
