//! Top-level entries of the hierarchy.

use indexmap::IndexSet;
use log::debug;

use super::CyclicFallback;
use crate::graph::{GraphModel, NodeId};

/// Roots followed by free nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLevel {
    /// Edge sources that are never a target, in first-seen edge order, or
    /// the fallback choice when there are none.
    pub roots: Vec<NodeId>,
    /// Nodes with no edges at all, in node order.
    pub free: Vec<NodeId>,
    /// Whether `roots` came from the cyclic fallback.
    pub fallback_used: bool,
}

impl TopLevel {
    /// All top-level nodes in display order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().chain(&self.free).copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len() + self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.free.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDeriver {
    fallback: CyclicFallback,
}

impl TreeDeriver {
    pub fn new(fallback: CyclicFallback) -> Self {
        Self { fallback }
    }

    /// Pick the top-level nodes. Only looks one edge hop deep, so cycles
    /// are harmless.
    pub fn derive(&self, model: &GraphModel) -> TopLevel {
        let sources: IndexSet<NodeId> = model.edges().iter().map(|edge| edge.source).collect();
        let mut is_target = vec![false; model.node_count()];
        for edge in model.edges() {
            is_target[edge.target.index()] = true;
        }

        let mut roots: Vec<NodeId> = sources
            .iter()
            .copied()
            .filter(|id| !is_target[id.index()])
            .collect();

        let fallback_used = roots.is_empty() && !sources.is_empty();
        if fallback_used {
            roots = match self.fallback {
                CyclicFallback::AllSources => sources.iter().copied().collect(),
                CyclicFallback::FirstSource => sources.iter().copied().take(1).collect(),
            };
            debug!(
                "no root among {} edge sources, falling back to {:?}",
                sources.len(),
                self.fallback
            );
        }

        let free = model
            .node_ids()
            .filter(|id| !is_target[id.index()] && !sources.contains(id))
            .collect();

        TopLevel {
            roots,
            free,
            fallback_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDocument;

    fn model(nodes: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let mut doc = GraphDocument::default();
        for id in nodes {
            doc.add_node(*id, Vec::<(&str, &str)>::new());
        }
        for (source, target) in links {
            doc.add_link(*source, *target);
        }
        GraphModel::from_document(&doc).unwrap()
    }

    fn ids(model: &GraphModel, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|id| model.node(*id).unwrap().id().to_owned())
            .collect()
    }

    #[test]
    fn test_no_edges_all_free() {
        let model = model(&["a", "b", "c"], &[]);
        let top = TreeDeriver::default().derive(&model);
        assert!(top.roots.is_empty());
        assert_eq!(ids(&model, &top.free), vec!["a", "b", "c"]);
        assert!(!top.fallback_used);
    }

    #[test]
    fn test_chain_has_single_root() {
        let model = model(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let top = TreeDeriver::default().derive(&model);
        assert_eq!(ids(&model, &top.roots), vec!["a"]);
        assert!(top.free.is_empty());
    }

    #[test]
    fn test_cycle_falls_back_to_all_sources() {
        let model = model(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let top = TreeDeriver::default().derive(&model);
        assert!(top.fallback_used);
        assert_eq!(ids(&model, &top.roots), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_first_source_policy() {
        let model = model(&["a", "b", "c"], &[("b", "c"), ("c", "b"), ("c", "b")]);
        let top = TreeDeriver::new(CyclicFallback::FirstSource).derive(&model);
        assert_eq!(ids(&model, &top.roots), vec!["b"]);
        assert_eq!(ids(&model, &top.free), vec!["a"]);
    }

    #[test]
    fn test_roots_in_edge_order_then_free_nodes() {
        let model = model(
            &["lonely", "x", "r2", "r1", "y"],
            &[("r1", "x"), ("r2", "y"), ("r1", "y"), ("x", "y")],
        );
        let top = TreeDeriver::default().derive(&model);
        assert_eq!(ids(&model, &top.roots), vec!["r1", "r2"]);
        let all: Vec<NodeId> = top.nodes().collect();
        assert_eq!(ids(&model, &all), vec!["r1", "r2", "lonely"]);
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn test_empty_graph() {
        let model = model(&[], &[]);
        assert!(TreeDeriver::default().derive(&model).is_empty());
    }
}
