//! Graph data structures.
//!
//! The graph is loaded once from a `GraphDocument` into an immutable
//! `GraphModel`. Link endpoints are resolved from string ids to dense
//! `NodeId` slots at load time; a petgraph `StableGraph` keeps the adjacency
//! used by the hierarchy view.

mod document;
mod edge;
mod model;
mod node;

pub use document::{AttributeValue, GraphDocument, LinkEndpoint, LinkRecord, NodeRecord};
pub use edge::{Edge, EdgeId};
pub use model::GraphModel;
pub use node::{Node, NodeId};
