//! Error type shared by the graph loader, the session and the bindings.

use crate::graph::NodeId;
use crate::tree::EntryId;

/// Which end of a link failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("link {link} has an unresolved {endpoint}: no node with id {id:?}")]
    UnresolvedEndpoint {
        link: usize,
        endpoint: Endpoint,
        id: String,
    },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("unknown tree entry: {0}")]
    UnknownEntry(EntryId),

    #[error("invalid document: {0}")]
    Document(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Document(error.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(error: serde_wasm_bindgen::Error) -> Self {
        Self::Document(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
