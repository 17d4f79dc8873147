//! Wire form of the input graph.
//!
//! ```json
//! { "nodes": [ { "id": "a", "attributes": { "k": "v" } } ],
//!   "links": [ { "source": "a", "target": "b" } ] }
//! ```
//!
//! Link endpoints may also arrive pre-resolved as node objects
//! (`{ "source": { "id": "a" } }`), the shape a d3 simulation leaves behind.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The graph document consumed at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<IndexMap<String, AttributeValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: LinkEndpoint,
    pub target: LinkEndpoint,
}

/// A link endpoint: a bare node id or a node object carrying one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEndpoint {
    Id(String),
    Node { id: String },
}

impl LinkEndpoint {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Node { id } => id,
        }
    }
}

/// Scalar attribute value.
///
/// Data sources emit numbers and booleans as well as strings; the model
/// stores the display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl GraphDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convenience builder used by hosts that assemble graphs in code.
    pub fn add_node<I, K, V>(&mut self, id: impl Into<String>, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<IndexMap<_, _>>();
        self.nodes.push(NodeRecord {
            id: id.into(),
            attributes: Some(attributes),
        });
    }

    pub fn add_link(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.links.push(LinkRecord {
            source: LinkEndpoint::Id(source.into()),
            target: LinkEndpoint::Id(target.into()),
        });
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
