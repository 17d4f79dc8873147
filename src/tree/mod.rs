//! Hierarchy view derived from the graph.
//!
//! The graph may be cyclic and disconnected, so the hierarchy is never built
//! eagerly. `TreeDeriver` picks the top-level entries from one edge hop of
//! information; `TreeView` builds an entry's subtree the first time it is
//! expanded and caches it from then on.

mod derive;
mod expand;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use derive::{TopLevel, TreeDeriver};
pub use expand::{EntryContent, Subtree, TreeAction, TreeCommand, TreeEntry, TreeOutcome, TreeView};

/// Arena index of a hierarchy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl EntryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry({})", self.0)
    }
}

impl From<u32> for EntryId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// What the host needs to show one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: EntryId,
    pub parent: Option<EntryId>,
    pub depth: u32,
    /// Node id, or `key: value` for attribute leaves.
    pub label: String,
    /// Whether the entry shows an expand affordance.
    pub expandable: bool,
    /// Document id of the node this entry stands for.
    pub node: Option<String>,
}

/// Top-level choice when every edge source is also a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclicFallback {
    /// Every distinct edge source becomes a top-level entry.
    #[default]
    AllSources,
    /// Only the first edge's source becomes a top-level entry.
    FirstSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub cyclic_fallback: CyclicFallback,
}
