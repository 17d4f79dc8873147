//! Lazily expanded hierarchy entries.
//!
//! Entries live in an arena indexed by `EntryId`. A node entry starts with a
//! `Pending` subtree, or `Empty` when the node has no outgoing edges and no
//! attributes. The first expansion builds a pending subtree from the node's
//! outgoing edges and attributes and it is never rebuilt afterwards. Toggling
//! only flips `expanded`.

use log::debug;

use super::derive::TreeDeriver;
use super::{EntryId, EntryView, TreeConfig};
use crate::error::{Error, Result};
use crate::graph::{GraphModel, Node, NodeId};
use crate::view::RenderTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtree {
    /// Not expanded yet.
    Pending,
    /// Nothing to show; the entry never offers an expand affordance.
    Empty,
    /// Child entries followed by attribute leaves.
    Built(Vec<EntryId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Node {
        node: NodeId,
        expanded: bool,
        subtree: Subtree,
    },
    Attribute {
        key: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub id: EntryId,
    pub parent: Option<EntryId>,
    pub depth: u32,
    pub content: EntryContent,
}

impl TreeEntry {
    pub fn node(&self) -> Option<NodeId> {
        match self.content {
            EntryContent::Node { node, .. } => Some(node),
            EntryContent::Attribute { .. } => None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.content, EntryContent::Node { expanded: true, .. })
    }

    /// Whether the entry still offers an expand affordance.
    pub fn is_expandable(&self) -> bool {
        matches!(
            self.content,
            EntryContent::Node {
                subtree: Subtree::Pending | Subtree::Built(_),
                ..
            }
        )
    }

    fn view(&self, model: &GraphModel) -> EntryView {
        let (label, node) = match &self.content {
            EntryContent::Node { node, .. } => {
                let id = model
                    .node(*node)
                    .map(|n| n.id().to_owned())
                    .unwrap_or_default();
                (id.clone(), Some(id))
            }
            EntryContent::Attribute { key, value } => (format!("{key}: {value}"), None),
        };
        EntryView {
            id: self.id,
            parent: self.parent,
            depth: self.depth,
            label,
            expandable: self.is_expandable(),
            node,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAction {
    Toggle,
    Expand,
    Collapse,
}

/// A click (or programmatic request) on a hierarchy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeCommand {
    pub entry: EntryId,
    pub action: TreeAction,
}

impl TreeCommand {
    pub fn toggle(entry: EntryId) -> Self {
        Self {
            entry,
            action: TreeAction::Toggle,
        }
    }
}

/// Result of a tree command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOutcome {
    /// Node to focus in the graph view.
    pub focus: Option<NodeId>,
    /// Expanded state after the command.
    pub expanded: bool,
}

/// The hierarchy view: top-level entries plus every subtree built so far.
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    entries: Vec<TreeEntry>,
    top_level: Vec<EntryId>,
}

impl TreeView {
    /// Derive the top-level entries for `model`. Nothing is sent to a render
    /// target until `mount`.
    pub fn new(model: &GraphModel, config: &TreeConfig) -> Self {
        let top = TreeDeriver::new(config.cyclic_fallback).derive(model);
        let mut view = Self {
            entries: Vec::with_capacity(top.len()),
            top_level: Vec::with_capacity(top.len()),
        };
        for node in top.nodes() {
            let id = view.push_node_entry(model, node, None, 0);
            view.top_level.push(id);
        }
        debug!("tree view: {} top-level entries", view.top_level.len());
        view
    }

    /// Create the host widgets for every entry built so far.
    pub fn mount(&self, model: &GraphModel, target: &mut dyn RenderTarget) {
        for entry in &self.entries {
            target.create_tree_entry(&entry.view(model));
            if entry.is_expanded() {
                target.set_tree_entry_expanded(entry.id, true);
            }
        }
    }

    /// Destroy every host widget, children before parents, and forget all
    /// entries.
    pub fn unmount(&mut self, target: &mut dyn RenderTarget) {
        for entry in self.entries.iter().rev() {
            target.destroy_tree_entry(entry.id);
        }
        self.entries.clear();
        self.top_level.clear();
    }

    pub fn top_level(&self) -> &[EntryId] {
        &self.top_level
    }

    pub fn entry(&self, id: EntryId) -> Option<&TreeEntry> {
        self.entries.get(id.index())
    }

    /// Built children of an entry; `None` until its first expansion.
    pub fn children(&self, id: EntryId) -> Option<&[EntryId]> {
        match &self.entry(id)?.content {
            EntryContent::Node {
                subtree: Subtree::Built(children),
                ..
            } => Some(children),
            _ => None,
        }
    }

    /// Number of entries built so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply a command. Every command on a node entry asks for that node to
    /// be focused, whether or not anything expands.
    pub fn handle(
        &mut self,
        model: &GraphModel,
        command: TreeCommand,
        target: &mut dyn RenderTarget,
    ) -> Result<TreeOutcome> {
        let id = command.entry;
        let entry = self.entry(id).ok_or(Error::UnknownEntry(id))?;
        let EntryContent::Node { node, expanded, .. } = entry.content else {
            return Ok(TreeOutcome::default());
        };

        let want = match command.action {
            TreeAction::Toggle => !expanded,
            TreeAction::Expand => true,
            TreeAction::Collapse => false,
        };
        if want {
            self.ensure_built(id, model, target);
        }

        let EntryContent::Node {
            expanded, subtree, ..
        } = &mut self.entries[id.index()].content
        else {
            return Ok(TreeOutcome::default());
        };
        let next = want && !matches!(subtree, Subtree::Empty);
        if *expanded != next {
            *expanded = next;
            target.set_tree_entry_expanded(id, next);
        }

        Ok(TreeOutcome {
            focus: Some(node),
            expanded: next,
        })
    }

    /// Build the subtree of `id` on first use.
    fn ensure_built(&mut self, id: EntryId, model: &GraphModel, target: &mut dyn RenderTarget) {
        let entry = &self.entries[id.index()];
        let EntryContent::Node {
            node,
            subtree: Subtree::Pending,
            ..
        } = entry.content
        else {
            return;
        };
        let depth = entry.depth + 1;

        let mut children = Vec::new();
        for edge in model.outgoing_edges(node) {
            children.push(self.push_node_entry(model, edge.target, Some(id), depth));
        }
        if let Some(n) = model.node(node) {
            for (key, value) in n.attributes() {
                children.push(self.push_entry(
                    Some(id),
                    depth,
                    EntryContent::Attribute {
                        key: key.clone(),
                        value: value.clone(),
                    },
                ));
            }
        }

        let built = if children.is_empty() {
            Subtree::Empty
        } else {
            Subtree::Built(children.clone())
        };
        if let EntryContent::Node { subtree, .. } = &mut self.entries[id.index()].content {
            *subtree = built;
        }

        for child in children {
            target.create_tree_entry(&self.entries[child.index()].view(model));
        }
    }

    fn push_node_entry(
        &mut self,
        model: &GraphModel,
        node: NodeId,
        parent: Option<EntryId>,
        depth: u32,
    ) -> EntryId {
        // One hop only: whether anything would show, not what.
        let has_content =
            model.has_outgoing(node) || model.node(node).is_some_and(Node::has_attributes);
        let subtree = if has_content {
            Subtree::Pending
        } else {
            Subtree::Empty
        };
        self.push_entry(
            parent,
            depth,
            EntryContent::Node {
                node,
                expanded: false,
                subtree,
            },
        )
    }

    fn push_entry(
        &mut self,
        parent: Option<EntryId>,
        depth: u32,
        content: EntryContent,
    ) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(TreeEntry {
            id,
            parent,
            depth,
            content,
        });
        id
    }
}
