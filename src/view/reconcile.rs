//! Keyed reconciliation of mounted shapes against the next frame.

use std::hash::Hash;

use indexmap::IndexMap;

/// What changed between two keyed frames. Each list follows the order of
/// the frame it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K> {
    pub created: Vec<K>,
    pub updated: Vec<K>,
    pub removed: Vec<K>,
}

impl<K> Reconciliation<K> {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Diff `next` against `mounted` by key. Values equal in both are neither
/// created nor updated.
pub fn reconcile<K, V>(mounted: &IndexMap<K, V>, next: &IndexMap<K, V>) -> Reconciliation<K>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    let mut created = Vec::new();
    let mut updated = Vec::new();
    for (key, value) in next {
        match mounted.get(key) {
            None => created.push(key.clone()),
            Some(previous) if previous != value => updated.push(key.clone()),
            Some(_) => {}
        }
    }

    let removed = mounted
        .keys()
        .filter(|key| !next.contains_key(*key))
        .cloned()
        .collect();

    Reconciliation {
        created,
        updated,
        removed,
    }
}
