//! Id, tag and class index maps for connected elements.
//!
//! The tree calls the `on_*` hooks as elements join or leave the document
//! and as their `id`/`class` attributes change. Registration reserves
//! memory fallibly; when a reservation fails the element is left out and the
//! index is marked degraded, after which lookups must not be trusted and
//! callers scan the tree instead.

use std::cell::RefCell;
use std::collections::TryReserveError;

use rustc_hash::FxHashMap;

use super::node::{NodeData, NodeId};
use crate::selector::bloom::class_tokens;

type IndexMap = FxHashMap<String, Vec<NodeId>>;

/// Per-tree index maps.
#[derive(Debug, Default)]
pub struct DomIndex {
    ids: IndexMap,
    tags: IndexMap,
    classes: IndexMap,
    degraded: bool,
    /// Most recent `get_element_by_id` key and answer.
    last_id_lookup: RefCell<Option<(String, Option<NodeId>)>>,
}

impl DomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some registration failed. Lookups may then miss elements.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Elements registered under `id`, in no particular order.
    pub fn elements_with_id(&self, id: &str) -> &[NodeId] {
        lookup(&self.ids, id)
    }

    pub fn elements_with_tag(&self, tag: &str) -> &[NodeId] {
        lookup(&self.tags, tag)
    }

    pub fn elements_with_class(&self, class: &str) -> &[NodeId] {
        lookup(&self.classes, class)
    }

    /// Cached answer for the last id lookup, if it was for `id`.
    pub fn cached_id_lookup(&self, id: &str) -> Option<Option<NodeId>> {
        match &*self.last_id_lookup.borrow() {
            Some((key, found)) if key == id => Some(*found),
            _ => None,
        }
    }

    pub fn remember_id_lookup(&self, id: &str, found: Option<NodeId>) {
        *self.last_id_lookup.borrow_mut() = Some((id.to_owned(), found));
    }

    fn invalidate_id_lookup(&self) {
        self.last_id_lookup.borrow_mut().take();
    }

    /// Register an element that became connected.
    pub fn on_element_inserted(&mut self, node: NodeId, data: &NodeData) {
        let mut result = register(&mut self.tags, data.tag(), node);
        if let Some(id) = data.id() {
            self.invalidate_id_lookup();
            result = result.and(register_id(&mut self.ids, id, node));
        }
        if let Some(classes) = data.class_name() {
            result = result.and(register_classes(&mut self.classes, classes, node));
        }
        self.note(result, node);
        tracing::trace!(?node, tag = data.tag(), "indexed element");
    }

    /// Unregister an element that was disconnected.
    pub fn on_element_removed(&mut self, node: NodeId, data: &NodeData) {
        unregister(&mut self.tags, data.tag(), node);
        if let Some(id) = data.id() {
            self.invalidate_id_lookup();
            unregister(&mut self.ids, id, node);
        }
        if let Some(classes) = data.class_name() {
            for class in class_tokens(classes) {
                unregister(&mut self.classes, class, node);
            }
        }
    }

    /// Unregister an element moved out to another tree.
    pub fn on_element_adopted(&mut self, node: NodeId, data: &NodeData) {
        self.on_element_removed(node, data);
    }

    pub fn on_id_attribute_changed(&mut self, node: NodeId, old: Option<&str>, new: Option<&str>) {
        self.invalidate_id_lookup();
        if let Some(old) = old {
            unregister(&mut self.ids, old, node);
        }
        if let Some(new) = new {
            let result = register_id(&mut self.ids, new, node);
            self.note(result, node);
        }
    }

    pub fn on_class_attribute_changed(
        &mut self,
        node: NodeId,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        if let Some(old) = old {
            for class in class_tokens(old) {
                unregister(&mut self.classes, class, node);
            }
        }
        if let Some(new) = new {
            let result = register_classes(&mut self.classes, new, node);
            self.note(result, node);
        }
    }

    /// Drop every entry and clear the degraded flag.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.tags.clear();
        self.classes.clear();
        self.degraded = false;
        self.invalidate_id_lookup();
    }

    fn note(&mut self, result: Result<(), TryReserveError>, node: NodeId) {
        if let Err(err) = result {
            tracing::debug!(?node, %err, "index reservation failed, falling back to tree scans");
            self.degraded = true;
        }
    }

    #[cfg(test)]
    fn mark_degraded(&mut self) {
        self.degraded = true;
    }
}

fn lookup<'a>(map: &'a IndexMap, key: &str) -> &'a [NodeId] {
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

/// Add `node` under `key`. A node already last in the bucket is not added
/// again, which dedupes repeated class tokens.
fn register(map: &mut IndexMap, key: &str, node: NodeId) -> Result<(), TryReserveError> {
    if let Some(bucket) = map.get_mut(key) {
        if bucket.last() != Some(&node) {
            bucket.try_reserve(1)?;
            bucket.push(node);
        }
        return Ok(());
    }
    map.try_reserve(1)?;
    let mut bucket = Vec::new();
    bucket.try_reserve(1)?;
    bucket.push(node);
    map.insert(key.to_owned(), bucket);
    Ok(())
}

fn register_id(map: &mut IndexMap, id: &str, node: NodeId) -> Result<(), TryReserveError> {
    if id.is_empty() {
        return Ok(());
    }
    register(map, id, node)
}

fn register_classes(
    map: &mut IndexMap,
    classes: &str,
    node: NodeId,
) -> Result<(), TryReserveError> {
    for class in class_tokens(classes) {
        register(map, class, node)?;
    }
    Ok(())
}

fn unregister(map: &mut IndexMap, key: &str, node: NodeId) {
    if let Some(bucket) = map.get_mut(key) {
        if let Some(position) = bucket.iter().position(|&n| n == node) {
            bucket.swap_remove(position);
        }
        if bucket.is_empty() {
            map.remove(key);
        }
    }
}
