//! Tree operations: create, insert, detach, destroy, adopt, attributes.

use std::cell::RefCell;
use std::cmp::Ordering;

use slotmap::{SecondaryMap, SlotMap};

use super::index::DomIndex;
use super::node::{NodeData, NodeId};
use crate::config::QueryConfig;
use crate::selector::bloom::BloomFilter;
use crate::selector::cache::SelectorCache;
use crate::selector::tree::{NodeKind, SelectorTree};

/// Errors from tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Sibling and parent links of one node.
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    previous_sibling: Option<NodeId>,
}

/// A document tree backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`; links are stored in a secondary
/// map. The document node is created with the tree and cannot be removed.
/// Elements connected to the document are kept in the index maps, and the
/// tree owns the parsed-selector cache used by the query methods.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    links: SecondaryMap<NodeId, Links>,
    document: NodeId,
    pub(crate) index: DomIndex,
    pub(crate) cache: RefCell<SelectorCache>,
    config: QueryConfig,
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.nodes.len())
            .field("document", &self.document)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a tree holding only a document node.
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    pub fn with_config(config: QueryConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let document = nodes.insert(NodeData::document());
        let mut links = SecondaryMap::new();
        links.insert(document, Links::default());
        Self {
            nodes,
            links,
            document,
            index: DomIndex::new(),
            cache: RefCell::new(SelectorCache::with_limits(
                config.cache_capacity,
                config.max_nesting_depth,
            )),
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// The document node. Scope for document-wide queries.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The document's first element child.
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(self.document)
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Add a detached node.
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.links.insert(id, Links::default());
        id
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.create_node(NodeData::element(tag))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeData::text(text))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeData::comment(text))
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.create_node(NodeData::fragment())
    }

    /// Create a node and append it to `parent`.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, DomError> {
        self.require(parent)?;
        let id = self.create_node(data);
        if let Err(err) = self.append_child(parent, id) {
            self.nodes.remove(id);
            self.links.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    // ── Navigation ──────────────────────────────────────────────────────

    fn link(&self, id: NodeId) -> Links {
        self.links.get(id).copied().unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).next_sibling
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.link(id).previous_sibling
    }

    /// Child nodes of `id` in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(id), move |&child| self.next_sibling(child))
    }

    /// Walk from `id` up to the root. Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Nodes below `id` in tree order, not including `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(id), move |&node| {
            self.next_in_preorder(node, id)
        })
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id)?.attribute(name)
    }

    /// Number of nodes, including the document and detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true; the document node always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `id` is the document or has it as an ancestor.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(id) && (id == self.document || self.ancestors(id).any(|a| a == self.document))
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Relative position of two nodes in tree order. Nodes in different
    /// trees are ordered by id.
    pub fn compare_tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        let common = path_a
            .iter()
            .zip(&path_b)
            .take_while(|(x, y)| x == y)
            .count();
        if common == 0 {
            return a.cmp(&b);
        }
        if common == path_a.len() {
            return Ordering::Less;
        }
        if common == path_b.len() {
            return Ordering::Greater;
        }
        let (x, y) = (path_a[common], path_b[common]);
        let mut current = self.next_sibling(x);
        while let Some(sibling) = current {
            if sibling == y {
                return Ordering::Less;
            }
            current = self.next_sibling(sibling);
        }
        Ordering::Greater
    }

    fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.ancestors(id).collect();
        path.reverse();
        path.push(id);
        path
    }

    // ── Mutation ────────────────────────────────────────────────────────

    fn require(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id).ok_or(DomError::NodeNotFound(id))
    }

    fn require_element(&self, id: NodeId) -> Result<&NodeData, DomError> {
        let data = self.require(id)?;
        if !data.is_element() {
            return Err(DomError::HierarchyRequest(
                "attributes exist only on elements".into(),
            ));
        }
        Ok(data)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or last when
    /// `reference` is `None`. The child is detached from its old position
    /// first. Inserting a fragment moves its children instead.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child, reference)?;

        if self.require(child)?.kind() == NodeKind::DocumentFragment {
            let moved: Vec<NodeId> = self.children(child).collect();
            for node in moved {
                self.insert_before(parent, node, reference)?;
            }
            return Ok(());
        }

        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };
        self.detach(child);
        self.attach(parent, child, reference);
        if self.is_connected(parent) {
            self.index_subtree(child, IndexUpdate::Insert);
        }
        Ok(())
    }

    fn check_insert(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_kind = self.require(parent)?.kind();
        let child_kind = self.require(child)?.kind();
        if let Some(reference) = reference {
            self.require(reference)?;
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        if matches!(parent_kind, NodeKind::Text | NodeKind::Comment) {
            return Err(DomError::HierarchyRequest(
                "text and comment nodes cannot have children".into(),
            ));
        }
        if child_kind == NodeKind::Document {
            return Err(DomError::HierarchyRequest(
                "the document cannot be inserted".into(),
            ));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into its own subtree".into(),
            ));
        }
        if parent_kind == NodeKind::Document {
            self.check_document_child(child, child_kind)?;
        }
        Ok(())
    }

    /// A document holds at most one element and no text.
    fn check_document_child(&self, child: NodeId, kind: NodeKind) -> Result<(), DomError> {
        let (elements, text) = match kind {
            NodeKind::DocumentFragment => (
                self.children(child).filter(|&c| self.is_element(c)).count(),
                self.children(child)
                    .any(|c| self.node_kind(c) == NodeKind::Text),
            ),
            NodeKind::Element => (1, false),
            NodeKind::Text => (0, true),
            _ => (0, false),
        };
        if text {
            return Err(DomError::HierarchyRequest(
                "the document cannot contain text".into(),
            ));
        }
        let existing = self
            .children(self.document)
            .filter(|&c| c != child && self.is_element(c))
            .count();
        if elements + existing > 1 {
            return Err(DomError::HierarchyRequest(
                "the document can have only one element child".into(),
            ));
        }
        Ok(())
    }

    /// Detach `child` from `parent` and return it. The subtree stays alive.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.require(parent)?;
        self.require(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Destroy a node and its descendants.
    ///
    /// Returns the node's data, or `None` if it did not exist or is the
    /// document.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if id == self.document || !self.contains(id) {
            return None;
        }
        self.detach(id);
        let doomed: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        let mut removed = None;
        for node in doomed {
            self.links.remove(node);
            let data = self.nodes.remove(node);
            if node == id {
                removed = data;
            }
        }
        removed
    }

    /// Move `node` and its subtree out of `source` into this tree as a
    /// detached subtree. Returns the node's id in this tree.
    pub fn adopt_node(&mut self, source: &mut Dom, node: NodeId) -> Result<NodeId, DomError> {
        let kind = source.require(node)?.kind();
        if kind == NodeKind::Document {
            return Err(DomError::HierarchyRequest(
                "the document cannot be adopted".into(),
            ));
        }
        if source.is_connected(node) {
            source.index_subtree(node, IndexUpdate::Adopt);
        }
        source.unlink(node);

        let moved: Vec<NodeId> = std::iter::once(node).chain(source.descendants(node)).collect();
        let mut mapping: SecondaryMap<NodeId, NodeId> = SecondaryMap::new();
        for &old in &moved {
            let parent = source.parent(old);
            source.links.remove(old);
            let Some(data) = source.nodes.remove(old) else {
                continue;
            };
            let new = self.create_node(data);
            mapping.insert(old, new);
            if let Some(new_parent) = parent.and_then(|p| mapping.get(p).copied()) {
                self.attach(new_parent, new, None);
            }
        }
        mapping.get(node).copied().ok_or(DomError::NodeNotFound(node))
    }

    /// Set an attribute on an element, keeping the index and bloom filter
    /// in step.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.require_element(element)?;
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let connected = self.is_connected(element);
        let Some(data) = self.nodes.get_mut(element) else {
            return Err(DomError::NodeNotFound(element));
        };
        let old = data.set_attribute(&name, value.clone());
        if connected {
            self.attribute_changed(element, &name, old.as_deref(), Some(&value));
        }
        Ok(())
    }

    /// Remove an attribute from an element, returning its old value.
    pub fn remove_attribute(
        &mut self,
        element: NodeId,
        name: &str,
    ) -> Result<Option<String>, DomError> {
        self.require_element(element)?;
        let name = name.to_ascii_lowercase();
        let connected = self.is_connected(element);
        let Some(data) = self.nodes.get_mut(element) else {
            return Err(DomError::NodeNotFound(element));
        };
        let old = data.remove_attribute(&name);
        if connected && old.is_some() {
            self.attribute_changed(element, &name, old.as_deref(), None);
        }
        Ok(old)
    }

    pub fn set_id(&mut self, element: NodeId, id: impl Into<String>) -> Result<(), DomError> {
        self.set_attribute(element, "id", id)
    }

    pub fn set_class_name(
        &mut self,
        element: NodeId,
        classes: impl Into<String>,
    ) -> Result<(), DomError> {
        self.set_attribute(element, "class", classes)
    }

    fn attribute_changed(
        &mut self,
        element: NodeId,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        match name {
            "id" => self.index.on_id_attribute_changed(element, old, new),
            "class" => self.index.on_class_attribute_changed(element, old, new),
            _ => {}
        }
    }

    // ── Links ───────────────────────────────────────────────────────────

    /// Unlink `child` from its parent, unindexing it if it was connected.
    fn detach(&mut self, child: NodeId) {
        if self.parent(child).is_none() {
            return;
        }
        if self.is_connected(child) {
            self.index_subtree(child, IndexUpdate::Remove);
        }
        self.unlink(child);
    }

    fn unlink(&mut self, child: NodeId) {
        let Links {
            parent,
            next_sibling,
            previous_sibling,
            ..
        } = self.link(child);
        let Some(parent) = parent else {
            return;
        };
        match previous_sibling {
            Some(prev) => self.update_links(prev, |l| l.next_sibling = next_sibling),
            None => self.update_links(parent, |l| l.first_child = next_sibling),
        }
        match next_sibling {
            Some(next) => self.update_links(next, |l| l.previous_sibling = previous_sibling),
            None => self.update_links(parent, |l| l.last_child = previous_sibling),
        }
        self.update_links(child, |l| {
            l.parent = None;
            l.next_sibling = None;
            l.previous_sibling = None;
        });
    }

    /// Link a parentless `child` into `parent` before `reference`.
    fn attach(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let previous = match reference {
            Some(reference) => self.previous_sibling(reference),
            None => self.last_child(parent),
        };
        self.update_links(child, |l| {
            l.parent = Some(parent);
            l.previous_sibling = previous;
            l.next_sibling = reference;
        });
        match previous {
            Some(prev) => self.update_links(prev, |l| l.next_sibling = Some(child)),
            None => self.update_links(parent, |l| l.first_child = Some(child)),
        }
        match reference {
            Some(next) => self.update_links(next, |l| l.previous_sibling = Some(child)),
            None => self.update_links(parent, |l| l.last_child = Some(child)),
        }
    }

    fn update_links(&mut self, id: NodeId, update: impl FnOnce(&mut Links)) {
        if let Some(links) = self.links.get_mut(id) {
            update(links);
        }
    }

    fn index_subtree(&mut self, root: NodeId, update: IndexUpdate) {
        let mut next = Some(root);
        while let Some(node) = next {
            if let Some(data) = self.nodes.get(node).filter(|d| d.is_element()) {
                match update {
                    IndexUpdate::Insert => self.index.on_element_inserted(node, data),
                    IndexUpdate::Remove => self.index.on_element_removed(node, data),
                    IndexUpdate::Adopt => self.index.on_element_adopted(node, data),
                }
            }
            next = self.next_in_preorder(node, root);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum IndexUpdate {
    Insert,
    Remove,
    Adopt,
}

impl SelectorTree for Dom {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Dom::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Dom::first_child(self, node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        Dom::last_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Dom::next_sibling(self, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        Dom::previous_sibling(self, node)
    }

    /// Stale ids read as comments so they never match.
    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.nodes.get(node).map_or(NodeKind::Comment, NodeData::kind)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.nodes.get(element).map_or("", NodeData::tag)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.get_attribute(element, name)
    }

    fn class_bloom(&self, element: NodeId) -> Option<BloomFilter> {
        self.nodes.get(element).map(NodeData::bloom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a test tree:
    /// ```text
    ///   document
    ///      |
    ///     html
    ///    /    \
    ///  head   body
    ///         /  \
    ///        p    div
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.insert_child(doc, NodeData::element("html")).unwrap();
        let head = dom.insert_child(html, NodeData::element("head")).unwrap();
        let body = dom.insert_child(html, NodeData::element("body")).unwrap();
        let p = dom.insert_child(body, NodeData::element("p")).unwrap();
        let div = dom.insert_child(body, NodeData::element("div")).unwrap();
        (dom, html, head, body, p, div)
    }

    #[test]
    fn new_has_document() {
        let dom = Dom::new();
        assert_eq!(dom.len(), 1);
        assert_eq!(dom.node_kind(dom.document()), NodeKind::Document);
        assert!(dom.is_connected(dom.document()));
        assert_eq!(dom.document_element(), None);
    }

    #[test]
    fn links_are_consistent() {
        let (dom, html, head, body, p, div) = build_tree();
        assert_eq!(dom.document_element(), Some(html));
        assert_eq!(dom.children(html).collect::<Vec<_>>(), vec![head, body]);
        assert_eq!(dom.first_child(body), Some(p));
        assert_eq!(dom.last_child(body), Some(div));
        assert_eq!(dom.next_sibling(p), Some(div));
        assert_eq!(dom.previous_sibling(div), Some(p));
        assert_eq!(dom.parent(p), Some(body));
    }

    #[test]
    fn ancestors_and_descendants() {
        let (dom, html, head, body, p, div) = build_tree();
        assert_eq!(
            dom.ancestors(p).collect::<Vec<_>>(),
            vec![body, html, dom.document()]
        );
        assert_eq!(
            dom.descendants(html).collect::<Vec<_>>(),
            vec![head, body, p, div]
        );
        assert_eq!(dom.descendants(p).count(), 0);
    }

    #[test]
    fn insert_before_reference() {
        let (mut dom, _, _, body, p, div) = build_tree();
        let span = dom.create_element("span");
        dom.insert_before(body, span, Some(div)).unwrap();
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![p, span, div]);
        dom.insert_before(body, div, Some(p)).unwrap();
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![div, p, span]);
    }

    #[test]
    fn insert_before_self_is_noop_move() {
        let (mut dom, _, _, body, p, div) = build_tree();
        dom.insert_before(body, p, Some(p)).unwrap();
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![p, div]);
    }

    #[test]
    fn append_moves_existing_node() {
        let (mut dom, _, head, body, p, div) = build_tree();
        dom.append_child(head, p).unwrap();
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![div]);
        assert_eq!(dom.parent(p), Some(head));
        assert_eq!(dom.previous_sibling(div), None);
    }

    #[test]
    fn fragment_children_are_moved() {
        let (mut dom, _, _, body, p, div) = build_tree();
        let fragment = dom.create_document_fragment();
        let a = dom.insert_child(fragment, NodeData::element("a")).unwrap();
        let b = dom.insert_child(fragment, NodeData::element("b")).unwrap();
        dom.insert_before(body, fragment, Some(div)).unwrap();
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![p, a, b, div]);
        assert_eq!(dom.first_child(fragment), None);
    }

    #[test]
    fn hierarchy_errors() {
        let (mut dom, html, _, body, p, _) = build_tree();
        let text = dom.create_text("hi");
        assert!(matches!(
            dom.append_child(body, html),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            dom.append_child(text, p),
            Err(DomError::HierarchyRequest(_))
        ));
        let doc = dom.document();
        assert!(matches!(
            dom.append_child(doc, text),
            Err(DomError::HierarchyRequest(_))
        ));
        let second = dom.create_element("html");
        assert!(matches!(
            dom.append_child(doc, second),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            dom.append_child(body, doc),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn reference_must_be_child() {
        let (mut dom, _, head, body, p, _) = build_tree();
        let span = dom.create_element("span");
        assert_eq!(
            dom.insert_before(head, span, Some(p)),
            Err(DomError::NotAChild {
                parent: head,
                child: p
            })
        );
        assert_eq!(dom.parent(span), None);
        assert_eq!(dom.remove_child(head, p), Err(DomError::NotAChild { parent: head, child: p }));
        assert_eq!(dom.remove_child(body, p), Ok(p));
    }

    #[test]
    fn remove_child_keeps_subtree_alive() {
        let (mut dom, html, _, body, p, div) = build_tree();
        dom.remove_child(html, body).unwrap();
        assert!(dom.contains(body));
        assert!(!dom.is_connected(body));
        assert!(!dom.is_connected(p));
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![p, div]);
    }

    #[test]
    fn remove_destroys_subtree() {
        let (mut dom, _, head, body, p, div) = build_tree();
        let data = dom.remove(body).unwrap();
        assert_eq!(data.tag(), "body");
        assert!(!dom.contains(body));
        assert!(!dom.contains(p));
        assert!(!dom.contains(div));
        assert_eq!(dom.next_sibling(head), None);
        assert_eq!(dom.len(), 3);
    }

    #[test]
    fn remove_document_is_refused() {
        let mut dom = Dom::new();
        let doc = dom.document();
        assert!(dom.remove(doc).is_none());
        assert!(dom.contains(doc));
    }

    #[test]
    fn tree_order() {
        let (dom, html, head, body, p, div) = build_tree();
        assert_eq!(dom.compare_tree_order(html, p), Ordering::Less);
        assert_eq!(dom.compare_tree_order(p, body), Ordering::Greater);
        assert_eq!(dom.compare_tree_order(head, div), Ordering::Less);
        assert_eq!(dom.compare_tree_order(div, p), Ordering::Greater);
        assert_eq!(dom.compare_tree_order(p, p), Ordering::Equal);
    }

    #[test]
    fn index_follows_connection() {
        let (mut dom, _, _, body, p, _) = build_tree();
        dom.set_class_name(p, "lead").unwrap();
        assert_eq!(dom.index.elements_with_class("lead"), &[p]);

        let detached = dom.create_element("section");
        dom.set_id(detached, "later").unwrap();
        assert!(dom.index.elements_with_id("later").is_empty());

        dom.append_child(body, detached).unwrap();
        assert_eq!(dom.index.elements_with_id("later"), &[detached]);

        dom.remove_child(body, p).unwrap();
        assert!(dom.index.elements_with_class("lead").is_empty());
        assert!(dom.index.elements_with_tag("p").is_empty());
    }

    #[test]
    fn attribute_changes_update_index_and_bloom() {
        let (mut dom, _, _, _, p, _) = build_tree();
        dom.set_id(p, "a").unwrap();
        dom.set_id(p, "b").unwrap();
        assert!(dom.index.elements_with_id("a").is_empty());
        assert_eq!(dom.index.elements_with_id("b"), &[p]);

        dom.set_class_name(p, "x y").unwrap();
        assert!(dom.class_bloom(p).is_some_and(|b| b.may_contain("y")));
        assert_eq!(dom.remove_attribute(p, "class"), Ok(Some("x y".into())));
        assert!(dom.index.elements_with_class("x").is_empty());
        assert_eq!(dom.class_bloom(p), Some(BloomFilter::new()));
    }

    #[test]
    fn attributes_only_on_elements() {
        let mut dom = Dom::new();
        let text = dom.create_text("t");
        assert!(matches!(
            dom.set_attribute(text, "id", "x"),
            Err(DomError::HierarchyRequest(_))
        ));
        let stale = dom.create_element("p");
        dom.remove(stale);
        assert_eq!(
            dom.set_attribute(stale, "id", "x"),
            Err(DomError::NodeNotFound(stale))
        );
    }

    #[test]
    fn adopt_moves_subtree_between_trees() {
        let (mut source, _, _, body, p, _) = build_tree();
        source.set_id(p, "moved").unwrap();
        let mut target = Dom::new();

        let adopted = target.adopt_node(&mut source, body).unwrap();
        assert!(!source.contains(body));
        assert!(!source.contains(p));
        assert!(source.index.elements_with_id("moved").is_empty());

        assert_eq!(target.get(adopted).map(NodeData::tag), Some("body"));
        let kids: Vec<&str> = target
            .children(adopted)
            .filter_map(|c| target.get(c).map(NodeData::tag))
            .collect();
        assert_eq!(kids, vec!["p", "div"]);
        assert!(!target.is_connected(adopted));

        let doc = target.document();
        target.append_child(doc, adopted).unwrap();
        assert_eq!(target.index.elements_with_id("moved").len(), 1);
    }
}
