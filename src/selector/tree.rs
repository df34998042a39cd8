//! The tree interface the matcher needs from a DOM implementation.
//!
//! Only navigation, node kind, tag name and attribute access are required.
//! Element helpers (`parent_element`, `previous_element_sibling`, ...) and
//! the class test are provided on top of those.

use super::bloom::{class_tokens, BloomFilter};

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    DocumentFragment,
    Element,
    Text,
    Comment,
}

/// Read access to a DOM tree for selector matching.
pub trait SelectorTree {
    /// Lightweight node handle.
    type Node: Copy + Eq;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn node_kind(&self, node: Self::Node) -> NodeKind;

    /// Tag name of an element. Empty for other node kinds.
    fn tag_name(&self, element: Self::Node) -> &str;

    fn attribute(&self, element: Self::Node, name: &str) -> Option<&str>;

    /// Class bloom filter of an element, if the tree maintains one.
    fn class_bloom(&self, _element: Self::Node) -> Option<BloomFilter> {
        None
    }

    fn is_element(&self, node: Self::Node) -> bool {
        self.node_kind(node) == NodeKind::Element
    }

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node> {
        self.parent(node).filter(|&p| self.is_element(p))
    }

    fn previous_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.previous_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    fn next_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.next_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    fn first_element_child(&self, node: Self::Node) -> Option<Self::Node> {
        let first = self.first_child(node)?;
        if self.is_element(first) {
            Some(first)
        } else {
            self.next_element_sibling(first)
        }
    }

    /// The node after `node` in a pre-order walk of the subtree rooted at
    /// `root`, or `None` once the walk leaves it.
    fn next_in_preorder(&self, node: Self::Node, root: Self::Node) -> Option<Self::Node> {
        if let Some(child) = self.first_child(node) {
            return Some(child);
        }
        let mut current = node;
        loop {
            if current == root {
                return None;
            }
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Element `id` attribute.
    fn element_id(&self, element: Self::Node) -> Option<&str> {
        self.attribute(element, "id")
    }

    /// Whether the element's class attribute contains `class` as a token.
    ///
    /// Rejects through the bloom filter first when one is available.
    fn has_class(&self, element: Self::Node, class: &str) -> bool {
        if let Some(bloom) = self.class_bloom(element) {
            if !bloom.may_contain(class) {
                return false;
            }
        }
        self.attribute(element, "class")
            .is_some_and(|value| class_tokens(value).any(|token| token == class))
    }
}
