//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

use crate::selector::bloom::BloomFilter;
use crate::selector::tree::NodeKind;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Data associated with a single DOM node.
///
/// Attribute names are stored ASCII-lowercased. The class bloom filter is
/// rebuilt whenever the `class` attribute is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    kind: NodeKind,
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    bloom: BloomFilter,
}

impl NodeData {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: String::new(),
            attributes: Vec::new(),
            text: String::new(),
            bloom: BloomFilter::new(),
        }
    }

    /// An element with the given tag name.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::with_kind(NodeKind::Element)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::with_kind(NodeKind::Text)
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::with_kind(NodeKind::Comment)
        }
    }

    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::DocumentFragment)
    }

    pub(crate) fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value.into());
        self
    }

    /// Set the id (builder).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Append one or more space-separated classes (builder).
    pub fn with_class(mut self, class: &str) -> Self {
        let value = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attribute("class", value);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Tag name; empty for non-elements.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Character data of text and comment nodes.
    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in the order they were first set.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn class_name(&self) -> Option<&str> {
        self.attribute("class")
    }

    pub fn bloom(&self) -> BloomFilter {
        self.bloom
    }

    /// Write an attribute, returning the previous value.
    pub(crate) fn set_attribute(&mut self, name: &str, value: String) -> Option<String> {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            self.bloom = BloomFilter::from_class_attribute(&value);
        }
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.attributes.push((name, value));
                None
            }
        }
    }

    /// Remove an attribute, returning its value.
    pub(crate) fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let position = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        let (key, value) = self.attributes.remove(position);
        if key == "class" {
            self.bloom.clear();
        }
        Some(value)
    }
}
