//! Per-element 64-bit class bloom filter.
//!
//! One bit per class name, chosen by `hash(class) % 64`. A clear bit proves
//! the class is absent; a set bit only says it may be present, so callers
//! must confirm against the class attribute.

use std::hash::Hasher;

use rustc_hash::FxHasher;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BloomFilter {
    bits: u64,
}

impl BloomFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from a space-separated class attribute value.
    pub fn from_class_attribute(value: &str) -> Self {
        let mut filter = Self::new();
        for class in class_tokens(value) {
            filter.add(class);
        }
        filter
    }

    pub fn add(&mut self, class: &str) {
        self.bits |= bit_for(class);
    }

    /// `false` means `class` was definitely never added.
    pub fn may_contain(&self, class: &str) -> bool {
        self.bits & bit_for(class) != 0
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

fn bit_for(class: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(class.as_bytes());
    1u64 << (hasher.finish() % 64)
}

/// Split a class attribute on ASCII whitespace, skipping empty tokens.
pub fn class_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}
