//! Parsed-selector cache with FIFO eviction.
//!
//! Each entry keeps the source string, the parsed list, the fast-path shape
//! and the identifier a fast path needs. Entries are shared as `Rc` so a
//! query can keep using one after it has been evicted.

use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::selector::fast_path::{self, FastPath};
use crate::selector::model::SelectorList;
use crate::selector::parser::{
    parse_selector_list_with_limit, ParseError, DEFAULT_MAX_NESTING_DEPTH,
};

/// Capacity used by [`SelectorCache::default`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// A selector string parsed and classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    pub source: String,
    pub selectors: SelectorList,
    pub fast_path: FastPath,
    /// Id, class or tag name for the simple shapes; the required id for
    /// [`FastPath::IdFiltered`] when the list has one.
    pub identifier: Option<String>,
}

impl ParsedSelector {
    /// Parse and classify without caching.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Self::parse_with_limit(source, DEFAULT_MAX_NESTING_DEPTH)
    }

    pub fn parse_with_limit(source: &str, max_nesting_depth: usize) -> Result<Self, ParseError> {
        let selectors = parse_selector_list_with_limit(source, max_nesting_depth)?;
        let fast_path = fast_path::classify(source);
        let identifier = match fast_path {
            FastPath::IdFiltered => selectors.required_id().map(str::to_owned),
            _ => fast_path::simple_identifier(source, fast_path).map(str::to_owned),
        };
        Ok(Self {
            source: source.to_owned(),
            selectors,
            fast_path,
            identifier,
        })
    }
}

/// Bounded map from selector string to [`ParsedSelector`].
///
/// At capacity the oldest inserted entry is evicted, regardless of use.
#[derive(Debug)]
pub struct SelectorCache {
    entries: FxHashMap<String, Rc<ParsedSelector>>,
    order: VecDeque<String>,
    capacity: usize,
    max_nesting_depth: usize,
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SelectorCache {
    /// A cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, DEFAULT_MAX_NESTING_DEPTH)
    }

    pub fn with_limits(capacity: usize, max_nesting_depth: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity),
            capacity,
            max_nesting_depth,
        }
    }

    /// Return the cached entry for `selector`, parsing and inserting it on a
    /// miss. Parse failures are returned and not cached.
    pub fn get(&mut self, selector: &str) -> Result<Rc<ParsedSelector>, ParseError> {
        if let Some(entry) = self.entries.get(selector) {
            tracing::trace!(selector, "selector cache hit");
            return Ok(Rc::clone(entry));
        }

        let parsed = Rc::new(ParsedSelector::parse_with_limit(
            selector,
            self.max_nesting_depth,
        )?);
        tracing::trace!(selector, fast_path = %parsed.fast_path, "selector cache miss");

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(selector.to_owned(), Rc::clone(&parsed));
        self.order.push_back(selector.to_owned());
        Ok(parsed)
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
            tracing::trace!(selector = %oldest, "selector cache evict");
        }
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.entries.contains_key(selector)
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
