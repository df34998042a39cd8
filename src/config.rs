//! Query engine configuration.

use crate::selector::cache::DEFAULT_CACHE_CAPACITY;
use crate::selector::parser::DEFAULT_MAX_NESTING_DEPTH;

/// Per-tree settings for selector parsing, caching and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Entries kept by the parsed-selector cache before FIFO eviction.
    pub cache_capacity: usize,
    /// Deepest nesting of `:not`/`:is`/`:where`/`:has` the parser accepts.
    pub max_nesting_depth: usize,
    /// Serve simple selectors from the index maps. When off, every query
    /// runs through the matcher.
    pub fast_paths: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            fast_paths: true,
        }
    }
}

impl QueryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector cache capacity (builder).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the nesting limit (builder).
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Enable or disable fast-path dispatch (builder).
    pub fn with_fast_paths(mut self, enabled: bool) -> Self {
        self.fast_paths = enabled;
        self
    }
}
