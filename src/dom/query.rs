//! DOM queries: querySelector(All), matches, closest, and the id/tag/class
//! lookups.
//!
//! Every selector query goes through the tree's [`SelectorCache`]. Simple
//! selectors on connected scopes are answered from the index maps; anything
//! else walks the scope's descendants with the matcher.
//!
//! [`SelectorCache`]: crate::selector::SelectorCache

use std::rc::Rc;

use super::node::NodeId;
use super::tree::Dom;
use crate::selector::bloom::class_tokens;
use crate::selector::cache::ParsedSelector;
use crate::selector::fast_path::FastPath;
use crate::selector::matcher::{match_class, match_id, match_type, matches_in_context, MatchContext};
use crate::selector::parser::ParseError;
use crate::selector::tree::SelectorTree;

impl Dom {
    /// First element below `scope` in tree order matching `selector`.
    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, ParseError> {
        let parsed = self.parse_cached(selector)?;
        if let Some(candidates) = self.indexed_candidates(scope, &parsed) {
            return Ok(candidates
                .into_iter()
                .min_by(|&a, &b| self.compare_tree_order(a, b)));
        }
        let first = self.scan(scope, &parsed).next();
        Ok(first)
    }

    /// All elements below `scope` matching `selector`, in tree order.
    ///
    /// The result is a snapshot; later mutations do not change it.
    pub fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, ParseError> {
        let parsed = self.parse_cached(selector)?;
        if let Some(mut candidates) = self.indexed_candidates(scope, &parsed) {
            candidates.sort_by(|&a, &b| self.compare_tree_order(a, b));
            return Ok(candidates);
        }
        Ok(self.scan(scope, &parsed).collect())
    }

    /// Whether `element` matches `selector`. Non-elements never match.
    pub fn matches(&self, element: NodeId, selector: &str) -> Result<bool, ParseError> {
        let parsed = self.parse_cached(selector)?;
        Ok(self.matches_parsed(element, &parsed, &MatchContext::new(Some(element))))
    }

    /// Alias of [`Dom::matches`].
    pub fn webkit_matches_selector(
        &self,
        element: NodeId,
        selector: &str,
    ) -> Result<bool, ParseError> {
        self.matches(element, selector)
    }

    /// `element` itself or its nearest ancestor element matching `selector`.
    pub fn closest(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, ParseError> {
        let parsed = self.parse_cached(selector)?;
        if !self.is_element(element) {
            return Ok(None);
        }
        let context = MatchContext::new(Some(element));
        Ok(std::iter::once(element)
            .chain(self.ancestors(element))
            .take_while(|&node| self.is_element(node))
            .find(|&node| self.matches_parsed(node, &parsed, &context)))
    }

    /// First connected element in tree order whose id is `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        if self.index.is_degraded() {
            return self
                .descendants(self.document())
                .find(|&node| self.is_element(node) && match_id(self, node, id));
        }
        if let Some(found) = self.index.cached_id_lookup(id) {
            return found;
        }
        let found = self
            .index
            .elements_with_id(id)
            .iter()
            .copied()
            .min_by(|&a, &b| self.compare_tree_order(a, b));
        self.index.remember_id_lookup(id, found);
        found
    }

    /// Elements below `scope` with tag name `tag`, in tree order. `*`
    /// selects every element.
    pub fn get_elements_by_tag_name(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        if tag == "*" {
            return self
                .descendants(scope)
                .filter(|&node| self.is_element(node))
                .collect();
        }
        if self.index_usable(scope) {
            return self.in_scope_sorted(scope, self.index.elements_with_tag(tag), |_| true);
        }
        self.descendants(scope)
            .filter(|&node| self.is_element(node) && match_type(self, node, tag))
            .collect()
    }

    /// Elements below `scope` carrying every class in the space-separated
    /// `names`, in tree order. Empty `names` selects nothing.
    pub fn get_elements_by_class_name(&self, scope: NodeId, names: &str) -> Vec<NodeId> {
        let classes: Vec<&str> = class_tokens(names).collect();
        let Some(first) = classes.first() else {
            return Vec::new();
        };
        let has_all = |node: NodeId| classes.iter().all(|class| match_class(self, node, class));
        if self.index_usable(scope) {
            return self.in_scope_sorted(scope, self.index.elements_with_class(first), has_all);
        }
        self.descendants(scope)
            .filter(|&node| self.is_element(node) && has_all(node))
            .collect()
    }

    /// Drop every cached parsed selector.
    pub fn clear_selector_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Number of parsed selectors currently cached.
    pub fn selector_cache_len(&self) -> usize {
        self.cache.borrow().count()
    }

    fn parse_cached(&self, selector: &str) -> Result<Rc<ParsedSelector>, ParseError> {
        self.cache
            .borrow_mut()
            .get(selector)
            .inspect_err(|err| tracing::debug!(selector, %err, "rejected selector"))
    }

    /// The index maps describe exactly the connected elements, so they can
    /// answer for connected scopes only.
    fn index_usable(&self, scope: NodeId) -> bool {
        self.config().fast_paths && !self.index.is_degraded() && self.is_connected(scope)
    }

    /// `:scope` is the scope element; a document or fragment scope leaves it
    /// to mean `:root`.
    fn scope_context(&self, scope: NodeId) -> MatchContext<NodeId> {
        MatchContext::new(Some(scope).filter(|&node| self.is_element(node)))
    }

    fn matches_parsed(
        &self,
        element: NodeId,
        parsed: &ParsedSelector,
        context: &MatchContext<NodeId>,
    ) -> bool {
        if !self.is_element(element) {
            return false;
        }
        if self.config().fast_paths {
            if let Some(key) = parsed.identifier.as_deref() {
                match parsed.fast_path {
                    FastPath::SimpleId => return match_id(self, element, key),
                    FastPath::SimpleClass => return match_class(self, element, key),
                    FastPath::SimpleTag => return match_type(self, element, key),
                    FastPath::IdFiltered | FastPath::Generic => {}
                }
            }
        }
        matches_in_context(self, context, element, &parsed.selectors)
    }

    /// Matching elements under `scope` taken from the index maps, unordered.
    /// `None` when the selector or scope cannot be served that way.
    fn indexed_candidates(&self, scope: NodeId, parsed: &ParsedSelector) -> Option<Vec<NodeId>> {
        if !self.index_usable(scope) {
            return None;
        }
        let key = parsed.identifier.as_deref()?;
        let (bucket, verify) = match parsed.fast_path {
            FastPath::SimpleId => (self.index.elements_with_id(key), false),
            FastPath::SimpleClass => (self.index.elements_with_class(key), false),
            FastPath::SimpleTag => (self.index.elements_with_tag(key), false),
            FastPath::IdFiltered => (self.index.elements_with_id(key), true),
            FastPath::Generic => return None,
        };
        tracing::trace!(
            selector = %parsed.source,
            fast_path = %parsed.fast_path,
            candidates = bucket.len(),
            "fast path dispatch"
        );
        let context = self.scope_context(scope);
        Some(
            bucket
                .iter()
                .copied()
                .filter(|&node| self.is_ancestor(scope, node))
                .filter(|&node| {
                    !verify || matches_in_context(self, &context, node, &parsed.selectors)
                })
                .collect(),
        )
    }

    fn in_scope_sorted(
        &self,
        scope: NodeId,
        bucket: &[NodeId],
        keep: impl Fn(NodeId) -> bool,
    ) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = bucket
            .iter()
            .copied()
            .filter(|&node| self.is_ancestor(scope, node) && keep(node))
            .collect();
        found.sort_by(|&a, &b| self.compare_tree_order(a, b));
        found
    }

    fn scan<'a>(
        &'a self,
        scope: NodeId,
        parsed: &'a ParsedSelector,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let context = self.scope_context(scope);
        self.descendants(scope)
            .filter(move |&node| matches_in_context(self, &context, node, &parsed.selectors))
    }
}
