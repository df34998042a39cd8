//! Right-to-left selector matching.
//!
//! The subject element must match the rightmost compound. Each combinator,
//! walked from last to first, names a candidate set (parent, ancestors,
//! previous sibling, previous siblings) that must contain an element
//! matching the next compound to the left. Descendant and subsequent-sibling
//! candidates are tried nearest first; a candidate that matches its compound
//! but fails further left does not end the search unless the failure shows
//! that no candidate further out can succeed either.
//!
//! This module is the single authority on selector semantics. The fast paths
//! call [`match_type`], [`match_class`] and [`match_id`] directly.

use crate::selector::model::*;
use crate::selector::tree::{NodeKind, SelectorTree};

/// Per-query matching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchContext<N> {
    /// Element `:scope` refers to. Without one, `:scope` is `:root`.
    pub scope: Option<N>,
}

impl<N> MatchContext<N> {
    pub fn new(scope: Option<N>) -> Self {
        Self { scope }
    }
}

impl<N> Default for MatchContext<N> {
    fn default() -> Self {
        Self { scope: None }
    }
}

/// Whether `element` matches any selector in `list`.
pub fn matches_selector_list<T: SelectorTree>(
    tree: &T,
    element: T::Node,
    list: &SelectorList,
) -> bool {
    matches_in_context(tree, &MatchContext::default(), element, list)
}

/// Like [`matches_selector_list`] with an explicit `:scope`.
pub fn matches_in_context<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    list: &SelectorList,
) -> bool {
    tree.is_element(element)
        && list
            .iter()
            .any(|complex| matches_complex(tree, context, element, complex))
}

/// Match one complex selector against `element`.
pub fn matches_complex<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    complex: &ComplexSelector,
) -> bool {
    match_from(tree, context, complex, complex.rest.len(), element) == ChainMatch::Matched
}

/// Compound number `index` in source order (0 is `first`).
fn compound_at(complex: &ComplexSelector, index: usize) -> &CompoundSelector {
    match index {
        0 => &complex.first,
        i => &complex.rest[i - 1].1,
    }
}

/// Outcome of matching a compound and everything to its left.
///
/// The failure variants say how far back the caller has to give up. When a
/// descendant combinator runs out of ancestors, trying a higher element for
/// the compounds to its right only shrinks the candidate set, so the whole
/// selector fails. Sibling combinators that run out of siblings fall back
/// to the closest descendant combinator on their right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainMatch {
    Matched,
    RestartFromClosestLaterSibling,
    RestartFromClosestDescendant,
    NotMatchedGlobally,
}

/// Match compound `index` against `element`, then walk its combinator.
fn match_from<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    complex: &ComplexSelector,
    index: usize,
    element: T::Node,
) -> ChainMatch {
    if !matches_compound(tree, context, element, compound_at(complex, index)) {
        return ChainMatch::RestartFromClosestLaterSibling;
    }
    if index == 0 {
        return ChainMatch::Matched;
    }

    let combinator = complex.rest[index - 1].0;
    let (siblings, not_found) = match combinator {
        Combinator::Child | Combinator::Descendant => (false, ChainMatch::NotMatchedGlobally),
        Combinator::NextSibling | Combinator::SubsequentSibling => {
            (true, ChainMatch::RestartFromClosestDescendant)
        }
    };
    let step = |node: T::Node| {
        if siblings {
            tree.previous_element_sibling(node)
        } else {
            tree.parent_element(node)
        }
    };

    let mut next = step(element);
    loop {
        let Some(candidate) = next else {
            return not_found;
        };
        let result = match_from(tree, context, complex, index - 1, candidate);
        match (result, combinator) {
            (ChainMatch::Matched | ChainMatch::NotMatchedGlobally, _) => return result,
            (_, Combinator::Child) => return ChainMatch::RestartFromClosestDescendant,
            (_, Combinator::NextSibling) => return result,
            (ChainMatch::RestartFromClosestDescendant, Combinator::SubsequentSibling) => {
                return result;
            }
            _ => {}
        }
        next = step(candidate);
    }
}

/// All simple selectors must match; stops at the first that does not.
pub fn matches_compound<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(tree, context, element, simple))
}

pub fn matches_simple<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(name) => match_type(tree, element, name),
        SimpleSelector::Class(class) => match_class(tree, element, class),
        SimpleSelector::Id(id) => match_id(tree, element, id),
        SimpleSelector::Attribute(attr) => match_attribute(tree, element, attr),
        SimpleSelector::PseudoClass(kind) => match_pseudo_class(tree, context, element, kind),
        SimpleSelector::PseudoElement(_) => false,
    }
}

/// Exact tag name comparison.
pub fn match_type<T: SelectorTree>(tree: &T, element: T::Node, name: &str) -> bool {
    tree.tag_name(element) == name
}

/// Bloom filter rejection, then a token scan of the class attribute.
pub fn match_class<T: SelectorTree>(tree: &T, element: T::Node, class: &str) -> bool {
    tree.has_class(element, class)
}

pub fn match_id<T: SelectorTree>(tree: &T, element: T::Node, id: &str) -> bool {
    tree.element_id(element) == Some(id)
}

pub fn match_attribute<T: SelectorTree>(
    tree: &T,
    element: T::Node,
    attr: &AttributeSelector,
) -> bool {
    let Some(value) = tree.attribute(element, &attr.name) else {
        return false;
    };
    let Some(expected) = attr.matcher.value() else {
        return true;
    };
    if attr.case_sensitive {
        attribute_value_matches(&attr.matcher, value, expected)
    } else {
        attribute_value_matches(
            &attr.matcher,
            &value.to_ascii_lowercase(),
            &expected.to_ascii_lowercase(),
        )
    }
}

/// Operator semantics for attribute value `value` against operand `expected`.
///
/// An empty operand never matches `*=` or `~=`; it is a prefix and suffix of
/// every value.
pub fn attribute_value_matches(matcher: &AttributeMatcher, value: &str, expected: &str) -> bool {
    match matcher {
        AttributeMatcher::Presence => true,
        AttributeMatcher::Exact(_) => value == expected,
        AttributeMatcher::Prefix(_) => value.starts_with(expected),
        AttributeMatcher::Suffix(_) => value.ends_with(expected),
        AttributeMatcher::Substring(_) => !expected.is_empty() && value.contains(expected),
        AttributeMatcher::Includes(_) => {
            !expected.is_empty()
                && !expected.contains(|c: char| c.is_ascii_whitespace())
                && value.split_ascii_whitespace().any(|token| token == expected)
        }
        AttributeMatcher::DashMatch(_) => {
            value == expected
                || value
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
    }
}

fn match_pseudo_class<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    kind: &PseudoClassKind,
) -> bool {
    match kind {
        PseudoClassKind::FirstChild => tree.previous_element_sibling(element).is_none(),
        PseudoClassKind::LastChild => tree.next_element_sibling(element).is_none(),
        PseudoClassKind::OnlyChild => {
            tree.previous_element_sibling(element).is_none()
                && tree.next_element_sibling(element).is_none()
        }
        PseudoClassKind::FirstOfType => nth_index(tree, element, true, false) == 1,
        PseudoClassKind::LastOfType => nth_index(tree, element, true, true) == 1,
        PseudoClassKind::OnlyOfType => {
            nth_index(tree, element, true, false) == 1 && nth_index(tree, element, true, true) == 1
        }
        PseudoClassKind::Empty => tree.first_child(element).is_none(),
        PseudoClassKind::Root => is_root(tree, element),
        PseudoClassKind::Scope => match context.scope {
            Some(scope) if tree.is_element(scope) => scope == element,
            _ => is_root(tree, element),
        },
        PseudoClassKind::NthChild(p) => p.matches(nth_index(tree, element, false, false)),
        PseudoClassKind::NthLastChild(p) => p.matches(nth_index(tree, element, false, true)),
        PseudoClassKind::NthOfType(p) => p.matches(nth_index(tree, element, true, false)),
        PseudoClassKind::NthLastOfType(p) => p.matches(nth_index(tree, element, true, true)),
        PseudoClassKind::State(_) => false,
        PseudoClassKind::Not(list) => !matches_in_context(tree, context, element, list),
        PseudoClassKind::Is(list) | PseudoClassKind::Where(list) => {
            matches_in_context(tree, context, element, list)
        }
        PseudoClassKind::Has(list) => has_matching_descendant(tree, context, element, list),
    }
}

fn is_root<T: SelectorTree>(tree: &T, element: T::Node) -> bool {
    tree.parent(element)
        .is_none_or(|parent| tree.node_kind(parent) == NodeKind::Document)
}

/// 1-based position among element siblings, optionally only those with the
/// same tag, counted from the start or from the end.
fn nth_index<T: SelectorTree>(tree: &T, element: T::Node, of_type: bool, from_end: bool) -> usize {
    let tag = tree.tag_name(element);
    let step = |node| {
        if from_end {
            tree.next_element_sibling(node)
        } else {
            tree.previous_element_sibling(node)
        }
    };
    let mut index = 1;
    let mut current = step(element);
    while let Some(sibling) = current {
        if !of_type || tree.tag_name(sibling) == tag {
            index += 1;
        }
        current = step(sibling);
    }
    index
}

/// Pre-order scan of the descendants of `element`, stopping at the first match.
fn has_matching_descendant<T: SelectorTree>(
    tree: &T,
    context: &MatchContext<T::Node>,
    element: T::Node,
    list: &SelectorList,
) -> bool {
    let mut next = tree.first_child(element);
    while let Some(node) = next {
        if matches_in_context(tree, context, node, list) {
            return true;
        }
        next = tree.next_in_preorder(node, element);
    }
    false
}
