//! Classifier for selectors that can skip full matching.
//!
//! Works on the raw string without tokenizing. The result is advisory: the
//! selector is still parsed, and any fast path must agree with the matcher.

use std::fmt;

use super::tokenizer::is_css_whitespace;

/// Shape of a selector string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FastPath {
    /// `#ident`
    SimpleId,
    /// `.ident`
    SimpleClass,
    /// A bare tag name of ASCII letters, digits and hyphens.
    SimpleTag,
    /// Contains `#` but is not a lone id selector.
    IdFiltered,
    Generic,
}

impl FastPath {
    /// Whether the whole selector is a single id, class or tag test.
    pub fn is_simple(self) -> bool {
        matches!(self, FastPath::SimpleId | FastPath::SimpleClass | FastPath::SimpleTag)
    }
}

impl fmt::Display for FastPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FastPath::SimpleId => "simple_id",
            FastPath::SimpleClass => "simple_class",
            FastPath::SimpleTag => "simple_tag",
            FastPath::IdFiltered => "id_filtered",
            FastPath::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Classify a selector string. Never fails.
pub fn classify(selector: &str) -> FastPath {
    let selector = selector.trim_matches(is_css_whitespace);
    if let Some(rest) = selector.strip_prefix('#') {
        if is_ident(rest) {
            return FastPath::SimpleId;
        }
    } else if let Some(rest) = selector.strip_prefix('.') {
        if is_ident(rest) {
            return FastPath::SimpleClass;
        }
    } else if is_simple_tag(selector) {
        return FastPath::SimpleTag;
    }

    if selector.contains('#') {
        FastPath::IdFiltered
    } else {
        FastPath::Generic
    }
}

/// The id, class or tag name a simple selector tests for.
pub fn simple_identifier(selector: &str, fast_path: FastPath) -> Option<&str> {
    let selector = selector.trim_matches(is_css_whitespace);
    match fast_path {
        FastPath::SimpleId | FastPath::SimpleClass => selector.get(1..),
        FastPath::SimpleTag => Some(selector),
        FastPath::IdFiltered | FastPath::Generic => None,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// CSS identifier without escapes or a leading hyphen.
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

fn is_simple_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}
