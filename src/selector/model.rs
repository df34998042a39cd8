//! Selector AST: SelectorList, ComplexSelector, CompoundSelector, SimpleSelector.
//!
//! Ownership is strictly top-down. Logical pseudo-classes (`:not`, `:is`,
//! `:where`, `:has`) own a boxed nested [`SelectorList`]; there are no back
//! references, so dropping a list drops the whole tree.
//!
//! Every node implements `Display`, producing canonical CSS text that parses
//! back into an equal AST.

use std::fmt;

use super::nth::NthPattern;

/// Comma-separated selectors with OR semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<ComplexSelector>) -> Self {
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplexSelector> {
        self.selectors.iter()
    }

    /// The id every matching element must carry, if the list forces one.
    ///
    /// That is the case when the list has a single complex selector whose
    /// rightmost compound contains an id selector.
    pub fn required_id(&self) -> Option<&str> {
        let [only] = self.selectors.as_slice() else {
            return None;
        };
        only.rightmost().simples.iter().find_map(|simple| match simple {
            SimpleSelector::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }
}

/// Relation between two compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: `A B`.
    Descendant,
    /// `A > B`.
    Child,
    /// `A + B`.
    NextSibling,
    /// `A ~ B`.
    SubsequentSibling,
}

/// A chain of compound selectors joined by combinators.
///
/// Stored in source order: `first`, then `(combinator, compound)` pairs.
/// Matching walks it right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The compound the subject element itself must match.
    pub fn rightmost(&self) -> &CompoundSelector {
        self.rest
            .last()
            .map(|(_, compound)| compound)
            .unwrap_or(&self.first)
    }

    pub fn combinator_count(&self) -> usize {
        self.rest.len()
    }
}

/// A non-empty sequence of simple selectors that all apply to one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn new(simples: Vec<SimpleSelector>) -> Self {
        Self { simples }
    }

    /// Append a simple selector.
    pub fn push(&mut self, simple: SimpleSelector) {
        self.simples.push(simple);
    }

    pub fn is_empty(&self) -> bool {
        self.simples.is_empty()
    }
}

/// A single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `*`
    Universal,
    /// `div`
    Type(String),
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// `[attr]`, `[attr=value]`, ...
    Attribute(AttributeSelector),
    /// `:first-child`, `:not(...)`, ...
    PseudoClass(PseudoClassKind),
    /// `::before`. Parsed but never matches.
    PseudoElement(String),
}

/// `[name op value flag]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: AttributeMatcher,
    pub case_sensitive: bool,
}

impl AttributeSelector {
    pub fn new(name: impl Into<String>, matcher: AttributeMatcher) -> Self {
        Self {
            name: name.into(),
            matcher,
            case_sensitive: true,
        }
    }
}

/// Attribute comparison operator and its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// `[attr]`
    Presence,
    /// `[attr=value]`
    Exact(String),
    /// `[attr^=value]`
    Prefix(String),
    /// `[attr$=value]`
    Suffix(String),
    /// `[attr*=value]`
    Substring(String),
    /// `[attr~=value]`
    Includes(String),
    /// `[attr|=value]`
    DashMatch(String),
}

impl AttributeMatcher {
    fn operator(&self) -> &'static str {
        match self {
            AttributeMatcher::Presence => "",
            AttributeMatcher::Exact(_) => "=",
            AttributeMatcher::Prefix(_) => "^=",
            AttributeMatcher::Suffix(_) => "$=",
            AttributeMatcher::Substring(_) => "*=",
            AttributeMatcher::Includes(_) => "~=",
            AttributeMatcher::DashMatch(_) => "|=",
        }
    }

    /// The operand, `None` for [`AttributeMatcher::Presence`].
    pub fn value(&self) -> Option<&str> {
        match self {
            AttributeMatcher::Presence => None,
            AttributeMatcher::Exact(v)
            | AttributeMatcher::Prefix(v)
            | AttributeMatcher::Suffix(v)
            | AttributeMatcher::Substring(v)
            | AttributeMatcher::Includes(v)
            | AttributeMatcher::DashMatch(v) => Some(v),
        }
    }
}

/// Every pseudo-class the parser recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClassKind {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    /// The query scope element, or the root element without one.
    Scope,
    NthChild(NthPattern),
    NthLastChild(NthPattern),
    NthOfType(NthPattern),
    NthLastOfType(NthPattern),
    /// Link, user-action and form state. Recognized, never matches.
    State(StatePseudoClass),
    Not(Box<SelectorList>),
    Is(Box<SelectorList>),
    Where(Box<SelectorList>),
    Has(Box<SelectorList>),
}

/// Pseudo-classes that depend on live document state (focus, history,
/// layout, form control state) which this engine does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePseudoClass {
    Hover,
    Active,
    Focus,
    FocusWithin,
    FocusVisible,
    Link,
    Visited,
    AnyLink,
    LocalLink,
    Target,
    TargetWithin,
    Checked,
    Indeterminate,
    Default,
    Disabled,
    Enabled,
    Required,
    Optional,
    ReadOnly,
    ReadWrite,
    PlaceholderShown,
    Valid,
    Invalid,
    InRange,
    OutOfRange,
    Autofill,
    UserValid,
    UserInvalid,
}

impl StatePseudoClass {
    const ALL: [StatePseudoClass; 28] = [
        StatePseudoClass::Hover,
        StatePseudoClass::Active,
        StatePseudoClass::Focus,
        StatePseudoClass::FocusWithin,
        StatePseudoClass::FocusVisible,
        StatePseudoClass::Link,
        StatePseudoClass::Visited,
        StatePseudoClass::AnyLink,
        StatePseudoClass::LocalLink,
        StatePseudoClass::Target,
        StatePseudoClass::TargetWithin,
        StatePseudoClass::Checked,
        StatePseudoClass::Indeterminate,
        StatePseudoClass::Default,
        StatePseudoClass::Disabled,
        StatePseudoClass::Enabled,
        StatePseudoClass::Required,
        StatePseudoClass::Optional,
        StatePseudoClass::ReadOnly,
        StatePseudoClass::ReadWrite,
        StatePseudoClass::PlaceholderShown,
        StatePseudoClass::Valid,
        StatePseudoClass::Invalid,
        StatePseudoClass::InRange,
        StatePseudoClass::OutOfRange,
        StatePseudoClass::Autofill,
        StatePseudoClass::UserValid,
        StatePseudoClass::UserInvalid,
    ];

    /// Look up a lowercase pseudo-class name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            StatePseudoClass::Hover => "hover",
            StatePseudoClass::Active => "active",
            StatePseudoClass::Focus => "focus",
            StatePseudoClass::FocusWithin => "focus-within",
            StatePseudoClass::FocusVisible => "focus-visible",
            StatePseudoClass::Link => "link",
            StatePseudoClass::Visited => "visited",
            StatePseudoClass::AnyLink => "any-link",
            StatePseudoClass::LocalLink => "local-link",
            StatePseudoClass::Target => "target",
            StatePseudoClass::TargetWithin => "target-within",
            StatePseudoClass::Checked => "checked",
            StatePseudoClass::Indeterminate => "indeterminate",
            StatePseudoClass::Default => "default",
            StatePseudoClass::Disabled => "disabled",
            StatePseudoClass::Enabled => "enabled",
            StatePseudoClass::Required => "required",
            StatePseudoClass::Optional => "optional",
            StatePseudoClass::ReadOnly => "read-only",
            StatePseudoClass::ReadWrite => "read-write",
            StatePseudoClass::PlaceholderShown => "placeholder-shown",
            StatePseudoClass::Valid => "valid",
            StatePseudoClass::Invalid => "invalid",
            StatePseudoClass::InRange => "in-range",
            StatePseudoClass::OutOfRange => "out-of-range",
            StatePseudoClass::Autofill => "autofill",
            StatePseudoClass::UserValid => "user-valid",
            StatePseudoClass::UserInvalid => "user-invalid",
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
        })
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (combinator, compound) in &self.rest {
            write!(f, "{combinator}{compound}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simples {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Universal => f.write_str("*"),
            SimpleSelector::Type(name) => f.write_str(name),
            SimpleSelector::Class(name) => write!(f, ".{name}"),
            SimpleSelector::Id(id) => write!(f, "#{id}"),
            SimpleSelector::Attribute(attr) => write!(f, "{attr}"),
            SimpleSelector::PseudoClass(kind) => write!(f, "{kind}"),
            SimpleSelector::PseudoElement(name) => write!(f, "::{name}"),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.name)?;
        if let Some(value) = self.matcher.value() {
            f.write_str(self.matcher.operator())?;
            write_quoted(f, value)?;
            if !self.case_sensitive {
                f.write_str(" i")?;
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for PseudoClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClassKind::FirstChild => f.write_str(":first-child"),
            PseudoClassKind::LastChild => f.write_str(":last-child"),
            PseudoClassKind::OnlyChild => f.write_str(":only-child"),
            PseudoClassKind::FirstOfType => f.write_str(":first-of-type"),
            PseudoClassKind::LastOfType => f.write_str(":last-of-type"),
            PseudoClassKind::OnlyOfType => f.write_str(":only-of-type"),
            PseudoClassKind::Empty => f.write_str(":empty"),
            PseudoClassKind::Root => f.write_str(":root"),
            PseudoClassKind::Scope => f.write_str(":scope"),
            PseudoClassKind::NthChild(p) => write!(f, ":nth-child({p})"),
            PseudoClassKind::NthLastChild(p) => write!(f, ":nth-last-child({p})"),
            PseudoClassKind::NthOfType(p) => write!(f, ":nth-of-type({p})"),
            PseudoClassKind::NthLastOfType(p) => write!(f, ":nth-last-of-type({p})"),
            PseudoClassKind::State(state) => write!(f, ":{}", state.name()),
            PseudoClassKind::Not(list) => write!(f, ":not({list})"),
            PseudoClassKind::Is(list) => write!(f, ":is({list})"),
            PseudoClassKind::Where(list) => write!(f, ":where({list})"),
            PseudoClassKind::Has(list) => write!(f, ":has({list})"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(simples: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector::new(simples)
    }

    fn single(simple: SimpleSelector) -> ComplexSelector {
        ComplexSelector {
            first: compound(vec![simple]),
            rest: Vec::new(),
        }
    }

    #[test]
    fn rightmost_without_combinators() {
        let complex = single(SimpleSelector::Type("div".into()));
        assert_eq!(complex.rightmost().simples, vec![SimpleSelector::Type("div".into())]);
        assert_eq!(complex.combinator_count(), 0);
    }

    #[test]
    fn rightmost_with_combinators() {
        let complex = ComplexSelector {
            first: compound(vec![SimpleSelector::Type("div".into())]),
            rest: vec![(
                Combinator::Child,
                compound(vec![SimpleSelector::Class("text".into())]),
            )],
        };
        assert_eq!(complex.rightmost().simples, vec![SimpleSelector::Class("text".into())]);
    }

    #[test]
    fn required_id_from_rightmost_compound() {
        let list = SelectorList::new(vec![ComplexSelector {
            first: compound(vec![SimpleSelector::Type("div".into())]),
            rest: vec![(
                Combinator::Descendant,
                compound(vec![
                    SimpleSelector::Type("p".into()),
                    SimpleSelector::Id("intro".into()),
                ]),
            )],
        }]);
        assert_eq!(list.required_id(), Some("intro"));
    }

    #[test]
    fn required_id_ignores_ancestor_ids_and_lists() {
        let ancestor_only = SelectorList::new(vec![ComplexSelector {
            first: compound(vec![SimpleSelector::Id("main".into())]),
            rest: vec![(Combinator::Descendant, compound(vec![SimpleSelector::Universal]))],
        }]);
        assert_eq!(ancestor_only.required_id(), None);

        let two = SelectorList::new(vec![
            single(SimpleSelector::Id("a".into())),
            single(SimpleSelector::Id("b".into())),
        ]);
        assert_eq!(two.required_id(), None);
    }

    #[test]
    fn attribute_value_accessor() {
        assert_eq!(AttributeMatcher::Presence.value(), None);
        assert_eq!(AttributeMatcher::DashMatch("en".into()).value(), Some("en"));
    }

    #[test]
    fn state_pseudo_class_names_round_trip() {
        for state in StatePseudoClass::ALL {
            assert_eq!(StatePseudoClass::from_name(state.name()), Some(state));
        }
        assert_eq!(StatePseudoClass::from_name("first-child"), None);
    }

    #[test]
    fn display_attribute_escapes_quotes() {
        let mut attr =
            AttributeSelector::new("title", AttributeMatcher::Exact("say \"hi\"".into()));
        attr.case_sensitive = false;
        assert_eq!(attr.to_string(), r#"[title="say \"hi\"" i]"#);
    }

    #[test]
    fn display_complex_selector() {
        let complex = ComplexSelector {
            first: compound(vec![
                SimpleSelector::Type("ul".into()),
                SimpleSelector::Class("menu".into()),
            ]),
            rest: vec![
                (Combinator::Child, compound(vec![SimpleSelector::Type("li".into())])),
                (
                    Combinator::SubsequentSibling,
                    compound(vec![SimpleSelector::PseudoClass(PseudoClassKind::NthChild(
                        NthPattern::ODD,
                    ))]),
                ),
            ],
        };
        assert_eq!(complex.to_string(), "ul.menu > li ~ :nth-child(2n+1)");
    }
}
