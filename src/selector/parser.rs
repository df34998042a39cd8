//! Recursive descent selector parser.
//!
//! Grammar:
//!
//! ```text
//! selector_list := complex (',' complex)*
//! complex       := compound (combinator compound)*
//! compound      := simple+
//! simple        := '*' | ident | '.' ident | '#' ident | attribute | pseudo
//! ```
//!
//! The parser keeps a single token of lookahead. Whitespace tokens are
//! reinterpreted: whitespace followed by the start of a compound is a
//! descendant combinator, whitespace around `>`, `+` or `~` is insignificant.
//! Parsing is all-or-nothing; an error drops whatever was built so far.

use crate::selector::model::*;
use crate::selector::nth::NthPattern;
use crate::selector::tokenizer::{LexError, Token, TokenKind, Tokenizer};

/// Nesting depth of `:not`/`:is`/`:where`/`:has` accepted by default.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Pseudo-elements accepted after `::`.
const PSEUDO_ELEMENTS: &[&str] = &[
    "before",
    "after",
    "first-line",
    "first-letter",
    "marker",
    "placeholder",
    "selection",
    "backdrop",
    "file-selector-button",
];

/// Pseudo-elements that CSS 2 allowed with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("selector nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::UnexpectedToken {
            position: err.position,
            message: format!("unrecognized input '{}'", err.fragment),
        }
    }
}

/// Parse a selector string into a [`SelectorList`].
pub fn parse_selector_list(input: &str) -> Result<SelectorList, ParseError> {
    parse_selector_list_with_limit(input, DEFAULT_MAX_NESTING_DEPTH)
}

/// Parse with an explicit limit on nested logical pseudo-classes.
pub fn parse_selector_list_with_limit(
    input: &str,
    max_nesting_depth: usize,
) -> Result<SelectorList, ParseError> {
    let mut parser = Parser::new(input, max_nesting_depth)?;
    let list = parser.parse_selector_list()?;
    if parser.current.is_some() {
        return Err(parser.unexpected("expected ',' or end of selector"));
    }
    Ok(list)
}

/// Recursive descent parser state.
struct Parser<'src> {
    source: &'src str,
    tokens: Tokenizer<'src>,
    current: Option<Token<'src>>,
    depth: usize,
    max_depth: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, max_depth: usize) -> Result<Self, ParseError> {
        let mut parser = Self {
            source,
            tokens: Tokenizer::new(source),
            current: None,
            depth: 0,
            max_depth,
        };
        parser.advance()?;
        Ok(parser)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.tokens.next().transpose()?;
        Ok(())
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.current.map(|t| t.kind)
    }

    /// Consume a run of whitespace, returning whether there was any.
    fn skip_whitespace(&mut self) -> Result<bool, ParseError> {
        let mut skipped = false;
        while self.peek_kind() == Some(TokenKind::Whitespace) {
            self.advance()?;
            skipped = true;
        }
        Ok(skipped)
    }

    /// Error describing the current token (or end of input).
    fn unexpected(&self, message: &str) -> ParseError {
        match self.current {
            Some(tok) => ParseError::UnexpectedToken {
                position: tok.start,
                message: format!("{message}, got '{}'", tok.value),
            },
            None => ParseError::UnexpectedEof(message.to_owned()),
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token<'src>, ParseError> {
        match self.current {
            Some(tok) if tok.kind == kind => {
                self.advance()?;
                Ok(tok)
            }
            _ => Err(self.unexpected(message)),
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<&'src str, ParseError> {
        self.expect(TokenKind::Ident, message).map(|tok| tok.value)
    }

    /// Parse comma-separated complex selectors. Stops before any token that
    /// cannot continue the list (end of input or `)`).
    fn parse_selector_list(&mut self) -> Result<SelectorList, ParseError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace()?;
            selectors.push(self.parse_complex()?);
            if self.peek_kind() != Some(TokenKind::Comma) {
                break;
            }
            self.advance()?;
        }
        Ok(SelectorList::new(selectors))
    }

    /// Parse compounds joined by combinators. Consumes trailing whitespace.
    fn parse_complex(&mut self) -> Result<ComplexSelector, ParseError> {
        let first = self.parse_compound()?;
        let mut rest = Vec::new();

        loop {
            let spaced = self.skip_whitespace()?;
            let combinator = match self.peek_kind() {
                Some(TokenKind::Gt) => Combinator::Child,
                Some(TokenKind::Plus) => Combinator::NextSibling,
                Some(TokenKind::Tilde) => Combinator::SubsequentSibling,
                Some(kind) if spaced && kind.starts_compound() => Combinator::Descendant,
                _ => break,
            };
            if combinator != Combinator::Descendant {
                self.advance()?;
                self.skip_whitespace()?;
            }
            rest.push((combinator, self.parse_compound()?));
        }

        Ok(ComplexSelector { first, rest })
    }

    /// Parse adjacent simple selectors, e.g. `p.text#intro[lang]:first-child`.
    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut compound = CompoundSelector::default();

        while let Some(tok) = self.current {
            let simple = match tok.kind {
                TokenKind::Ident | TokenKind::Asterisk if !compound.is_empty() => {
                    return Err(ParseError::UnexpectedToken {
                        position: tok.start,
                        message: format!(
                            "type selector '{}' must come first in a compound",
                            tok.value
                        ),
                    });
                }
                TokenKind::Ident => {
                    self.advance()?;
                    SimpleSelector::Type(tok.value.to_owned())
                }
                TokenKind::Asterisk => {
                    self.advance()?;
                    SimpleSelector::Universal
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let class = self.expect_ident("expected class name after '.'")?;
                    SimpleSelector::Class(class.to_owned())
                }
                TokenKind::Hash => {
                    self.advance()?;
                    SimpleSelector::Id(self.expect_ident("expected id after '#'")?.to_owned())
                }
                TokenKind::LBracket => SimpleSelector::Attribute(self.parse_attribute()?),
                TokenKind::Colon => self.parse_pseudo()?,
                _ => break,
            };
            compound.push(simple);
        }

        if compound.is_empty() {
            return Err(self.unexpected("expected selector"));
        }
        Ok(compound)
    }

    /// Parse `[ name (op value flag?)? ]`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, ParseError> {
        let open = self.expect(TokenKind::LBracket, "expected '['")?;
        self.skip_whitespace()?;
        let name = self.expect_ident("expected attribute name")?.to_ascii_lowercase();
        self.skip_whitespace()?;

        let Some(tok) = self.current else {
            return Err(ParseError::UnexpectedEof("expected ']'".into()));
        };
        let make: fn(String) -> AttributeMatcher = match tok.kind {
            TokenKind::RBracket => {
                self.advance()?;
                return Ok(AttributeSelector::new(name, AttributeMatcher::Presence));
            }
            TokenKind::Equals => AttributeMatcher::Exact,
            TokenKind::PrefixMatch => AttributeMatcher::Prefix,
            TokenKind::SuffixMatch => AttributeMatcher::Suffix,
            TokenKind::SubstringMatch => AttributeMatcher::Substring,
            TokenKind::IncludesMatch => AttributeMatcher::Includes,
            TokenKind::DashMatch => AttributeMatcher::DashMatch,
            _ => {
                return Err(ParseError::InvalidSelector(format!(
                    "malformed attribute selector at byte {}",
                    open.start
                )));
            }
        };
        self.advance()?;
        self.skip_whitespace()?;

        let value = match self.current {
            Some(tok) if tok.kind == TokenKind::Ident => tok.value.to_owned(),
            Some(tok) if tok.kind == TokenKind::String => unquote(tok.value),
            Some(_) => {
                return Err(ParseError::InvalidSelector(format!(
                    "malformed attribute value at byte {}",
                    open.start
                )));
            }
            None => return Err(ParseError::UnexpectedEof("expected attribute value".into())),
        };
        self.advance()?;
        self.skip_whitespace()?;

        let mut selector = AttributeSelector::new(name, make(value));
        if let Some(flag) = self.current.filter(|t| t.kind == TokenKind::Ident) {
            selector.case_sensitive = match flag.value {
                f if f.eq_ignore_ascii_case("i") => false,
                f if f.eq_ignore_ascii_case("s") => true,
                other => {
                    return Err(ParseError::InvalidSelector(format!(
                        "unknown attribute flag '{other}'"
                    )));
                }
            };
            self.advance()?;
            self.skip_whitespace()?;
        }

        self.expect(TokenKind::RBracket, "expected ']'")?;
        Ok(selector)
    }

    /// Parse `:name`, `:name(...)` or `::name`.
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, ParseError> {
        self.expect(TokenKind::Colon, "expected ':'")?;

        if self.peek_kind() == Some(TokenKind::Colon) {
            self.advance()?;
            let name = self.expect_ident("expected pseudo-element name")?.to_ascii_lowercase();
            if !PSEUDO_ELEMENTS.contains(&name.as_str()) {
                return Err(ParseError::InvalidSelector(format!(
                    "unknown pseudo-element '::{name}'"
                )));
            }
            return Ok(SimpleSelector::PseudoElement(name));
        }

        let name = self.expect_ident("expected pseudo-class name")?.to_ascii_lowercase();

        if self.peek_kind() == Some(TokenKind::LParen) {
            self.advance()?;
            return self.parse_functional_pseudo(&name).map(SimpleSelector::PseudoClass);
        }

        let kind = match name.as_str() {
            "first-child" => PseudoClassKind::FirstChild,
            "last-child" => PseudoClassKind::LastChild,
            "only-child" => PseudoClassKind::OnlyChild,
            "first-of-type" => PseudoClassKind::FirstOfType,
            "last-of-type" => PseudoClassKind::LastOfType,
            "only-of-type" => PseudoClassKind::OnlyOfType,
            "empty" => PseudoClassKind::Empty,
            "root" => PseudoClassKind::Root,
            "scope" => PseudoClassKind::Scope,
            legacy if LEGACY_PSEUDO_ELEMENTS.contains(&legacy) => {
                return Ok(SimpleSelector::PseudoElement(name));
            }
            "not" | "is" | "where" | "has" | "nth-child" | "nth-last-child" | "nth-of-type"
            | "nth-last-of-type" => {
                return Err(ParseError::InvalidSelector(format!(
                    "':{name}' requires an argument"
                )));
            }
            other => match StatePseudoClass::from_name(other) {
                Some(state) => PseudoClassKind::State(state),
                None => {
                    return Err(ParseError::InvalidSelector(format!(
                        "unknown pseudo-class ':{name}'"
                    )));
                }
            },
        };
        Ok(SimpleSelector::PseudoClass(kind))
    }

    /// Dispatch a functional pseudo-class by name. The `(` is already consumed.
    fn parse_functional_pseudo(&mut self, name: &str) -> Result<PseudoClassKind, ParseError> {
        match name {
            "not" => Ok(PseudoClassKind::Not(self.parse_nested_list()?)),
            "is" => Ok(PseudoClassKind::Is(self.parse_nested_list()?)),
            "where" => Ok(PseudoClassKind::Where(self.parse_nested_list()?)),
            "has" => Ok(PseudoClassKind::Has(self.parse_nested_list()?)),
            "nth-child" => self.parse_nth_argument().map(PseudoClassKind::NthChild),
            "nth-last-child" => self.parse_nth_argument().map(PseudoClassKind::NthLastChild),
            "nth-of-type" => self.parse_nth_argument().map(PseudoClassKind::NthOfType),
            "nth-last-of-type" => self.parse_nth_argument().map(PseudoClassKind::NthLastOfType),
            _ => Err(ParseError::InvalidSelector(format!(
                "unknown functional pseudo-class ':{name}()'"
            ))),
        }
    }

    /// Parse the selector list argument of a logical pseudo-class and its `)`.
    fn parse_nested_list(&mut self) -> Result<Box<SelectorList>, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let list = self.parse_selector_list();
        self.depth -= 1;
        let list = list?;
        self.expect(TokenKind::RParen, "expected ')'")?;
        Ok(Box::new(list))
    }

    /// Take the raw source text up to the matching `)` and parse it as `An+B`.
    fn parse_nth_argument(&mut self) -> Result<NthPattern, ParseError> {
        let start = match self.current {
            Some(tok) => tok.start,
            None => return Err(ParseError::UnexpectedEof("expected nth pattern".into())),
        };
        let mut depth = 0usize;
        let end = loop {
            match self.current {
                None => return Err(ParseError::UnexpectedEof("expected ')'".into())),
                Some(tok) if tok.kind == TokenKind::RParen && depth == 0 => break tok.start,
                Some(tok) => {
                    match tok.kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => depth -= 1,
                        _ => {}
                    }
                    self.advance()?;
                }
            }
        };
        self.advance()?;

        let raw = &self.source[start..end];
        NthPattern::parse(raw)
            .ok_or_else(|| ParseError::InvalidSelector(format!("invalid nth pattern '{raw}'")))
    }
}

/// Strip the quotes from a string token and resolve backslash escapes.
///
/// `\` followed by up to six hex digits (and one optional space) is a code
/// point; `\` before a newline is a line continuation; any other escaped
/// character stands for itself.
fn unquote(token: &str) -> String {
    let inner = &token[1..token.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            match chars.next() {
                Some('\n') | None => {}
                Some(escaped) => out.push(escaped),
            }
            continue;
        }
        if chars.peek() == Some(&' ') {
            chars.next();
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
        out.push(char::from_u32(code).filter(|c| *c != '\0').unwrap_or('\u{FFFD}'));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Helpers ──────────────────────────────────────────────────────

    fn parse(input: &str) -> SelectorList {
        parse_selector_list(input).unwrap_or_else(|e| panic!("parse of {input:?} failed: {e}"))
    }

    /// The simple selectors of the only compound in a one-compound selector.
    fn only_compound(input: &str) -> Vec<SimpleSelector> {
        let list = parse(input);
        assert_eq!(list.len(), 1);
        let complex = &list.selectors[0];
        assert!(complex.rest.is_empty(), "expected no combinators in {input:?}");
        complex.first.simples.clone()
    }

    fn only_pseudo(input: &str) -> PseudoClassKind {
        match only_compound(input).as_slice() {
            [SimpleSelector::PseudoClass(kind)] => kind.clone(),
            other => panic!("expected one pseudo-class, got {other:?}"),
        }
    }

    fn type_sel(name: &str) -> SimpleSelector {
        SimpleSelector::Type(name.into())
    }

    // ── Lists and combinators ────────────────────────────────────────

    #[test]
    fn test_list_of_types() {
        let list = parse("div, span, p");
        assert_eq!(list.len(), 3);
        for (complex, name) in list.iter().zip(["div", "span", "p"]) {
            assert_eq!(complex.combinator_count(), 0);
            assert_eq!(complex.first.simples, vec![type_sel(name)]);
        }
    }

    #[test]
    fn test_child_combinator() {
        let list = parse("div > p.text");
        let complex = &list.selectors[0];
        assert_eq!(complex.first.simples, vec![type_sel("div")]);
        assert_eq!(
            complex.rest,
            vec![(
                Combinator::Child,
                CompoundSelector::new(vec![type_sel("p"), SimpleSelector::Class("text".into())])
            )]
        );
    }

    #[test]
    fn test_all_combinators() {
        let list = parse("a b>c+d ~ e");
        let combinators: Vec<_> = list.selectors[0].rest.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_insignificant() {
        assert_eq!(parse("  div   >   p  "), parse("div>p"));
        assert_eq!(parse(" a ,b "), parse("a,b"));
    }

    #[test]
    fn test_compound_parts() {
        assert_eq!(
            only_compound("*.a#b[c]"),
            vec![
                SimpleSelector::Universal,
                SimpleSelector::Class("a".into()),
                SimpleSelector::Id("b".into()),
                SimpleSelector::Attribute(AttributeSelector::new("c", AttributeMatcher::Presence)),
            ]
        );
    }

    // ── Attributes ───────────────────────────────────────────────────

    #[test]
    fn test_attribute_operators() {
        let cases = [
            ("[a=x]", AttributeMatcher::Exact("x".into())),
            ("[a^='x']", AttributeMatcher::Prefix("x".into())),
            ("[a$=\"x\"]", AttributeMatcher::Suffix("x".into())),
            ("[a*=x]", AttributeMatcher::Substring("x".into())),
            ("[a~=x]", AttributeMatcher::Includes("x".into())),
            ("[a|=x]", AttributeMatcher::DashMatch("x".into())),
        ];
        for (input, matcher) in cases {
            assert_eq!(
                only_compound(input),
                vec![SimpleSelector::Attribute(AttributeSelector::new("a", matcher))],
                "{input}"
            );
        }
    }

    #[test]
    fn test_attribute_whitespace_and_flag() {
        let simples = only_compound("[ HREF ^= 'http' i ]");
        let SimpleSelector::Attribute(attr) = &simples[0] else {
            panic!("expected attribute selector");
        };
        assert_eq!(attr.name, "href");
        assert_eq!(attr.matcher, AttributeMatcher::Prefix("http".into()));
        assert!(!attr.case_sensitive);
    }

    #[test]
    fn test_attribute_string_escapes() {
        let simples = only_compound(r#"[title="a\"b\26 c"]"#);
        let SimpleSelector::Attribute(attr) = &simples[0] else {
            panic!("expected attribute selector");
        };
        assert_eq!(attr.matcher, AttributeMatcher::Exact("a\"b&c".into()));
    }

    #[test]
    fn test_malformed_attributes() {
        assert!(matches!(parse_selector_list("[a=]"), Err(ParseError::InvalidSelector(_))));
        assert!(matches!(parse_selector_list("[a b]"), Err(ParseError::InvalidSelector(_))));
        assert!(matches!(parse_selector_list("[a=b x]"), Err(ParseError::InvalidSelector(_))));
        assert!(matches!(parse_selector_list("[a=b"), Err(ParseError::UnexpectedEof(_))));
    }

    // ── Pseudo-classes ───────────────────────────────────────────────

    #[test]
    fn test_structural_pseudo_classes() {
        assert_eq!(only_pseudo(":first-child"), PseudoClassKind::FirstChild);
        assert_eq!(only_pseudo(":LAST-OF-TYPE"), PseudoClassKind::LastOfType);
        assert_eq!(only_pseudo(":empty"), PseudoClassKind::Empty);
        assert_eq!(only_pseudo(":root"), PseudoClassKind::Root);
    }

    #[test]
    fn test_nth_pseudo_classes() {
        assert_eq!(only_pseudo(":nth-child(2)"), PseudoClassKind::NthChild(NthPattern::new(0, 2)));
        assert_eq!(only_pseudo(":nth-child(odd)"), PseudoClassKind::NthChild(NthPattern::ODD));
        assert_eq!(
            only_pseudo(":nth-last-child( -n + 3 )"),
            PseudoClassKind::NthLastChild(NthPattern::new(-1, 3))
        );
        assert_eq!(
            only_pseudo(":nth-of-type(2n-1)"),
            PseudoClassKind::NthOfType(NthPattern::new(2, -1))
        );
        assert_eq!(
            only_pseudo(":nth-last-of-type(even)"),
            PseudoClassKind::NthLastOfType(NthPattern::EVEN)
        );
    }

    #[test]
    fn test_malformed_nth() {
        for input in [":nth-child(2x)", ":nth-child()", ":nth-child(2n+1 of .a)"] {
            assert!(
                matches!(parse_selector_list(input), Err(ParseError::InvalidSelector(_))),
                "{input}"
            );
        }
        assert!(matches!(parse_selector_list(":nth-child(2"), Err(ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn test_state_pseudo_classes_are_recognized() {
        assert_eq!(only_pseudo(":hover"), PseudoClassKind::State(StatePseudoClass::Hover));
        assert_eq!(only_pseudo(":checked"), PseudoClassKind::State(StatePseudoClass::Checked));
    }

    #[test]
    fn test_logical_pseudo_classes_nest() {
        let PseudoClassKind::Not(inner) = only_pseudo(":not(.a, :is(p > span))") else {
            panic!("expected :not");
        };
        assert_eq!(inner.len(), 2);
        let [SimpleSelector::PseudoClass(PseudoClassKind::Is(nested))] =
            inner.selectors[1].first.simples.as_slice()
        else {
            panic!("expected nested :is");
        };
        assert_eq!(nested.selectors[0].rest[0].0, Combinator::Child);
    }

    #[test]
    fn test_has_and_where() {
        assert!(matches!(only_pseudo(":has(.x)"), PseudoClassKind::Has(_)));
        assert!(matches!(
            only_pseudo(":where(a, b)"),
            PseudoClassKind::Where(list) if list.len() == 2
        ));
    }

    #[test]
    fn test_unknown_pseudo_class() {
        assert!(matches!(parse_selector_list(":bogus"), Err(ParseError::InvalidSelector(_))));
        assert!(matches!(parse_selector_list(":bogus(1)"), Err(ParseError::InvalidSelector(_))));
        assert!(matches!(parse_selector_list(":not"), Err(ParseError::InvalidSelector(_))));
    }

    #[test]
    fn test_pseudo_elements() {
        assert_eq!(
            only_compound("p::before"),
            vec![type_sel("p"), SimpleSelector::PseudoElement("before".into())]
        );
        assert_eq!(
            only_compound("p:after"),
            vec![type_sel("p"), SimpleSelector::PseudoElement("after".into())]
        );
        assert!(matches!(parse_selector_list("p::bogus"), Err(ParseError::InvalidSelector(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}a{}", ":is(".repeat(5), ")".repeat(5));
        assert!(parse_selector_list_with_limit(&deep, 5).is_ok());
        assert_eq!(
            parse_selector_list_with_limit(&deep, 4),
            Err(ParseError::NestingTooDeep { limit: 4 })
        );
    }

    // ── Errors ───────────────────────────────────────────────────────

    #[test]
    fn test_empty_and_dangling_input() {
        assert!(matches!(parse_selector_list(""), Err(ParseError::UnexpectedEof(_))));
        assert!(matches!(parse_selector_list("   "), Err(ParseError::UnexpectedEof(_))));
        assert!(matches!(parse_selector_list("div >"), Err(ParseError::UnexpectedEof(_))));
        assert!(matches!(parse_selector_list("div,"), Err(ParseError::UnexpectedEof(_))));
        assert!(matches!(parse_selector_list(".a:not(.b"), Err(ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn test_unexpected_tokens() {
        assert_eq!(
            parse_selector_list("> p"),
            Err(ParseError::UnexpectedToken {
                position: 0,
                message: "expected selector, got '>'".into(),
            })
        );
        assert!(matches!(
            parse_selector_list(".a div"),
            Ok(list) if list.selectors[0].rest.len() == 1
        ));
        assert!(matches!(
            parse_selector_list(".a*"),
            Err(ParseError::UnexpectedToken { position: 2, .. })
        ));
        assert!(matches!(parse_selector_list("#1"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parse_selector_list("a )"), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_lex_error_surfaces_as_unexpected_token() {
        assert_eq!(
            parse_selector_list("div!"),
            Err(ParseError::UnexpectedToken {
                position: 3,
                message: "unrecognized input '!'".into(),
            })
        );
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn test_display_is_canonical() {
        let list = parse("div.card>p:nth-child( odd ) , a[href^='http' i]:not(.x,#y)");
        insta::assert_snapshot!(
            list.to_string(),
            @r#"div.card > p:nth-child(2n+1), a[href^="http" i]:not(.x, #y)"#
        );
    }

    #[test]
    fn test_display_reparses_to_same_ast() {
        for input in [
            "ul li:first-child + li ~ li",
            "[data-x=\"a b\"]::after",
            "li:has(.x) > a:not([href])",
            "section :where(h1, h2):nth-last-of-type(-n+2)",
        ] {
            let list = parse(input);
            assert_eq!(parse(&list.to_string()), list, "{input}");
        }
    }
}
