//! logos-based selector tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `~=` as [`TokenKind::IncludesMatch`] beats `~`)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Unlike a stylesheet lexer, whitespace is not skipped: the parser needs it
//! to tell a descendant combinator (`div p`) apart from spacing around an
//! explicit combinator (`div > p`). Comments are skipped.

use logos::Logos;

/// Kind of a selector token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    // ── Multi-character tokens ───────────────────────────────────────

    /// Identifier following CSS ident rules (no escapes).
    #[regex(r"(--|-)?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\-\x{80}-\x{10FFFF}]*")]
    Ident,

    /// Quoted string, single or double, with backslash escapes.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    /// Signed or unsigned number, only meaningful inside nth arguments.
    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Run of CSS whitespace.
    #[regex(r"[ \t\n\r\f]+")]
    Whitespace,

    /// `^=`
    #[token("^=")]
    PrefixMatch,

    /// `$=`
    #[token("$=")]
    SuffixMatch,

    /// `*=`
    #[token("*=")]
    SubstringMatch,

    /// `~=`
    #[token("~=")]
    IncludesMatch,

    /// `|=`
    #[token("|=")]
    DashMatch,

    // ── Single-character punctuation ─────────────────────────────────

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `:`
    #[token(":")]
    Colon,

    /// `,`
    #[token(",")]
    Comma,

    /// `*`
    #[token("*")]
    Asterisk,

    /// `>`
    #[token(">")]
    Gt,

    /// `+`
    #[token("+")]
    Plus,

    /// `~`
    #[token("~")]
    Tilde,

    /// `=`
    #[token("=")]
    Equals,
}

impl TokenKind {
    /// Returns `true` if a compound selector can start with this token.
    pub fn starts_compound(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Asterisk
                | TokenKind::Dot
                | TokenKind::Hash
                | TokenKind::LBracket
                | TokenKind::Colon
        )
    }
}

/// The characters [`TokenKind::Whitespace`] accepts. Other Unicode spaces
/// are ident characters.
pub fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// A token borrowed from the selector source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub value: &'src str,
    /// Byte offset of the token in the source.
    pub start: usize,
}

impl Token<'_> {
    /// Byte offset just past the end of the token.
    pub fn end(&self) -> usize {
        self.start + self.value.len()
    }
}

/// Input that no token rule accepts, e.g. `!` or an unterminated string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized input '{fragment}' at byte {position}")]
pub struct LexError {
    pub position: usize,
    pub fragment: String,
}

/// Lazy token stream over a selector string.
///
/// Yields `None` once the input is exhausted. [`Tokenizer::reset`] rewinds
/// to the start of the same source.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, TokenKind>,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: TokenKind::lexer(source),
        }
    }

    /// Restart tokenization from the beginning of the source.
    pub fn reset(&mut self) {
        self.lexer = TokenKind::lexer(self.source);
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lexer.next()?;
        let span = self.lexer.span();
        let value = self.lexer.slice();
        Some(match result {
            Ok(kind) => Ok(Token {
                kind,
                value,
                start: span.start,
            }),
            Err(()) => Err(LexError {
                position: span.start,
                fragment: value.to_owned(),
            }),
        })
    }
}

/// Tokenize a selector string into a vector, failing on the first lexical error.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Tokenizer::new(input).collect()
}
