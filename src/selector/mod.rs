//! Selector engine: tokenizer, parser, matcher and their caches.

pub mod bloom;
pub mod cache;
pub mod fast_path;
pub mod matcher;
pub mod model;
pub mod nth;
pub mod parser;
pub mod tokenizer;
pub mod tree;

pub use bloom::BloomFilter;
pub use cache::{ParsedSelector, SelectorCache};
pub use fast_path::FastPath;
pub use matcher::{matches_in_context, matches_selector_list, MatchContext};
pub use model::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    PseudoClassKind, SelectorList, SimpleSelector, StatePseudoClass,
};
pub use nth::NthPattern;
pub use parser::{parse_selector_list, parse_selector_list_with_limit, ParseError};
pub use tokenizer::{tokenize, LexError, Token, TokenKind, Tokenizer};
pub use tree::{NodeKind, SelectorTree};
