//! # dom-selectors
//!
//! A CSS selector engine over an arena-backed DOM.
//!
//! Selector strings are tokenized, parsed into an owned AST and matched
//! right to left against any tree implementing [`SelectorTree`]. The bundled
//! [`Dom`] keeps per-tree id/tag/class indices and a per-element class bloom
//! filter up to date through its mutation methods, and caches parsed
//! selectors so repeated queries skip the parser. Trivial selectors (`#id`,
//! `.class`, `tag`) are answered from the indices.
//!
//! ## Core Systems
//!
//! - **[`selector`]**: Tokenizer, parser, AST, matcher, fast-path classifier, caches
//! - **[`dom`]**: Slotmap-backed document tree, index maps, query surface
//! - **[`config`]**: Cache capacity, nesting limit, fast-path switch
//!
//! ## Example
//!
//! ```
//! use dom_selectors::{Dom, NodeData};
//!
//! let mut dom = Dom::new();
//! let doc = dom.document();
//! let list = dom.insert_child(doc, NodeData::element("ul")).unwrap();
//! let first = dom.insert_child(list, NodeData::element("li").with_class("x")).unwrap();
//! dom.insert_child(list, NodeData::element("li")).unwrap();
//!
//! assert_eq!(dom.query_selector(doc, "ul > li.x").unwrap(), Some(first));
//! assert!(dom.matches(first, "li:first-child").unwrap());
//! assert_eq!(dom.query_selector_all(doc, "li").unwrap().len(), 2);
//! ```

pub mod config;
pub mod dom;
pub mod selector;

pub use config::QueryConfig;
pub use dom::{Dom, DomError, NodeData, NodeId};
pub use selector::{parse_selector_list, ParseError, SelectorList, SelectorTree};
