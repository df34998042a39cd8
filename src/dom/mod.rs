//! DOM arena: slotmap-backed document tree with selector queries.

pub mod index;
pub mod node;
pub mod query;
pub mod tree;

pub use index::DomIndex;
pub use node::{NodeData, NodeId};
pub use tree::{Dom, DomError};
