//! limit_cst: Lossless concrete syntax tree.
//!
//! A CST node owns an ordered list of elements, each a child node or a raw
//! token. Trivia is kept as `Whitespace`/`Comment` nodes between the
//! significant tokens, so the text of a node's elements is exactly the
//! source it covers. Recovery leaves `Error`, `Missing` and `Incomplete`
//! nodes in place of malformed input instead of dropping it.

mod builder;
mod kind;
mod node;
pub mod trivia;

pub use builder::{CstBuilder, CstMark};
pub use kind::NodeKind;
pub use node::{reconstruct_source, Element, Node, NodeDetail};
pub use trivia::{CompactToken, TriviaHandle, TriviaInterner, TriviaPiece, TriviaStats};
