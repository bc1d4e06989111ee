//! limit_ast: Abstract syntax tree for the Limit language.
//!
//! Nodes are allocated in a `bumpalo` arena owned by the caller and refer to
//! their children through `&'a` references and arena slices. Every node
//! records the source line it starts on and its byte range.

pub mod node;
pub mod types;
pub mod visitor;

pub use node::*;
pub use types::*;
pub use visitor::AstVisitor;
