//! limit_parser: Recursive descent parser for the Limit language.
//!
//! Consumes the scanner's token stream and builds an arena-allocated AST.
//! With `cst_mode` enabled it also builds a lossless concrete syntax tree
//! from the same pass. Syntax errors never stop the parse early: the parser
//! reports a diagnostic, skips to the next statement boundary and carries
//! on, until the configured error ceiling is reached.

mod block_context;
mod declarations;
mod expressions;
mod options;
mod parser;
mod patterns;
mod precedence;
mod statements;
mod types;
mod utilities;

pub use block_context::{BlockContext, BlockContextTracker};
pub use options::ParserOptions;
pub use parser::{parse_source, ParseResult, Parser};
