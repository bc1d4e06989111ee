//! limit_scanner: Tokens and the lexer for Limit source code.
//!
//! The scanner turns source text into a flat token array where every
//! significant token carries the whitespace and comments around it as
//! leading and trailing trivia. Nothing is dropped: concatenating each
//! token's leading trivia, text and trailing trivia gives back the input.

mod scanner;
mod token;
mod token_kind;

pub use scanner::{scan, Scanner};
pub use token::Token;
pub use token_kind::TokenKind;
