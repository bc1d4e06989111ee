//! limit_core: Shared foundations for the Limit language front end.
//!
//! Source positions, line lookup for diagnostics, and string interning.

pub mod intern;
pub mod text;

pub use intern::{InternedString, StringInterner};
pub use text::{LineAndColumn, LineMap, TextPos, TextRange, TextSpan};
