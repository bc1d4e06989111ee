//! Tokens produced by the scanner.

use crate::token_kind::TokenKind;
use limit_core::text::{TextRange, TextSpan};

/// A scanned token. `text` is the exact source slice, so escapes and quotes
/// are still present in string tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first byte.
    pub line: u32,
    pub pos: u32,
    pub end: u32,
    /// Trivia between the previous token's trailing trivia and this token.
    pub leading_trivia: Vec<Token>,
    /// Same-line trivia after this token, up to but excluding a newline.
    pub trailing_trivia: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, pos: u32) -> Self {
        let text = text.into();
        let end = pos + text.len() as u32;
        Self {
            kind,
            text,
            line,
            pos,
            end,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    pub fn with_leading_trivia(mut self, trivia: Vec<Token>) -> Self {
        self.leading_trivia = trivia;
        self
    }

    pub fn with_trailing_trivia(mut self, trivia: Vec<Token>) -> Self {
        self.trailing_trivia = trivia;
        self
    }

    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.pos, self.end)
    }

    /// The range including leading and trailing trivia.
    pub fn full_range(&self) -> TextRange {
        let pos = self.leading_trivia.first().map_or(self.pos, |t| t.pos);
        let end = self.trailing_trivia.last().map_or(self.end, |t| t.end);
        TextRange::new(pos, end)
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFileToken
    }

    /// Whether a line break separates this token from the previous one.
    pub fn has_preceding_line_break(&self) -> bool {
        self.leading_trivia.iter().any(|t| {
            t.kind == TokenKind::NewLineTrivia
                || (t.kind == TokenKind::MultiLineCommentTrivia && t.text.contains('\n'))
        })
    }

    /// Leading trivia, text and trailing trivia, exactly as in the source.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.write_full_text(&mut out);
        out
    }

    pub fn write_full_text(&self, out: &mut String) {
        for t in &self.leading_trivia {
            out.push_str(&t.text);
        }
        out.push_str(&self.text);
        for t in &self.trailing_trivia {
            out.push_str(&t.text);
        }
    }
}
