//! Open-block tracking for diagnostics.
//!
//! The parser records every brace-delimited construct it enters. When a
//! closing brace turns out to be missing, the innermost record tells the
//! user where the unterminated construct started.

use limit_scanner::Token;

/// A construct whose body is still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    /// `"function"`, `"class"`, `"if"`, `"for"`, ...
    pub kind: &'static str,
    pub line: u32,
    pub pos: u32,
    /// Text of the token that opened the construct.
    pub lexeme: String,
}

impl BlockContext {
    pub fn new(kind: &'static str, token: &Token) -> Self {
        Self {
            kind,
            line: token.line,
            pos: token.pos,
            lexeme: token.text.clone(),
        }
    }

    /// The note appended to an unclosed-brace diagnostic.
    pub fn caused_by(&self) -> String {
        let what = match self.kind {
            "function" | "class" => self.kind,
            _ => "block",
        };
        format!(
            "Caused by: Unterminated {} starting at line {}:\n{} | {} - unclosed {} starts here",
            self.kind, self.line, self.line, self.lexeme, what
        )
    }
}

#[derive(Debug, Default)]
pub struct BlockContextTracker {
    stack: Vec<BlockContext>,
}

impl BlockContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: &'static str, token: &Token) {
        self.stack.push(BlockContext::new(kind, token));
    }

    pub fn pop(&mut self) -> Option<BlockContext> {
        self.stack.pop()
    }

    pub fn current(&self) -> Option<&BlockContext> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drop contexts pushed after the tracker had `depth` entries.
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }

    /// The "Caused by" note for `message`, if it is about a missing or stray
    /// closing brace and some block is open.
    pub fn caused_by(&self, message: &str) -> Option<String> {
        if !(message.contains("Expected '}'") || message.contains("Unexpected closing brace")) {
            return None;
        }
        self.current().map(BlockContext::caused_by)
    }
}
