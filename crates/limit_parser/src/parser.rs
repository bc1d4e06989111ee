//! Parser state, token cursor and error recovery.
//!
//! The grammar rules live in `types`, `patterns`, `expressions`,
//! `statements` and `declarations`; each adds methods to [`Parser`]. This
//! module owns everything they share: the cursor over the token array, the
//! diagnostics policy, checkpoints for bounded lookahead, the CST builder and
//! the recovery loop at the top of the program.

use crate::block_context::BlockContextTracker;
use crate::options::ParserOptions;
use crate::utilities::is_statement_boundary;
use bumpalo::Bump;
use limit_ast::{Expression, ExpressionKind, NodeData, Program, Statement};
use limit_core::text::{LineMap, TextSpan};
use limit_cst::{CstBuilder, CstMark, Node, NodeKind};
use limit_diagnostics::{
    messages, Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage,
};
use limit_scanner::{Token, TokenKind};

/// Maximum nesting of statements, expressions, types and patterns.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 200;

/// Why a grammar rule stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseFailure {
    /// The input did not match; the diagnostic has been recorded. Caught at
    /// declaration and expression granularity.
    #[error("{0}")]
    Syntax(String),
    /// The error ceiling was reached. Unwinds to `parse`.
    #[error("too many errors")]
    Abort,
}

pub(crate) type PResult<T> = Result<T, ParseFailure>;

/// Move a Vec into the arena as a slice.
pub(crate) fn alloc_vec<T>(arena: &Bump, items: Vec<T>) -> &[T] {
    if items.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(items)
}

/// A saved parser position for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    current: usize,
    cst: Option<CstMark>,
    diagnostics: usize,
    error_count: usize,
    blocks: usize,
}

/// Everything a parse run produces.
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub program: Program<'a>,
    /// Present when the parser ran in CST mode.
    pub cst: Option<Node>,
    pub diagnostics: DiagnosticCollection,
    /// The error ceiling was reached and the parse stopped early.
    pub aborted: bool,
}

impl ParseResult<'_> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Scan and parse `source` in one call. Scanner diagnostics come first.
pub fn parse_source<'a>(
    arena: &'a Bump,
    file_name: &str,
    source: &'a str,
    options: ParserOptions,
) -> ParseResult<'a> {
    let (tokens, scan_diagnostics) = limit_scanner::Scanner::new(source)
        .with_file_name(file_name)
        .scan_tokens();
    let mut result = Parser::new(arena, file_name, source, tokens, options).parse();
    let mut diagnostics = scan_diagnostics;
    diagnostics.extend(result.diagnostics);
    result.diagnostics = diagnostics;
    result
}

/// Recursive descent parser over a scanned token array.
pub struct Parser<'a> {
    pub(crate) arena: &'a Bump,
    tokens: Vec<Token>,
    current: usize,
    file_name: String,
    source: &'a str,
    line_map: LineMap,
    pub(crate) options: ParserOptions,
    diagnostics: DiagnosticCollection,
    error_count: usize,
    pub(crate) blocks: BlockContextTracker,
    cst: Option<CstBuilder>,
    /// Set while parsing the body of `parallel` or `concurrent`, where
    /// `task` and `worker` are statements.
    pub(crate) in_concurrent_block: bool,
    recursion_depth: u32,
}

impl<'a> Parser<'a> {
    /// `tokens` should end with an end-of-file token; one is appended if not.
    pub fn new(
        arena: &'a Bump,
        file_name: &str,
        source: &'a str,
        mut tokens: Vec<Token>,
        options: ParserOptions,
    ) -> Self {
        let line_map = LineMap::new(source);
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = source.len() as u32;
            tokens.push(Token::new(TokenKind::EndOfFileToken, "", line_map.line_of(end), end));
        }
        Self {
            arena,
            tokens,
            current: 0,
            file_name: file_name.to_string(),
            source,
            line_map,
            options,
            diagnostics: DiagnosticCollection::new(),
            error_count: 0,
            blocks: BlockContextTracker::new(),
            cst: options.cst_mode.then(CstBuilder::new),
            in_concurrent_block: false,
            recursion_depth: 0,
        }
    }

    pub fn parse(mut self) -> ParseResult<'a> {
        let mut statements = Vec::new();
        let aborted = self.parse_program(&mut statements).is_err();
        let program = Program {
            data: NodeData::new(1, 0, self.source.len() as u32),
            statements: alloc_vec(self.arena, statements),
        };

        let cst = match self.cst.take() {
            Some(mut builder) if aborted => {
                while builder.depth() > 1 {
                    builder.abandon_node("Parsing stopped");
                }
                builder.start_error("Parsing stopped after too many errors", self.peek().pos);
                for token in &self.tokens[self.current..] {
                    builder.token(token);
                }
                builder.finish_node();
                Some(builder.finish(Some("Too many errors; parsing stopped.")))
            }
            Some(mut builder) => {
                builder.token(self.peek());
                Some(builder.finish(None))
            }
            None => None,
        };

        ParseResult {
            program,
            cst,
            diagnostics: self.diagnostics,
            aborted,
        }
    }

    fn parse_program(&mut self, statements: &mut Vec<Statement<'a>>) -> PResult<()> {
        while !self.is_at_end() {
            if self.check(TokenKind::CloseBraceToken) {
                self.report_with(&messages::UNEXPECTED_CLOSING_BRACE, &[])?;
                self.skip_token("Unexpected closing brace");
                continue;
            }
            let start = self.current;
            if let Some(stmt) = self.declaration()? {
                statements.push(stmt);
            }
            if self.current == start {
                self.synchronize();
            }
        }
        Ok(())
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    #[inline]
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline]
    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.tokens[self.current].kind
    }

    /// Kind of the token `n` positions ahead; end of file past the array.
    pub(crate) fn peek_nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.current + n)
            .map_or(TokenKind::EndOfFileToken, |t| t.kind)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::EndOfFileToken
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Whether the current token is the identifier `text`.
    pub(crate) fn check_identifier(&self, text: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.text == text
    }

    /// Consume the current token, attaching it to the CST. A no-op at end
    /// of file.
    pub(crate) fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        if let Some(cst) = self.cst.as_mut() {
            cst.token(&self.tokens[self.current]);
        }
        self.current += 1;
    }

    /// Consume the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.expected(kind, message))
        }
    }

    /// Consume a token of `kind` and return its text.
    pub(crate) fn consume_text(&mut self, kind: TokenKind, message: &str) -> PResult<&'a str> {
        if self.check(kind) {
            Ok(self.take_text())
        } else {
            Err(self.expected(kind, message))
        }
    }

    pub(crate) fn consume_identifier(&mut self, message: &str) -> PResult<&'a str> {
        self.consume_text(TokenKind::Identifier, message)
    }

    /// Report a missing token. In CST mode a zero-width `Missing` node marks
    /// where it should have been.
    fn expected(&mut self, kind: TokenKind, message: &str) -> ParseFailure {
        if self.cst.is_some() {
            let expected = match kind {
                TokenKind::Identifier => "identifier".to_string(),
                _ => kind
                    .punctuation_text()
                    .or_else(|| kind.keyword_text())
                    .map_or_else(|| kind.to_string(), str::to_string),
            };
            self.mark_missing(&expected);
        }
        self.error(message)
    }

    /// Add a zero-width `Missing` node where `expected` should have been.
    pub(crate) fn mark_missing(&mut self, expected: &str) {
        let pos = if self.current == 0 {
            self.tokens[0].pos
        } else {
            self.tokens[self.current - 1].end
        };
        if let Some(cst) = self.cst.as_mut() {
            cst.missing(expected, pos);
        }
    }

    /// Text of the current token, copied into the arena.
    pub(crate) fn current_text(&self) -> &'a str {
        self.arena.alloc_str(&self.tokens[self.current].text)
    }

    /// Consume the current token and return its text.
    pub(crate) fn take_text(&mut self) -> &'a str {
        let text = self.current_text();
        self.advance();
        text
    }

    pub(crate) fn alloc_str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    // ========================================================================
    // Node data and allocation
    // ========================================================================

    /// Index of the current token, used as a node start.
    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.current
    }

    /// Position data from the token at `start` through the last consumed one.
    pub(crate) fn data_from(&self, start: usize) -> NodeData {
        let first = &self.tokens[start];
        let end = if self.current > start {
            self.tokens[self.current - 1].end
        } else {
            first.pos
        };
        NodeData::new(first.line, first.pos, end.max(first.pos))
    }

    pub(crate) fn alloc_expr(&self, data: NodeData, kind: ExpressionKind<'a>) -> &'a Expression<'a> {
        self.arena.alloc(Expression::new(data, kind))
    }

    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    pub(crate) fn alloc_vec<T>(&self, items: Vec<T>) -> &'a [T] {
        alloc_vec(self.arena, items)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Record a diagnostic at the token `index`. Errors count toward the
    /// ceiling; reaching it adds a final note and aborts the parse.
    fn record(&mut self, index: usize, message: &DiagnosticMessage, args: &[&str]) -> PResult<String> {
        let token = &self.tokens[index];
        let span = TextSpan::from_bounds(token.pos, token.end);
        let mut diagnostic = Diagnostic::with_location(
            &self.file_name,
            self.source,
            &self.line_map,
            span,
            message,
            args,
        );
        if let Some(note) = self.blocks.caused_by(&diagnostic.message_text) {
            diagnostic = diagnostic.with_note(&note);
        }
        let text = diagnostic.message_text.clone();
        self.diagnostics.add(diagnostic);

        if message.category == DiagnosticCategory::Error {
            self.error_count += 1;
            if self.error_count >= self.options.max_errors {
                let count = self.error_count.to_string();
                self.diagnostics.add(Diagnostic::with_location(
                    &self.file_name,
                    self.source,
                    &self.line_map,
                    span,
                    &messages::TOO_MANY_ERRORS,
                    &[&count],
                ));
                return Err(ParseFailure::Abort);
            }
        }
        Ok(text)
    }

    /// Report `message` at the current token and return the failure to
    /// propagate.
    pub(crate) fn error(&mut self, message: &str) -> ParseFailure {
        self.error_with(&messages::SYNTAX_ERROR, &[message])
    }

    pub(crate) fn error_with(&mut self, message: &DiagnosticMessage, args: &[&str]) -> ParseFailure {
        match self.record(self.current, message, args) {
            Ok(text) => ParseFailure::Syntax(text),
            Err(abort) => abort,
        }
    }

    /// Report without failing the current rule.
    pub(crate) fn report(&mut self, message: &str) -> PResult<()> {
        self.report_with(&messages::SYNTAX_ERROR, &[message])
    }

    pub(crate) fn report_with(&mut self, message: &DiagnosticMessage, args: &[&str]) -> PResult<()> {
        self.record(self.current, message, args).map(drop)
    }

    pub(crate) fn report_at(
        &mut self,
        index: usize,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> PResult<()> {
        self.record(index, message, args).map(drop)
    }

    // ========================================================================
    // Recursion guard and checkpoints
    // ========================================================================

    pub(crate) fn enter<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            return Err(self.error_with(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]));
        }
        self.recursion_depth += 1;
        let result = f(self);
        self.recursion_depth -= 1;
        result
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            cst: self.cst_mark(),
            diagnostics: self.diagnostics.len(),
            error_count: self.error_count,
            blocks: self.blocks.depth(),
        }
    }

    /// Return to `checkpoint`, dropping tokens attached to the CST and
    /// diagnostics recorded since.
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.current = checkpoint.current;
        if let (Some(cst), Some(mark)) = (self.cst.as_mut(), checkpoint.cst) {
            cst.truncate(mark);
        }
        self.diagnostics.truncate(checkpoint.diagnostics);
        self.error_count = checkpoint.error_count;
        self.blocks.truncate(checkpoint.blocks);
    }

    /// Run `f` with a block context pushed for the token at `index`; the
    /// context is popped whatever `f` returns.
    pub(crate) fn with_block<T>(
        &mut self,
        kind: &'static str,
        index: usize,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.blocks.push(kind, &self.tokens[index]);
        let result = f(self);
        self.blocks.pop();
        result
    }

    // ========================================================================
    // CST construction
    // ========================================================================

    pub(crate) fn cst_mark(&self) -> Option<CstMark> {
        self.cst.as_ref().map(CstBuilder::mark)
    }

    fn close_node<T>(&mut self, result: &PResult<T>) {
        if let Some(cst) = self.cst.as_mut() {
            match result {
                Ok(_) => cst.finish_node(),
                Err(ParseFailure::Syntax(message)) => cst.abandon_node(message.clone()),
                Err(ParseFailure::Abort) => cst.abandon_node("Parsing stopped"),
            }
        }
    }

    /// Run `f` inside a CST node of `kind`. The node is closed on every exit
    /// path: normally on success, as `Incomplete` on failure.
    pub(crate) fn node<T>(
        &mut self,
        kind: NodeKind,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        if self.cst.is_none() {
            return f(self);
        }
        let pos = self.peek().pos;
        if let Some(cst) = self.cst.as_mut() {
            cst.start_node(kind, pos);
        }
        let result = f(self);
        self.close_node(&result);
        result
    }

    /// Like [`Parser::node`], but the node also adopts what was attached
    /// since `mark` (annotations and modifiers read before the keyword).
    pub(crate) fn node_from<T>(
        &mut self,
        mark: Option<CstMark>,
        kind: NodeKind,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        if self.cst.is_none() {
            return f(self);
        }
        let pos = self.peek().pos;
        if let Some(cst) = self.cst.as_mut() {
            match mark {
                Some(mark) => cst.start_node_at(mark, kind, pos),
                None => cst.start_node(kind, pos),
            }
        }
        let result = f(self);
        self.close_node(&result);
        result
    }

    /// Wrap what was attached since `mark` in a closed node of `kind`.
    pub(crate) fn wrap(&mut self, mark: Option<CstMark>, kind: NodeKind) {
        if let (Some(cst), Some(mark)) = (self.cst.as_mut(), mark) {
            cst.wrap_from(mark, kind);
        }
    }

    /// [`Parser::wrap`] for expression productions, which only get their own
    /// nodes with `detailed_expression_nodes`.
    pub(crate) fn wrap_expression(&mut self, mark: Option<CstMark>, kind: NodeKind) {
        if self.options.detailed_expression_nodes {
            self.wrap(mark, kind);
        }
    }

    pub(crate) fn describe(&mut self, description: impl FnOnce() -> String) {
        if let Some(cst) = self.cst.as_mut() {
            cst.describe(description());
        }
    }

    /// Open an `Error` node for skipped tokens. Returns the mark needed to
    /// drop it again if nothing ends up skipped.
    fn start_skipping(&mut self, message: &str) -> Option<CstMark> {
        let pos = self.peek().pos;
        let cst = self.cst.as_mut()?;
        let mark = cst.mark();
        cst.start_error(message, pos);
        Some(mark)
    }

    fn finish_skipping(&mut self, mark: Option<CstMark>, skipped: bool) {
        if let (Some(cst), Some(mark)) = (self.cst.as_mut(), mark) {
            if skipped {
                cst.finish_node();
            } else {
                cst.truncate(mark);
            }
        }
    }

    /// Consume a single token into an `Error` node.
    pub(crate) fn skip_token(&mut self, message: &str) {
        let mark = self.start_skipping(message);
        let start = self.current;
        self.advance();
        self.finish_skipping(mark, self.current > start);
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Skip past the offending token, then up to the next statement
    /// boundary: just after a `;`, or before a token that starts a
    /// declaration or statement.
    pub(crate) fn synchronize(&mut self) {
        let mark = self.start_skipping("Skipped tokens");
        let start = self.current;
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::SemicolonToken && self.current > start {
                break;
            }
            if is_statement_boundary(self.peek_kind()) {
                break;
            }
            self.advance();
        }
        self.finish_skipping(mark, self.current > start);
    }

    /// Skip the rest of a malformed expression: up to `;`, `}`, `)`, `,` or
    /// the end of the line.
    pub(crate) fn skip_expression(&mut self, message: &str) {
        let mark = self.start_skipping(message);
        let start = self.current;
        while !self.is_at_end() {
            let token = self.peek();
            if matches!(
                token.kind,
                TokenKind::SemicolonToken
                    | TokenKind::CloseBraceToken
                    | TokenKind::CloseParenToken
                    | TokenKind::CommaToken
            ) {
                break;
            }
            if self.current > start && token.has_preceding_line_break() {
                break;
            }
            self.advance();
        }
        self.finish_skipping(mark, self.current > start);
    }

    /// Parse one declaration or statement. A syntax failure is reported,
    /// the input is synchronized and `None` is returned; only an abort
    /// escapes.
    pub(crate) fn declaration(&mut self) -> PResult<Option<Statement<'a>>> {
        match self.enter(|p| p.parse_declaration()) {
            Ok(stmt) => Ok(Some(stmt)),
            Err(ParseFailure::Syntax(_)) => {
                self.synchronize();
                Ok(None)
            }
            Err(ParseFailure::Abort) => Err(ParseFailure::Abort),
        }
    }
}
