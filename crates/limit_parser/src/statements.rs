//! Statements: control flow, blocks, and the concurrency constructs.

use crate::parser::{PResult, Parser};
use crate::utilities::{unquote_string, TIME_UNITS};
use limit_ast::{
    Block, ComptimeStatement, ConcurrencyStatement, ContractStatement, Expression,
    ExpressionStatement, ForKind, ForStatement, IfStatement, IterStatement, MatchCase,
    MatchStatement, Modifiers, Parameter, PrintStatement, ReturnStatement, Statement,
    TaskStatement, UnsafeStatement, Visibility, WhileStatement, WorkerStatement,
};
use limit_cst::NodeKind;
use limit_diagnostics::messages;
use limit_scanner::TokenKind;

/// Parameter values of a `parallel` or `concurrent` header before defaults
/// are filled in.
#[derive(Default)]
struct ConcurrencyParams<'a> {
    channel: Option<&'a str>,
    mode: Option<&'a str>,
    cores: Option<&'a str>,
    on_error: Option<&'a str>,
    timeout: Option<&'a str>,
    grace: Option<&'a str>,
    on_timeout: Option<&'a str>,
    typed: Vec<Parameter<'a>>,
}

impl<'a> ConcurrencyParams<'a> {
    /// Store a `name = value` parameter. Returns false for unknown names.
    fn set(&mut self, name: &str, value: &'a str) -> bool {
        let slot = match name {
            "ch" | "channel" => &mut self.channel,
            "mode" => &mut self.mode,
            "cores" => &mut self.cores,
            "on_error" => &mut self.on_error,
            "timeout" => &mut self.timeout,
            "grace" => &mut self.grace,
            "on_timeout" => &mut self.on_timeout,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn statement(&mut self) -> PResult<Statement<'a>> {
        match self.peek_kind() {
            TokenKind::PrintKeyword => self.print_statement(),
            TokenKind::IfKeyword => self.if_statement(),
            TokenKind::ForKeyword => self.for_statement(),
            TokenKind::WhileKeyword => self.while_statement(),
            TokenKind::IterKeyword => self.iter_statement(),
            TokenKind::MatchKeyword => self.match_statement(),
            TokenKind::ReturnKeyword => self.return_statement(),
            TokenKind::BreakKeyword => self.node(NodeKind::BreakStatement, |p| {
                let start = p.start();
                p.advance();
                p.eat(TokenKind::SemicolonToken);
                Ok(Statement::Break(p.data_from(start)))
            }),
            TokenKind::ContinueKeyword => self.node(NodeKind::ContinueStatement, |p| {
                let start = p.start();
                p.advance();
                p.eat(TokenKind::SemicolonToken);
                Ok(Statement::Continue(p.data_from(start)))
            }),
            TokenKind::OpenBraceToken => Ok(Statement::Block(self.block_node(
                "Expected '{' before block.",
                "Expected '}' after block.",
            )?)),
            TokenKind::ParallelKeyword => self
                .node(NodeKind::ParallelStatement, |p| p.concurrency_statement(true))
                .map(Statement::Parallel),
            TokenKind::ConcurrentKeyword => self
                .node(NodeKind::ConcurrentStatement, |p| p.concurrency_statement(false))
                .map(Statement::Concurrent),
            TokenKind::UnsafeKeyword => self.unsafe_statement(),
            TokenKind::ContractKeyword => self.contract_statement(),
            TokenKind::ComptimeKeyword => self.comptime_statement(),
            TokenKind::Identifier if self.at_concurrency_unit() => {
                if !self.in_concurrent_block {
                    let keyword = self.current_text();
                    self.report_with(&messages::UNSUPPORTED_STATEMENT_OUTSIDE_CONCURRENT, &[keyword])?;
                }
                if self.check_identifier("task") {
                    self.task_statement()
                } else {
                    self.worker_statement()
                }
            }
            _ => self.expression_statement(),
        }
    }

    /// A statement nested inside another construct, such as a loop body.
    pub(crate) fn nested_statement(&mut self) -> PResult<&'a Statement<'a>> {
        let stmt = self.enter(|p| p.statement())?;
        Ok(self.alloc(stmt))
    }

    /// `{ declaration* }` with the given messages for missing braces.
    pub(crate) fn block(&mut self, open: &str, close: &str) -> PResult<&'a Block<'a>> {
        let block = self.block_node(open, close)?;
        Ok(self.alloc(block))
    }

    fn block_node(&mut self, open: &str, close: &str) -> PResult<Block<'a>> {
        self.node(NodeKind::Block, |p| {
            let start = p.start();
            p.consume(TokenKind::OpenBraceToken, open)?;
            let mut statements = Vec::new();
            while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                let before = p.start();
                if let Some(stmt) = p.declaration()? {
                    statements.push(stmt);
                }
                if p.start() == before {
                    p.skip_token("Unexpected token");
                }
            }
            p.consume(TokenKind::CloseBraceToken, close)?;
            Ok(Block {
                data: p.data_from(start),
                statements: p.alloc_vec(statements),
            })
        })
    }

    /// The body of a loop or branch. A braced body records the keyword at
    /// `keyword` as its block context.
    fn body_statement(&mut self, kind: &'static str, keyword: usize) -> PResult<&'a Statement<'a>> {
        if self.check(TokenKind::OpenBraceToken) {
            self.with_block(kind, keyword, |p| p.nested_statement())
        } else {
            self.nested_statement()
        }
    }

    fn expression_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::ExpressionStatement, |p| {
            let start = p.start();
            let expression = p.expression()?;
            p.eat(TokenKind::SemicolonToken);
            Ok(Statement::Expression(ExpressionStatement {
                data: p.data_from(start),
                expression,
            }))
        })
    }

    fn print_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::PrintStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'print'.")?;
            let arguments = p.expression_list(TokenKind::CloseParenToken)?;
            p.consume(TokenKind::CloseParenToken, "Expected ')' after print arguments.")?;
            p.eat(TokenKind::SemicolonToken);
            Ok(Statement::Print(PrintStatement {
                data: p.data_from(start),
                arguments: p.alloc_vec(arguments),
            }))
        })
    }

    fn return_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::ReturnStatement, |p| {
            let start = p.start();
            p.advance();
            let value = if p.check(TokenKind::SemicolonToken)
                || p.check(TokenKind::CloseBraceToken)
                || p.is_at_end()
            {
                None
            } else {
                Some(p.expression()?)
            };
            p.eat(TokenKind::SemicolonToken);
            Ok(Statement::Return(ReturnStatement {
                data: p.data_from(start),
                value,
            }))
        })
    }

    // ========================================================================
    // Branches and loops
    // ========================================================================

    /// `if (c) s (elif (c) s)* (else s)?`. Each `elif` becomes an `if` in the
    /// else branch of the one before it.
    fn if_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::IfStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'if'.")?;
            let condition = p.expression()?;
            p.consume(TokenKind::CloseParenToken, "Expected ')' after if condition.")?;
            let then_branch = p.body_statement("if", start)?;

            let mut elifs = Vec::new();
            while p.check(TokenKind::ElifKeyword) {
                let elif_start = p.start();
                p.advance();
                p.consume(TokenKind::OpenParenToken, "Expected '(' after 'elif'.")?;
                let condition = p.expression()?;
                p.consume(TokenKind::CloseParenToken, "Expected ')' after elif condition.")?;
                let branch = p.body_statement("elif", elif_start)?;
                elifs.push((elif_start, condition, branch));
            }

            let mut else_branch = if p.check(TokenKind::ElseKeyword) {
                let else_start = p.start();
                p.advance();
                Some(p.body_statement("else", else_start)?)
            } else {
                None
            };

            for (elif_start, condition, branch) in elifs.into_iter().rev() {
                let elif = Statement::If(IfStatement {
                    data: p.data_from(elif_start),
                    condition,
                    then_branch: branch,
                    else_branch,
                });
                else_branch = Some(p.alloc(elif));
            }

            Ok(Statement::If(IfStatement {
                data: p.data_from(start),
                condition,
                then_branch,
                else_branch,
            }))
        })
    }

    fn while_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::WhileStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'while'.")?;
            let condition = p.expression()?;
            p.consume(TokenKind::CloseParenToken, "Expected ')' after while condition.")?;
            let body = p.body_statement("while", start)?;
            Ok(Statement::While(WhileStatement {
                data: p.data_from(start),
                condition,
                body,
            }))
        })
    }

    /// ```text
    /// for ( [var] x in e )          for ( [var] k, v in e )
    /// for ( init? ; cond? ; incr? )
    /// ```
    fn for_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::ForStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'for'.")?;

            let kind = match p.iterable_for_clause()? {
                Some(kind) => kind,
                None => p.traditional_for_clause()?,
            };
            p.consume(TokenKind::CloseParenToken, "Expected ')' after for clauses.")?;
            let body = p.body_statement("for", start)?;
            Ok(Statement::For(ForStatement {
                data: p.data_from(start),
                kind,
                body,
            }))
        })
    }

    /// Try the `x in e` and `k, v in e` forms. Rewinds and returns `None`
    /// when the clause turns out to be a traditional one.
    fn iterable_for_clause(&mut self) -> PResult<Option<ForKind<'a>>> {
        let checkpoint = self.checkpoint();
        self.eat(TokenKind::VarKeyword);
        if !self.check(TokenKind::Identifier) {
            self.rewind(checkpoint);
            return Ok(None);
        }
        let next = self.peek_nth_kind(1);
        if next != TokenKind::InKeyword && next != TokenKind::CommaToken {
            self.rewind(checkpoint);
            return Ok(None);
        }

        let variable = self.take_text();
        let second_variable = if self.eat(TokenKind::CommaToken) {
            let second = self.consume_identifier("Expected second variable name after comma.")?;
            self.consume(TokenKind::InKeyword, "Expected 'in' after loop variables.")?;
            Some(second)
        } else {
            self.advance();
            None
        };
        let iterable = self.expression()?;
        Ok(Some(ForKind::Iterable {
            variable,
            second_variable,
            iterable,
        }))
    }

    fn traditional_for_clause(&mut self) -> PResult<ForKind<'a>> {
        let initializer = if self.eat(TokenKind::SemicolonToken) {
            None
        } else {
            let stmt = if self.check(TokenKind::VarKeyword) {
                self.node(NodeKind::VarDeclaration, |p| {
                    let start = p.start();
                    p.advance();
                    p.var_binding(start, Modifiers::NONE, Visibility::Private)
                        .map(Statement::VarDeclaration)
                })?
            } else {
                self.node(NodeKind::ExpressionStatement, |p| {
                    let start = p.start();
                    let expression = p.expression()?;
                    Ok(Statement::Expression(ExpressionStatement {
                        data: p.data_from(start),
                        expression,
                    }))
                })?
            };
            self.consume(TokenKind::SemicolonToken, "Expected ';' after loop initializer.")?;
            Some(self.alloc(stmt))
        };

        let condition = if self.check(TokenKind::SemicolonToken) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::SemicolonToken, "Expected ';' after loop condition.")?;

        let increment = if self.check(TokenKind::CloseParenToken) {
            None
        } else {
            Some(self.expression()?)
        };

        Ok(ForKind::Traditional {
            initializer,
            condition,
            increment,
        })
    }

    /// `iter ( [var] x [, y] in e ) s`
    fn iter_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::IterStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'iter'.")?;
            p.eat(TokenKind::VarKeyword);
            if !p.check(TokenKind::Identifier) {
                p.mark_missing("identifier");
                return Err(p.error_with(&messages::EXPECTED_ITER_VARIABLE, &[]));
            }
            let variable = p.take_text();
            let second_variable = if p.eat(TokenKind::CommaToken) {
                let second = p.consume_identifier("Expected second variable name after comma.")?;
                p.consume(TokenKind::InKeyword, "Expected 'in' after loop variables.")?;
                Some(second)
            } else if p.eat(TokenKind::InKeyword) {
                None
            } else {
                p.mark_missing("in");
                return Err(p.error_with(&messages::EXPECTED_IN_AFTER_LOOP_VARIABLE, &[]));
            };
            let iterable = p.expression()?;
            p.consume(TokenKind::CloseParenToken, "Expected ')' after iter clauses.")?;
            let body = p.body_statement("iter", start)?;
            Ok(Statement::Iter(IterStatement {
                data: p.data_from(start),
                variable,
                second_variable,
                iterable,
                body,
            }))
        })
    }

    /// `match (e) { pattern [where guard] => statement [,] ... }`
    fn match_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::MatchStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'match'.")?;
            let value = p.expression()?;
            p.consume(TokenKind::CloseParenToken, "Expected ')' after match value.")?;

            let cases = p.with_block("match", start, |p| {
                p.consume(TokenKind::OpenBraceToken, "Expected '{' before match cases.")?;
                let mut cases = Vec::new();
                while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                    cases.push(p.node(NodeKind::MatchCase, |p| p.match_case())?);
                    p.eat(TokenKind::CommaToken);
                }
                p.consume(TokenKind::CloseBraceToken, "Expected '}' after match cases.")?;
                Ok(cases)
            })?;

            Ok(Statement::Match(MatchStatement {
                data: p.data_from(start),
                value,
                cases: p.alloc_vec(cases),
            }))
        })
    }

    fn match_case(&mut self) -> PResult<MatchCase<'a>> {
        let start = self.start();
        let pattern = self.parse_pattern()?;
        let guard = if self.eat(TokenKind::WhereKeyword) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::ArrowToken, "Expected '=>' after match pattern.")?;
        let body = self.nested_statement()?;
        Ok(MatchCase {
            data: self.data_from(start),
            pattern,
            guard,
            body,
        })
    }

    // ========================================================================
    // Concurrency
    // ========================================================================

    /// `parallel(params) { ... }` or `concurrent(params) { ... }`.
    fn concurrency_statement(&mut self, parallel: bool) -> PResult<ConcurrencyStatement<'a>> {
        let start = self.start();
        let keyword = if parallel { "parallel" } else { "concurrent" };
        self.advance();

        let mut params = ConcurrencyParams::default();
        if self.eat(TokenKind::OpenParenToken) {
            while !self.check(TokenKind::CloseParenToken) && !self.is_at_end() {
                self.concurrency_param(&mut params)?;
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
            self.consume(TokenKind::CloseParenToken, "Expected ')' after parameters.")?;
        }

        let open = format!("Expected '{{' after '{}'.", keyword);
        let body = self.with_block(keyword, start, |p| {
            let saved = p.in_concurrent_block;
            p.in_concurrent_block = true;
            let body = p.block(&open, "Expected '}' after block.");
            p.in_concurrent_block = saved;
            body
        })?;

        let default_mode = if parallel { "fork-join" } else { "batch" };
        Ok(ConcurrencyStatement {
            data: self.data_from(start),
            channel: params.channel.unwrap_or(""),
            mode: params.mode.unwrap_or(default_mode),
            cores: params.cores.unwrap_or("auto"),
            on_error: params.on_error.unwrap_or("stop"),
            timeout: params.timeout.unwrap_or("0"),
            grace: params.grace.unwrap_or("0"),
            on_timeout: params.on_timeout.unwrap_or("partial"),
            typed_params: self.alloc_vec(params.typed),
            body,
        })
    }

    /// `name = value` or `name: Type`.
    fn concurrency_param(&mut self, params: &mut ConcurrencyParams<'a>) -> PResult<()> {
        let name_index = self.start();
        if !self.peek_kind().is_word() {
            self.mark_missing("parameter name");
            return Err(self.error("Expected parameter name."));
        }
        let name = self.take_text();

        if self.eat(TokenKind::ColonToken) {
            let ty = self.parse_type()?;
            params.typed.push(Parameter {
                data: self.data_from(name_index),
                name,
                type_annotation: Some(ty),
                default_value: None,
            });
            return Ok(());
        }

        self.consume(TokenKind::EqualsToken, "Expected '=' or ':' after parameter name.")?;
        let value = match self.peek_kind() {
            TokenKind::StringLiteral => {
                let text = unquote_string(&self.peek().text).into_owned();
                self.advance();
                self.alloc_str(&text)
            }
            TokenKind::NumberLiteral => {
                let number = self.take_text();
                let unit = self.peek();
                if unit.kind == TokenKind::Identifier
                    && TIME_UNITS.contains(&unit.text.as_str())
                    && !unit.has_preceding_line_break()
                {
                    let unit = self.take_text();
                    self.alloc_str(&format!("{}{}", number, unit))
                } else {
                    number
                }
            }
            kind if kind.is_word() => self.take_text(),
            _ => {
                self.mark_missing("value");
                return Err(self.error_with(&messages::EXPECTED_PARAMETER_VALUE, &[name]));
            }
        };

        if !params.set(name, value) {
            self.report_at(name_index, &messages::UNKNOWN_PARAMETER, &[name])?;
        }
        Ok(())
    }

    /// Whether the current identifier starts a `task(...) {` or `worker(...) {`
    /// unit. Inside a concurrent block the header is enough; elsewhere the
    /// parenthesized part must be followed by a block.
    fn at_concurrency_unit(&self) -> bool {
        if !(self.check_identifier("task") || self.check_identifier("worker")) {
            return false;
        }
        if self.peek_nth_kind(1) != TokenKind::OpenParenToken {
            return false;
        }
        if self.in_concurrent_block {
            return true;
        }
        let mut depth = 0usize;
        let mut n = 1;
        loop {
            match self.peek_nth_kind(n) {
                TokenKind::OpenParenToken => depth += 1,
                TokenKind::CloseParenToken => {
                    depth -= 1;
                    if depth == 0 {
                        return self.peek_nth_kind(n + 1) == TokenKind::OpenBraceToken;
                    }
                }
                TokenKind::EndOfFileToken => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// `task ( [x in] [e] ) { ... }`
    fn task_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::TaskStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'task'.")?;
            let loop_variable = if p.check(TokenKind::Identifier)
                && p.peek_nth_kind(1) == TokenKind::InKeyword
            {
                let name = p.take_text();
                p.advance();
                Some(name)
            } else {
                None
            };
            let iterable = if p.check(TokenKind::CloseParenToken) {
                None
            } else {
                Some(p.expression()?)
            };
            p.consume(TokenKind::CloseParenToken, "Expected ')' after task arguments.")?;
            let body = p.with_block("task", start, |p| {
                p.block("Expected '{' before task body.", "Expected '}' after task body.")
            })?;
            Ok(Statement::Task(TaskStatement {
                data: p.data_from(start),
                loop_variable,
                iterable,
                body,
            }))
        })
    }

    /// `worker ( [x] ) { ... }`
    fn worker_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::WorkerStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'worker'.")?;
            let param = if p.check(TokenKind::Identifier) {
                Some(p.take_text())
            } else {
                None
            };
            p.consume(TokenKind::CloseParenToken, "Expected ')' after worker parameter.")?;
            let body = p.with_block("worker", start, |p| {
                p.block("Expected '{' before worker body.", "Expected '}' after worker body.")
            })?;
            Ok(Statement::Worker(WorkerStatement {
                data: p.data_from(start),
                param,
                body,
            }))
        })
    }

    // ========================================================================
    // unsafe, contract, comptime
    // ========================================================================

    fn unsafe_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::UnsafeStatement, |p| {
            let start = p.start();
            p.advance();
            let body = p.with_block("unsafe", start, |p| {
                p.block("Expected '{' after 'unsafe'.", "Expected '}' after block.")
            })?;
            Ok(Statement::Unsafe(UnsafeStatement {
                data: p.data_from(start),
                body,
            }))
        })
    }

    /// `contract(condition[, message]);`
    fn contract_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::ContractStatement, |p| {
            let start = p.start();
            p.advance();
            p.consume(TokenKind::OpenParenToken, "Expected '(' after 'contract'.")?;
            let condition = p.expression()?;
            let message: Option<&'a Expression<'a>> = if p.eat(TokenKind::CommaToken) {
                Some(p.expression()?)
            } else {
                None
            };
            p.consume(TokenKind::CloseParenToken, "Expected ')' after contract condition.")?;
            p.eat(TokenKind::SemicolonToken);
            Ok(Statement::Contract(ContractStatement {
                data: p.data_from(start),
                condition,
                message,
            }))
        })
    }

    fn comptime_statement(&mut self) -> PResult<Statement<'a>> {
        self.node(NodeKind::ComptimeStatement, |p| {
            let start = p.start();
            p.advance();
            let declaration = p.enter(|p| p.parse_declaration())?;
            Ok(Statement::Comptime(ComptimeStatement {
                data: p.data_from(start),
                declaration: p.alloc(declaration),
            }))
        })
    }
}
