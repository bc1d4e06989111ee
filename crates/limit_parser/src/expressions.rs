//! Expression grammar.
//!
//! ```text
//! expression := assignment
//! assignment := binary (('=' | '+=' | '-=' | '*=' | '/=' | '%=') assignment)?
//! binary     := unary (binop unary)*          precedence climbing, `..` is a range
//! unary      := ('!' | '-' | '+') unary | power
//! power      := postfix ('**' unary)?
//! postfix    := primary ( call | '.' name | '.' NUMBER | '[' expression ']'
//!                       | '?' ('else' name? statement)? )*
//! ```
//!
//! `-x ** 2` is `-(x ** 2)`: the power operator binds tighter than the
//! prefix operators, and its right operand may itself be prefixed.

use crate::parser::{PResult, ParseFailure, Parser};
use crate::precedence::{
    assign_operator, binary_operator, get_binary_operator_precedence, unary_operator,
    OperatorPrecedence,
};
use crate::utilities::{classify_number, interpolation_segment, unquote_string, NumberLiteral};
use limit_ast::{
    AssignExpression, BinaryExpression, BinaryOperator, Block, CallExpression, DictEntry,
    ErrorConstruct, Expression, ExpressionKind, FallibleExpression, IndexExpression,
    InterpolationPart, LambdaExpression, Literal, MemberExpression, NamedArgument, ObjectLiteral,
    ObjectProperty, Parameter, RangeExpression, UnaryExpression,
};
use limit_cst::NodeKind;
use limit_diagnostics::messages;
use limit_scanner::TokenKind;

impl<'a> Parser<'a> {
    /// Parse an expression. A malformed expression is reported, the rest of
    /// it is skipped and an `Error` placeholder is returned, so callers can
    /// carry on with the surrounding construct.
    pub(crate) fn expression(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        match self.enter(|p| p.assignment()) {
            Ok(expr) => Ok(expr),
            Err(ParseFailure::Syntax(message)) => {
                self.skip_expression(&message);
                Ok(self.alloc_expr(self.data_from(start), ExpressionKind::Error))
            }
            Err(ParseFailure::Abort) => Err(ParseFailure::Abort),
        }
    }

    fn assignment(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let target = self.binary(OperatorPrecedence::Lowest)?;

        let Some(operator) = assign_operator(self.peek_kind()) else {
            return Ok(target);
        };
        let operator_index = self.start();
        self.advance();
        let value = self.enter(|p| p.assignment())?;
        if !target.is_assignment_target() {
            self.report_at(operator_index, &messages::INVALID_ASSIGNMENT_TARGET, &[])?;
        }

        self.wrap_expression(mark, NodeKind::AssignmentExpr);
        let kind = ExpressionKind::Assign(AssignExpression {
            target,
            operator,
            value,
        });
        Ok(self.alloc_expr(self.data_from(start), kind))
    }

    /// Precedence climbing over the left-associative infix operators.
    fn binary(&mut self, min_precedence: OperatorPrecedence) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let mut left = self.unary()?;

        loop {
            let operator_kind = self.peek_kind();
            let precedence = get_binary_operator_precedence(operator_kind);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            self.advance();
            let right = self.binary(precedence)?;

            let (kind, node_kind) = match binary_operator(operator_kind) {
                Some(operator) => (
                    ExpressionKind::Binary(BinaryExpression {
                        left,
                        operator,
                        right,
                    }),
                    NodeKind::BinaryExpr,
                ),
                None => (
                    ExpressionKind::Range(RangeExpression {
                        start: left,
                        end: right,
                        inclusive: true,
                    }),
                    NodeKind::RangeExpr,
                ),
            };
            self.wrap_expression(mark, node_kind);
            left = self.alloc_expr(self.data_from(start), kind);
        }

        Ok(left)
    }

    fn unary(&mut self) -> PResult<&'a Expression<'a>> {
        let Some(operator) = unary_operator(self.peek_kind()) else {
            return self.power();
        };
        let start = self.start();
        let mark = self.cst_mark();
        self.advance();
        let operand = self.enter(|p| p.unary())?;
        self.wrap_expression(mark, NodeKind::UnaryExpr);
        let kind = ExpressionKind::Unary(UnaryExpression { operator, operand });
        Ok(self.alloc_expr(self.data_from(start), kind))
    }

    /// `base ** exponent`, right associative through `unary`.
    fn power(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let base = self.postfix()?;
        if !self.eat(TokenKind::AsteriskAsteriskToken) {
            return Ok(base);
        }
        let exponent = self.enter(|p| p.unary())?;
        self.wrap_expression(mark, NodeKind::BinaryExpr);
        let kind = ExpressionKind::Binary(BinaryExpression {
            left: base,
            operator: BinaryOperator::Power,
            right: exponent,
        });
        Ok(self.alloc_expr(self.data_from(start), kind))
    }

    // ========================================================================
    // Postfix chain
    // ========================================================================

    fn postfix(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let mut expr = self.primary()?;

        loop {
            let (kind, node_kind) = match self.peek_kind() {
                TokenKind::OpenParenToken => (self.call(expr)?, NodeKind::CallExpr),
                TokenKind::DotToken => self.member(expr)?,
                TokenKind::OpenBracketToken => {
                    self.advance();
                    let index = self.expression()?;
                    self.consume(TokenKind::CloseBracketToken, "Expected ']' after index.")?;
                    let kind = ExpressionKind::Index(IndexExpression {
                        object: expr,
                        index,
                    });
                    (kind, NodeKind::IndexExpr)
                }
                TokenKind::QuestionToken => (self.fallible(expr)?, NodeKind::FallibleExpr),
                _ => break,
            };
            self.wrap_expression(mark, node_kind);
            expr = self.alloc_expr(self.data_from(start), kind);
        }

        Ok(expr)
    }

    /// `( [name =] expr, ... )`, trailing comma allowed.
    fn call(&mut self, callee: &'a Expression<'a>) -> PResult<ExpressionKind<'a>> {
        let mark = self.cst_mark();
        self.advance();
        let mut arguments = Vec::new();
        let mut named_arguments = Vec::new();

        while !self.check(TokenKind::CloseParenToken) && !self.is_at_end() {
            if self.check(TokenKind::Identifier) && self.peek_nth_kind(1) == TokenKind::EqualsToken {
                let name = self.take_text();
                self.advance();
                let value = self.expression()?;
                named_arguments.push(NamedArgument { name, value });
            } else {
                arguments.push(self.expression()?);
            }
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.consume(TokenKind::CloseParenToken, "Expected ')' after arguments.")?;
        self.wrap_expression(mark, NodeKind::ArgumentList);

        Ok(ExpressionKind::Call(CallExpression {
            callee,
            arguments: self.alloc_vec(arguments),
            named_arguments: self.alloc_vec(named_arguments),
        }))
    }

    /// `.name`, or `.0` indexing into a tuple.
    fn member(&mut self, object: &'a Expression<'a>) -> PResult<(ExpressionKind<'a>, NodeKind)> {
        self.advance();

        if self.check(TokenKind::NumberLiteral) {
            let index_start = self.start();
            let text = self.take_text();
            let text = match classify_number(text) {
                NumberLiteral::Integer(text) => text,
                _ => {
                    self.report_at(index_start, &messages::INVALID_TUPLE_INDEX, &[])?;
                    "0"
                }
            };
            let index = self.alloc_expr(
                self.data_from(index_start),
                ExpressionKind::Literal(Literal::Integer(text)),
            );
            let kind = ExpressionKind::Index(IndexExpression { object, index });
            return Ok((kind, NodeKind::IndexExpr));
        }

        if !self.peek_kind().is_word() {
            self.mark_missing("property name");
            return Err(self.error("Expected property name after '.'."));
        }
        let name = self.take_text();
        Ok((
            ExpressionKind::Member(MemberExpression { object, name }),
            NodeKind::MemberExpr,
        ))
    }

    /// `expr?` with an optional `else [name] handler`. The error binding is
    /// only taken when the name is directly followed by `{`.
    fn fallible(&mut self, expression: &'a Expression<'a>) -> PResult<ExpressionKind<'a>> {
        self.advance();
        let mut else_variable = None;
        let mut else_handler = None;
        if self.eat(TokenKind::ElseKeyword) {
            if self.check(TokenKind::Identifier) && self.peek_nth_kind(1) == TokenKind::OpenBraceToken {
                else_variable = Some(self.take_text());
            }
            else_handler = Some(self.nested_statement()?);
        }
        Ok(ExpressionKind::Fallible(FallibleExpression {
            expression,
            else_variable,
            else_handler,
        }))
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    pub(crate) fn primary(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();

        let (kind, node_kind) = match self.peek_kind() {
            TokenKind::TrueKeyword | TokenKind::FalseKeyword => {
                let value = self.check(TokenKind::TrueKeyword);
                self.advance();
                (ExpressionKind::Literal(Literal::Bool(value)), NodeKind::LiteralExpr)
            }
            TokenKind::NilKeyword => {
                self.advance();
                (ExpressionKind::Literal(Literal::Nil), NodeKind::LiteralExpr)
            }
            TokenKind::NumberLiteral => (self.number_literal()?, NodeKind::LiteralExpr),
            TokenKind::StringLiteral => {
                let text = unquote_string(&self.peek().text).into_owned();
                self.advance();
                let text = self.alloc_str(&text);
                (ExpressionKind::Literal(Literal::String(text)), NodeKind::LiteralExpr)
            }
            TokenKind::InterpolationStart => (self.interpolated_string()?, NodeKind::InterpolationExpr),
            TokenKind::ThisKeyword | TokenKind::SelfKeyword => {
                self.advance();
                (ExpressionKind::This, NodeKind::ThisExpr)
            }
            TokenKind::SuperKeyword => {
                self.advance();
                (ExpressionKind::Super, NodeKind::SuperExpr)
            }
            TokenKind::Identifier => self.identifier_or_object()?,
            TokenKind::ErrKeyword => (self.error_construct()?, NodeKind::ErrorConstructExpr),
            TokenKind::OkKeyword => {
                self.advance();
                self.consume(TokenKind::OpenParenToken, "Expected '(' after 'ok'.")?;
                let value = self.expression()?;
                self.consume(TokenKind::CloseParenToken, "Expected ')' after ok value.")?;
                (ExpressionKind::OkConstruct(value), NodeKind::OkConstructExpr)
            }
            TokenKind::FnKeyword => (self.lambda()?, NodeKind::LambdaExpr),
            TokenKind::OpenParenToken => self.group_or_tuple()?,
            TokenKind::OpenBracketToken => (self.list_literal()?, NodeKind::ListExpr),
            TokenKind::OpenBraceToken => (self.dict_literal()?, NodeKind::DictExpr),
            _ => {
                self.mark_missing("expression");
                return Err(self.error_with(&messages::EXPECTED_EXPRESSION, &[]));
            }
        };

        self.wrap_expression(mark, node_kind);
        Ok(self.alloc_expr(self.data_from(start), kind))
    }

    /// Malformed numbers are reported and read as zero.
    fn number_literal(&mut self) -> PResult<ExpressionKind<'a>> {
        let index = self.start();
        let text = self.take_text();
        let literal = match classify_number(text) {
            NumberLiteral::Integer(text) => Literal::Integer(text),
            NumberLiteral::Float(text) => Literal::Float(text),
            NumberLiteral::InvalidInteger => {
                self.report_at(index, &messages::INVALID_INTEGER_FORMAT, &[text])?;
                Literal::Integer("0")
            }
            NumberLiteral::InvalidFloat => {
                self.report_at(index, &messages::INVALID_FLOAT_FORMAT, &[text])?;
                Literal::Float("0.0")
            }
        };
        Ok(ExpressionKind::Literal(literal))
    }

    /// `"text {expr} more {expr} end"` scanned as alternating segments.
    fn interpolated_string(&mut self) -> PResult<ExpressionKind<'a>> {
        let mut parts = Vec::new();
        self.push_segment(&mut parts, true);

        loop {
            parts.push(InterpolationPart::Expression(self.expression()?));
            self.consume(TokenKind::InterpolationEnd, "Expected '}' after interpolation expression.")?;
            match self.peek_kind() {
                TokenKind::InterpolationStart => self.push_segment(&mut parts, false),
                TokenKind::StringLiteral => {
                    self.push_segment(&mut parts, false);
                    break;
                }
                _ => return Err(self.error_with(&messages::EXPECTED_STRING_AFTER_INTERPOLATION, &[])),
            }
        }

        Ok(ExpressionKind::InterpolatedString(self.alloc_vec(parts)))
    }

    /// Consume a string segment, keeping its text if there is any.
    fn push_segment(&mut self, parts: &mut Vec<InterpolationPart<'a>>, first: bool) {
        let text = interpolation_segment(&self.peek().text, first).into_owned();
        self.advance();
        if !text.is_empty() {
            parts.push(InterpolationPart::Text(self.alloc_str(&text)));
        }
    }

    /// A name, or `Name { key: value, ... }` when a brace follows directly.
    fn identifier_or_object(&mut self) -> PResult<(ExpressionKind<'a>, NodeKind)> {
        let name = self.take_text();
        if !self.check(TokenKind::OpenBraceToken) {
            return Ok((ExpressionKind::Variable(name), NodeKind::VariableExpr));
        }

        self.advance();
        let mut properties = Vec::new();
        while !self.check(TokenKind::CloseBraceToken) && !self.is_at_end() {
            let property = self.consume_identifier("Expected property name in object literal.")?;
            self.consume(TokenKind::ColonToken, "Expected ':' after property name.")?;
            let value = self.expression()?;
            properties.push(ObjectProperty {
                name: property,
                value,
            });
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.consume(TokenKind::CloseBraceToken, "Expected '}' after object literal properties.")?;

        let kind = ExpressionKind::ObjectLiteral(ObjectLiteral {
            constructor: name,
            properties: self.alloc_vec(properties),
        });
        Ok((kind, NodeKind::ObjectLiteralExpr))
    }

    /// `err(Type)` or `err(Type(args))`.
    fn error_construct(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        self.consume(TokenKind::OpenParenToken, "Expected '(' after 'err'.")?;
        let error_type = self.consume_identifier("Expected error type name.")?;
        let mut arguments = Vec::new();
        if self.eat(TokenKind::OpenParenToken) {
            arguments = self.expression_list(TokenKind::CloseParenToken)?;
            self.consume(
                TokenKind::CloseParenToken,
                "Expected ')' after error constructor arguments.",
            )?;
        }
        self.consume(TokenKind::CloseParenToken, "Expected ')' after error construction.")?;
        Ok(ExpressionKind::ErrorConstruct(ErrorConstruct {
            error_type,
            arguments: self.alloc_vec(arguments),
        }))
    }

    /// `fn (a: T, b) [: R] { body }`
    fn lambda(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        self.consume(TokenKind::OpenParenToken, "Expected '(' after 'fn'.")?;
        let params = self.node(NodeKind::ParameterList, |p| {
            let mut params = Vec::new();
            while !p.check(TokenKind::CloseParenToken) && !p.is_at_end() {
                params.push(p.node(NodeKind::Parameter, |p| {
                    let start = p.start();
                    let name = p.consume_identifier("Expected parameter name.")?;
                    let type_annotation = if p.eat(TokenKind::ColonToken) {
                        Some(p.parse_type()?)
                    } else {
                        None
                    };
                    Ok(Parameter {
                        data: p.data_from(start),
                        name,
                        type_annotation,
                        default_value: None,
                    })
                })?);
                if !p.eat(TokenKind::CommaToken) {
                    break;
                }
            }
            Ok(params)
        })?;
        self.consume(TokenKind::CloseParenToken, "Expected ')' after lambda parameters.")?;

        let return_type = if self.eat(TokenKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.lambda_body()?;
        Ok(ExpressionKind::Lambda(LambdaExpression {
            params: self.alloc_vec(params),
            return_type,
            body,
        }))
    }

    fn lambda_body(&mut self) -> PResult<&'a Block<'a>> {
        let index = self.start();
        self.with_block("function", index, |p| {
            p.block(
                "Expected '{' before lambda body.",
                "Expected '}' after lambda body.",
            )
        })
    }

    /// `()` and `(a, b)` are tuples; `(a)` is a grouping.
    fn group_or_tuple(&mut self) -> PResult<(ExpressionKind<'a>, NodeKind)> {
        self.advance();
        if self.eat(TokenKind::CloseParenToken) {
            return Ok((ExpressionKind::Tuple(&[]), NodeKind::TupleExpr));
        }

        let first = self.expression()?;
        if !self.eat(TokenKind::CommaToken) {
            self.consume(TokenKind::CloseParenToken, "Expected ')' after expression.")?;
            return Ok((ExpressionKind::Grouping(first), NodeKind::GroupingExpr));
        }

        let mut elements = vec![first];
        while !self.check(TokenKind::CloseParenToken) && !self.is_at_end() {
            elements.push(self.expression()?);
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.consume(TokenKind::CloseParenToken, "Expected ')' after tuple elements.")?;
        Ok((ExpressionKind::Tuple(self.alloc_vec(elements)), NodeKind::TupleExpr))
    }

    fn list_literal(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        let elements = self.expression_list(TokenKind::CloseBracketToken)?;
        self.consume(TokenKind::CloseBracketToken, "Expected ']' after list elements.")?;
        Ok(ExpressionKind::List(self.alloc_vec(elements)))
    }

    fn dict_literal(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        let mut entries = Vec::new();
        while !self.check(TokenKind::CloseBraceToken) && !self.is_at_end() {
            let key = self.expression()?;
            self.consume(TokenKind::ColonToken, "Expected ':' after dictionary key.")?;
            let value = self.expression()?;
            entries.push(DictEntry { key, value });
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.consume(TokenKind::CloseBraceToken, "Expected '}' after dictionary entries.")?;
        Ok(ExpressionKind::Dict(self.alloc_vec(entries)))
    }

    /// Comma separated expressions up to (not including) `close`. A trailing
    /// comma is allowed.
    pub(crate) fn expression_list(&mut self, close: TokenKind) -> PResult<Vec<&'a Expression<'a>>> {
        let mut items = Vec::new();
        while !self.check(close) && !self.is_at_end() {
            items.push(self.expression()?);
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        Ok(items)
    }
}
