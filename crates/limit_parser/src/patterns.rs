//! `match` arm patterns.
//!
//! Patterns share the expression node type. Each pattern form gets its own
//! CST node whether or not detailed expression nodes are enabled.

use crate::parser::{PResult, Parser};
use crate::utilities::{is_builtin_error_type, is_type_pattern_start};
use limit_ast::{
    BindingPattern, DictPattern, DictPatternField, ErrPattern, ErrorTypePattern, Expression,
    ExpressionKind, ListPattern,
};
use limit_cst::NodeKind;
use limit_diagnostics::messages;
use limit_scanner::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_pattern(&mut self) -> PResult<&'a Expression<'a>> {
        self.enter(|p| p.pattern())
    }

    fn pattern(&mut self) -> PResult<&'a Expression<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let (kind, node_kind) = self.pattern_kind()?;
        self.wrap(mark, node_kind);
        Ok(self.alloc_expr(self.data_from(start), kind))
    }

    fn pattern_kind(&mut self) -> PResult<(ExpressionKind<'a>, NodeKind)> {
        let kind = self.peek_kind();

        match kind {
            TokenKind::ValKeyword => {
                self.advance();
                let name = self.consume_identifier("Expected variable name after 'val'.")?;
                return Ok((ExpressionKind::ValPattern(name), NodeKind::ValPattern));
            }
            TokenKind::ErrKeyword => {
                self.advance();
                let name = self.consume_identifier("Expected identifier after 'err'.")?;
                let error_type = is_builtin_error_type(name).then_some(name);
                let pattern = ErrPattern {
                    variable: Some(name),
                    error_type,
                };
                return Ok((ExpressionKind::ErrPattern(pattern), NodeKind::ErrPattern));
            }
            TokenKind::DefaultKeyword => {
                self.advance();
                return Ok((ExpressionKind::Wildcard, NodeKind::WildcardPattern));
            }
            TokenKind::OpenBracketToken => {
                return Ok((self.list_pattern()?, NodeKind::ListPattern));
            }
            TokenKind::OpenBraceToken => {
                return Ok((self.dict_pattern()?, NodeKind::DictPattern));
            }
            TokenKind::OpenParenToken => {
                self.advance();
                let elements = self.pattern_list(TokenKind::CloseParenToken)?;
                self.consume(TokenKind::CloseParenToken, "Expected ')' at end of tuple pattern.")?;
                return Ok((ExpressionKind::TuplePattern(elements), NodeKind::TuplePattern));
            }
            _ => {}
        }

        if kind == TokenKind::Identifier && is_builtin_error_type(&self.peek().text) {
            return Ok((self.error_type_pattern()?, NodeKind::ErrorTypePattern));
        }

        if kind == TokenKind::Identifier && self.peek_nth_kind(1) == TokenKind::OpenParenToken {
            let type_name = self.take_text();
            self.advance();
            let variable = self.consume_identifier("Expected variable name in binding pattern.")?;
            self.consume(
                TokenKind::CloseParenToken,
                "Expected ')' after variable name in binding pattern.",
            )?;
            let pattern = BindingPattern { type_name, variable };
            return Ok((ExpressionKind::BindingPattern(pattern), NodeKind::BindingPattern));
        }

        if is_type_pattern_start(kind, &self.peek().text) {
            let ty = self.basic_type()?;
            return Ok((ExpressionKind::TypePattern(self.alloc(ty)), NodeKind::TypePattern));
        }

        if matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::NumberLiteral
                | TokenKind::StringLiteral
                | TokenKind::InterpolationStart
                | TokenKind::TrueKeyword
                | TokenKind::FalseKeyword
                | TokenKind::NilKeyword
        ) {
            let literal = self.primary()?;
            // The caller re-allocates with the pattern's own span.
            return Ok((self.copy_kind(literal), NodeKind::LiteralPattern));
        }

        self.mark_missing("pattern");
        Err(self.error_with(&messages::EXPECTED_PATTERN, &[]))
    }

    /// `NetworkError` or `NetworkError(code, message)`.
    fn error_type_pattern(&mut self) -> PResult<ExpressionKind<'a>> {
        let error_type = self.take_text();
        let mut params = Vec::new();
        if self.eat(TokenKind::OpenParenToken) {
            if !self.check(TokenKind::CloseParenToken) {
                loop {
                    params.push(self.consume_identifier("Expected parameter name.")?);
                    if !self.eat(TokenKind::CommaToken) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::CloseParenToken, "Expected ')' after error type parameters.")?;
        }
        Ok(ExpressionKind::ErrorTypePattern(ErrorTypePattern {
            error_type,
            params: self.alloc_vec(params),
        }))
    }

    /// `[a, b, ...rest]`
    fn list_pattern(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        let mut elements = Vec::new();
        let mut rest = None;
        if !self.check(TokenKind::CloseBracketToken) {
            loop {
                if self.eat(TokenKind::DotDotDotToken) {
                    rest = Some(self.consume_identifier("Expected identifier for rest element.")?);
                    break;
                }
                elements.push(self.parse_pattern()?);
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.consume(TokenKind::CloseBracketToken, "Expected ']' at end of list pattern.")?;
        Ok(ExpressionKind::ListPattern(ListPattern {
            elements: self.alloc_vec(elements),
            rest,
        }))
    }

    /// `{key, key: binding, ...rest}`
    fn dict_pattern(&mut self) -> PResult<ExpressionKind<'a>> {
        self.advance();
        let mut fields = Vec::new();
        let mut has_rest = false;
        let mut rest = None;
        if !self.check(TokenKind::CloseBraceToken) {
            loop {
                if self.eat(TokenKind::DotDotDotToken) {
                    has_rest = true;
                    if self.check(TokenKind::Identifier) {
                        rest = Some(self.take_text());
                    }
                    break;
                }
                let key = self.consume_identifier("Expected field name in dict pattern.")?;
                let binding = if self.eat(TokenKind::ColonToken) {
                    Some(self.consume_identifier("Expected binding name after ':' in dict pattern.")?)
                } else {
                    None
                };
                fields.push(DictPatternField { key, binding });
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.consume(TokenKind::CloseBraceToken, "Expected '}' at end of dict pattern.")?;
        Ok(ExpressionKind::DictPattern(DictPattern {
            fields: self.alloc_vec(fields),
            has_rest,
            rest,
        }))
    }

    fn pattern_list(&mut self, close: TokenKind) -> PResult<&'a [&'a Expression<'a>]> {
        let mut elements = Vec::new();
        if !self.check(close) {
            loop {
                elements.push(self.parse_pattern()?);
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        Ok(self.alloc_vec(elements))
    }

    /// Rebuild the kind of a literal or variable expression so it can be
    /// re-wrapped as a pattern.
    fn copy_kind(&self, expr: &'a Expression<'a>) -> ExpressionKind<'a> {
        match &expr.kind {
            ExpressionKind::Literal(literal) => ExpressionKind::Literal(*literal),
            ExpressionKind::Variable(name) => ExpressionKind::Variable(name),
            _ => ExpressionKind::Grouping(expr),
        }
    }
}
