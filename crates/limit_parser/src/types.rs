//! Type annotation grammar.
//!
//! ```text
//! type       := basic ( ('|' basic)+ | ('and' basic)+ | 'where' expression )?
//! basic      := ( '[' type? ']' | '(' (type (',' type)*)? ')' | '{' brace '}'
//!               | primitive | 'list' | 'array' | 'dict' | 'option'
//!               | ('fn' | 'function') '(' params ')' (':' type)?
//!               | STRING | IDENT ) suffix
//! suffix     := ( '?' (IDENT (',' IDENT)*)? )?
//! ```
//!
//! `{` opens a dictionary type when the first entry is a type name followed
//! by `:`, and a structural record otherwise. A `?` followed directly by an
//! identifier starts an error list instead of marking the type optional.

use crate::parser::{PResult, Parser};
use crate::utilities::{is_known_type_name, is_valid_parameter_name, primitive_type, unquote_string};
use limit_ast::{
    FunctionType, FunctionTypeParam, NodeData, PrimitiveType, StructuralField, StructuralType,
    TypeAnnotation, TypeKind, TypeSuffix,
};
use limit_cst::NodeKind;
use limit_diagnostics::messages;
use limit_scanner::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> PResult<&'a TypeAnnotation<'a>> {
        self.enter(|p| p.type_annotation())
    }

    fn type_annotation(&mut self) -> PResult<&'a TypeAnnotation<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let mut first = self.basic_type()?;

        if self.check(TokenKind::BarToken) || self.check(TokenKind::AndKeyword) {
            let separator = self.peek_kind();
            let mut members = vec![&*self.alloc(first)];
            while self.eat(separator) {
                let member = self.basic_type()?;
                members.push(self.alloc(member));
            }
            let (kind, node_kind) = if separator == TokenKind::BarToken {
                (TypeKind::Union(self.alloc_vec(members)), NodeKind::UnionType)
            } else {
                (TypeKind::Intersection(self.alloc_vec(members)), NodeKind::IntersectionType)
            };
            self.wrap(mark, node_kind);
            return Ok(self.alloc(TypeAnnotation {
                data: self.data_from(start),
                kind,
                suffix: TypeSuffix::None,
                refinement: None,
            }));
        }

        if self.eat(TokenKind::WhereKeyword) {
            first.refinement = Some(self.expression()?);
            first.data = self.data_from(start);
        }
        Ok(self.alloc(first))
    }

    /// A single type with its `?` suffix. Used directly where a union or a
    /// `where` clause would be ambiguous, such as `match` type patterns.
    pub(crate) fn basic_type(&mut self) -> PResult<TypeAnnotation<'a>> {
        let start = self.start();
        let mark = self.cst_mark();
        let (kind, node_kind) = self.basic_type_kind()?;
        let suffix = self.type_suffix()?;
        self.wrap(mark, node_kind);
        Ok(TypeAnnotation {
            data: self.data_from(start),
            kind,
            suffix,
            refinement: None,
        })
    }

    fn basic_type_kind(&mut self) -> PResult<(TypeKind<'a>, NodeKind)> {
        let kind = self.peek_kind();
        if let Some(primitive) = primitive_type(kind) {
            self.advance();
            return Ok((TypeKind::Primitive(primitive), NodeKind::PrimitiveType));
        }
        match kind {
            TokenKind::OpenBracketToken => {
                self.advance();
                let element = if self.check(TokenKind::CloseBracketToken) {
                    self.implicit_type(PrimitiveType::Any)
                } else {
                    self.parse_type()?
                };
                self.consume(TokenKind::CloseBracketToken, "Expected ']' after list element type.")?;
                Ok((TypeKind::List(element), NodeKind::ListType))
            }
            TokenKind::OpenParenToken => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::CloseParenToken) {
                    loop {
                        elements.push(self.parse_type()?);
                        if !self.eat(TokenKind::CommaToken) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::CloseParenToken, "Expected ')' after tuple element types.")?;
                Ok((TypeKind::Tuple(self.alloc_vec(elements)), NodeKind::TupleType))
            }
            TokenKind::OpenBraceToken => {
                self.advance();
                if self.at_dictionary_type() {
                    let key = self.parse_type()?;
                    self.consume(TokenKind::ColonToken, "Expected ':' in dictionary type.")?;
                    let value = self.parse_type()?;
                    self.consume(TokenKind::CloseBraceToken, "Expected '}' after dictionary type.")?;
                    Ok((TypeKind::Dict { key, value }, NodeKind::DictType))
                } else {
                    Ok((self.structural_type()?, NodeKind::StructuralType))
                }
            }
            TokenKind::ListKeyword | TokenKind::ArrayKeyword => {
                self.advance();
                Ok((TypeKind::List(self.implicit_type(PrimitiveType::Any)), NodeKind::ListType))
            }
            TokenKind::DictKeyword => {
                self.advance();
                let key = self.implicit_type(PrimitiveType::Any);
                let value = self.implicit_type(PrimitiveType::Any);
                Ok((TypeKind::Dict { key, value }, NodeKind::DictType))
            }
            TokenKind::OptionKeyword => {
                self.advance();
                Ok((TypeKind::Named("option"), NodeKind::UserType))
            }
            TokenKind::FnKeyword => {
                self.advance();
                Ok((self.function_type()?, NodeKind::FunctionType))
            }
            TokenKind::FunctionKeyword => {
                self.advance();
                if self.check(TokenKind::OpenParenToken) {
                    Ok((self.function_type()?, NodeKind::FunctionType))
                } else {
                    Ok((TypeKind::Named("function"), NodeKind::UserType))
                }
            }
            TokenKind::StringLiteral => {
                let text = unquote_string(&self.peek().text).into_owned();
                self.advance();
                Ok((TypeKind::Literal(self.alloc_str(&text)), NodeKind::LiteralType))
            }
            TokenKind::Identifier => Ok((TypeKind::Named(self.take_text()), NodeKind::UserType)),
            _ => {
                self.mark_missing("type");
                Err(self.error_with(&messages::EXPECTED_TYPE, &[]))
            }
        }
    }

    /// After `{`: a dictionary type starts with a primitive or well-known
    /// type name directly followed by `:`.
    fn at_dictionary_type(&self) -> bool {
        let first = self.peek();
        let is_type_name = primitive_type(first.kind).is_some()
            || (first.kind.is_word() && is_known_type_name(&first.text));
        is_type_name && self.peek_nth_kind(1) == TokenKind::ColonToken
    }

    /// The body of `{ name: T, "quoted": T, ...Base }` after the `{`.
    fn structural_type(&mut self) -> PResult<TypeKind<'a>> {
        let mut fields = Vec::new();
        let mut has_rest = false;
        let mut base_records = Vec::new();

        while !self.check(TokenKind::CloseBraceToken) && !self.is_at_end() {
            if self.eat(TokenKind::DotDotDotToken) {
                has_rest = true;
                if self.check(TokenKind::Identifier) {
                    base_records.push(self.take_text());
                }
                if self.eat(TokenKind::CommaToken) {
                    continue;
                }
                if self.check(TokenKind::CloseBraceToken) {
                    break;
                }
                return Err(self.error("Expected ',' or '}' after rest parameter."));
            }

            let name = if self.check(TokenKind::StringLiteral) {
                let text = unquote_string(&self.peek().text).into_owned();
                self.advance();
                self.alloc_str(&text)
            } else if self.peek_kind().is_word() {
                self.take_text()
            } else {
                self.mark_missing("field name");
                return Err(self.error("Expected field name."));
            };
            self.consume(TokenKind::ColonToken, "Expected ':' after field name.")?;
            let ty = self.parse_type()?;
            fields.push(StructuralField { name, ty });
            if !self.check(TokenKind::CloseBraceToken) {
                self.eat(TokenKind::CommaToken);
            }
        }
        self.consume(TokenKind::CloseBraceToken, "Expected '}' after structural type.")?;

        Ok(TypeKind::Structural(StructuralType {
            fields: self.alloc_vec(fields),
            has_rest,
            base_records: self.alloc_vec(base_records),
        }))
    }

    /// `( [name[?]:] T, ... ) [: R]` after `fn` or `function`.
    fn function_type(&mut self) -> PResult<TypeKind<'a>> {
        self.consume(TokenKind::OpenParenToken, "Expected '(' after 'fn' in function type.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::CloseParenToken) {
            loop {
                params.push(self.function_type_param()?);
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.consume(TokenKind::CloseParenToken, "Expected ')' after function parameters.")?;
        let return_type = if self.eat(TokenKind::ColonToken) {
            self.parse_type()?
        } else {
            self.implicit_type(PrimitiveType::Nil)
        };
        Ok(TypeKind::Function(FunctionType {
            params: self.alloc_vec(params),
            return_type,
        }))
    }

    fn function_type_param(&mut self) -> PResult<FunctionTypeParam<'a>> {
        let mark = self.cst_mark();
        let named = self.check(TokenKind::Identifier)
            && (self.peek_nth_kind(1) == TokenKind::ColonToken
                || (self.peek_nth_kind(1) == TokenKind::QuestionToken
                    && self.peek_nth_kind(2) == TokenKind::ColonToken));

        let mut name = None;
        let mut is_optional = false;
        if named {
            let text = self.current_text();
            if !is_valid_parameter_name(text) {
                self.report(&format!("Invalid parameter name: {}", text))?;
            }
            self.advance();
            is_optional = self.eat(TokenKind::QuestionToken);
            self.advance();
            name = Some(text);
        }
        let ty = self.parse_type()?;
        self.wrap(mark, NodeKind::Parameter);
        Ok(FunctionTypeParam { name, ty, is_optional })
    }

    /// `?`, `?Err`, `?ErrA, ErrB`. Error names must stay on the line of the
    /// `?`; an identifier on the next line starts a new statement. The list
    /// continues past a `,` only when an identifier follows that does not
    /// itself start `name:`.
    fn type_suffix(&mut self) -> PResult<TypeSuffix<'a>> {
        if !self.eat(TokenKind::QuestionToken) {
            return Ok(TypeSuffix::None);
        }
        if !self.check(TokenKind::Identifier) || self.peek().has_preceding_line_break() {
            return Ok(TypeSuffix::Optional);
        }
        let mut errors = vec![self.take_text()];
        while self.check(TokenKind::CommaToken)
            && self.peek_nth_kind(1) == TokenKind::Identifier
            && self.peek_nth_kind(2) != TokenKind::ColonToken
            && !self.peek_nth(1).is_some_and(|t| t.has_preceding_line_break())
        {
            self.advance();
            errors.push(self.take_text());
        }
        Ok(TypeSuffix::Fallible(self.alloc_vec(errors)))
    }

    /// A type that is implied rather than written, such as the `any` element
    /// of a bare `list`. Zero width at the current position.
    pub(crate) fn implicit_type(&self, primitive: PrimitiveType) -> &'a TypeAnnotation<'a> {
        let token = self.previous();
        self.alloc(TypeAnnotation {
            data: NodeData::new(token.line, token.end, token.end),
            kind: TypeKind::Primitive(primitive),
            suffix: TypeSuffix::None,
            refinement: None,
        })
    }
}
