//! Declarations: variables, functions, classes, enums, type aliases,
//! traits, interfaces, modules and imports.
//!
//! A declaration may be preceded by `@name` annotations, a visibility
//! keyword (`public`, `protected`, `private`) and modifiers (`pub`, `prot`,
//! `const`, `static`, `abstract`, `final`, `data`). Anything else falls
//! through to [`Parser::statement`].

use crate::parser::{PResult, Parser};
use crate::utilities::unquote_string;
use limit_ast::{
    AssignExpression, AssignOperator, Block, CallExpression, ClassDeclaration,
    DestructuringDeclaration, EnumDeclaration, EnumVariant, Expression, ExpressionKind,
    ExpressionStatement, FunctionDeclaration, ImportDeclaration, ImportFilter, ImportFilterKind,
    InterfaceDeclaration, MemberExpression, Modifiers, ModuleDeclaration, NodeData, Parameter,
    Statement, TraitDeclaration, TypeDeclaration, VarDeclaration, Visibility,
};
use limit_cst::NodeKind;
use limit_diagnostics::messages;
use limit_scanner::TokenKind;

/// Annotations, visibility and modifiers read ahead of a declaration.
#[derive(Debug, Clone, Copy, Default)]
struct Prefix {
    modifiers: Modifiers,
    visibility: Visibility,
}

/// What a single class member turned out to be.
enum ClassMember<'a> {
    Field(VarDeclaration<'a>),
    Method(FunctionDeclaration<'a>),
}

/// Which parameter forms a function header accepts.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ParamStyle {
    /// `name [: T] [= default]`
    Free,
    /// `name : T`, as in constructors and trait methods.
    Typed,
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_declaration(&mut self) -> PResult<Statement<'a>> {
        let mark = self.cst_mark();
        let start = self.start();
        let prefix = self.declaration_prefix()?;

        match self.peek_kind() {
            TokenKind::VarKeyword if self.peek_nth_kind(1) == TokenKind::OpenParenToken => self
                .node_from(mark, NodeKind::DestructuringDeclaration, |p| {
                    p.destructuring_declaration(start)
                })
                .map(Statement::Destructuring),
            TokenKind::VarKeyword => self
                .node_from(mark, NodeKind::VarDeclaration, |p| {
                    p.advance();
                    let mut decl = p.var_binding(start, prefix.modifiers, prefix.visibility)?;
                    p.eat(TokenKind::SemicolonToken);
                    decl.data = p.data_from(start);
                    Ok(decl)
                })
                .map(Statement::VarDeclaration),
            TokenKind::FnKeyword if self.peek_nth_kind(1) != TokenKind::OpenParenToken => self
                .node_from(mark, NodeKind::FunctionDeclaration, |p| {
                    p.function_declaration(start, prefix, "function")
                })
                .map(Statement::FunctionDeclaration),
            TokenKind::ClassKeyword => self
                .node_from(mark, NodeKind::ClassDeclaration, |p| p.class_declaration(start, prefix))
                .map(Statement::ClassDeclaration),
            TokenKind::EnumKeyword => self
                .node_from(mark, NodeKind::EnumDeclaration, |p| p.enum_declaration(start))
                .map(Statement::EnumDeclaration),
            TokenKind::TypeKeyword => self
                .node_from(mark, NodeKind::TypeDeclaration, |p| p.type_declaration(start))
                .map(Statement::TypeDeclaration),
            TokenKind::TraitKeyword => self
                .node_from(mark, NodeKind::TraitDeclaration, |p| p.trait_declaration(start))
                .map(Statement::TraitDeclaration),
            TokenKind::InterfaceKeyword => self
                .node_from(mark, NodeKind::InterfaceDeclaration, |p| {
                    p.interface_declaration(start)
                })
                .map(Statement::InterfaceDeclaration),
            TokenKind::ModuleKeyword => self
                .node_from(mark, NodeKind::ModuleDeclaration, |p| p.module_declaration(start))
                .map(Statement::ModuleDeclaration),
            TokenKind::ImportKeyword => self
                .node_from(mark, NodeKind::ImportDeclaration, |p| p.import_declaration(start))
                .map(Statement::ImportDeclaration),
            _ => self.statement(),
        }
    }

    fn declaration_prefix(&mut self) -> PResult<Prefix> {
        let mut prefix = Prefix::default();
        loop {
            match self.peek_kind() {
                TokenKind::AtToken => {
                    self.advance();
                    if !self.peek_kind().is_word() {
                        self.mark_missing("annotation name");
                        return Err(self.error("Expected annotation name after '@'."));
                    }
                }
                TokenKind::PublicKeyword => prefix.visibility = Visibility::Public,
                TokenKind::ProtectedKeyword => prefix.visibility = Visibility::Protected,
                TokenKind::PrivateKeyword => prefix.visibility = Visibility::Private,
                TokenKind::PubKeyword => {
                    prefix.modifiers |= Modifiers::PUB;
                    prefix.visibility = Visibility::Public;
                }
                TokenKind::ProtKeyword => {
                    prefix.modifiers |= Modifiers::PROT;
                    prefix.visibility = Visibility::Protected;
                }
                TokenKind::ConstKeyword => prefix.modifiers |= Modifiers::CONST,
                TokenKind::StaticKeyword => prefix.modifiers |= Modifiers::STATIC,
                TokenKind::AbstractKeyword => prefix.modifiers |= Modifiers::ABSTRACT,
                TokenKind::FinalKeyword => prefix.modifiers |= Modifiers::FINAL,
                TokenKind::DataKeyword => prefix.modifiers |= Modifiers::DATA | Modifiers::FINAL,
                _ => return Ok(prefix),
            }
            // The keyword itself, or the annotation name after `@`.
            self.advance();
        }
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// `name [: T] [= e]` after `var`. The caller handles `;`.
    pub(crate) fn var_binding(
        &mut self,
        start: usize,
        modifiers: Modifiers,
        visibility: Visibility,
    ) -> PResult<VarDeclaration<'a>> {
        let name = self.consume_identifier("Expected variable name.")?;
        let type_annotation = if self.eat(TokenKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let initializer = if self.eat(TokenKind::EqualsToken) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(VarDeclaration {
            data: self.data_from(start),
            name,
            type_annotation,
            initializer,
            modifiers,
            visibility,
        })
    }

    /// `var (a, b, c) = e`
    fn destructuring_declaration(&mut self, start: usize) -> PResult<DestructuringDeclaration<'a>> {
        self.advance();
        self.advance();
        let mut names = Vec::new();
        if !self.check(TokenKind::CloseParenToken) {
            loop {
                names.push(self.consume_identifier("Expected variable name in tuple destructuring.")?);
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.consume(
            TokenKind::CloseParenToken,
            "Expected ')' after tuple destructuring variables.",
        )?;
        self.consume(TokenKind::EqualsToken, "Expected '=' in tuple destructuring assignment.")?;
        let initializer = self.expression()?;
        self.eat(TokenKind::SemicolonToken);
        Ok(DestructuringDeclaration {
            data: self.data_from(start),
            names: self.alloc_vec(names),
            initializer,
        })
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// `fn name [T, U] (params) [: R] ( ; | { body } )`. `kind` names the
    /// declaration in messages and is either "function" or "method".
    fn function_declaration(
        &mut self,
        start: usize,
        prefix: Prefix,
        kind: &str,
    ) -> PResult<FunctionDeclaration<'a>> {
        self.advance();
        let name = self.consume_identifier(&format!("Expected {} name.", kind))?;
        self.describe(|| format!("{} {}", kind, name));

        let mut generic_params = Vec::new();
        if self.eat(TokenKind::OpenBracketToken) {
            loop {
                generic_params.push(self.consume_identifier("Expected generic parameter name.")?);
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
            self.consume(TokenKind::CloseBracketToken, "Expected ']' after generic parameters.")?;
        }

        self.consume(TokenKind::OpenParenToken, &format!("Expected '(' after {} name.", kind))?;
        let params = self.parameter_list(ParamStyle::Free)?;
        let (params, optional_params) = self.split_params(params);
        self.consume(TokenKind::CloseParenToken, "Expected ')' after parameters.")?;

        let return_type = if self.eat(TokenKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let can_fail = return_type.is_some_and(|ty| ty.is_fallible());
        let declared_error_types = return_type.map(|ty| ty.error_types()).unwrap_or_default();

        let body = if self.eat(TokenKind::SemicolonToken) {
            None
        } else {
            Some(self.function_body(&format!("Expected '{{' before {} body.", kind))?)
        };

        Ok(FunctionDeclaration {
            data: self.data_from(start),
            name,
            generic_params: self.alloc_vec(generic_params),
            params,
            optional_params,
            return_type,
            body,
            can_fail,
            declared_error_types,
            modifiers: prefix.modifiers,
            visibility: prefix.visibility,
        })
    }

    fn function_body(&mut self, open: &str) -> PResult<&'a Block<'a>> {
        let brace = self.start();
        self.with_block("function", brace, |p| p.block(open, "Expected '}' after block."))
    }

    /// Parameters up to, not including, the closing `)`, in source order.
    fn parameter_list(&mut self, style: ParamStyle) -> PResult<Vec<Parameter<'a>>> {
        self.node(NodeKind::ParameterList, |p| {
            let mut params = Vec::new();
            if p.check(TokenKind::CloseParenToken) {
                return Ok(params);
            }
            loop {
                params.push(p.node(NodeKind::Parameter, |p| p.parameter(style))?);
                if !p.eat(TokenKind::CommaToken) {
                    return Ok(params);
                }
            }
        })
    }

    /// Split parameters into required ones and those with a default value
    /// or an optional type.
    fn split_params(
        &self,
        params: Vec<Parameter<'a>>,
    ) -> (&'a [Parameter<'a>], &'a [Parameter<'a>]) {
        let (optional, required): (Vec<_>, Vec<_>) = params.into_iter().partition(|param| {
            param.default_value.is_some()
                || param.type_annotation.is_some_and(|ty| ty.is_optional())
        });
        (self.alloc_vec(required), self.alloc_vec(optional))
    }

    fn parameter(&mut self, style: ParamStyle) -> PResult<Parameter<'a>> {
        let start = self.start();
        let name = self.consume_identifier("Expected parameter name.")?;
        let type_annotation = match style {
            ParamStyle::Typed => {
                self.consume(TokenKind::ColonToken, "Expected ':' after parameter name.")?;
                Some(self.parse_type()?)
            }
            ParamStyle::Free if self.eat(TokenKind::ColonToken) => Some(self.parse_type()?),
            ParamStyle::Free => None,
        };
        let default_value = if style == ParamStyle::Free && self.eat(TokenKind::EqualsToken) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Parameter {
            data: self.data_from(start),
            name,
            type_annotation,
            default_value,
        })
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// ```text
    /// class Name [(p: T, ...)] [: Super [(args)]] { member* }
    /// ```
    ///
    /// Inline constructor parameters produce a synthesized `init` method that
    /// calls `super.init(args)` when a superclass is given and then assigns
    /// each parameter to the field of the same name.
    fn class_declaration(&mut self, start: usize, prefix: Prefix) -> PResult<ClassDeclaration<'a>> {
        self.advance();
        let name = self.consume_identifier("Expected class name.")?;
        self.describe(|| format!("class {}", name));

        let mut inline_constructor = false;
        let mut constructor_params: &'a [Parameter<'a>] = &[];
        if self.eat(TokenKind::OpenParenToken) {
            inline_constructor = true;
            let params = self.parameter_list(ParamStyle::Typed)?;
            constructor_params = self.alloc_vec(params);
            self.consume(TokenKind::CloseParenToken, "Expected ')' after constructor parameters.")?;
        }

        let mut superclass = None;
        let mut super_args: &'a [&'a Expression<'a>] = &[];
        if self.eat(TokenKind::ColonToken) {
            superclass = Some(self.consume_identifier("Expected superclass name.")?);
            if self.eat(TokenKind::OpenParenToken) {
                let args = self.expression_list(TokenKind::CloseParenToken)?;
                super_args = self.alloc_vec(args);
                self.consume(
                    TokenKind::CloseParenToken,
                    "Expected ')' after superclass arguments.",
                )?;
            }
        }

        let brace = self.start();
        let (fields, mut methods) = self.with_block("class", brace, |p| {
            p.consume(TokenKind::OpenBraceToken, "Expected '{' before class body.")?;
            let mut fields = Vec::new();
            let mut methods = Vec::new();
            while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                match p.node(NodeKind::ClassMember, |p| p.class_member(name))? {
                    ClassMember::Field(field) => fields.push(field),
                    ClassMember::Method(method) => methods.push(method),
                }
            }
            p.consume(TokenKind::CloseBraceToken, "Expected '}' after class body.")?;
            Ok((fields, methods))
        })?;

        let data = self.data_from(start);
        if inline_constructor {
            let init = self.synthesize_init(data, constructor_params, superclass.is_some(), super_args);
            methods.push(init);
        }

        Ok(ClassDeclaration {
            data,
            name,
            superclass,
            super_args,
            constructor_params,
            fields: self.alloc_vec(fields),
            methods: self.alloc_vec(methods),
            modifiers: prefix.modifiers,
            visibility: prefix.visibility,
        })
    }

    fn class_member(&mut self, class_name: &'a str) -> PResult<ClassMember<'a>> {
        let start = self.start();
        let prefix = self.declaration_prefix()?;

        match self.peek_kind() {
            TokenKind::VarKeyword => self
                .node(NodeKind::VarDeclaration, |p| {
                    p.advance();
                    let mut field = p.var_binding(start, prefix.modifiers, prefix.visibility)?;
                    p.eat(TokenKind::SemicolonToken);
                    field.data = p.data_from(start);
                    Ok(field)
                })
                .map(ClassMember::Field),
            TokenKind::FnKeyword => self
                .node(NodeKind::FunctionDeclaration, |p| {
                    p.function_declaration(start, prefix, "method")
                })
                .map(ClassMember::Method),
            TokenKind::Identifier
                if self.check_identifier(class_name)
                    && self.peek_nth_kind(1) == TokenKind::OpenParenToken =>
            {
                self.node(NodeKind::FunctionDeclaration, |p| p.constructor(start, prefix))
                    .map(ClassMember::Method)
            }
            TokenKind::Identifier => self
                .node(NodeKind::VarDeclaration, |p| p.bare_field(start, prefix))
                .map(ClassMember::Field),
            _ => {
                self.mark_missing("class member");
                Err(self.error_with(&messages::EXPECTED_CLASS_MEMBER, &[]))
            }
        }
    }

    /// `ClassName(p: T, ...) { ... }`, stored as a method named after the
    /// class.
    fn constructor(&mut self, start: usize, prefix: Prefix) -> PResult<FunctionDeclaration<'a>> {
        let name = self.take_text();
        self.advance();
        let params = self.parameter_list(ParamStyle::Typed)?;
        let (params, optional_params) = self.split_params(params);
        self.consume(TokenKind::CloseParenToken, "Expected ')' after parameters.")?;
        let body = self.function_body("Expected '{' before constructor body.")?;
        Ok(FunctionDeclaration {
            data: self.data_from(start),
            name,
            generic_params: &[],
            params,
            optional_params,
            return_type: None,
            body: Some(body),
            can_fail: false,
            declared_error_types: &[],
            modifiers: prefix.modifiers,
            visibility: prefix.visibility,
        })
    }

    /// `name: T [= e] [;]`
    fn bare_field(&mut self, start: usize, prefix: Prefix) -> PResult<VarDeclaration<'a>> {
        let name = self.take_text();
        if !self.eat(TokenKind::ColonToken) {
            self.mark_missing(":");
            return Err(self.error_with(&messages::EXPECTED_COLON_AFTER_FIELD_NAME, &[]));
        }
        let type_annotation = Some(self.parse_type()?);
        let initializer = if self.eat(TokenKind::EqualsToken) {
            Some(self.expression()?)
        } else {
            None
        };
        self.eat(TokenKind::SemicolonToken);
        Ok(VarDeclaration {
            data: self.data_from(start),
            name,
            type_annotation,
            initializer,
            modifiers: prefix.modifiers,
            visibility: prefix.visibility,
        })
    }

    /// The `init` method for a class with inline constructor parameters.
    /// Every synthesized node carries the class's position.
    fn synthesize_init(
        &self,
        data: NodeData,
        params: &'a [Parameter<'a>],
        has_superclass: bool,
        super_args: &'a [&'a Expression<'a>],
    ) -> FunctionDeclaration<'a> {
        let mut statements = Vec::with_capacity(params.len() + 1);

        if has_superclass {
            let super_expr = self.alloc_expr(data, ExpressionKind::Super);
            let callee = self.alloc_expr(
                data,
                ExpressionKind::Member(MemberExpression {
                    object: super_expr,
                    name: "init",
                }),
            );
            let call = self.alloc_expr(
                data,
                ExpressionKind::Call(CallExpression {
                    callee,
                    arguments: super_args,
                    named_arguments: &[],
                }),
            );
            statements.push(Statement::Expression(ExpressionStatement { data, expression: call }));
        }

        for param in params {
            let this = self.alloc_expr(data, ExpressionKind::This);
            let target = self.alloc_expr(
                data,
                ExpressionKind::Member(MemberExpression {
                    object: this,
                    name: param.name,
                }),
            );
            let value = self.alloc_expr(data, ExpressionKind::Variable(param.name));
            let assign = self.alloc_expr(
                data,
                ExpressionKind::Assign(AssignExpression {
                    target,
                    operator: AssignOperator::Assign,
                    value,
                }),
            );
            statements.push(Statement::Expression(ExpressionStatement { data, expression: assign }));
        }

        let body = self.alloc(Block {
            data,
            statements: self.alloc_vec(statements),
        });
        FunctionDeclaration {
            data,
            name: "init",
            generic_params: &[],
            params,
            optional_params: &[],
            return_type: None,
            body: Some(body),
            can_fail: false,
            declared_error_types: &[],
            modifiers: Modifiers::NONE,
            visibility: Visibility::Public,
        }
    }

    // ========================================================================
    // Enums and type aliases
    // ========================================================================

    /// `enum Name { A, B(T), ... }`
    fn enum_declaration(&mut self, start: usize) -> PResult<EnumDeclaration<'a>> {
        self.advance();
        let name = self.consume_identifier("Expected enum name.")?;
        self.describe(|| format!("enum {}", name));
        self.consume(TokenKind::OpenBraceToken, "Expected '{' before enum body.")?;
        let mut variants = Vec::new();
        if !self.check(TokenKind::CloseBraceToken) {
            loop {
                variants.push(self.node(NodeKind::EnumVariant, |p| {
                    let start = p.start();
                    let name = p.consume_identifier("Expected variant name.")?;
                    let payload = if p.eat(TokenKind::OpenParenToken) {
                        let ty = p.parse_type()?;
                        p.consume(TokenKind::CloseParenToken, "Expected ')' after variant type.")?;
                        Some(ty)
                    } else {
                        None
                    };
                    Ok(EnumVariant {
                        data: p.data_from(start),
                        name,
                        payload,
                    })
                })?);
                if !self.eat(TokenKind::CommaToken) || self.check(TokenKind::CloseBraceToken) {
                    break;
                }
            }
        }
        self.consume(TokenKind::CloseBraceToken, "Expected '}' after enum body.")?;
        Ok(EnumDeclaration {
            data: self.data_from(start),
            name,
            variants: self.alloc_vec(variants),
        })
    }

    /// `type Name = T [;]`
    fn type_declaration(&mut self, start: usize) -> PResult<TypeDeclaration<'a>> {
        self.advance();
        let name = self.consume_identifier("Expected type name.")?;
        self.consume(TokenKind::EqualsToken, "Expected '=' after type name.")?;
        let ty = self.parse_type()?;
        self.eat(TokenKind::SemicolonToken);
        Ok(TypeDeclaration {
            data: self.data_from(start),
            name,
            ty,
        })
    }

    // ========================================================================
    // Traits and interfaces
    // ========================================================================

    /// `trait [open] Name { fn m(p: T): R [;|{...}] ... }`
    fn trait_declaration(&mut self, start: usize) -> PResult<TraitDeclaration<'a>> {
        self.advance();
        let is_open = self.eat(TokenKind::OpenKeyword);
        let name = self.consume_identifier("Expected trait name.")?;
        self.describe(|| format!("trait {}", name));
        let brace = self.start();
        let methods = self.with_block("trait", brace, |p| {
            p.consume(TokenKind::OpenBraceToken, "Expected '{' before trait body.")?;
            let mut methods = Vec::new();
            while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                if !p.check(TokenKind::FnKeyword) {
                    p.mark_missing("fn");
                    return Err(p.error_with(&messages::EXPECTED_METHOD_IN_TRAIT, &[]));
                }
                methods.push(p.node(NodeKind::FunctionDeclaration, |p| p.trait_method())?);
            }
            p.consume(TokenKind::CloseBraceToken, "Expected '}' after trait body.")?;
            Ok(methods)
        })?;
        Ok(TraitDeclaration {
            data: self.data_from(start),
            name,
            is_open,
            methods: self.alloc_vec(methods),
        })
    }

    fn trait_method(&mut self) -> PResult<FunctionDeclaration<'a>> {
        let start = self.start();
        self.advance();
        let name = self.consume_identifier("Expected method name.")?;
        self.describe(|| format!("method {}", name));
        self.consume(TokenKind::OpenParenToken, "Expected '(' after method name.")?;
        let params = self.parameter_list(ParamStyle::Typed)?;
        let (params, optional_params) = self.split_params(params);
        self.consume(TokenKind::CloseParenToken, "Expected ')' after parameters.")?;
        let return_type = if self.eat(TokenKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if self.eat(TokenKind::SemicolonToken) {
            None
        } else {
            Some(self.function_body("Expected '{' or ';' after method declaration.")?)
        };
        Ok(FunctionDeclaration {
            data: self.data_from(start),
            name,
            generic_params: &[],
            params,
            optional_params,
            return_type,
            body,
            can_fail: return_type.is_some_and(|ty| ty.is_fallible()),
            declared_error_types: return_type.map(|ty| ty.error_types()).unwrap_or_default(),
            modifiers: Modifiers::NONE,
            visibility: Visibility::Public,
        })
    }

    /// `interface [@open] Name { fn ... }`
    fn interface_declaration(&mut self, start: usize) -> PResult<InterfaceDeclaration<'a>> {
        self.advance();
        let mut is_open = false;
        if self.check(TokenKind::AtToken) && self.peek_nth(1).is_some_and(|t| t.text == "open") {
            self.advance();
            self.advance();
            is_open = true;
        }
        let name = self.consume_identifier("Expected interface name.")?;
        self.describe(|| format!("interface {}", name));
        let brace = self.start();
        let methods = self.with_block("interface", brace, |p| {
            p.consume(TokenKind::OpenBraceToken, "Expected '{' before interface body.")?;
            let mut methods = Vec::new();
            while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                if !p.check(TokenKind::FnKeyword) {
                    p.mark_missing("fn");
                    return Err(p.error_with(&messages::EXPECTED_METHOD_IN_INTERFACE, &[]));
                }
                let method_start = p.start();
                methods.push(p.node(NodeKind::FunctionDeclaration, |p| {
                    p.function_declaration(method_start, Prefix::default(), "method")
                })?);
            }
            p.consume(TokenKind::CloseBraceToken, "Expected '}' after interface body.")?;
            Ok(methods)
        })?;
        Ok(InterfaceDeclaration {
            data: self.data_from(start),
            name,
            is_open,
            methods: self.alloc_vec(methods),
        })
    }

    // ========================================================================
    // Modules and imports
    // ========================================================================

    /// `module Name { [@public | @protected] declaration ... }`. Members
    /// without an annotation are private.
    fn module_declaration(&mut self, start: usize) -> PResult<ModuleDeclaration<'a>> {
        self.advance();
        let name = self.consume_identifier("Expected module name.")?;
        self.describe(|| format!("module {}", name));
        let brace = self.start();
        let (public, protected, private) = self.with_block("module", brace, |p| {
            p.consume(TokenKind::OpenBraceToken, "Expected '{' before module body.")?;
            let mut public = Vec::new();
            let mut protected = Vec::new();
            let mut private = Vec::new();
            while !p.check(TokenKind::CloseBraceToken) && !p.is_at_end() {
                let before = p.start();
                let visibility = p.module_visibility();
                if let Some(member) = p.declaration()? {
                    match visibility {
                        Visibility::Public => public.push(member),
                        Visibility::Protected => protected.push(member),
                        Visibility::Private => private.push(member),
                    }
                }
                if p.start() == before {
                    p.skip_token("Unexpected token");
                }
            }
            p.consume(TokenKind::CloseBraceToken, "Expected '}' after module body.")?;
            Ok((public, protected, private))
        })?;
        Ok(ModuleDeclaration {
            data: self.data_from(start),
            name,
            public_members: self.alloc_vec(public),
            protected_members: self.alloc_vec(protected),
            private_members: self.alloc_vec(private),
        })
    }

    /// Consume a leading `@public` or `@protected` and return the bucket.
    fn module_visibility(&mut self) -> Visibility {
        if !self.check(TokenKind::AtToken) {
            return Visibility::Private;
        }
        let visibility = match self.peek_nth(1) {
            Some(t) if t.kind == TokenKind::PublicKeyword || t.text == "public" => Visibility::Public,
            Some(t) if t.kind == TokenKind::ProtectedKeyword || t.text == "protected" => {
                Visibility::Protected
            }
            _ => return Visibility::Private,
        };
        self.advance();
        self.advance();
        visibility
    }

    /// ```text
    /// import a.b.c [as x] [show|hide n, ...] [;]
    /// import ("path") [as x] ...
    /// ```
    fn import_declaration(&mut self, start: usize) -> PResult<ImportDeclaration<'a>> {
        self.advance();
        let path = if self.check(TokenKind::Identifier) || self.check(TokenKind::ModuleKeyword) {
            let mut path = self.current_text().to_string();
            self.advance();
            while self.eat(TokenKind::DotToken) {
                if !self.peek_kind().is_word() {
                    self.mark_missing("identifier");
                    return Err(self.error("Expected module path component."));
                }
                path.push('.');
                path.push_str(&self.peek().text);
                self.advance();
            }
            self.alloc_str(&path)
        } else if self.eat(TokenKind::OpenParenToken) {
            if !self.check(TokenKind::StringLiteral) {
                self.mark_missing("string");
                return Err(self.error("Expected string literal for module path."));
            }
            let text = unquote_string(&self.peek().text).into_owned();
            self.advance();
            self.consume(TokenKind::CloseParenToken, "Expected ')' after module path string.")?;
            self.alloc_str(&text)
        } else {
            self.mark_missing("module path");
            return Err(self.error("Expected module path or string literal after 'import'."));
        };

        let alias = if self.eat(TokenKind::AsKeyword) {
            Some(self.consume_identifier("Expected alias name.")?)
        } else {
            None
        };

        let filter = if self.check(TokenKind::ShowKeyword) || self.check(TokenKind::HideKeyword) {
            let kind = if self.check(TokenKind::ShowKeyword) {
                ImportFilterKind::Show
            } else {
                ImportFilterKind::Hide
            };
            self.advance();
            let mut names = Vec::new();
            loop {
                if !(self.check(TokenKind::Identifier) || self.check(TokenKind::ModuleKeyword)) {
                    self.mark_missing("identifier");
                    return Err(self.error("Expected identifier in filter list."));
                }
                names.push(self.take_text());
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
            Some(ImportFilter {
                kind,
                names: self.alloc_vec(names),
            })
        } else {
            None
        };

        self.eat(TokenKind::SemicolonToken);
        Ok(ImportDeclaration {
            data: self.data_from(start),
            path,
            alias,
            filter,
        })
    }
}
