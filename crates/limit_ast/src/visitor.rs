//! AST traversal.
//!
//! Implement [`AstVisitor`] and override the hooks you need; the default
//! methods walk into every child in source order.

use crate::node::*;
use crate::types::*;

pub trait AstVisitor<'a> {
    fn visit_program(&mut self, program: &Program<'a>) {
        for stmt in program.statements {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &TypeAnnotation<'a>) {
        walk_type(self, ty);
    }

    fn visit_function(&mut self, func: &FunctionDeclaration<'a>) {
        walk_function(self, func);
    }
}

fn visit_block<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, block: &Block<'a>) {
    for stmt in block.statements {
        v.visit_statement(stmt);
    }
}

fn visit_params<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, params: &[Parameter<'a>]) {
    for param in params {
        if let Some(ty) = param.type_annotation {
            v.visit_type(ty);
        }
        if let Some(default) = param.default_value {
            v.visit_expression(default);
        }
    }
}

pub fn walk_function<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, func: &FunctionDeclaration<'a>) {
    visit_params(v, func.params);
    visit_params(v, func.optional_params);
    if let Some(ty) = func.return_type {
        v.visit_type(ty);
    }
    if let Some(body) = func.body {
        visit_block(v, body);
    }
}

pub fn walk_statement<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, stmt: &Statement<'a>) {
    match stmt {
        Statement::VarDeclaration(n) => {
            if let Some(ty) = n.type_annotation {
                v.visit_type(ty);
            }
            if let Some(init) = n.initializer {
                v.visit_expression(init);
            }
        }
        Statement::Destructuring(n) => v.visit_expression(n.initializer),
        Statement::FunctionDeclaration(n) => v.visit_function(n),
        Statement::ClassDeclaration(n) => {
            for arg in n.super_args {
                v.visit_expression(arg);
            }
            visit_params(v, n.constructor_params);
            for field in n.fields {
                if let Some(ty) = field.type_annotation {
                    v.visit_type(ty);
                }
                if let Some(init) = field.initializer {
                    v.visit_expression(init);
                }
            }
            for method in n.methods {
                v.visit_function(method);
            }
        }
        Statement::EnumDeclaration(n) => {
            for variant in n.variants {
                if let Some(ty) = variant.payload {
                    v.visit_type(ty);
                }
            }
        }
        Statement::TypeDeclaration(n) => v.visit_type(n.ty),
        Statement::TraitDeclaration(n) => {
            for method in n.methods {
                v.visit_function(method);
            }
        }
        Statement::InterfaceDeclaration(n) => {
            for method in n.methods {
                v.visit_function(method);
            }
        }
        Statement::ModuleDeclaration(n) => {
            for member in n.public_members.iter().chain(n.protected_members).chain(n.private_members) {
                v.visit_statement(member);
            }
        }
        Statement::ImportDeclaration(_) | Statement::Break(_) | Statement::Continue(_) => {}
        Statement::If(n) => {
            v.visit_expression(n.condition);
            v.visit_statement(n.then_branch);
            if let Some(else_branch) = n.else_branch {
                v.visit_statement(else_branch);
            }
        }
        Statement::For(n) => {
            match &n.kind {
                ForKind::Traditional {
                    initializer,
                    condition,
                    increment,
                } => {
                    if let Some(init) = initializer {
                        v.visit_statement(init);
                    }
                    if let Some(cond) = condition {
                        v.visit_expression(cond);
                    }
                    if let Some(incr) = increment {
                        v.visit_expression(incr);
                    }
                }
                ForKind::Iterable { iterable, .. } => v.visit_expression(iterable),
            }
            v.visit_statement(n.body);
        }
        Statement::While(n) => {
            v.visit_expression(n.condition);
            v.visit_statement(n.body);
        }
        Statement::Iter(n) => {
            v.visit_expression(n.iterable);
            v.visit_statement(n.body);
        }
        Statement::Match(n) => {
            v.visit_expression(n.value);
            for case in n.cases {
                v.visit_expression(case.pattern);
                if let Some(guard) = case.guard {
                    v.visit_expression(guard);
                }
                v.visit_statement(case.body);
            }
        }
        Statement::Block(n) => visit_block(v, n),
        Statement::Expression(n) => v.visit_expression(n.expression),
        Statement::Return(n) => {
            if let Some(value) = n.value {
                v.visit_expression(value);
            }
        }
        Statement::Print(n) => {
            for arg in n.arguments {
                v.visit_expression(arg);
            }
        }
        Statement::Parallel(n) | Statement::Concurrent(n) => {
            visit_params(v, n.typed_params);
            visit_block(v, n.body);
        }
        Statement::Task(n) => {
            if let Some(iterable) = n.iterable {
                v.visit_expression(iterable);
            }
            visit_block(v, n.body);
        }
        Statement::Worker(n) => visit_block(v, n.body),
        Statement::Contract(n) => {
            v.visit_expression(n.condition);
            if let Some(message) = n.message {
                v.visit_expression(message);
            }
        }
        Statement::Comptime(n) => v.visit_statement(n.declaration),
        Statement::Unsafe(n) => visit_block(v, n.body),
    }
}

pub fn walk_expression<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, expr: &Expression<'a>) {
    match &expr.kind {
        ExpressionKind::Binary(n) => {
            v.visit_expression(n.left);
            v.visit_expression(n.right);
        }
        ExpressionKind::Unary(n) => v.visit_expression(n.operand),
        ExpressionKind::Call(n) => {
            v.visit_expression(n.callee);
            for arg in n.arguments {
                v.visit_expression(arg);
            }
            for named in n.named_arguments {
                v.visit_expression(named.value);
            }
        }
        ExpressionKind::Member(n) => v.visit_expression(n.object),
        ExpressionKind::Index(n) => {
            v.visit_expression(n.object);
            v.visit_expression(n.index);
        }
        ExpressionKind::Grouping(inner) | ExpressionKind::OkConstruct(inner) => v.visit_expression(inner),
        ExpressionKind::Assign(n) => {
            v.visit_expression(n.target);
            v.visit_expression(n.value);
        }
        ExpressionKind::Ternary(n) => {
            v.visit_expression(n.condition);
            v.visit_expression(n.then_branch);
            v.visit_expression(n.else_branch);
        }
        ExpressionKind::Range(n) => {
            v.visit_expression(n.start);
            v.visit_expression(n.end);
        }
        ExpressionKind::List(items) | ExpressionKind::Tuple(items) | ExpressionKind::TuplePattern(items) => {
            for item in items.iter() {
                v.visit_expression(item);
            }
        }
        ExpressionKind::Dict(entries) => {
            for entry in entries.iter() {
                v.visit_expression(entry.key);
                v.visit_expression(entry.value);
            }
        }
        ExpressionKind::Lambda(n) => {
            visit_params(v, n.params);
            if let Some(ty) = n.return_type {
                v.visit_type(ty);
            }
            visit_block(v, n.body);
        }
        ExpressionKind::InterpolatedString(parts) => {
            for part in parts.iter() {
                if let InterpolationPart::Expression(e) = part {
                    v.visit_expression(e);
                }
            }
        }
        ExpressionKind::Fallible(n) => {
            v.visit_expression(n.expression);
            if let Some(handler) = n.else_handler {
                v.visit_statement(handler);
            }
        }
        ExpressionKind::ErrorConstruct(n) => {
            for arg in n.arguments {
                v.visit_expression(arg);
            }
        }
        ExpressionKind::ObjectLiteral(n) => {
            for prop in n.properties {
                v.visit_expression(prop.value);
            }
        }
        ExpressionKind::ListPattern(n) => {
            for element in n.elements {
                v.visit_expression(element);
            }
        }
        ExpressionKind::TypePattern(ty) => v.visit_type(ty),
        ExpressionKind::Literal(_)
        | ExpressionKind::Variable(_)
        | ExpressionKind::This
        | ExpressionKind::Super
        | ExpressionKind::Error
        | ExpressionKind::Wildcard
        | ExpressionKind::ValPattern(_)
        | ExpressionKind::ErrPattern(_)
        | ExpressionKind::ErrorTypePattern(_)
        | ExpressionKind::DictPattern(_)
        | ExpressionKind::BindingPattern(_) => {}
    }
}

pub fn walk_type<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, ty: &TypeAnnotation<'a>) {
    match &ty.kind {
        TypeKind::List(element) => v.visit_type(element),
        TypeKind::Dict { key, value } => {
            v.visit_type(key);
            v.visit_type(value);
        }
        TypeKind::Tuple(members) | TypeKind::Union(members) | TypeKind::Intersection(members) => {
            for member in members.iter() {
                v.visit_type(member);
            }
        }
        TypeKind::Function(func) => {
            for param in func.params {
                v.visit_type(param.ty);
            }
            v.visit_type(func.return_type);
        }
        TypeKind::Structural(record) => {
            for field in record.fields {
                v.visit_type(field.ty);
            }
        }
        TypeKind::Primitive(_) | TypeKind::Named(_) | TypeKind::Literal(_) => {}
    }
    if let Some(refinement) = ty.refinement {
        v.visit_expression(refinement);
    }
}

/// Counts statements, expressions and types; handy for summaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounter {
    pub statements: usize,
    pub expressions: usize,
    pub types: usize,
}

impl NodeCounter {
    pub fn count(program: &Program<'_>) -> Self {
        let mut counter = Self::default();
        counter.visit_program(program);
        counter
    }

    pub fn total(&self) -> usize {
        self.statements + self.expressions + self.types
    }
}

impl<'a> AstVisitor<'a> for NodeCounter {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        self.statements += 1;
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        self.expressions += 1;
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &TypeAnnotation<'a>) {
        self.types += 1;
        walk_type(self, ty);
    }
}
