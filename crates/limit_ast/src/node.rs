//! AST node definitions.
//!
//! Statements and expressions form closed sum types. Children are arena
//! references, lists are arena slices, and names are arena strings.

use crate::types::*;
use limit_core::text::TextRange;
use std::cell::Cell;

/// Position data shared by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeData {
    /// 1-based line of the node's first token.
    pub line: u32,
    pub range: TextRange,
}

impl NodeData {
    pub fn new(line: u32, pos: u32, end: u32) -> Self {
        Self {
            line,
            range: TextRange::new(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

#[derive(Debug)]
pub struct Program<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    VarDeclaration(VarDeclaration<'a>),
    Destructuring(DestructuringDeclaration<'a>),
    FunctionDeclaration(FunctionDeclaration<'a>),
    ClassDeclaration(ClassDeclaration<'a>),
    EnumDeclaration(EnumDeclaration<'a>),
    TypeDeclaration(TypeDeclaration<'a>),
    TraitDeclaration(TraitDeclaration<'a>),
    InterfaceDeclaration(InterfaceDeclaration<'a>),
    ModuleDeclaration(ModuleDeclaration<'a>),
    ImportDeclaration(ImportDeclaration<'a>),
    If(IfStatement<'a>),
    For(ForStatement<'a>),
    While(WhileStatement<'a>),
    Iter(IterStatement<'a>),
    Match(MatchStatement<'a>),
    Block(Block<'a>),
    Expression(ExpressionStatement<'a>),
    Return(ReturnStatement<'a>),
    Break(NodeData),
    Continue(NodeData),
    Print(PrintStatement<'a>),
    Parallel(ConcurrencyStatement<'a>),
    Concurrent(ConcurrencyStatement<'a>),
    Task(TaskStatement<'a>),
    Worker(WorkerStatement<'a>),
    Contract(ContractStatement<'a>),
    Comptime(ComptimeStatement<'a>),
    Unsafe(UnsafeStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::VarDeclaration(n) => &n.data,
            Statement::Destructuring(n) => &n.data,
            Statement::FunctionDeclaration(n) => &n.data,
            Statement::ClassDeclaration(n) => &n.data,
            Statement::EnumDeclaration(n) => &n.data,
            Statement::TypeDeclaration(n) => &n.data,
            Statement::TraitDeclaration(n) => &n.data,
            Statement::InterfaceDeclaration(n) => &n.data,
            Statement::ModuleDeclaration(n) => &n.data,
            Statement::ImportDeclaration(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::For(n) => &n.data,
            Statement::While(n) => &n.data,
            Statement::Iter(n) => &n.data,
            Statement::Match(n) => &n.data,
            Statement::Block(n) => &n.data,
            Statement::Expression(n) => &n.data,
            Statement::Return(n) => &n.data,
            Statement::Break(data) | Statement::Continue(data) => data,
            Statement::Print(n) => &n.data,
            Statement::Parallel(n) | Statement::Concurrent(n) => &n.data,
            Statement::Task(n) => &n.data,
            Statement::Worker(n) => &n.data,
            Statement::Contract(n) => &n.data,
            Statement::Comptime(n) => &n.data,
            Statement::Unsafe(n) => &n.data,
        }
    }

    pub fn line(&self) -> u32 {
        self.data().line
    }

    /// Declarations introduce a name; everything else is a statement.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Statement::VarDeclaration(_)
                | Statement::Destructuring(_)
                | Statement::FunctionDeclaration(_)
                | Statement::ClassDeclaration(_)
                | Statement::EnumDeclaration(_)
                | Statement::TypeDeclaration(_)
                | Statement::TraitDeclaration(_)
                | Statement::InterfaceDeclaration(_)
                | Statement::ModuleDeclaration(_)
                | Statement::ImportDeclaration(_)
        )
    }
}

#[derive(Debug)]
pub struct VarDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub type_annotation: Option<&'a TypeAnnotation<'a>>,
    pub initializer: Option<&'a Expression<'a>>,
    pub modifiers: Modifiers,
    pub visibility: Visibility,
}

/// `var (a, b) = expr`
#[derive(Debug)]
pub struct DestructuringDeclaration<'a> {
    pub data: NodeData,
    pub names: NodeList<'a, &'a str>,
    pub initializer: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub type_annotation: Option<&'a TypeAnnotation<'a>>,
    pub default_value: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub generic_params: NodeList<'a, &'a str>,
    /// Required parameters, in order.
    pub params: NodeList<'a, Parameter<'a>>,
    /// Parameters with a default value or an optional (`T?`) type.
    pub optional_params: NodeList<'a, Parameter<'a>>,
    pub return_type: Option<&'a TypeAnnotation<'a>>,
    /// `None` for a signature ending in `;`.
    pub body: Option<&'a Block<'a>>,
    pub can_fail: bool,
    pub declared_error_types: NodeList<'a, &'a str>,
    pub modifiers: Modifiers,
    pub visibility: Visibility,
}

impl FunctionDeclaration<'_> {
    pub fn is_abstract(&self) -> bool {
        self.body.is_none() || self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn param_count(&self) -> usize {
        self.params.len() + self.optional_params.len()
    }
}

#[derive(Debug)]
pub struct ClassDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub superclass: Option<&'a str>,
    pub super_args: NodeList<'a, &'a Expression<'a>>,
    /// Inline constructor parameters, `class P(x: int)`.
    pub constructor_params: NodeList<'a, Parameter<'a>>,
    pub fields: NodeList<'a, VarDeclaration<'a>>,
    /// Includes the generated `init` for an inline constructor.
    pub methods: NodeList<'a, FunctionDeclaration<'a>>,
    pub modifiers: Modifiers,
    pub visibility: Visibility,
}

impl<'a> ClassDeclaration<'a> {
    pub fn method(&self, name: &str) -> Option<&FunctionDeclaration<'a>> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug)]
pub struct EnumDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub variants: NodeList<'a, EnumVariant<'a>>,
}

#[derive(Debug)]
pub struct EnumVariant<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub payload: Option<&'a TypeAnnotation<'a>>,
}

#[derive(Debug)]
pub struct TypeDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub ty: &'a TypeAnnotation<'a>,
}

#[derive(Debug)]
pub struct TraitDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub is_open: bool,
    pub methods: NodeList<'a, FunctionDeclaration<'a>>,
}

#[derive(Debug)]
pub struct InterfaceDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub is_open: bool,
    pub methods: NodeList<'a, FunctionDeclaration<'a>>,
}

#[derive(Debug)]
pub struct ModuleDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub public_members: NodeList<'a, Statement<'a>>,
    pub protected_members: NodeList<'a, Statement<'a>>,
    pub private_members: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ImportDeclaration<'a> {
    pub data: NodeData,
    /// Dotted module path, or the string given in `import ("path")`.
    pub path: &'a str,
    pub alias: Option<&'a str>,
    pub filter: Option<ImportFilter<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFilterKind {
    Show,
    Hide,
}

#[derive(Debug)]
pub struct ImportFilter<'a> {
    pub kind: ImportFilterKind,
    pub names: NodeList<'a, &'a str>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_branch: &'a Statement<'a>,
    /// An `elif` is a nested `If` here.
    pub else_branch: Option<&'a Statement<'a>>,
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub kind: ForKind<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub enum ForKind<'a> {
    /// `for (init; cond; incr)`
    Traditional {
        initializer: Option<&'a Statement<'a>>,
        condition: Option<&'a Expression<'a>>,
        increment: Option<&'a Expression<'a>>,
    },
    /// `for (x in e)` and `for (k, v in e)`
    Iterable {
        variable: &'a str,
        second_variable: Option<&'a str>,
        iterable: &'a Expression<'a>,
    },
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct IterStatement<'a> {
    pub data: NodeData,
    pub variable: &'a str,
    pub second_variable: Option<&'a str>,
    pub iterable: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct MatchStatement<'a> {
    pub data: NodeData,
    pub value: &'a Expression<'a>,
    pub cases: NodeList<'a, MatchCase<'a>>,
}

#[derive(Debug)]
pub struct MatchCase<'a> {
    pub data: NodeData,
    pub pattern: &'a Expression<'a>,
    pub guard: Option<&'a Expression<'a>>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub value: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct PrintStatement<'a> {
    pub data: NodeData,
    pub arguments: NodeList<'a, &'a Expression<'a>>,
}

/// Shared shape of `parallel(...) { }` and `concurrent(...) { }`.
#[derive(Debug)]
pub struct ConcurrencyStatement<'a> {
    pub data: NodeData,
    pub channel: &'a str,
    pub mode: &'a str,
    pub cores: &'a str,
    pub on_error: &'a str,
    pub timeout: &'a str,
    pub grace: &'a str,
    pub on_timeout: &'a str,
    /// `name: Type` entries of the parameter list.
    pub typed_params: NodeList<'a, Parameter<'a>>,
    pub body: &'a Block<'a>,
}

/// `task([x in] expr) { }` inside a concurrency block.
#[derive(Debug)]
pub struct TaskStatement<'a> {
    pub data: NodeData,
    pub loop_variable: Option<&'a str>,
    pub iterable: Option<&'a Expression<'a>>,
    pub body: &'a Block<'a>,
}

/// `worker([x]) { }` inside a concurrency block.
#[derive(Debug)]
pub struct WorkerStatement<'a> {
    pub data: NodeData,
    pub param: Option<&'a str>,
    pub body: &'a Block<'a>,
}

#[derive(Debug)]
pub struct ContractStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub message: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct ComptimeStatement<'a> {
    pub data: NodeData,
    pub declaration: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct UnsafeStatement<'a> {
    pub data: NodeData,
    pub body: &'a Block<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub struct Expression<'a> {
    pub data: NodeData,
    pub kind: ExpressionKind<'a>,
    /// Filled in by later phases; always `None` after parsing.
    pub ty: Cell<Option<&'a TypeAnnotation<'a>>>,
}

impl<'a> Expression<'a> {
    pub fn new(data: NodeData, kind: ExpressionKind<'a>) -> Self {
        Self {
            data,
            kind,
            ty: Cell::new(None),
        }
    }

    pub fn line(&self) -> u32 {
        self.data.line
    }

    /// Whether the expression can appear on the left of `=`.
    pub fn is_assignment_target(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Variable(_) | ExpressionKind::Member(_) | ExpressionKind::Index(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ExpressionKind::Error)
    }

    pub fn as_variable(&self) -> Option<&'a str> {
        match self.kind {
            ExpressionKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ExpressionKind<'a> {
    Binary(BinaryExpression<'a>),
    Unary(UnaryExpression<'a>),
    Call(CallExpression<'a>),
    Member(MemberExpression<'a>),
    Index(IndexExpression<'a>),
    Literal(Literal<'a>),
    Variable(&'a str),
    Grouping(&'a Expression<'a>),
    Assign(AssignExpression<'a>),
    /// `cond ? a : b`; produced by desugaring passes, never by the parser.
    Ternary(TernaryExpression<'a>),
    Range(RangeExpression<'a>),
    List(NodeList<'a, &'a Expression<'a>>),
    Dict(NodeList<'a, DictEntry<'a>>),
    Tuple(NodeList<'a, &'a Expression<'a>>),
    Lambda(LambdaExpression<'a>),
    InterpolatedString(NodeList<'a, InterpolationPart<'a>>),
    Fallible(FallibleExpression<'a>),
    ErrorConstruct(ErrorConstruct<'a>),
    OkConstruct(&'a Expression<'a>),
    ObjectLiteral(ObjectLiteral<'a>),
    /// `this` or `self`.
    This,
    Super,
    /// Placeholder left where an expression failed to parse.
    Error,

    // Patterns, only produced inside `match` arms.
    Wildcard,
    ValPattern(&'a str),
    ErrPattern(ErrPattern<'a>),
    ErrorTypePattern(ErrorTypePattern<'a>),
    ListPattern(ListPattern<'a>),
    DictPattern(DictPattern<'a>),
    TuplePattern(NodeList<'a, &'a Expression<'a>>),
    BindingPattern(BindingPattern<'a>),
    TypePattern(&'a TypeAnnotation<'a>),
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub left: &'a Expression<'a>,
    pub operator: BinaryOperator,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub operator: UnaryOperator,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub callee: &'a Expression<'a>,
    pub arguments: NodeList<'a, &'a Expression<'a>>,
    pub named_arguments: NodeList<'a, NamedArgument<'a>>,
}

#[derive(Debug)]
pub struct NamedArgument<'a> {
    pub name: &'a str,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct MemberExpression<'a> {
    pub object: &'a Expression<'a>,
    pub name: &'a str,
}

/// `a[i]`, and `t.0` with an integer literal index.
#[derive(Debug)]
pub struct IndexExpression<'a> {
    pub object: &'a Expression<'a>,
    pub index: &'a Expression<'a>,
}

/// Numbers keep their canonical source text so no precision is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal<'a> {
    Nil,
    Bool(bool),
    Integer(&'a str),
    Float(&'a str),
    /// Unescaped string contents.
    String(&'a str),
}

#[derive(Debug)]
pub struct AssignExpression<'a> {
    pub target: &'a Expression<'a>,
    pub operator: AssignOperator,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct TernaryExpression<'a> {
    pub condition: &'a Expression<'a>,
    pub then_branch: &'a Expression<'a>,
    pub else_branch: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct RangeExpression<'a> {
    pub start: &'a Expression<'a>,
    pub end: &'a Expression<'a>,
    pub inclusive: bool,
}

#[derive(Debug)]
pub struct DictEntry<'a> {
    pub key: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct LambdaExpression<'a> {
    pub params: NodeList<'a, Parameter<'a>>,
    pub return_type: Option<&'a TypeAnnotation<'a>>,
    pub body: &'a Block<'a>,
}

#[derive(Debug)]
pub enum InterpolationPart<'a> {
    Text(&'a str),
    Expression(&'a Expression<'a>),
}

/// `expr?` with an optional `else [name] handler`.
#[derive(Debug)]
pub struct FallibleExpression<'a> {
    pub expression: &'a Expression<'a>,
    pub else_variable: Option<&'a str>,
    pub else_handler: Option<&'a Statement<'a>>,
}

/// `err(Type)` or `err(Type(args))`.
#[derive(Debug)]
pub struct ErrorConstruct<'a> {
    pub error_type: &'a str,
    pub arguments: NodeList<'a, &'a Expression<'a>>,
}

/// `Name { key: value, ... }`
#[derive(Debug)]
pub struct ObjectLiteral<'a> {
    pub constructor: &'a str,
    pub properties: NodeList<'a, ObjectProperty<'a>>,
}

#[derive(Debug)]
pub struct ObjectProperty<'a> {
    pub name: &'a str,
    pub value: &'a Expression<'a>,
}

// ============================================================================
// Patterns
// ============================================================================

/// `err name` binds any error; `err DivisionByZero` matches a built-in error type.
#[derive(Debug)]
pub struct ErrPattern<'a> {
    pub variable: Option<&'a str>,
    pub error_type: Option<&'a str>,
}

/// `NetworkError(code, message)`
#[derive(Debug)]
pub struct ErrorTypePattern<'a> {
    pub error_type: &'a str,
    pub params: NodeList<'a, &'a str>,
}

#[derive(Debug)]
pub struct ListPattern<'a> {
    pub elements: NodeList<'a, &'a Expression<'a>>,
    pub rest: Option<&'a str>,
}

#[derive(Debug)]
pub struct DictPattern<'a> {
    pub fields: NodeList<'a, DictPatternField<'a>>,
    pub has_rest: bool,
    pub rest: Option<&'a str>,
}

/// `key` or `key: binding`.
#[derive(Debug)]
pub struct DictPatternField<'a> {
    pub key: &'a str,
    pub binding: Option<&'a str>,
}

/// `Some(x)`
#[derive(Debug)]
pub struct BindingPattern<'a> {
    pub type_name: &'a str,
    pub variable: &'a str,
}
