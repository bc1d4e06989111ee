use std::fmt;

/// The kind of a CST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NodeKind {
    Program,

    // Declarations
    VarDeclaration,
    DestructuringDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    EnumDeclaration,
    TypeDeclaration,
    TraitDeclaration,
    InterfaceDeclaration,
    ModuleDeclaration,
    ImportDeclaration,

    // Statements
    IfStatement,
    ForStatement,
    WhileStatement,
    IterStatement,
    MatchStatement,
    Block,
    ExpressionStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    PrintStatement,
    ParallelStatement,
    ConcurrentStatement,
    TaskStatement,
    WorkerStatement,
    ContractStatement,
    ComptimeStatement,
    UnsafeStatement,

    // Expressions
    BinaryExpr,
    UnaryExpr,
    CallExpr,
    MemberExpr,
    IndexExpr,
    LiteralExpr,
    VariableExpr,
    GroupingExpr,
    AssignmentExpr,
    RangeExpr,
    ListExpr,
    DictExpr,
    TupleExpr,
    LambdaExpr,
    InterpolationExpr,
    FallibleExpr,
    ErrorConstructExpr,
    OkConstructExpr,
    ObjectLiteralExpr,
    ThisExpr,
    SuperExpr,

    // Types
    PrimitiveType,
    ListType,
    DictType,
    TupleType,
    FunctionType,
    UnionType,
    IntersectionType,
    StructuralType,
    UserType,
    LiteralType,

    // Patterns
    WildcardPattern,
    LiteralPattern,
    ValPattern,
    ErrPattern,
    ErrorTypePattern,
    ListPattern,
    DictPattern,
    TuplePattern,
    BindingPattern,
    TypePattern,

    // Structural helpers
    Parameter,
    ParameterList,
    ArgumentList,
    MatchCase,
    EnumVariant,
    ClassMember,

    // Trivia
    Whitespace,
    Comment,

    // Recovery
    Error,
    Missing,
    Incomplete,
}

impl NodeKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, NodeKind::Whitespace | NodeKind::Comment)
    }

    #[inline]
    pub fn is_recovery(self) -> bool {
        matches!(self, NodeKind::Error | NodeKind::Missing | NodeKind::Incomplete)
    }

    #[inline]
    pub fn is_declaration(self) -> bool {
        self >= NodeKind::VarDeclaration && self <= NodeKind::ImportDeclaration
    }

    #[inline]
    pub fn is_statement(self) -> bool {
        self >= NodeKind::IfStatement && self <= NodeKind::UnsafeStatement
    }

    #[inline]
    pub fn is_expression(self) -> bool {
        self >= NodeKind::BinaryExpr && self <= NodeKind::SuperExpr
    }

    #[inline]
    pub fn is_type(self) -> bool {
        self >= NodeKind::PrimitiveType && self <= NodeKind::LiteralType
    }

    #[inline]
    pub fn is_pattern(self) -> bool {
        self >= NodeKind::WildcardPattern && self <= NodeKind::TypePattern
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
