//! Type annotations, modifiers and operator enums.

use crate::node::{Expression, NodeData, NodeList};
use std::fmt;

bitflags::bitflags! {
    /// Declaration modifiers written before `class`, `fn`, `var` and members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE     = 0;
        const PUB      = 1 << 0;
        const PROT     = 1 << 1;
        const CONST    = 1 << 2;
        const STATIC   = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL    = 1 << 5;
        /// `data` classes are implicitly final.
        const DATA     = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

// ============================================================================
// Type annotations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    I8,
    I16,
    I32,
    I64,
    I128,
    Uint,
    U8,
    U16,
    U32,
    U64,
    U128,
    Float,
    F32,
    F64,
    Str,
    Bool,
    Any,
    Nil,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::I128 => "i128",
            PrimitiveType::Uint => "uint",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::U128 => "u128",
            PrimitiveType::Float => "float",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Str => "str",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Any => "any",
            PrimitiveType::Nil => "nil",
        }
    }
}

/// A parsed type. `suffix` carries the `?` marker, which is either optional
/// (`T?`) or fallible (`T?ErrA, ErrB`), never both.
#[derive(Debug)]
pub struct TypeAnnotation<'a> {
    pub data: NodeData,
    pub kind: TypeKind<'a>,
    pub suffix: TypeSuffix<'a>,
    /// `where <expr>` refinement, kept unevaluated.
    pub refinement: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub enum TypeKind<'a> {
    Primitive(PrimitiveType),
    List(&'a TypeAnnotation<'a>),
    Dict {
        key: &'a TypeAnnotation<'a>,
        value: &'a TypeAnnotation<'a>,
    },
    Tuple(NodeList<'a, &'a TypeAnnotation<'a>>),
    Function(FunctionType<'a>),
    Union(NodeList<'a, &'a TypeAnnotation<'a>>),
    Intersection(NodeList<'a, &'a TypeAnnotation<'a>>),
    Structural(StructuralType<'a>),
    /// A user-defined or library type referred to by name.
    Named(&'a str),
    /// A string literal used as a type, stored without quotes.
    Literal(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeSuffix<'a> {
    #[default]
    None,
    Optional,
    Fallible(NodeList<'a, &'a str>),
}

#[derive(Debug)]
pub struct FunctionType<'a> {
    pub params: NodeList<'a, FunctionTypeParam<'a>>,
    /// `nil` when no return type is written.
    pub return_type: &'a TypeAnnotation<'a>,
}

#[derive(Debug)]
pub struct FunctionTypeParam<'a> {
    pub name: Option<&'a str>,
    pub ty: &'a TypeAnnotation<'a>,
    pub is_optional: bool,
}

#[derive(Debug)]
pub struct StructuralType<'a> {
    /// In source order; duplicates are not rejected here.
    pub fields: NodeList<'a, StructuralField<'a>>,
    pub has_rest: bool,
    pub base_records: NodeList<'a, &'a str>,
}

#[derive(Debug)]
pub struct StructuralField<'a> {
    pub name: &'a str,
    pub ty: &'a TypeAnnotation<'a>,
}

impl<'a> TypeAnnotation<'a> {
    pub fn is_optional(&self) -> bool {
        matches!(self.suffix, TypeSuffix::Optional)
    }

    pub fn is_fallible(&self) -> bool {
        matches!(self.suffix, TypeSuffix::Fallible(_))
    }

    pub fn error_types(&self) -> &'a [&'a str] {
        match self.suffix {
            TypeSuffix::Fallible(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_primitive(&self, primitive: PrimitiveType) -> bool {
        matches!(self.kind, TypeKind::Primitive(p) if p == primitive)
    }
}

impl fmt::Display for TypeAnnotation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(p) => write!(f, "{}", p.as_str())?,
            TypeKind::List(element) => write!(f, "[{}]", element)?,
            TypeKind::Dict { key, value } => write!(f, "{{{}: {}}}", key, value)?,
            TypeKind::Tuple(elements) => {
                write!(f, "(")?;
                write_joined(f, elements.iter(), ", ")?;
                write!(f, ")")?;
            }
            TypeKind::Function(func) => {
                write!(f, "fn(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(name) = param.name {
                        write!(f, "{}{}: ", name, if param.is_optional { "?" } else { "" })?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                write!(f, "): {}", func.return_type)?;
            }
            TypeKind::Union(members) => write_joined(f, members.iter(), " | ")?,
            TypeKind::Intersection(members) => write_joined(f, members.iter(), " and ")?,
            TypeKind::Structural(record) => {
                write!(f, "{{")?;
                for (i, field) in record.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                if record.has_rest {
                    if !record.fields.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                    write_joined(f, record.base_records.iter(), ", ...")?;
                }
                write!(f, "}}")?;
            }
            TypeKind::Named(name) => write!(f, "{}", name)?,
            TypeKind::Literal(text) => write!(f, "\"{}\"", text)?,
        }
        match self.suffix {
            TypeSuffix::None => {}
            TypeSuffix::Optional => write!(f, "?")?,
            TypeSuffix::Fallible(errors) => {
                write!(f, "?")?;
                write_joined(f, errors.iter(), ", ")?;
            }
        }
        if self.refinement.is_some() {
            write!(f, " where ...")?;
        }
        Ok(())
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
}

impl AssignOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOperator::Assign => "=",
            AssignOperator::AddAssign => "+=",
            AssignOperator::SubtractAssign => "-=",
            AssignOperator::MultiplyAssign => "*=",
            AssignOperator::DivideAssign => "/=",
            AssignOperator::ModuloAssign => "%=",
        }
    }
}
