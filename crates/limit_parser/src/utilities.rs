//! Parser utility functions.

use limit_ast::PrimitiveType;
use limit_scanner::TokenKind;
use std::borrow::Cow;

/// Names that make `{Name: ...}` a dictionary type rather than a record.
const KNOWN_TYPE_NAMES: &[&str] = &[
    "any", "str", "int", "float", "bool", "list", "dict", "option", "result", "i8", "i16", "i32",
    "i64", "u8", "u16", "u32", "u64", "f32", "f64", "uint", "nil", "tuple", "function",
];

/// Error types the runtime defines; `err X` and `X(...)` patterns match them.
const BUILTIN_ERROR_TYPES: &[&str] = &[
    "DivisionByZero",
    "IndexOutOfBounds",
    "NullReference",
    "TypeConversion",
    "IOError",
    "ParseError",
    "NetworkError",
    "Error",
];

/// Names that cannot label a parameter in a function type.
const RESERVED_PARAMETER_NAMES: &[&str] = &[
    "int", "i8", "i16", "i32", "i64", "uint", "u8", "u16", "u32", "u64", "float", "f32", "f64",
    "str", "string", "bool", "nil", "any", "list", "dict", "array", "function", "option", "result",
    "channel", "atomic",
];

/// Duration suffixes accepted after a number in concurrency parameters.
pub const TIME_UNITS: &[&str] = &["s", "ms", "us", "ns"];

pub fn is_known_type_name(name: &str) -> bool {
    KNOWN_TYPE_NAMES.contains(&name)
}

pub fn is_builtin_error_type(name: &str) -> bool {
    BUILTIN_ERROR_TYPES.contains(&name)
}

pub fn is_valid_parameter_name(name: &str) -> bool {
    !RESERVED_PARAMETER_NAMES.contains(&name)
}

/// Tokens that start a new statement; recovery stops in front of them.
pub fn is_statement_boundary(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::ClassKeyword
            | TokenKind::FnKeyword
            | TokenKind::VarKeyword
            | TokenKind::ForKeyword
            | TokenKind::IfKeyword
            | TokenKind::WhileKeyword
            | TokenKind::PrintKeyword
            | TokenKind::ReturnKeyword
    )
}

/// Whether a `match` arm starting with this token is a type-test pattern.
pub fn is_type_pattern_start(kind: TokenKind, text: &str) -> bool {
    kind.is_primitive_type()
        || matches!(kind, TokenKind::ListKeyword | TokenKind::DictKeyword)
        || (kind == TokenKind::Identifier && matches!(text, "string" | "list" | "dict"))
}

pub fn primitive_type(kind: TokenKind) -> Option<PrimitiveType> {
    Some(match kind {
        TokenKind::IntKeyword => PrimitiveType::Int,
        TokenKind::I8Keyword => PrimitiveType::I8,
        TokenKind::I16Keyword => PrimitiveType::I16,
        TokenKind::I32Keyword => PrimitiveType::I32,
        TokenKind::I64Keyword => PrimitiveType::I64,
        TokenKind::I128Keyword => PrimitiveType::I128,
        TokenKind::UintKeyword => PrimitiveType::Uint,
        TokenKind::U8Keyword => PrimitiveType::U8,
        TokenKind::U16Keyword => PrimitiveType::U16,
        TokenKind::U32Keyword => PrimitiveType::U32,
        TokenKind::U64Keyword => PrimitiveType::U64,
        TokenKind::U128Keyword => PrimitiveType::U128,
        TokenKind::FloatKeyword => PrimitiveType::Float,
        TokenKind::F32Keyword => PrimitiveType::F32,
        TokenKind::F64Keyword => PrimitiveType::F64,
        TokenKind::StrKeyword => PrimitiveType::Str,
        TokenKind::BoolKeyword => PrimitiveType::Bool,
        TokenKind::AnyKeyword => PrimitiveType::Any,
        TokenKind::NilKeyword => PrimitiveType::Nil,
        _ => return None,
    })
}

// ============================================================================
// Literals
// ============================================================================

/// A numeric literal checked against its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberLiteral<'t> {
    Integer(&'t str),
    Float(&'t str),
    /// Text that does not parse; the caller reports it and uses zero.
    InvalidInteger,
    InvalidFloat,
}

/// Classify number text. A `.` or exponent makes a float; integers must fit
/// in `u64` or `i64`. Valid text is kept as written so no precision is lost.
pub fn classify_number(text: &str) -> NumberLiteral<'_> {
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => NumberLiteral::Float(text),
            _ => NumberLiteral::InvalidFloat,
        }
    } else if text.parse::<u64>().is_ok() || text.parse::<i64>().is_ok() {
        NumberLiteral::Integer(text)
    } else {
        NumberLiteral::InvalidInteger
    }
}

/// Strip the surrounding quotes of a string token and process escapes.
/// Text that is not a properly quoted string is returned unchanged.
pub fn unquote_string(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return Cow::Borrowed(text);
    }
    let quote = bytes[0];
    if (quote != b'"' && quote != b'\'') || bytes[bytes.len() - 1] != quote {
        return Cow::Borrowed(text);
    }
    unescape(&text[1..text.len() - 1])
}

/// Process `\n \t \r \\ \' \" \0 \a \b \f \v`. Unknown escapes keep the
/// backslash.
pub fn unescape(content: &str) -> Cow<'_, str> {
    if !content.contains('\\') {
        return Cow::Borrowed(content);
    }
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('0') => '\0',
            Some('a') => '\x07',
            Some('b') => '\x08',
            Some('f') => '\x0c',
            Some('v') => '\x0b',
            _ => {
                out.push('\\');
                continue;
            }
        };
        chars.next();
        out.push(replacement);
    }
    Cow::Owned(out)
}

/// Literal text of an interpolated string segment. The first segment starts
/// with the opening quote; segments that open an expression end with `{`;
/// the last segment ends with the closing quote.
pub fn interpolation_segment(text: &str, first: bool) -> Cow<'_, str> {
    let mut content = text;
    if first {
        if let Some(rest) = content.strip_prefix(['"', '\'']) {
            content = rest;
        }
    }
    if let Some(rest) = content.strip_suffix('{') {
        content = rest;
    } else if let Some(rest) = content.strip_suffix(['"', '\'']) {
        content = rest;
    }
    unescape(content)
}
