//! Operator precedence and token-to-operator mapping.

use limit_ast::{AssignOperator, BinaryOperator, UnaryOperator};
use limit_scanner::TokenKind;

/// Binding strength of infix operators, lowest to highest. `**` and the
/// prefix operators are handled outside the climbing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Equality = 3,
    /// Comparisons and the `..` range operator.
    Relational = 4,
    Additive = 5,
    Multiplicative = 6,
    Invalid = 255,
}

pub fn get_binary_operator_precedence(kind: TokenKind) -> OperatorPrecedence {
    match kind {
        TokenKind::OrKeyword => OperatorPrecedence::LogicalOr,
        TokenKind::AndKeyword => OperatorPrecedence::LogicalAnd,
        TokenKind::EqualsEqualsToken | TokenKind::ExclamationEqualsToken => OperatorPrecedence::Equality,
        TokenKind::LessThanToken
        | TokenKind::LessThanEqualsToken
        | TokenKind::GreaterThanToken
        | TokenKind::GreaterThanEqualsToken
        | TokenKind::DotDotToken => OperatorPrecedence::Relational,
        TokenKind::PlusToken | TokenKind::MinusToken => OperatorPrecedence::Additive,
        TokenKind::AsteriskToken | TokenKind::SlashToken | TokenKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}

pub fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::PlusToken => BinaryOperator::Add,
        TokenKind::MinusToken => BinaryOperator::Subtract,
        TokenKind::AsteriskToken => BinaryOperator::Multiply,
        TokenKind::SlashToken => BinaryOperator::Divide,
        TokenKind::PercentToken => BinaryOperator::Modulo,
        TokenKind::AsteriskAsteriskToken => BinaryOperator::Power,
        TokenKind::EqualsEqualsToken => BinaryOperator::Equal,
        TokenKind::ExclamationEqualsToken => BinaryOperator::NotEqual,
        TokenKind::LessThanToken => BinaryOperator::Less,
        TokenKind::LessThanEqualsToken => BinaryOperator::LessEqual,
        TokenKind::GreaterThanToken => BinaryOperator::Greater,
        TokenKind::GreaterThanEqualsToken => BinaryOperator::GreaterEqual,
        TokenKind::AndKeyword => BinaryOperator::And,
        TokenKind::OrKeyword => BinaryOperator::Or,
        _ => return None,
    })
}

pub fn unary_operator(kind: TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::ExclamationToken => Some(UnaryOperator::Not),
        TokenKind::MinusToken => Some(UnaryOperator::Negate),
        TokenKind::PlusToken => Some(UnaryOperator::Plus),
        _ => None,
    }
}

pub fn assign_operator(kind: TokenKind) -> Option<AssignOperator> {
    match kind {
        TokenKind::EqualsToken => Some(AssignOperator::Assign),
        TokenKind::PlusEqualsToken => Some(AssignOperator::AddAssign),
        TokenKind::MinusEqualsToken => Some(AssignOperator::SubtractAssign),
        TokenKind::AsteriskEqualsToken => Some(AssignOperator::MultiplyAssign),
        TokenKind::SlashEqualsToken => Some(AssignOperator::DivideAssign),
        TokenKind::PercentEqualsToken => Some(AssignOperator::ModuloAssign),
        _ => None,
    }
}
