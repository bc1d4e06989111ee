//! TokenKind enum: every token the Limit scanner can produce.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TokenKind {
    // ========================================================================
    // Special
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // ========================================================================
    // Trivia
    // ========================================================================
    WhitespaceTrivia,
    NewLineTrivia,
    SingleLineCommentTrivia,
    MultiLineCommentTrivia,

    // ========================================================================
    // Literals and names
    // ========================================================================
    Identifier,
    NumberLiteral,
    StringLiteral,
    /// A string segment ending in `{` that opens an embedded expression.
    InterpolationStart,
    /// The `}` closing an embedded expression.
    InterpolationEnd,

    // ========================================================================
    // Punctuation
    // ========================================================================
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    OpenBracketToken,
    CloseBracketToken,
    CommaToken,
    DotToken,
    DotDotToken,
    DotDotDotToken,
    ColonToken,
    SemicolonToken,
    QuestionToken,
    AtToken,
    /// Both `->` and `=>`.
    ArrowToken,

    // ========================================================================
    // Operators
    // ========================================================================
    PlusToken,
    PlusEqualsToken,
    MinusToken,
    MinusEqualsToken,
    AsteriskToken,
    AsteriskEqualsToken,
    AsteriskAsteriskToken,
    SlashToken,
    SlashEqualsToken,
    PercentToken,
    PercentEqualsToken,
    ExclamationToken,
    ExclamationEqualsToken,
    EqualsToken,
    EqualsEqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    BarToken,
    AmpersandToken,
    CaretToken,
    TildeToken,

    // ========================================================================
    // Keywords
    // ========================================================================
    AbstractKeyword,
    AndKeyword,
    AsKeyword,
    BreakKeyword,
    ClassKeyword,
    ComptimeKeyword,
    ConcurrentKeyword,
    ConstKeyword,
    ContinueKeyword,
    ContractKeyword,
    DataKeyword,
    DefaultKeyword,
    ElifKeyword,
    ElseKeyword,
    EnumKeyword,
    ErrKeyword,
    FalseKeyword,
    FinalKeyword,
    FnKeyword,
    ForKeyword,
    HideKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InterfaceKeyword,
    IterKeyword,
    MatchKeyword,
    ModuleKeyword,
    NilKeyword,
    OkKeyword,
    OpenKeyword,
    OrKeyword,
    ParallelKeyword,
    PrintKeyword,
    PrivateKeyword,
    ProtKeyword,
    ProtectedKeyword,
    PubKeyword,
    PublicKeyword,
    ReturnKeyword,
    SelfKeyword,
    ShowKeyword,
    StaticKeyword,
    SuperKeyword,
    ThisKeyword,
    TraitKeyword,
    TrueKeyword,
    TypeKeyword,
    UnsafeKeyword,
    ValKeyword,
    VarKeyword,
    WhereKeyword,
    WhileKeyword,

    // ========================================================================
    // Type keywords
    // ========================================================================
    IntKeyword,
    I8Keyword,
    I16Keyword,
    I32Keyword,
    I64Keyword,
    I128Keyword,
    UintKeyword,
    U8Keyword,
    U16Keyword,
    U32Keyword,
    U64Keyword,
    U128Keyword,
    FloatKeyword,
    F32Keyword,
    F64Keyword,
    StrKeyword,
    BoolKeyword,
    AnyKeyword,
    ListKeyword,
    DictKeyword,
    ArrayKeyword,
    OptionKeyword,
    FunctionKeyword,
}

impl TokenKind {
    pub const FIRST_TRIVIA: TokenKind = TokenKind::WhitespaceTrivia;
    pub const LAST_TRIVIA: TokenKind = TokenKind::MultiLineCommentTrivia;
    pub const FIRST_PUNCTUATION: TokenKind = TokenKind::OpenParenToken;
    pub const LAST_PUNCTUATION: TokenKind = TokenKind::TildeToken;
    pub const FIRST_KEYWORD: TokenKind = TokenKind::AbstractKeyword;
    pub const LAST_KEYWORD: TokenKind = TokenKind::FunctionKeyword;
    pub const FIRST_TYPE_KEYWORD: TokenKind = TokenKind::IntKeyword;
    pub const LAST_TYPE_KEYWORD: TokenKind = TokenKind::FunctionKeyword;
}

impl TokenKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        self >= Self::FIRST_TRIVIA && self <= Self::LAST_TRIVIA
    }

    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::SingleLineCommentTrivia | TokenKind::MultiLineCommentTrivia)
    }

    #[inline]
    pub fn is_punctuation(self) -> bool {
        self >= Self::FIRST_PUNCTUATION && self <= Self::LAST_PUNCTUATION
    }

    /// Keywords, including the type keywords.
    #[inline]
    pub fn is_keyword(self) -> bool {
        self >= Self::FIRST_KEYWORD && self <= Self::LAST_KEYWORD
    }

    /// `int`, `i8` ... `u128`, `float`, `f32`, `f64`, `str`, `bool`, `any`.
    #[inline]
    pub fn is_primitive_type(self) -> bool {
        self >= Self::FIRST_TYPE_KEYWORD && self <= TokenKind::AnyKeyword
    }

    /// Any keyword that can begin a type.
    #[inline]
    pub fn is_type_keyword(self) -> bool {
        self >= Self::FIRST_TYPE_KEYWORD && self <= Self::LAST_TYPE_KEYWORD
    }

    /// Tokens usable where a name is expected: identifiers and keywords.
    #[inline]
    pub fn is_word(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }

    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::EqualsToken
                | TokenKind::PlusEqualsToken
                | TokenKind::MinusEqualsToken
                | TokenKind::AsteriskEqualsToken
                | TokenKind::SlashEqualsToken
                | TokenKind::PercentEqualsToken
        )
    }

    pub fn keyword_text(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::AbstractKeyword => "abstract",
            TokenKind::AndKeyword => "and",
            TokenKind::AsKeyword => "as",
            TokenKind::BreakKeyword => "break",
            TokenKind::ClassKeyword => "class",
            TokenKind::ComptimeKeyword => "comptime",
            TokenKind::ConcurrentKeyword => "concurrent",
            TokenKind::ConstKeyword => "const",
            TokenKind::ContinueKeyword => "continue",
            TokenKind::ContractKeyword => "contract",
            TokenKind::DataKeyword => "data",
            TokenKind::DefaultKeyword => "default",
            TokenKind::ElifKeyword => "elif",
            TokenKind::ElseKeyword => "else",
            TokenKind::EnumKeyword => "enum",
            TokenKind::ErrKeyword => "err",
            TokenKind::FalseKeyword => "false",
            TokenKind::FinalKeyword => "final",
            TokenKind::FnKeyword => "fn",
            TokenKind::ForKeyword => "for",
            TokenKind::HideKeyword => "hide",
            TokenKind::IfKeyword => "if",
            TokenKind::ImportKeyword => "import",
            TokenKind::InKeyword => "in",
            TokenKind::InterfaceKeyword => "interface",
            TokenKind::IterKeyword => "iter",
            TokenKind::MatchKeyword => "match",
            TokenKind::ModuleKeyword => "module",
            TokenKind::NilKeyword => "nil",
            TokenKind::OkKeyword => "ok",
            TokenKind::OpenKeyword => "open",
            TokenKind::OrKeyword => "or",
            TokenKind::ParallelKeyword => "parallel",
            TokenKind::PrintKeyword => "print",
            TokenKind::PrivateKeyword => "private",
            TokenKind::ProtKeyword => "prot",
            TokenKind::ProtectedKeyword => "protected",
            TokenKind::PubKeyword => "pub",
            TokenKind::PublicKeyword => "public",
            TokenKind::ReturnKeyword => "return",
            TokenKind::SelfKeyword => "self",
            TokenKind::ShowKeyword => "show",
            TokenKind::StaticKeyword => "static",
            TokenKind::SuperKeyword => "super",
            TokenKind::ThisKeyword => "this",
            TokenKind::TraitKeyword => "trait",
            TokenKind::TrueKeyword => "true",
            TokenKind::TypeKeyword => "type",
            TokenKind::UnsafeKeyword => "unsafe",
            TokenKind::ValKeyword => "val",
            TokenKind::VarKeyword => "var",
            TokenKind::WhereKeyword => "where",
            TokenKind::WhileKeyword => "while",
            TokenKind::IntKeyword => "int",
            TokenKind::I8Keyword => "i8",
            TokenKind::I16Keyword => "i16",
            TokenKind::I32Keyword => "i32",
            TokenKind::I64Keyword => "i64",
            TokenKind::I128Keyword => "i128",
            TokenKind::UintKeyword => "uint",
            TokenKind::U8Keyword => "u8",
            TokenKind::U16Keyword => "u16",
            TokenKind::U32Keyword => "u32",
            TokenKind::U64Keyword => "u64",
            TokenKind::U128Keyword => "u128",
            TokenKind::FloatKeyword => "float",
            TokenKind::F32Keyword => "f32",
            TokenKind::F64Keyword => "f64",
            TokenKind::StrKeyword => "str",
            TokenKind::BoolKeyword => "bool",
            TokenKind::AnyKeyword => "any",
            TokenKind::ListKeyword => "list",
            TokenKind::DictKeyword => "dict",
            TokenKind::ArrayKeyword => "array",
            TokenKind::OptionKeyword => "option",
            TokenKind::FunctionKeyword => "function",
            _ => return None,
        })
    }

    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "abstract" => TokenKind::AbstractKeyword,
            "and" => TokenKind::AndKeyword,
            "as" => TokenKind::AsKeyword,
            "break" => TokenKind::BreakKeyword,
            "class" => TokenKind::ClassKeyword,
            "comptime" => TokenKind::ComptimeKeyword,
            "concurrent" => TokenKind::ConcurrentKeyword,
            "const" => TokenKind::ConstKeyword,
            "continue" => TokenKind::ContinueKeyword,
            "contract" => TokenKind::ContractKeyword,
            "data" => TokenKind::DataKeyword,
            "default" | "_" => TokenKind::DefaultKeyword,
            "elif" => TokenKind::ElifKeyword,
            "else" => TokenKind::ElseKeyword,
            "enum" => TokenKind::EnumKeyword,
            "err" => TokenKind::ErrKeyword,
            "false" => TokenKind::FalseKeyword,
            "final" => TokenKind::FinalKeyword,
            "fn" => TokenKind::FnKeyword,
            "for" => TokenKind::ForKeyword,
            "hide" => TokenKind::HideKeyword,
            "if" => TokenKind::IfKeyword,
            "import" => TokenKind::ImportKeyword,
            "in" => TokenKind::InKeyword,
            "interface" => TokenKind::InterfaceKeyword,
            "iter" => TokenKind::IterKeyword,
            "match" => TokenKind::MatchKeyword,
            "module" => TokenKind::ModuleKeyword,
            "nil" => TokenKind::NilKeyword,
            "ok" => TokenKind::OkKeyword,
            "open" => TokenKind::OpenKeyword,
            "or" => TokenKind::OrKeyword,
            "parallel" => TokenKind::ParallelKeyword,
            "print" => TokenKind::PrintKeyword,
            "private" => TokenKind::PrivateKeyword,
            "prot" => TokenKind::ProtKeyword,
            "protected" => TokenKind::ProtectedKeyword,
            "pub" => TokenKind::PubKeyword,
            "public" => TokenKind::PublicKeyword,
            "return" => TokenKind::ReturnKeyword,
            "self" => TokenKind::SelfKeyword,
            "show" => TokenKind::ShowKeyword,
            "static" => TokenKind::StaticKeyword,
            "super" => TokenKind::SuperKeyword,
            "this" => TokenKind::ThisKeyword,
            "trait" => TokenKind::TraitKeyword,
            "true" => TokenKind::TrueKeyword,
            "type" => TokenKind::TypeKeyword,
            "unsafe" => TokenKind::UnsafeKeyword,
            "val" => TokenKind::ValKeyword,
            "var" => TokenKind::VarKeyword,
            "where" => TokenKind::WhereKeyword,
            "while" => TokenKind::WhileKeyword,
            "int" => TokenKind::IntKeyword,
            "i8" => TokenKind::I8Keyword,
            "i16" => TokenKind::I16Keyword,
            "i32" => TokenKind::I32Keyword,
            "i64" => TokenKind::I64Keyword,
            "i128" => TokenKind::I128Keyword,
            "uint" => TokenKind::UintKeyword,
            "u8" => TokenKind::U8Keyword,
            "u16" => TokenKind::U16Keyword,
            "u32" => TokenKind::U32Keyword,
            "u64" => TokenKind::U64Keyword,
            "u128" => TokenKind::U128Keyword,
            "float" => TokenKind::FloatKeyword,
            "f32" => TokenKind::F32Keyword,
            "f64" => TokenKind::F64Keyword,
            "str" => TokenKind::StrKeyword,
            "bool" => TokenKind::BoolKeyword,
            "any" => TokenKind::AnyKeyword,
            "list" => TokenKind::ListKeyword,
            "dict" => TokenKind::DictKeyword,
            "array" => TokenKind::ArrayKeyword,
            "option" => TokenKind::OptionKeyword,
            "function" => TokenKind::FunctionKeyword,
            _ => return None,
        })
    }

    /// Source text of fixed punctuation and operator tokens. `->` and `=>`
    /// share a kind; `->` is reported.
    pub fn punctuation_text(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::OpenParenToken => "(",
            TokenKind::CloseParenToken => ")",
            TokenKind::OpenBraceToken => "{",
            TokenKind::CloseBraceToken => "}",
            TokenKind::OpenBracketToken => "[",
            TokenKind::CloseBracketToken => "]",
            TokenKind::CommaToken => ",",
            TokenKind::DotToken => ".",
            TokenKind::DotDotToken => "..",
            TokenKind::DotDotDotToken => "...",
            TokenKind::ColonToken => ":",
            TokenKind::SemicolonToken => ";",
            TokenKind::QuestionToken => "?",
            TokenKind::AtToken => "@",
            TokenKind::ArrowToken => "->",
            TokenKind::PlusToken => "+",
            TokenKind::PlusEqualsToken => "+=",
            TokenKind::MinusToken => "-",
            TokenKind::MinusEqualsToken => "-=",
            TokenKind::AsteriskToken => "*",
            TokenKind::AsteriskEqualsToken => "*=",
            TokenKind::AsteriskAsteriskToken => "**",
            TokenKind::SlashToken => "/",
            TokenKind::SlashEqualsToken => "/=",
            TokenKind::PercentToken => "%",
            TokenKind::PercentEqualsToken => "%=",
            TokenKind::ExclamationToken => "!",
            TokenKind::ExclamationEqualsToken => "!=",
            TokenKind::EqualsToken => "=",
            TokenKind::EqualsEqualsToken => "==",
            TokenKind::GreaterThanToken => ">",
            TokenKind::GreaterThanEqualsToken => ">=",
            TokenKind::LessThanToken => "<",
            TokenKind::LessThanEqualsToken => "<=",
            TokenKind::BarToken => "|",
            TokenKind::AmpersandToken => "&",
            TokenKind::CaretToken => "^",
            TokenKind::TildeToken => "~",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["and", "elif", "parallel", "comptime", "self", "data", "u128", "function"] {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.keyword_text(), Some(word));
        }
    }

    #[test]
    fn test_classification() {
        assert!(TokenKind::NewLineTrivia.is_trivia());
        assert!(!TokenKind::Identifier.is_trivia());
        assert!(TokenKind::I128Keyword.is_primitive_type());
        assert!(!TokenKind::ListKeyword.is_primitive_type());
        assert!(TokenKind::ListKeyword.is_type_keyword());
        assert!(TokenKind::VarKeyword.is_word());
        assert!(TokenKind::ArrowToken.is_punctuation());
        assert!(TokenKind::PercentEqualsToken.is_assignment_operator());
        assert_eq!(TokenKind::from_keyword("_"), Some(TokenKind::DefaultKeyword));
        assert_eq!(TokenKind::from_keyword("result"), None);
    }
}
