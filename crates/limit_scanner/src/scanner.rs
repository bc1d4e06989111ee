//! The Limit scanner.
//!
//! Converts source text into a token array. Each significant token owns the
//! trivia around it: trailing trivia runs to the end of its line (excluding
//! the newline), everything else becomes leading trivia of the next token.
//! The final `EndOfFileToken` holds any trivia left at the end of input.

use crate::token::Token;
use crate::token_kind::TokenKind;
use limit_core::text::{LineMap, TextSpan};
use limit_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Scan `source` with an anonymous file name.
pub fn scan(source: &str) -> (Vec<Token>, DiagnosticCollection) {
    Scanner::new(source).scan_tokens()
}

/// An open `{` inside a string literal.
struct Interpolation {
    quote: u8,
    /// Unmatched `{` seen inside the embedded expression.
    depth: u32,
}

pub struct Scanner<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    file_name: String,
    line_map: LineMap,
    interpolations: Vec<Interpolation>,
    /// Set right after an `InterpolationEnd`; the next token continues the string.
    resume_string: Option<u8>,
    diagnostics: DiagnosticCollection,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            file_name: String::new(),
            line_map: LineMap::new(source),
            interpolations: Vec::new(),
            resume_string: None,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Scan the whole input. The returned array always ends with an
    /// `EndOfFileToken`.
    pub fn scan_tokens(mut self) -> (Vec<Token>, DiagnosticCollection) {
        let mut tokens = Vec::new();
        loop {
            if self.resume_string.is_some() && self.is_eof() {
                self.resume_string = None;
                self.report(self.pos, 0, &messages::UNTERMINATED_STRING, &[]);
            }
            let leading = if self.resume_string.is_some() {
                Vec::new()
            } else {
                self.scan_trivia(true)
            };
            if self.is_eof() {
                if !self.interpolations.is_empty() {
                    self.report(self.pos, 0, &messages::UNTERMINATED_INTERPOLATION, &[]);
                }
                let eof = self.make_token(TokenKind::EndOfFileToken, self.pos);
                tokens.push(eof.with_leading_trivia(leading));
                break;
            }
            let token = self.scan_token().with_leading_trivia(leading);
            let token = if self.resume_string.is_none() {
                let trailing = self.scan_trivia(false);
                token.with_trailing_trivia(trailing)
            } else {
                token
            };
            tokens.push(token);
        }
        (tokens, self.diagnostics)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    /// Token covering `start..self.pos`.
    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        let text = self.source.get(start..self.pos).unwrap_or("");
        Token::new(kind, text, self.line_map.line_of(start as u32), start as u32)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.pos += 1;
        self.make_token(kind, start)
    }

    /// One of `kind1` (one byte) or, if followed by `second`, `kind2` (two bytes).
    fn either(&mut self, second: u8, kind2: TokenKind, kind1: TokenKind) -> Token {
        let start = self.pos;
        if self.byte_at(1) == Some(second) {
            self.pos += 2;
            self.make_token(kind2, start)
        } else {
            self.pos += 1;
            self.make_token(kind1, start)
        }
    }

    fn report(&mut self, pos: usize, len: usize, message: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::new(pos as u32, len as u32);
        self.diagnostics.add(Diagnostic::with_location(
            &self.file_name,
            self.source,
            &self.line_map,
            span,
            message,
            args,
        ));
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Scan a run of trivia. With `multiline == false` the run stops before
    /// the first newline.
    fn scan_trivia(&mut self, multiline: bool) -> Vec<Token> {
        let mut trivia = Vec::new();
        while let Some(byte) = self.byte_at(0) {
            let start = self.pos;
            let kind = match byte {
                b'\n' | b'\r' => {
                    if !multiline {
                        break;
                    }
                    self.pos += if byte == b'\r' && self.byte_at(1) == Some(b'\n') { 2 } else { 1 };
                    TokenKind::NewLineTrivia
                }
                b'/' if self.byte_at(1) == Some(b'/') => {
                    let rest = &self.bytes[self.pos..];
                    let mut len = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
                    if len > 0 && rest[len - 1] == b'\r' {
                        len -= 1;
                    }
                    self.pos += len;
                    TokenKind::SingleLineCommentTrivia
                }
                b'/' if self.byte_at(1) == Some(b'*') => {
                    let body = &self.bytes[self.pos + 2..];
                    match memchr::memmem::find(body, b"*/") {
                        Some(close) => self.pos += close + 4,
                        None => {
                            self.report(start, 2, &messages::UNTERMINATED_BLOCK_COMMENT, &[]);
                            self.pos = self.bytes.len();
                        }
                    }
                    TokenKind::MultiLineCommentTrivia
                }
                _ => {
                    while let Some(c) = self.current_char() {
                        if c == '\n' || c == '\r' || !c.is_whitespace() {
                            break;
                        }
                        self.pos += c.len_utf8();
                    }
                    if self.pos == start {
                        break;
                    }
                    TokenKind::WhitespaceTrivia
                }
            };
            trivia.push(self.make_token(kind, start));
        }
        trivia
    }

    // ========================================================================
    // Significant tokens
    // ========================================================================

    fn scan_token(&mut self) -> Token {
        if let Some(quote) = self.resume_string.take() {
            return self.scan_string(quote, self.pos);
        }

        let start = self.pos;
        let byte = self.bytes[self.pos];
        match byte {
            b'(' => self.single(TokenKind::OpenParenToken),
            b')' => self.single(TokenKind::CloseParenToken),
            b'[' => self.single(TokenKind::OpenBracketToken),
            b']' => self.single(TokenKind::CloseBracketToken),
            b',' => self.single(TokenKind::CommaToken),
            b':' => self.single(TokenKind::ColonToken),
            b';' => self.single(TokenKind::SemicolonToken),
            b'?' => self.single(TokenKind::QuestionToken),
            b'@' => self.single(TokenKind::AtToken),
            b'|' => self.single(TokenKind::BarToken),
            b'&' => self.single(TokenKind::AmpersandToken),
            b'^' => self.single(TokenKind::CaretToken),
            b'~' => self.single(TokenKind::TildeToken),
            b'{' => {
                if let Some(open) = self.interpolations.last_mut() {
                    open.depth += 1;
                }
                self.single(TokenKind::OpenBraceToken)
            }
            b'}' => self.scan_close_brace(),
            b'.' => {
                if self.byte_at(1) == Some(b'.') {
                    let len = if self.byte_at(2) == Some(b'.') { 3 } else { 2 };
                    self.pos += len;
                    let kind = if len == 3 { TokenKind::DotDotDotToken } else { TokenKind::DotDotToken };
                    self.make_token(kind, start)
                } else {
                    self.single(TokenKind::DotToken)
                }
            }
            b'-' if self.byte_at(1) == Some(b'>') => {
                self.pos += 2;
                self.make_token(TokenKind::ArrowToken, start)
            }
            b'-' => self.either(b'=', TokenKind::MinusEqualsToken, TokenKind::MinusToken),
            b'=' if self.byte_at(1) == Some(b'>') => {
                self.pos += 2;
                self.make_token(TokenKind::ArrowToken, start)
            }
            b'=' => self.either(b'=', TokenKind::EqualsEqualsToken, TokenKind::EqualsToken),
            b'*' if self.byte_at(1) == Some(b'*') => {
                self.pos += 2;
                self.make_token(TokenKind::AsteriskAsteriskToken, start)
            }
            b'*' => self.either(b'=', TokenKind::AsteriskEqualsToken, TokenKind::AsteriskToken),
            b'+' => self.either(b'=', TokenKind::PlusEqualsToken, TokenKind::PlusToken),
            b'/' => self.either(b'=', TokenKind::SlashEqualsToken, TokenKind::SlashToken),
            b'%' => self.either(b'=', TokenKind::PercentEqualsToken, TokenKind::PercentToken),
            b'!' => self.either(b'=', TokenKind::ExclamationEqualsToken, TokenKind::ExclamationToken),
            b'>' => self.either(b'=', TokenKind::GreaterThanEqualsToken, TokenKind::GreaterThanToken),
            b'<' => self.either(b'=', TokenKind::LessThanEqualsToken, TokenKind::LessThanToken),
            b'"' | b'\'' => {
                self.pos += 1;
                self.scan_string(byte, start)
            }
            b'0'..=b'9' => self.scan_number(),
            _ => match self.current_char() {
                Some(c) if is_identifier_start(c) => self.scan_identifier(),
                Some(c) => {
                    self.pos += c.len_utf8();
                    let text = c.to_string();
                    self.report(start, c.len_utf8(), &messages::UNEXPECTED_CHARACTER, &[&text]);
                    self.make_token(TokenKind::Unknown, start)
                }
                None => self.single(TokenKind::Unknown),
            },
        }
    }

    fn scan_close_brace(&mut self) -> Token {
        if let Some(open) = self.interpolations.last_mut() {
            if open.depth == 0 {
                let quote = open.quote;
                self.interpolations.pop();
                self.resume_string = Some(quote);
                return self.single(TokenKind::InterpolationEnd);
            }
            open.depth -= 1;
        }
        self.single(TokenKind::CloseBraceToken)
    }

    /// Scan string content from the current position. `start` is where the
    /// token begins: the opening quote, or just after an interpolation's `}`.
    fn scan_string(&mut self, quote: u8, start: usize) -> Token {
        loop {
            match self.byte_at(0) {
                None => {
                    self.report(start, self.pos - start, &messages::UNTERMINATED_STRING, &[]);
                    return self.make_token(TokenKind::Unknown, start);
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return self.make_token(TokenKind::StringLiteral, start);
                }
                Some(b'\\') => {
                    self.pos += if self.byte_at(1).is_some() { 2 } else { 1 };
                }
                Some(b'{') if self.brace_opens_interpolation(quote) => {
                    self.pos += 1;
                    self.interpolations.push(Interpolation { quote, depth: 0 });
                    return self.make_token(TokenKind::InterpolationStart, start);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// A `{` inside a string starts an interpolation when what follows, up to
    /// the closing brace or quote, is more than digits, commas and spaces.
    /// `"{2,3}"` therefore stays literal text.
    fn brace_opens_interpolation(&self, quote: u8) -> bool {
        self.bytes[self.pos + 1..]
            .iter()
            .take_while(|&&b| b != b'}' && b != quote)
            .any(|&b| !(b.is_ascii_digit() || b == b',' || b == b' '))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.skip_digits();
        if self.byte_at(0) == Some(b'.') && self.byte_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.byte_at(0) {
            let sign = matches!(self.byte_at(1), Some(b'+' | b'-')) as usize;
            if self.byte_at(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.skip_digits();
            }
        }
        self.make_token(TokenKind::NumberLiteral, start)
    }

    fn skip_digits(&mut self) {
        while self.byte_at(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if self.pos > start && !is_identifier_part(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        let text = &self.source[start..self.pos];
        let kind = TokenKind::from_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && unicode_xid::UnicodeXID::is_xid_start(ch))
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (!ch.is_ascii() && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_scan_punctuation() {
        assert_eq!(
            kinds("( ) { } [ ] , . .. ... : ; ? @"),
            vec![
                TokenKind::OpenParenToken,
                TokenKind::CloseParenToken,
                TokenKind::OpenBraceToken,
                TokenKind::CloseBraceToken,
                TokenKind::OpenBracketToken,
                TokenKind::CloseBracketToken,
                TokenKind::CommaToken,
                TokenKind::DotToken,
                TokenKind::DotDotToken,
                TokenKind::DotDotDotToken,
                TokenKind::ColonToken,
                TokenKind::SemicolonToken,
                TokenKind::QuestionToken,
                TokenKind::AtToken,
                TokenKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_scan_arrows() {
        assert_eq!(
            kinds("-> => - = -= =="),
            vec![
                TokenKind::ArrowToken,
                TokenKind::ArrowToken,
                TokenKind::MinusToken,
                TokenKind::EqualsToken,
                TokenKind::MinusEqualsToken,
                TokenKind::EqualsEqualsToken,
                TokenKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_scan_range_after_number() {
        assert_eq!(
            kinds("1..10"),
            vec![
                TokenKind::NumberLiteral,
                TokenKind::DotDotToken,
                TokenKind::NumberLiteral,
                TokenKind::EndOfFileToken,
            ]
        );
    }

    #[test]
    fn test_trivia_split() {
        let (tokens, _) = scan("a // c\n  b");
        assert_eq!(tokens[0].text, "a");
        let trailing: Vec<_> = tokens[0].trailing_trivia.iter().map(|t| t.kind).collect();
        assert_eq!(trailing, vec![TokenKind::WhitespaceTrivia, TokenKind::SingleLineCommentTrivia]);
        let leading: Vec<_> = tokens[1].leading_trivia.iter().map(|t| t.kind).collect();
        assert_eq!(leading, vec![TokenKind::NewLineTrivia, TokenKind::WhitespaceTrivia]);
        assert!(tokens[1].has_preceding_line_break());
        assert_eq!(tokens[1].line, 2);
    }
}
