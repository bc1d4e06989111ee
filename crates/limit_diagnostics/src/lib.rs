//! limit_diagnostics: Diagnostic messages and error reporting.
//!
//! Every problem found while scanning or parsing a `.lm` file becomes a
//! [`Diagnostic`]: a coded message plus the 1-based line, column and the
//! literal source line it points at. Diagnostics are collected in order of
//! discovery in a [`DiagnosticCollection`].

mod report;

pub use report::{render_plain, render_report};

use limit_core::text::{LineMap, TextSpan};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip)]
    pub span: Option<TextSpan>,
    /// 1-based; 0 when the diagnostic has no location.
    pub line: u32,
    /// 1-based, counted in characters; 0 when the diagnostic has no location.
    pub column: u32,
    /// The full text of the offending line, for context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    #[serde(rename = "message")]
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic without location.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            line: 0,
            column: 0,
            source_line: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// A diagnostic pointing at `span` in `source`. Line, column and the
    /// source line are derived from the span start.
    pub fn with_location(
        file: &str,
        source: &str,
        line_map: &LineMap,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        let position = line_map.line_and_column_of(source, span.start);
        Self {
            file: Some(file.to_string()),
            span: Some(span),
            line: position.line,
            column: position.column,
            source_line: line_map.line_text(source, position.line).map(str::to_string),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Append a further explanation on its own line.
    pub fn with_note(mut self, note: &str) -> Self {
        self.message_text.push('\n');
        self.message_text.push_str(note);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}: ", file, self.line, self.column)?;
        }
        write!(f, "{}[LM{}]: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, ... in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics in order of discovery.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Drop diagnostics recorded after the first `len`; used when a
    /// speculative parse is rolled back.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    /// Order by file, then source position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.span.map(|s| s.start).cmp(&b.span.map(|s| s.start)))
        });
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Diagnostic messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Syntax errors (1000-1099)
    // ========================================================================
    pub const EXPECTED_EXPRESSION: DiagnosticMessage = diag!(1000, Error, "Expected expression.");
    pub const EXPECTED_0: DiagnosticMessage = diag!(1001, Error, "Expected {0}.");
    pub const EXPECTED_0_AFTER_1: DiagnosticMessage = diag!(1002, Error, "Expected '{0}' after {1}.");
    pub const EXPECTED_0_BEFORE_1: DiagnosticMessage = diag!(1003, Error, "Expected '{0}' before {1}.");
    pub const UNEXPECTED_CLOSING_BRACE: DiagnosticMessage = diag!(1004, Error, "Unexpected closing brace '}'.");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(1005, Error, "Invalid assignment target.");
    pub const INVALID_TUPLE_INDEX: DiagnosticMessage = diag!(1006, Error, "Invalid tuple index.");
    pub const INVALID_INTEGER_FORMAT: DiagnosticMessage = diag!(1007, Error, "Invalid integer format: {0}");
    pub const INVALID_FLOAT_FORMAT: DiagnosticMessage = diag!(1008, Error, "Invalid floating-point number format: {0}");
    pub const EXPECTED_PATTERN: DiagnosticMessage = diag!(1009, Error, "Expected pattern in match case.");
    pub const EXPECTED_TYPE: DiagnosticMessage = diag!(1010, Error, "Expected type.");
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: DiagnosticMessage = diag!(1011, Error, "Maximum nesting depth exceeded.");
    pub const EXPECTED_STRING_AFTER_INTERPOLATION: DiagnosticMessage = diag!(1012, Error, "Expected string continuation after interpolated expression.");
    /// Carries a fully formatted message that has no dedicated code.
    pub const SYNTAX_ERROR: DiagnosticMessage = diag!(1099, Error, "{0}");

    // ========================================================================
    // Scanner errors (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!(1100, Error, "Unexpected character '{0}'.");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(1101, Error, "Unterminated string.");
    pub const UNTERMINATED_BLOCK_COMMENT: DiagnosticMessage = diag!(1102, Error, "Unterminated block comment.");
    pub const UNTERMINATED_INTERPOLATION: DiagnosticMessage = diag!(1103, Error, "Unterminated string interpolation.");

    // ========================================================================
    // Declaration and statement shape errors (1200-1299)
    // ========================================================================
    pub const EXPECTED_CLASS_MEMBER: DiagnosticMessage = diag!(1200, Error, "Expected class member declaration.");
    pub const EXPECTED_COLON_AFTER_FIELD_NAME: DiagnosticMessage = diag!(1201, Error, "Expected ':' after field name in class member declaration.");
    pub const EXPECTED_METHOD_IN_TRAIT: DiagnosticMessage = diag!(1202, Error, "Expected method declaration in trait.");
    pub const EXPECTED_METHOD_IN_INTERFACE: DiagnosticMessage = diag!(1203, Error, "Expected method declaration in interface.");
    pub const UNKNOWN_PARAMETER: DiagnosticMessage = diag!(1204, Error, "Unknown parameter: {0}");
    pub const EXPECTED_IN_AFTER_LOOP_VARIABLE: DiagnosticMessage = diag!(1205, Error, "Expected 'in' after loop variable.");
    pub const EXPECTED_ITER_VARIABLE: DiagnosticMessage = diag!(1206, Error, "Expected variable name or identifier after 'iter ('.");
    pub const EXPECTED_PARAMETER_VALUE: DiagnosticMessage = diag!(1207, Error, "Expected parameter value for '{0}'.");
    pub const UNSUPPORTED_STATEMENT_OUTSIDE_CONCURRENT: DiagnosticMessage = diag!(1208, Warning, "'{0}' is only a statement inside a parallel or concurrent block.");

    // ========================================================================
    // Recovery and limits (1300-1399)
    // ========================================================================
    pub const TOO_MANY_ERRORS: DiagnosticMessage = diag!(1300, Error, "Too many errors ({0}); parsing stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("Expected '{0}' after {1}.", &["}", "block"]),
            "Expected '}' after block."
        );
        assert_eq!(format_message("no placeholders", &["x"]), "no placeholders");
    }

    #[test]
    fn test_diagnostic_location() {
        let source = "var a = 1\nvar b = ;\n";
        let map = LineMap::new(source);
        let at = source.find(';').unwrap() as u32;
        let diag = Diagnostic::with_location(
            "main.lm",
            source,
            &map,
            TextSpan::new(at, 1),
            &messages::EXPECTED_EXPRESSION,
            &[],
        );
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 9);
        assert_eq!(diag.source_line.as_deref(), Some("var b = ;"));
        assert_eq!(diag.code, 1000);
        assert_eq!(diag.to_string(), "main.lm:2:9: error[LM1000]: Expected expression.");
    }

    #[test]
    fn test_diagnostic_with_note() {
        let diag = Diagnostic::new(&messages::EXPECTED_0_AFTER_1, &["}", "block"])
            .with_note("Caused by: something");
        assert_eq!(diag.message_text, "Expected '}' after block.\nCaused by: something");
        assert!(diag.is_error());
    }

    #[test]
    fn test_collection_truncate_and_count() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());
        collection.add(Diagnostic::new(&messages::EXPECTED_EXPRESSION, &[]));
        collection.add(Diagnostic::new(&messages::UNSUPPORTED_STATEMENT_OUTSIDE_CONCURRENT, &["task"]));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.error_count(), 1);
        collection.truncate(1);
        assert_eq!(collection.len(), 1);
        assert!(collection.has_errors());
    }

    #[test]
    fn test_collection_sort() {
        let source = "a\nb\nc";
        let map = LineMap::new(source);
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::with_location("b.lm", source, &map, TextSpan::new(2, 1), &messages::EXPECTED_TYPE, &[]));
        collection.add(Diagnostic::with_location("a.lm", source, &map, TextSpan::new(4, 1), &messages::EXPECTED_TYPE, &[]));
        collection.add(Diagnostic::with_location("a.lm", source, &map, TextSpan::new(0, 1), &messages::EXPECTED_TYPE, &[]));
        collection.sort();
        let order: Vec<_> = collection
            .diagnostics()
            .iter()
            .map(|d| (d.file.as_deref().unwrap_or(""), d.line))
            .collect();
        assert_eq!(order, vec![("a.lm", 1), ("a.lm", 3), ("b.lm", 2)]);
    }

    #[test]
    fn test_serialize_json() {
        let diag = Diagnostic::new(&messages::UNKNOWN_PARAMETER, &["speed"]);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["message"], "Unknown parameter: speed");
        assert_eq!(json["category"], "error");
        assert_eq!(json["code"], 1204);
        assert!(json.get("file").is_none());
    }
}
