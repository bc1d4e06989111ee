//! Rendering diagnostics for terminals.

use crate::{Diagnostic, DiagnosticCategory};
use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, Severity};
use std::fmt;

/// Adapter giving a [`Diagnostic`] and its source text to miette.
#[derive(Debug, thiserror::Error)]
#[error("{}", .diagnostic.message_text)]
struct SourceReport<'a> {
    diagnostic: &'a Diagnostic,
    source_text: &'a str,
}

impl miette::Diagnostic for SourceReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(format!("LM{}", self.diagnostic.code)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.diagnostic.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
            DiagnosticCategory::Message => Severity::Advice,
        })
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.diagnostic.span.map(|_| &self.source_text as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.diagnostic.span?;
        let start = (span.start as usize).min(self.source_text.len());
        let len = (span.length as usize).min(self.source_text.len() - start);
        let label = LabeledSpan::new(Some("here".to_string()), start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Render a diagnostic as a graphical report with the offending snippet.
pub fn render_report(diagnostic: &Diagnostic, source: &str, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    let report = SourceReport {
        diagnostic,
        source_text: source,
    };
    let mut out = String::new();
    if handler.render_report(&mut out, &report).is_err() {
        return render_plain(diagnostic);
    }
    out
}

/// Render as `file:line:col: error[LMcode]: message` followed by the source line.
pub fn render_plain(diagnostic: &Diagnostic) -> String {
    let mut out = diagnostic.to_string();
    if let Some(ref line) = diagnostic.source_line {
        out.push_str(&format!("\n{:>5} | {}", diagnostic.line, line));
        let pad = diagnostic.column.saturating_sub(1) as usize;
        out.push_str(&format!("\n      | {}^", " ".repeat(pad)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages;
    use limit_core::text::{LineMap, TextSpan};

    fn sample() -> (Diagnostic, &'static str) {
        let source = "fn main() {\n  var x = ;\n}\n";
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
        (diag, source)
    }

    #[test]
    fn test_render_plain_points_at_column() {
        let (diag, _) = sample();
        let text = render_plain(&diag);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "main.lm:2:11: error[LM1000]: Expected expression.");
        assert_eq!(lines[1], "    2 |   var x = ;");
        assert_eq!(lines[2], "      |           ^");
    }

    #[test]
    fn test_render_report_mentions_code_and_message() {
        let (diag, source) = sample();
        let text = render_report(&diag, source, false);
        assert!(text.contains("LM1000"));
        assert!(text.contains("Expected expression."));
        assert!(text.contains("var x = ;"));
    }
}
