//! Structured diagnostics with source spans.
//!
//! Parsing and validation never log or abort; every problem is
//! collected into a [`Diagnostic`] list returned with the result.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The definition (or part of it) is unusable.
    Error,
    /// The definition works but is suspect.
    Warning,
}

/// A diagnostic message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity of the problem.
    pub severity: Severity,
    /// Byte span into the definition text this diagnostic points at.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }

    /// Shift the span right by `delta` bytes, rebasing a block-relative
    /// diagnostic to document offsets.
    pub fn offset(mut self, delta: usize) -> Self {
        self.span = self.span.start + delta..self.span.end + delta;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

/// Render diagnostics against their source using ariadne.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        // Clamp spans so a diagnostic rebased past a trailing newline
        // can never point outside the source.
        let span = diag.span.start.min(source.len())..diag.span.end.min(source.len());

        let report = Report::build(kind, (filename, span.clone()))
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&diag.message)
                    .with_color(color),
            );

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(0..5, "no table sections found");
        assert_eq!(d.to_string(), "error: no table sections found");
        let w = Diagnostic::warning(0..5, "section \"gems\" has no entries");
        assert_eq!(w.to_string(), "warning: section \"gems\" has no entries");
    }

    #[test]
    fn offset_shifts_span() {
        let d = Diagnostic::warning(3..8, "x").offset(10);
        assert_eq!(d.span, 13..18);
    }

    #[test]
    fn render_produces_output() {
        let source = "output\n  You meet a [stranger].\n";
        let diags = vec![Diagnostic::warning(12..31, "unresolvable reference")];
        let output = render_diagnostics(source, "tables.md", &diags);
        assert!(!output.is_empty());
        assert!(output.contains("unresolvable reference"));
    }
}
