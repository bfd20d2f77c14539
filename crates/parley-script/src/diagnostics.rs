use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::fmt;
use std::ops::Range;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The script cannot be used as written.
    Error,
    /// Something was skipped; the rest of the script still loads.
    Warning,
}

impl Severity {
    fn report_kind(self) -> ReportKind<'static> {
        match self {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        }
    }
}

/// A problem found in a dialogue script, pointing at the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// 1-based line number (0 when the whole script is meant).
    pub line: usize,
    /// Byte range in the script the message points at.
    pub span: Range<usize>,
    /// Human-readable description.
    pub message: String,
    /// Optional text for the source label (defaults to `message`).
    pub label: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(line: usize, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(line: usize, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label shown next to the source excerpt.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.line > 0 {
            write!(f, "{prefix} (line {}): {}", self.line, self.message)
        } else {
            write!(f, "{prefix}: {}", self.message)
        }
    }
}

/// Count errors and warnings, e.g. `"1 error, 2 warnings"`.
pub fn summarize(diagnostics: &[Diagnostic]) -> String {
    let count = |severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    format!(
        "{}, {}",
        plural(count(Severity::Error), "error"),
        plural(count(Severity::Warning), "warning")
    )
}

/// Render diagnostics with source excerpts using ariadne.
pub fn render_diagnostics(
    source: &str,
    filename: &str,
    diagnostics: &[Diagnostic],
    color: bool,
) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let span = (filename, diag.span.clone());
        let label_text = diag.label.as_deref().unwrap_or(&diag.message);

        Report::build(diag.severity.report_kind(), span.clone())
            .with_config(Config::default().with_color(color))
            .with_message(&diag.message)
            .with_label(
                Label::new(span)
                    .with_message(label_text)
                    .with_color(diag.severity.color()),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
