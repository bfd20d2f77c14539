use crate::diagnostics::Diagnostic;

/// Alias for `Result<T, ScriptError>`.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// A script that cannot produce any dialogue graph at all.
///
/// Problems inside individual sections are not errors; they are reported as
/// diagnostics and the section or line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// The text contains no `=== name ===` boundary.
    #[error("script has no `=== node ===` sections")]
    NoSections,

    /// Every section was empty or dropped.
    #[error("script has sections but none produced a node")]
    EmptyGraph,
}

impl ScriptError {
    /// The failure as an error diagnostic pointing at the top of `source`.
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let first = source.lines().next().map_or(0, str::len);
        let label = match self {
            ScriptError::NoSections => "expected a `=== start ===` header",
            ScriptError::EmptyGraph => "every section in this script is empty",
        };
        Diagnostic::error(1, 0..first, self.to_string()).with_label(label)
    }
}
