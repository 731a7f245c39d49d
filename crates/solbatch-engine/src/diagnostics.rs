//! Diagnostics emitted during a compile run

use std::fmt;
use std::path::PathBuf;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single message about a source file
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// File the message is about, when known
    pub path: Option<PathBuf>,
    /// Byte range in the file, when known
    pub range: Option<(usize, usize)>,
    /// Short machine-readable category, e.g. `import` or a compiler error type
    pub code: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// A warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// A diagnostic with the given severity
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            path: None,
            range: None,
            code: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        write!(f, "{}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Receives diagnostics as they are produced
pub trait DiagnosticSink {
    fn push(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn push(&mut self, diagnostic: Diagnostic) {
        Vec::push(self, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_path_and_code() {
        let diagnostic = Diagnostic::error("Cannot resolve import 'x.sol'")
            .with_path("/proj/A.sol")
            .with_code("import");

        assert_eq!(
            diagnostic.to_string(),
            "/proj/A.sol: error[import]: Cannot resolve import 'x.sol'"
        );
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        DiagnosticSink::push(&mut sink, Diagnostic::warning("unused"));

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].severity, Severity::Warning);
        assert_eq!(sink[0].to_string(), "warning: unused");
    }
}
