//! Colored terminal output for diagnostics and summaries.
//!
//! Uses `termcolor`; honors `NO_COLOR` and the `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use solbatch_engine::{CompileSummary, Diagnostic, DiagnosticSink, Severity};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
    }
}

/// Styled output writer for terminal.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
    errors: usize,
    warnings: usize,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
            errors: 0,
            warnings: 0,
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    /// Red bold text.
    pub fn error(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Red), true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Cyan), false);
    }

    /// Dim text.
    pub fn dim(&mut self, text: &str) {
        self.write_styled(text, Some(Color::White), false);
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// Error diagnostics printed so far
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Print one diagnostic to stderr
    ///
    /// `path:start-end: error[code]: message`
    pub fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }

        if let Some(path) = &diagnostic.path {
            let _ = write!(self.stderr, "{}", path.display());
            if let Some((start, end)) = diagnostic.range {
                let _ = write!(self.stderr, ":{}-{}", start, end);
            }
            let _ = write!(self.stderr, ": ");
        }

        let mut spec = ColorSpec::new();
        spec.set_fg(Some(severity_color(diagnostic.severity))).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "{}", diagnostic.severity);
        if let Some(code) = &diagnostic.code {
            let _ = write!(self.stderr, "[{}]", code);
        }
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", diagnostic.message);
    }

    /// Final one-line report of a compile run
    pub fn summary(&mut self, summary: &CompileSummary) {
        if self.errors == 0 {
            self.success("Compiled");
        } else {
            self.error("Failed");
        }
        self.plain(&format!(
            " {} of {} sources",
            summary.compiled, summary.documents
        ));
        if self.errors > 0 || self.warnings > 0 {
            self.dim(&format!(
                " ({} errors, {} warnings)",
                self.errors, self.warnings
            ));
        }
        self.newline();
        let _ = self.stdout.flush();
    }
}

impl DiagnosticSink for StyledOutput {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostic(&diagnostic);
    }
}
