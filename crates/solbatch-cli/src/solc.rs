//! Compiler backends
//!
//! [`SolcCompiler`] pipes the standard-JSON input through
//! `solc --standard-json`, turns `errors[]` into diagnostics and writes one
//! `<build>/<Contract>.json` artifact per contract. [`EmitInput`] prints the
//! input instead of compiling it.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use solbatch_engine::{
    CompilationSet, CompileTarget, Compiler, CompilerError, Diagnostic, DiagnosticSink, Severity,
};

/// Compiler executable used when none is configured
pub const DEFAULT_SOLC: &str = "solc";

/// Artifact directory under the project root when no build dir is declared
const DEFAULT_BUILD_DIR: &str = "bin";

#[derive(Debug, Default, Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<SolcError>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolcError {
    severity: String,
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    source_location: Option<SourceLocation>,
}

#[derive(Debug, Deserialize)]
struct SourceLocation {
    file: String,
    start: i64,
    end: i64,
}

impl SolcError {
    fn into_diagnostic(self) -> Diagnostic {
        let severity = match self.severity.as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        };
        let mut diagnostic = Diagnostic::new(severity, self.message);
        if let Some(kind) = self.kind {
            diagnostic = diagnostic.with_code(kind);
        }
        if let Some(location) = self.source_location {
            diagnostic = diagnostic.with_path(location.file);
            if location.start >= 0 && location.end >= location.start {
                diagnostic = diagnostic.with_range(location.start as usize, location.end as usize);
            }
        }
        diagnostic
    }
}

/// Runs a local `solc` binary
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    program: String,
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_SOLC)
    }
}

impl SolcCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, input: &str, cwd: &Path) -> Result<String, CompilerError> {
        let launch = |e: std::io::Error| CompilerError::Launch {
            program: self.program.clone(),
            message: e.to_string(),
        };

        let mut child = Command::new(&self.program)
            .arg("--standard-json")
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(launch)?;
        }

        let output = child.wait_with_output().map_err(launch)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(CompilerError::Output(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(stdout)
    }

    /// Report diagnostics from solc output and write artifacts
    ///
    /// Artifacts are only written when solc reported no errors.
    fn process_output(
        &self,
        stdout: &str,
        diagnostics: &mut dyn DiagnosticSink,
        target: &CompileTarget,
    ) -> Result<usize, CompilerError> {
        let output: SolcOutput =
            serde_json::from_str(stdout).map_err(|e| CompilerError::Output(e.to_string()))?;

        let mut failed = false;
        for error in output.errors {
            let diagnostic = error.into_diagnostic();
            failed |= diagnostic.severity == Severity::Error;
            diagnostics.push(diagnostic);
        }
        if failed {
            log::info!("compilation failed, no artifacts written");
            return Ok(0);
        }

        let build_dir = artifact_dir(target);
        let mut written = 0;
        for (source, contracts) in &output.contracts {
            for (name, contract) in contracts {
                let path = build_dir.join(format!("{}.json", name));
                let io_error = |e: std::io::Error| CompilerError::Io {
                    path: path.clone(),
                    message: e.to_string(),
                };
                std::fs::create_dir_all(&build_dir).map_err(io_error)?;
                let json = serde_json::to_string_pretty(contract)
                    .map_err(|e| CompilerError::Output(e.to_string()))?;
                std::fs::write(&path, json).map_err(io_error)?;
                log::debug!("{}:{} -> {}", source, name, path.display());
                written += 1;
            }
        }

        log::info!("wrote {} artifacts to {}", written, build_dir.display());
        Ok(written)
    }
}

fn artifact_dir(target: &CompileTarget) -> PathBuf {
    match &target.build_dir {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(&target.project_path).join(DEFAULT_BUILD_DIR),
    }
}

impl Compiler for SolcCompiler {
    fn compile(
        &mut self,
        set: &CompilationSet,
        diagnostics: &mut dyn DiagnosticSink,
        target: &CompileTarget,
    ) -> Result<(), CompilerError> {
        if set.is_empty() {
            log::info!("nothing to compile");
            return Ok(());
        }

        let input = set
            .to_json_string()
            .map_err(|e| CompilerError::Output(e.to_string()))?;
        let stdout = self.run(&input, Path::new(&target.project_path))?;
        self.process_output(&stdout, diagnostics, target)?;
        Ok(())
    }
}

/// Writes the standard-JSON input instead of compiling
pub struct EmitInput<W> {
    out: W,
}

impl<W: Write> EmitInput<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Compiler for EmitInput<W> {
    fn compile(
        &mut self,
        set: &CompilationSet,
        _diagnostics: &mut dyn DiagnosticSink,
        target: &CompileTarget,
    ) -> Result<(), CompilerError> {
        let io_error = |e: std::io::Error| CompilerError::Io {
            path: PathBuf::from(&target.project_path),
            message: e.to_string(),
        };
        let input = set
            .to_json_string()
            .map_err(|e| CompilerError::Output(e.to_string()))?;
        writeln!(self.out, "{}", input).map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}
