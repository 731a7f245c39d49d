//! `solbatch compile`

use anyhow::Context;

use solbatch_engine::{Compiler, DiskReader, Driver};

use super::ProjectArgs;
use crate::output::StyledOutput;
use crate::search::GlobSearch;
use crate::solc::{EmitInput, SolcCompiler, DEFAULT_SOLC};

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub project: ProjectArgs,
    /// Compiler executable, overriding `solc` in solbatch.toml
    pub solc: Option<String>,
    /// Print the standard-JSON input instead of compiling
    pub emit_input: bool,
}

/// Compile every source in the project; returns the number of errors reported
pub fn execute(options: CompileOptions, out: &mut StyledOutput) -> anyhow::Result<usize> {
    let (workspace, settings) = options.project.load()?;
    let driver = Driver::new(&workspace, &GlobSearch, &DiskReader);

    let mut compiler: Box<dyn Compiler> = if options.emit_input {
        Box::new(EmitInput::new(std::io::stdout()))
    } else {
        let program = options
            .solc
            .or_else(|| settings.solc.clone())
            .unwrap_or_else(|| DEFAULT_SOLC.to_string());
        Box::new(SolcCompiler::new(program))
    };

    let summary = driver
        .compile_all(&settings, compiler.as_mut(), out)
        .context("compile failed")?;

    if !options.emit_input {
        out.summary(&summary);
    }
    Ok(out.error_count())
}
