pub mod compile;
pub mod sources;

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use solbatch_pm::{find_project_root, Settings};

use crate::workspace::{BufferFile, CliWorkspace};

/// Options shared by commands that load a project
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (default: nearest directory with solbatch.toml,
    /// dappFile.json or remappings.txt)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// JSON file of open buffers: [{"path": ..., "text": ...}]
    #[arg(long)]
    pub buffers: Option<PathBuf>,

    /// Optimizer runs (0 disables the optimizer)
    #[arg(long)]
    pub optimizer_runs: Option<u32>,

    /// Extra remapping `[context:]prefix=target`, ahead of configured ones
    #[arg(long = "remap", value_name = "REMAPPING")]
    pub remappings: Vec<String>,
}

impl ProjectArgs {
    fn root(&self) -> anyhow::Result<Option<PathBuf>> {
        if let Some(root) = &self.root {
            return Ok(Some(root.clone()));
        }
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        Ok(find_project_root(&cwd))
    }

    /// Workspace and settings snapshot for one run
    ///
    /// `solbatch.toml` is read from the root; flags override it.
    pub fn load(&self) -> anyhow::Result<(CliWorkspace, Settings)> {
        let root = self.root()?;

        let mut settings = match &root {
            Some(root) => Settings::load(root)
                .with_context(|| format!("invalid settings in {}", root.display()))?,
            None => Settings::default(),
        };
        if let Some(runs) = self.optimizer_runs {
            settings.optimizer_runs = runs;
        }
        if !self.remappings.is_empty() {
            let mut remappings = self.remappings.clone();
            remappings.append(&mut settings.remappings);
            settings.remappings = remappings;
        }

        let mut workspace = CliWorkspace::new(root);
        if let Some(path) = &self.buffers {
            let buffers = BufferFile::load(path, workspace.root())?;
            log::debug!("loaded {} buffers from {}", buffers.len(), path.display());
            workspace = workspace.with_buffers(buffers);
        }

        Ok((workspace, settings))
    }
}
