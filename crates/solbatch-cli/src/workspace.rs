//! Command-line workspace: a root folder plus buffers loaded from a file
//!
//! Editors hand unsaved text to the CLI as a JSON list:
//!
//! ```json
//! [{ "path": "contracts/Token.sol", "text": "contract Token {}" }]
//! ```
//!
//! Relative buffer paths are taken against the workspace root.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use solbatch_engine::{OpenDocument, Workspace};

#[derive(Debug, Deserialize)]
struct BufferEntry {
    path: PathBuf,
    text: String,
}

/// Open buffers read from a JSON file
#[derive(Debug, Default)]
pub struct BufferFile {
    buffers: Vec<OpenDocument>,
}

impl BufferFile {
    pub fn from_json(content: &str, root: Option<&Path>) -> anyhow::Result<Self> {
        let entries: Vec<BufferEntry> =
            serde_json::from_str(content).context("invalid buffer list")?;
        let buffers = entries
            .into_iter()
            .map(|entry| {
                let path = match root {
                    Some(root) if entry.path.is_relative() => root.join(entry.path),
                    _ => entry.path,
                };
                OpenDocument::new(path, entry.text)
            })
            .collect();
        Ok(Self { buffers })
    }

    pub fn load(path: &Path, root: Option<&Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read buffers from {}", path.display()))?;
        Self::from_json(&content, root)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }
}

/// [`Workspace`] for one command invocation
#[derive(Debug, Default)]
pub struct CliWorkspace {
    root: Option<PathBuf>,
    buffers: BufferFile,
}

impl CliWorkspace {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            buffers: BufferFile::default(),
        }
    }

    pub fn with_buffers(mut self, buffers: BufferFile) -> Self {
        self.buffers = buffers;
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

impl Workspace for CliWorkspace {
    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn open_documents(&self) -> Vec<OpenDocument> {
        self.buffers.buffers.clone()
    }
}
