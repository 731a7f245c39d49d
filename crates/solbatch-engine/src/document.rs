//! Source documents
//!
//! A document is one Solidity file as it was when the collection saw it. Its
//! text and imports never change; a newer version of the file is a new
//! document in a new collection.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::imports::extract_imports;
use crate::resolver::ResolveError;

/// Where a document's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// An open editor buffer, possibly with unsaved edits
    Buffer,
    /// Read from disk
    Disk,
}

/// An import that could not be followed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportError {
    /// The import string did not map to a path
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// The import resolved, but the target could not be read
    #[error("Cannot read import '{specifier}' at {}: {message}", path.display())]
    Read {
        specifier: String,
        path: PathBuf,
        message: String,
    },
}

impl ImportError {
    /// The raw import string that failed
    pub fn specifier(&self) -> &str {
        match self {
            ImportError::Resolve(e) => e.specifier(),
            ImportError::Read { specifier, .. } => specifier,
        }
    }
}

/// A single Solidity source file
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    code: String,
    imports: Vec<String>,
    origin: DocumentOrigin,
    dependencies: Vec<PathBuf>,
    errors: Vec<ImportError>,
}

impl SourceDocument {
    /// Create a document from its canonical path and text
    pub fn new(path: PathBuf, code: String, origin: DocumentOrigin) -> Self {
        let imports = extract_imports(&code);
        Self {
            path,
            code,
            imports,
            origin,
            dependencies: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Canonical absolute path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full source text
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Raw import strings, in declaration order
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Where the text came from
    pub fn origin(&self) -> DocumentOrigin {
        self.origin
    }

    /// Canonical paths of successfully resolved imports, without duplicates
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Imports that could not be followed
    pub fn errors(&self) -> &[ImportError] {
        &self.errors
    }

    /// Whether every import was followed
    pub fn is_fully_resolved(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn add_dependency(&mut self, path: PathBuf) {
        if !self.dependencies.contains(&path) {
            self.dependencies.push(path);
        }
    }

    pub(crate) fn add_error(&mut self, error: ImportError) {
        self.errors.push(error);
    }
}
