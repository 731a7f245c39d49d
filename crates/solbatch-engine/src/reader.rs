//! Source reading capability
//!
//! The collection never touches the filesystem directly; everything goes
//! through a [`SourceReader`] so editors can serve unsaved text and tests can
//! run without a disk.

use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};

use solbatch_pm::normalize;

/// Reads source text and answers path questions for the resolver
pub trait SourceReader {
    /// Read the full text of `path`
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names an existing file
    fn exists(&self, path: &Path) -> bool;

    /// Canonical key for `path`
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize(path)
    }
}

impl<T: SourceReader + ?Sized> SourceReader for &T {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        (**self).read_text(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        (**self).canonicalize(path)
    }
}

/// Reads sources from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskReader;

impl SourceReader for DiskReader {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Resolves symlinks when the file exists, otherwise normalizes lexically
    /// against the current directory.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        if let Ok(canonical) = path.canonicalize() {
            return canonical;
        }
        if path.is_absolute() {
            return normalize(path);
        }
        match std::env::current_dir() {
            Ok(cwd) => normalize(&cwd.join(path)),
            Err(_) => normalize(path),
        }
    }
}

/// In-memory sources keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), text.into());
    }

    /// Builder form of [`MemoryReader::insert`]
    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl SourceReader for MemoryReader {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}
