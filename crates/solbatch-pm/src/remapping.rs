//! Import remappings
//!
//! A remapping redirects imports that start with `prefix` to `target`.
//! The optional context restricts it to importing files below that directory.
//!
//! Accepted forms:
//! - `prefix=target`
//! - `context:prefix=target`

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// File name of the line-oriented remappings list
pub const REMAPPINGS_FILE: &str = "remappings.txt";

/// Errors that can occur while parsing remappings
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemappingError {
    /// No `=` separating prefix and target
    #[error("Invalid remapping '{0}': expected 'prefix=target'")]
    MissingTarget(String),

    /// The prefix part is empty
    #[error("Invalid remapping '{0}': prefix cannot be empty")]
    EmptyPrefix(String),

    /// Failed to read remappings file
    #[error("Failed to read {path}: {message}")]
    IoError { path: String, message: String },
}

/// A single prefix substitution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Remapping {
    /// Directory (relative to the project root) the importing file must live in
    pub context: Option<String>,
    /// Import prefix to replace
    pub prefix: String,
    /// Replacement path; relative targets are taken from the project root
    pub target: String,
}

impl Remapping {
    /// Create a remapping without context
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            context: None,
            prefix: prefix.into(),
            target: target.into(),
        }
    }

    /// Restrict the remapping to importing files under `context`
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.is_empty() { None } else { Some(context) };
        self
    }

    /// Suffix of `specifier` after this remapping's prefix, if it matches
    pub fn strip<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        specifier.strip_prefix(self.prefix.as_str())
    }

    /// Length of the context used for precedence, zero when absent
    pub fn context_len(&self) -> usize {
        self.context.as_ref().map_or(0, String::len)
    }
}

impl FromStr for Remapping {
    type Err = RemappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (lhs, target) = line
            .split_once('=')
            .ok_or_else(|| RemappingError::MissingTarget(line.to_string()))?;

        let (context, prefix) = match lhs.split_once(':') {
            Some((context, prefix)) => (context.trim(), prefix.trim()),
            None => ("", lhs.trim()),
        };

        if prefix.is_empty() {
            return Err(RemappingError::EmptyPrefix(line.to_string()));
        }

        Ok(Remapping::new(prefix, target.trim()).with_context(context))
    }
}

impl fmt::Display for Remapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}:{}={}", context, self.prefix, self.target),
            None => write!(f, "{}={}", self.prefix, self.target),
        }
    }
}

/// Parse remappings from text, one per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_remappings(text: &str) -> Result<Vec<Remapping>, RemappingError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Remapping::from_str)
        .collect()
}

/// Read `remappings.txt` from the project root, if present
pub fn load_remappings_file(root: &Path) -> Result<Vec<Remapping>, RemappingError> {
    let path = root.join(REMAPPINGS_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path).map_err(|e| RemappingError::IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_remappings(&text)
}
