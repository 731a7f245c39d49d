//! Package manifest parsing (dappFile.json)
//!
//! A package may declare where its Solidity sources live and where build
//! output goes. Both fields are optional; empty strings count as unset.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File name of the package manifest
pub const MANIFEST_FILE: &str = "dappFile.json";

/// Errors that can occur during manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    ValidationError(String),
}

/// Package manifest (dappFile.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Directory holding the package's Solidity sources, relative to the package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sol_sources: Option<String>,

    /// Build output directory, relative to the package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<String>,
}

impl PackageManifest {
    /// Parse a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        let manifest: PackageManifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the manifest of the package rooted at `dir`, if it has one
    pub fn load(dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    /// Validate the manifest
    ///
    /// Declared directories must stay inside the package.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (field, value) in [("sol_sources", self.sources()), ("build_dir", self.build_dir())] {
            if let Some(dir) = value {
                let dir_path = Path::new(dir);
                let escapes = dir_path.is_absolute()
                    || dir_path
                        .components()
                        .any(|c| matches!(c, std::path::Component::ParentDir));
                if escapes {
                    return Err(ManifestError::ValidationError(format!(
                        "{} must be a relative path inside the package, got '{}'",
                        field, dir
                    )));
                }
            }
        }
        Ok(())
    }

    /// Declared source directory, ignoring empty values
    pub fn sources(&self) -> Option<&str> {
        non_empty(self.sol_sources.as_deref())
    }

    /// Declared build directory, ignoring empty values
    pub fn build_dir(&self) -> Option<&str> {
        non_empty(self.build_dir.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(|v| v.trim_end_matches('/')).filter(|v| !v.is_empty())
}
