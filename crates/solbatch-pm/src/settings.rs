//! Tool settings (solbatch.toml)
//!
//! The settings file is the configuration snapshot handed to a compile run:
//!
//! ```toml
//! [solidity]
//! packages-dir = "lib"
//! packages-contracts-dir = "src"
//! optimizer-runs = 200
//! remappings = ["@openzeppelin/=lib/openzeppelin-contracts/contracts/"]
//! solc = "/usr/local/bin/solc"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File name of the settings file at the project root
pub const SETTINGS_FILE: &str = "solbatch.toml";

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read-only configuration for one compile run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Directory (under the project root) holding dependency packages
    pub packages_dir: String,

    /// Contracts directory nested inside each dependency package
    pub packages_contracts_dir: String,

    /// Optimizer runs; zero disables the optimizer
    pub optimizer_runs: u32,

    /// Remappings in `[context:]prefix=target` form, highest precedence first
    pub remappings: Vec<String>,

    /// Compiler executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packages_dir: "lib".to_string(),
            packages_contracts_dir: "src".to_string(),
            optimizer_runs: 200,
            remappings: Vec::new(),
            solc: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    solidity: Settings,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = toml::from_str(content)?;
        Ok(file.solidity)
    }

    /// Load `solbatch.toml` from the project root, falling back to defaults
    pub fn load(root: &Path) -> Result<Self, SettingsError> {
        let path = root.join(SETTINGS_FILE);
        if !path.is_file() {
            log::debug!("no {} in {}, using defaults", SETTINGS_FILE, root.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Dependency directory name, or `None` when unset
    pub fn packages_dir(&self) -> Option<&str> {
        Some(self.packages_dir.as_str()).filter(|d| !d.is_empty())
    }

    /// Nested contracts directory name, or `None` when unset
    pub fn packages_contracts_dir(&self) -> Option<&str> {
        Some(self.packages_contracts_dir.as_str()).filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_table_missing() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.packages_dir(), Some("lib"));
        assert_eq!(settings.optimizer_runs, 200);
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
[solidity]
packages-dir = "node_modules"
packages-contracts-dir = "contracts"
optimizer-runs = 0
remappings = ["lib/=/pkgs/lib", "lib/sub/=/special"]
solc = "solc-0.8.24"
"#;
        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.packages_dir(), Some("node_modules"));
        assert_eq!(settings.packages_contracts_dir(), Some("contracts"));
        assert_eq!(settings.optimizer_runs, 0);
        assert_eq!(settings.remappings.len(), 2);
        assert_eq!(settings.solc.as_deref(), Some("solc-0.8.24"));
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let settings = Settings::from_toml("[solidity]\noptimizer-runs = 1000\n").unwrap();
        assert_eq!(settings.optimizer_runs, 1000);
        assert_eq!(settings.packages_contracts_dir(), Some("src"));
    }

    #[test]
    fn test_empty_directories_are_unset() {
        let settings = Settings {
            packages_dir: String::new(),
            packages_contracts_dir: String::new(),
            ..Settings::default()
        };
        assert_eq!(settings.packages_dir(), None);
        assert_eq!(settings.packages_contracts_dir(), None);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Settings::from_toml("[solidity]\noptimizer-runs = \"many\"\n");
        assert!(matches!(result, Err(SettingsError::ParseError(_))));
    }
}
