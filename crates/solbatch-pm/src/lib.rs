//! Solbatch Project Library
//!
//! This crate describes a Solidity project on disk, including:
//! - Package manifest parsing (dappFile.json)
//! - Tool settings (solbatch.toml)
//! - Import remappings (`prefix=target`, `context:prefix=target`, remappings.txt)
//! - Dependency package discovery
//! - Path normalization and project root discovery

pub mod manifest;
pub mod path;
pub mod project;
pub mod remapping;
pub mod settings;

pub use manifest::{ManifestError, PackageManifest, MANIFEST_FILE};
pub use path::{find_project_root, format_path, is_path_subdirectory, normalize};
pub use project::{Package, Project, ProjectError};
pub use remapping::{
    load_remappings_file, parse_remappings, Remapping, RemappingError, REMAPPINGS_FILE,
};
pub use settings::{Settings, SettingsError, SETTINGS_FILE};
