//! Project descriptor
//!
//! Describes one project for the duration of a compile run: its root, its
//! own manifest, where dependency packages live, and the remappings that
//! apply to its imports. Built once from a [`Settings`] snapshot and never
//! mutated afterwards.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{ManifestError, PackageManifest};
use crate::path::{format_path, is_path_subdirectory, normalize};
use crate::remapping::{load_remappings_file, Remapping, RemappingError};
use crate::settings::Settings;

/// Errors that can occur while initialising a project
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Project manifest could not be loaded
    #[error("Project manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A remapping could not be parsed
    #[error("{0}")]
    Remapping(#[from] RemappingError),

    /// I/O error while scanning the dependency directory
    #[error("I/O error scanning {path}: {message}")]
    IoError { path: PathBuf, message: String },
}

/// A dependency package found under the project's dependency directory
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Directory name, used as the import prefix
    pub name: String,
    /// Absolute path to the package directory
    pub path: PathBuf,
    /// The package's own manifest (default when it has none)
    pub manifest: PackageManifest,
}

impl Package {
    /// Create a package rooted at `path` without a manifest
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: normalize(&path.into()),
            manifest: PackageManifest::default(),
        }
    }

    /// Attach the package's manifest
    pub fn with_manifest(mut self, manifest: PackageManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Directory imports into this package are resolved against
    ///
    /// The package's declared source directory wins over the project-wide
    /// contracts directory.
    pub fn sources_path(&self, contracts_dir: Option<&str>) -> PathBuf {
        match self.manifest.sources().or(contracts_dir) {
            Some(dir) => self.path.join(dir),
            None => self.path.clone(),
        }
    }
}

/// Immutable description of a project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: PackageManifest,
    packages_dir: Option<String>,
    contracts_dir: Option<String>,
    remappings: Vec<Remapping>,
    packages: Vec<Package>,
}

impl Project {
    /// Create a bare project rooted at `root`
    ///
    /// The root is canonicalized when it exists so symlinked checkouts map to
    /// the same keys as the files found beneath them.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or_else(|_| normalize(&root));
        Self {
            root,
            manifest: PackageManifest::default(),
            packages_dir: None,
            contracts_dir: None,
            remappings: Vec::new(),
            packages: Vec::new(),
        }
    }

    /// Initialise a project from disk and a settings snapshot
    ///
    /// Remappings from the settings come first, followed by `remappings.txt`.
    /// Every directory under the dependency directory becomes a [`Package`].
    pub fn initialise(root: &Path, settings: &Settings) -> Result<Self, ProjectError> {
        let mut project = Project::new(root)
            .with_packages_dir(settings.packages_dir())
            .with_contracts_dir(settings.packages_contracts_dir());

        if let Some(manifest) = PackageManifest::load(&project.root)? {
            project.manifest = manifest;
        }

        let mut remappings = settings
            .remappings
            .iter()
            .map(|r| r.parse::<Remapping>())
            .collect::<Result<Vec<_>, _>>()?;
        remappings.extend(load_remappings_file(&project.root)?);
        project.remappings = remappings;

        project.packages = project.discover_packages()?;

        log::debug!(
            "initialised project at {} ({} remappings, {} packages)",
            project.root.display(),
            project.remappings.len(),
            project.packages.len()
        );

        Ok(project)
    }

    /// Set the project's own manifest
    pub fn with_manifest(mut self, manifest: PackageManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Set the dependency directory (relative to the root)
    pub fn with_packages_dir(mut self, dir: Option<&str>) -> Self {
        self.packages_dir = dir.filter(|d| !d.is_empty()).map(str::to_string);
        self
    }

    /// Set the contracts directory nested inside each dependency package
    pub fn with_contracts_dir(mut self, dir: Option<&str>) -> Self {
        self.contracts_dir = dir.filter(|d| !d.is_empty()).map(str::to_string);
        self
    }

    /// Replace the remappings, highest precedence first
    pub fn with_remappings(mut self, remappings: Vec<Remapping>) -> Self {
        self.remappings = remappings;
        self
    }

    /// Register a dependency package
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    fn discover_packages(&self) -> Result<Vec<Package>, ProjectError> {
        let Some(dir) = self.packages_path() else {
            return Ok(Vec::new());
        };
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let io_error = |e: std::io::Error| ProjectError::IoError {
            path: dir.clone(),
            message: e.to_string(),
        };

        let mut packages = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            // Symlinked packages are keyed by their real location, like sources
            let path = path.canonicalize().unwrap_or(path);
            let manifest = match PackageManifest::load(&path) {
                Ok(manifest) => manifest.unwrap_or_default(),
                Err(e) => {
                    log::warn!("ignoring manifest of package '{}': {}", name, e);
                    PackageManifest::default()
                }
            };
            packages.push(Package::new(name, path).with_manifest(manifest));
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Absolute project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project's own manifest
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Absolute source directory: the declared `sol_sources`, else the root
    pub fn sources_path(&self) -> PathBuf {
        match self.manifest.sources() {
            Some(dir) => normalize(&self.root.join(dir)),
            None => self.root.clone(),
        }
    }

    /// Declared build directory, if any
    pub fn build_dir(&self) -> Option<&str> {
        self.manifest.build_dir()
    }

    /// Absolute build directory, if one is declared
    pub fn build_path(&self) -> Option<PathBuf> {
        self.build_dir().map(|dir| normalize(&self.root.join(dir)))
    }

    /// Check whether `path` lies inside the declared build directory
    pub fn is_in_build_dir(&self, path: &Path) -> bool {
        self.build_path()
            .is_some_and(|build| is_path_subdirectory(&build, path))
    }

    /// Dependency directory name, if configured
    pub fn packages_dir(&self) -> Option<&str> {
        self.packages_dir.as_deref()
    }

    /// Absolute dependency directory, if configured
    pub fn packages_path(&self) -> Option<PathBuf> {
        self.packages_dir().map(|dir| normalize(&self.root.join(dir)))
    }

    /// Contracts directory nested in dependency packages, if configured
    pub fn contracts_dir(&self) -> Option<&str> {
        self.contracts_dir.as_deref()
    }

    /// Configured remappings, highest precedence first
    pub fn remappings(&self) -> &[Remapping] {
        &self.remappings
    }

    /// Discovered dependency packages, sorted by name
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Look up a dependency package by name
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Absolute form of a remapping target
    pub fn remapping_target(&self, remapping: &Remapping) -> PathBuf {
        normalize(&self.root.join(&remapping.target))
    }

    /// Absolute form of a remapping context
    pub fn remapping_context(&self, remapping: &Remapping) -> Option<PathBuf> {
        remapping
            .context
            .as_ref()
            .map(|context| normalize(&self.root.join(context)))
    }

    /// Remappings expressed against absolute paths, for the compiler
    ///
    /// Configured remappings come first, then one `name/=<sources>/` entry per
    /// dependency package so package-style imports resolve identically.
    pub fn compiler_remappings(&self) -> Vec<String> {
        let mut remappings: Vec<String> = self
            .remappings
            .iter()
            .map(|r| {
                let mut target = format_path(&self.remapping_target(r));
                if (r.target.ends_with('/') || r.prefix.ends_with('/')) && !target.ends_with('/') {
                    target.push('/');
                }
                let absolute = Remapping {
                    context: self.remapping_context(r).map(|c| format_path(&c)),
                    prefix: r.prefix.clone(),
                    target,
                };
                absolute.to_string()
            })
            .collect();

        for package in &self.packages {
            let sources = package.sources_path(self.contracts_dir());
            remappings.push(format!("{}/={}/", package.name, format_path(&sources)));
        }

        remappings
    }
}
