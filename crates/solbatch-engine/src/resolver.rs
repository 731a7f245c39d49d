//! Import path resolution
//!
//! Maps the string written in an `import` statement to an absolute path.
//!
//! # Resolution Order
//! For `import "x/y.sol"` in `/proj/src/A.sol`:
//! 1. Remappings whose prefix matches (longest context, then longest prefix;
//!    ties go to configuration order)
//! 2. `./` and `../` imports, relative to `/proj/src`
//! 3. Absolute imports, as written
//! 4. Dependency packages: `<deps>/x/<sources>/y.sol`, then `<deps>/x/y.sol`
//!
//! Remapped, relative and absolute targets are not checked for existence;
//! a missing file surfaces when it is read.

use std::cmp::Reverse;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use solbatch_pm::{is_path_subdirectory, normalize, Project};

use crate::reader::SourceReader;

/// Errors that can occur during import resolution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// No dependency package provides the import
    #[error("Cannot resolve import '{specifier}' (tried: {tried:?})")]
    PackageNotFound { specifier: String, tried: Vec<PathBuf> },

    /// Importing file has no parent directory
    #[error("Cannot resolve import '{specifier}': {} has no parent directory", from.display())]
    NoParentDirectory { specifier: String, from: PathBuf },

    /// Empty import string, or one climbing above the filesystem root
    #[error("Invalid import '{0}'")]
    InvalidSpecifier(String),
}

impl ResolveError {
    /// The raw import string that failed
    pub fn specifier(&self) -> &str {
        match self {
            ResolveError::PackageNotFound { specifier, .. } => specifier,
            ResolveError::NoParentDirectory { specifier, .. } => specifier,
            ResolveError::InvalidSpecifier(specifier) => specifier,
        }
    }
}

/// Which rule produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Rewritten by a remapping
    Remapped,
    /// `./` or `../` relative to the importing file
    Relative,
    /// Absolute path written in the import
    Absolute,
    /// Found in a dependency package
    Package,
}

/// A resolved import
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImport {
    /// Normalized absolute path of the imported file
    pub path: PathBuf,
    /// Rule that produced the path
    pub kind: ResolutionKind,
}

/// Resolve `specifier`, imported from `from_file`, against `project`
///
/// `reader` is only consulted to pick among dependency package candidates.
pub fn resolve<R: SourceReader + ?Sized>(
    specifier: &str,
    from_file: &Path,
    project: &Project,
    reader: &R,
) -> Result<ResolvedImport, ResolveError> {
    if specifier.trim().is_empty() {
        return Err(ResolveError::InvalidSpecifier(specifier.to_string()));
    }

    if let Some(path) = resolve_remapped(specifier, from_file, project)? {
        return Ok(ResolvedImport {
            path,
            kind: ResolutionKind::Remapped,
        });
    }

    if specifier.starts_with("./") || specifier.starts_with("../") {
        let from_dir = from_file
            .parent()
            .ok_or_else(|| ResolveError::NoParentDirectory {
                specifier: specifier.to_string(),
                from: from_file.to_path_buf(),
            })?;
        return Ok(ResolvedImport {
            path: join_checked(from_dir, specifier, specifier)?,
            kind: ResolutionKind::Relative,
        });
    }

    if Path::new(specifier).is_absolute() {
        return Ok(ResolvedImport {
            path: normalize(Path::new(specifier)),
            kind: ResolutionKind::Absolute,
        });
    }

    resolve_package(specifier, project, reader)
}

fn resolve_remapped(
    specifier: &str,
    from_file: &Path,
    project: &Project,
) -> Result<Option<PathBuf>, ResolveError> {
    // min_by_key keeps the first of equal keys, so configuration order breaks ties
    let best = project
        .remappings()
        .iter()
        .filter(|r| r.strip(specifier).is_some())
        .filter(|r| match project.remapping_context(r) {
            Some(context) => is_path_subdirectory(&context, from_file),
            None => true,
        })
        .min_by_key(|r| (Reverse(r.context_len()), Reverse(r.prefix.len())));

    let Some(remapping) = best else {
        return Ok(None);
    };

    // A prefix ending in `/` names a directory; anything else is a plain
    // string substitution.
    let suffix = remapping.strip(specifier).unwrap_or_default();
    let as_directory =
        remapping.prefix.ends_with('/') || suffix.is_empty() || suffix.starts_with('/');
    let replaced = if as_directory {
        Path::new(&remapping.target).join(suffix.trim_start_matches('/'))
    } else {
        PathBuf::from(format!("{}{}", remapping.target, suffix))
    };
    log::debug!("remapped '{}' via '{}' to {}", specifier, remapping, replaced.display());

    join_checked(project.root(), &replaced, specifier).map(Some)
}

fn resolve_package<R: SourceReader + ?Sized>(
    specifier: &str,
    project: &Project,
    reader: &R,
) -> Result<ResolvedImport, ResolveError> {
    let not_found = |tried: Vec<PathBuf>| ResolveError::PackageNotFound {
        specifier: specifier.to_string(),
        tried,
    };

    let Some(packages_path) = project.packages_path() else {
        return Err(not_found(Vec::new()));
    };

    let mut candidates = Vec::new();
    if let Some((name, rest)) = specifier.split_once('/') {
        if !rest.is_empty() {
            let sources = match project.package(name) {
                Some(package) => Some(package.sources_path(project.contracts_dir())),
                None => project.contracts_dir().map(|dir| packages_path.join(name).join(dir)),
            };
            if let Some(sources) = sources {
                candidates.push(join_checked(&sources, rest, specifier)?);
            }
        }
    }
    let direct = join_checked(&packages_path, specifier, specifier)?;
    if !candidates.contains(&direct) {
        candidates.push(direct);
    }

    match candidates.iter().find(|c| reader.exists(c)) {
        Some(path) => Ok(ResolvedImport {
            path: path.clone(),
            kind: ResolutionKind::Package,
        }),
        None => Err(not_found(candidates)),
    }
}

/// Join `relative` onto `base` and normalize, rejecting `..` above the root
fn join_checked(
    base: &Path,
    relative: impl AsRef<Path>,
    specifier: &str,
) -> Result<PathBuf, ResolveError> {
    let joined = base.join(relative.as_ref());
    let mut depth: usize = 0;
    for component in joined.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => {
                if depth == 0 && joined.is_absolute() {
                    return Err(ResolveError::InvalidSpecifier(specifier.to_string()));
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }
    Ok(normalize(&joined))
}
