//! Path helpers shared by the project descriptor and the import resolver
//!
//! Canonical paths are absolute, lexically normalized, and compared
//! component-wise. Strings handed to the compiler use forward slashes.

use std::path::{Component, Path, PathBuf};

use crate::manifest::MANIFEST_FILE;
use crate::remapping::REMAPPINGS_FILE;
use crate::settings::SETTINGS_FILE;

/// Normalize a path lexically, collapsing `.` and `..` segments
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Render a path with forward slashes regardless of platform
pub fn format_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check whether `child` lives inside `parent` (or is `parent` itself)
pub fn is_path_subdirectory(parent: &Path, child: &Path) -> bool {
    normalize(child).starts_with(normalize(parent))
}

/// Find the project root by walking up from `start_dir`
///
/// A directory is a project root when it holds any of `solbatch.toml`,
/// `dappFile.json` or `remappings.txt`.
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let is_root = [SETTINGS_FILE, MANIFEST_FILE, REMAPPINGS_FILE]
            .iter()
            .any(|marker| current.join(marker).exists());
        if is_root {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}
