//! Integration tests for project initialisation from disk

use solbatch_pm::{Project, ProjectError, Remapping, Settings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_initialise_reads_manifest() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        &root.join("dappFile.json"),
        r#"{ "sol_sources": "contracts", "build_dir": "build" }"#,
    );

    let project = Project::initialise(root, &Settings::default()).unwrap();
    let root = root.canonicalize().unwrap();

    assert_eq!(project.root(), root);
    assert_eq!(project.sources_path(), root.join("contracts"));
    assert_eq!(project.build_path(), Some(root.join("build")));
}

#[test]
fn test_initialise_without_manifest() {
    let temp = TempDir::new().unwrap();

    let project = Project::initialise(temp.path(), &Settings::default()).unwrap();

    assert_eq!(project.build_dir(), None);
    assert_eq!(project.sources_path(), project.root());
    assert!(project.packages().is_empty());
}

#[test]
fn test_settings_remappings_precede_remappings_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("remappings.txt"), "lib/=vendor/lib/\n");

    let settings = Settings {
        remappings: vec!["lib/sub/=/special".to_string()],
        ..Settings::default()
    };
    let project = Project::initialise(root, &settings).unwrap();

    assert_eq!(
        project.remappings(),
        &[
            Remapping::new("lib/sub/", "/special"),
            Remapping::new("lib/", "vendor/lib/"),
        ]
    );
}

#[test]
fn test_malformed_remapping_is_an_error() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        remappings: vec!["no-target".to_string()],
        ..Settings::default()
    };

    let result = Project::initialise(temp.path(), &settings);

    assert!(matches!(result, Err(ProjectError::Remapping(_))));
}

#[test]
fn test_discovers_dependency_packages() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("lib/solmate/src/tokens/ERC20.sol"), "");
    write(&root.join("lib/oz/dappFile.json"), r#"{ "sol_sources": "contracts" }"#);
    write(&root.join("lib/README.md"), "not a package");

    let project = Project::initialise(root, &Settings::default()).unwrap();
    let names: Vec<_> = project.packages().iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, vec!["oz", "solmate"]);
    let oz = project.package("oz").unwrap();
    assert!(oz.sources_path(project.contracts_dir()).ends_with("lib/oz/contracts"));
    let solmate = project.package("solmate").unwrap();
    assert!(solmate.sources_path(project.contracts_dir()).ends_with("lib/solmate/src"));
}

#[test]
fn test_broken_root_manifest_is_an_error() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("dappFile.json"), "{ not json");

    let result = Project::initialise(temp.path(), &Settings::default());

    assert!(matches!(result, Err(ProjectError::Manifest(_))));
}

#[cfg(unix)]
#[test]
fn test_symlinked_package_uses_real_location() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().canonicalize().unwrap();
    let store = base.join("store/oz");
    write(&store.join("src/access/Ownable.sol"), "contract Ownable {}");
    let root = base.join("proj");
    fs::create_dir_all(root.join("lib")).unwrap();
    std::os::unix::fs::symlink(&store, root.join("lib/oz")).unwrap();

    let project = Project::initialise(&root, &Settings::default()).unwrap();

    assert_eq!(project.package("oz").unwrap().path, store);
    assert_eq!(
        project.compiler_remappings(),
        vec![format!("oz/={}/", store.join("src").display())]
    );
}
