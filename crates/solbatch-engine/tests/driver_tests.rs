//! Integration tests for the compile driver over a real directory tree

use solbatch_engine::{
    CompilationSet, CompileTarget, Compiler, CompilerError, Diagnostic, DiagnosticSink,
    DiskReader, DocumentOrigin, Driver, FileSearch, ImportError, OpenDocument, SearchRequest,
    Settings, Workspace,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct TestWorkspace {
    root: PathBuf,
    buffers: Vec<OpenDocument>,
}

impl Workspace for TestWorkspace {
    fn root_path(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }

    fn open_documents(&self) -> Vec<OpenDocument> {
        self.buffers.clone()
    }
}

struct GlobTestSearch;

impl FileSearch for GlobTestSearch {
    fn find(&self, request: &SearchRequest) -> io::Result<Vec<PathBuf>> {
        let pattern = request.base.join(&request.include);
        let excludes: Vec<glob::Pattern> = request
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).unwrap())
            .collect();

        Ok(glob::glob(pattern.to_str().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|p| {
                let relative = p.strip_prefix(&request.base).unwrap_or(p);
                !excludes.iter().any(|e| e.matches_path(relative))
            })
            .take(request.max_results)
            .collect())
    }
}

#[derive(Default)]
struct RecordingCompiler {
    set: Option<CompilationSet>,
    target: Option<CompileTarget>,
}

impl Compiler for RecordingCompiler {
    fn compile(
        &mut self,
        set: &CompilationSet,
        _diagnostics: &mut dyn DiagnosticSink,
        target: &CompileTarget,
    ) -> Result<(), CompilerError> {
        self.set = Some(set.clone());
        self.target = Some(target.clone());
        Ok(())
    }
}

fn write(root: &Path, relative: &str, text: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

fn project_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    (temp, root)
}

fn names(set: &CompilationSet) -> Vec<String> {
    set.units().iter().map(|u| u.name.clone()).collect()
}

#[test]
fn test_open_buffer_beats_stale_disk_copy() {
    let (_temp, root) = project_dir();
    let token = write(&root, "Token.sol", "contract Token { uint a; }");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: vec![OpenDocument::new(&token, "contract Token { uint b; }")],
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);

    let (_, collection) = driver.collect(&Settings::default()).unwrap();

    assert_eq!(collection.len(), 1);
    let doc = collection.get(&token).unwrap();
    assert_eq!(doc.code(), "contract Token { uint b; }");
    assert_eq!(doc.origin(), DocumentOrigin::Buffer);
}

#[test]
fn test_build_dir_never_searched() {
    let (_temp, root) = project_dir();
    write(&root, "dappFile.json", r#"{ "build_dir": "build" }"#);
    write(&root, "A.sol", "contract A {}");
    let stale = write(&root, "build/Flattened.sol", "contract Flattened {}");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);
    let mut compiler = RecordingCompiler::default();
    let mut sink: Vec<Diagnostic> = Vec::new();

    let summary = driver
        .compile_all(&Settings::default(), &mut compiler, &mut sink)
        .unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.compiled, 1);
    let target = compiler.target.unwrap();
    let build = root.join("build");
    assert_eq!(target.build_dir.as_deref(), Some(build.to_str().unwrap()));
    assert!(!names(&compiler.set.unwrap()).contains(&stale.to_str().unwrap().to_string()));
}

#[test]
fn test_default_bin_dir_never_searched() {
    let (_temp, root) = project_dir();
    write(&root, "A.sol", "contract A {}");
    write(&root, "bin/Out.sol", "contract Out {}");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);

    let (_, collection) = driver.collect(&Settings::default()).unwrap();

    assert_eq!(collection.len(), 1);
    assert!(!collection.contains(&root.join("bin/Out.sol")));
}

#[test]
fn test_package_imports_compile_dependencies_first() {
    let (_temp, root) = project_dir();
    write(&root, "dappFile.json", r#"{ "sol_sources": "contracts" }"#);
    let token = write(
        &root,
        "contracts/Token.sol",
        "import \"openzeppelin/token/ERC20.sol\";\ncontract Token is ERC20 {}",
    );
    let erc20 = write(
        &root,
        "lib/openzeppelin/src/token/ERC20.sol",
        "import \"../utils/Context.sol\";\ncontract ERC20 is Context {}",
    );
    let context = write(&root, "lib/openzeppelin/src/utils/Context.sol", "contract Context {}");
    write(&root, "scripts/Deploy.sol", "contract Deploy {}");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);
    let mut compiler = RecordingCompiler::default();
    let mut sink: Vec<Diagnostic> = Vec::new();

    let summary = driver
        .compile_all(&Settings::default(), &mut compiler, &mut sink)
        .unwrap();

    assert!(sink.is_empty());
    assert_eq!(summary.import_errors, 0);
    let set = compiler.set.unwrap();
    let to_name = |p: &Path| p.to_str().unwrap().to_string();
    assert_eq!(names(&set), vec![to_name(&context), to_name(&erc20), to_name(&token)]);
    assert!(set
        .remappings()
        .contains(&format!("openzeppelin/={}/", root.join("lib/openzeppelin/src").display())));

    let target = compiler.target.unwrap();
    assert_eq!(target.sources_path, to_name(&root.join("contracts")));
    assert_eq!(target.packages_path, Some(to_name(&root.join("lib"))));
}

#[test]
fn test_unresolvable_import_is_recorded() {
    let (_temp, root) = project_dir();
    let main = write(&root, "Main.sol", "import \"missing/Thing.sol\";\ncontract Main {}");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);

    let (_, collection) = driver.collect(&Settings::default()).unwrap();

    let doc = collection.get(&main).unwrap();
    assert_eq!(doc.errors().len(), 1);
    assert!(matches!(doc.errors()[0], ImportError::Resolve(_)));
    assert_eq!(doc.errors()[0].specifier(), "missing/Thing.sol");
}

#[test]
fn test_remappings_from_settings_file() {
    let (_temp, root) = project_dir();
    write(
        &root,
        "solbatch.toml",
        "[solidity]\noptimizer-runs = 0\nremappings = [\"@vendor/=vendor/\"]\n",
    );
    let main = write(&root, "src/Main.sol", "import \"@vendor/Lib.sol\";\ncontract Main {}");
    let lib = write(&root, "vendor/Lib.sol", "library Lib {}");

    let settings = Settings::load(&root).unwrap();
    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);
    let mut compiler = RecordingCompiler::default();
    let mut sink: Vec<Diagnostic> = Vec::new();

    driver.compile_all(&settings, &mut compiler, &mut sink).unwrap();

    let set = compiler.set.unwrap();
    assert!(!set.optimizer_enabled());
    let names = names(&set);
    let lib_pos = names.iter().position(|n| Path::new(n) == lib).unwrap();
    let main_pos = names.iter().position(|n| Path::new(n) == main).unwrap();
    assert!(lib_pos < main_pos);
}

#[cfg(unix)]
#[test]
fn test_symlinked_package_matches_compiler_remapping() {
    let (_temp, base) = project_dir();
    let store = base.join("store/oz");
    write(&store, "src/access/Ownable.sol", "contract Ownable {}");
    let root = base.join("proj");
    write(
        &root,
        "Vault.sol",
        "import \"oz/access/Ownable.sol\";\ncontract Vault is Ownable {}",
    );
    fs::create_dir_all(root.join("lib")).unwrap();
    std::os::unix::fs::symlink(&store, root.join("lib/oz")).unwrap();

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);
    let mut compiler = RecordingCompiler::default();
    let mut sink: Vec<Diagnostic> = Vec::new();

    let summary = driver
        .compile_all(&Settings::default(), &mut compiler, &mut sink)
        .unwrap();

    assert_eq!(summary.import_errors, 0);
    let set = compiler.set.unwrap();
    let target = format!("{}/", store.join("src").display());
    assert!(set.remappings().contains(&format!("oz/={}", target)));
    let ownable = names(&set)
        .into_iter()
        .find(|n| n.ends_with("Ownable.sol"))
        .unwrap();
    assert!(ownable.starts_with(&target));
}

#[test]
fn test_project_below_bin_ancestor_is_collected() {
    let (_temp, base) = project_dir();
    let root = base.join("bin/proj");
    let token = write(&root, "contracts/Token.sol", "contract Token {}");
    write(&root, "bin/Token.sol", "contract Stale {}");

    let workspace = TestWorkspace {
        root: root.clone(),
        buffers: Vec::new(),
    };
    let driver = Driver::new(&workspace, &GlobTestSearch, &DiskReader);

    let (_, collection) = driver.collect(&Settings::default()).unwrap();

    assert_eq!(collection.len(), 1);
    assert!(collection.contains(&token));
}
