//! Compile driver
//!
//! Runs one batch compile for a workspace:
//!
//! 1. Initialise the [`Project`] from the settings snapshot
//! 2. Add every open `.sol` buffer under the root (unsaved text wins)
//! 3. Search the source directory and add whatever is not yet collected
//! 4. Report import failures, build the compilation set and hand it to the
//!    [`Compiler`]
//!
//! Every collaborator is a trait object so editors, the CLI and tests can
//! plug in their own workspace, search and compiler.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use solbatch_pm::{format_path, is_path_subdirectory, Project, ProjectError, Settings};

use crate::collection::SourceDocumentCollection;
use crate::compilation::CompilationSet;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::document::DocumentOrigin;
use crate::reader::SourceReader;

/// Extension of the files the driver collects
pub const SOURCE_EXTENSION: &str = "sol";

/// Upper bound on files returned by one source search
pub const MAX_SEARCH_RESULTS: usize = 1000;

/// Build directory excluded when the manifest declares none
const DEFAULT_BUILD_EXCLUDE: &str = "**/bin/**";

/// Errors that abort a compile run
#[derive(Debug, Error)]
pub enum DriverError {
    /// The workspace has no root folder
    #[error("No workspace root; nothing to compile")]
    RootNotFound,

    /// The project could not be initialised
    #[error("{0}")]
    Project(#[from] ProjectError),

    /// The source search failed
    #[error("Source search failed: {0}")]
    Search(#[source] io::Error),

    /// The compiler could not be run
    #[error("{0}")]
    Compiler(#[from] CompilerError),
}

/// Errors raised by a [`Compiler`] that prevent it from producing output
///
/// Errors in the sources themselves are diagnostics, not `CompilerError`s.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The compiler process could not be started
    #[error("Failed to launch compiler '{program}': {message}")]
    Launch { program: String, message: String },

    /// The compiler produced output that could not be understood
    #[error("Unexpected compiler output: {0}")]
    Output(String),

    /// Writing artifacts failed
    #[error("I/O error writing {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// An editor buffer, possibly with unsaved changes
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDocument {
    pub path: PathBuf,
    pub text: String,
}

impl OpenDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// The workspace a compile runs in
pub trait Workspace {
    /// Root folder, if one is open
    fn root_path(&self) -> Option<PathBuf>;

    /// Currently open buffers
    fn open_documents(&self) -> Vec<OpenDocument>;
}

/// A file search rooted at one directory
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Directory to search under
    pub base: PathBuf,
    /// Glob relative to `base`
    pub include: String,
    /// Globs whose matches are dropped, matched relative to `base`
    pub exclude: Vec<String>,
    /// Maximum number of results
    pub max_results: usize,
}

/// Finds files on disk
pub trait FileSearch {
    fn find(&self, request: &SearchRequest) -> io::Result<Vec<PathBuf>>;
}

/// Where a compiler should put its output, and the paths it compiles against
#[derive(Debug, Clone, PartialEq)]
pub struct CompileTarget {
    /// Absolute build directory, if the project declares one
    pub build_dir: Option<String>,
    /// Absolute project root
    pub project_path: String,
    /// Absolute source directory
    pub sources_path: String,
    /// Absolute dependency directory, if configured
    pub packages_path: Option<String>,
}

impl CompileTarget {
    /// Forward-slash paths for `project`
    pub fn for_project(project: &Project) -> Self {
        Self {
            build_dir: project.build_path().map(|p| format_path(&p)),
            project_path: format_path(project.root()),
            sources_path: format_path(&project.sources_path()),
            packages_path: project.packages_path().map(|p| format_path(&p)),
        }
    }
}

/// Compiles a prepared set of sources
pub trait Compiler {
    fn compile(
        &mut self,
        set: &CompilationSet,
        diagnostics: &mut dyn DiagnosticSink,
        target: &CompileTarget,
    ) -> Result<(), CompilerError>;
}

/// Counts of what one compile run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileSummary {
    /// Documents collected, build directory included
    pub documents: usize,
    /// Documents handed to the compiler
    pub compiled: usize,
    /// Import failures recorded across all documents
    pub import_errors: usize,
    /// Diagnostics pushed by the driver and the compiler
    pub diagnostics: usize,
}

/// Glob excluding the project's build directory from the source search
pub fn build_exclude(project: &Project) -> String {
    match project.build_dir() {
        Some(dir) => format!("**/{}/**", dir.trim_matches('/')),
        None => DEFAULT_BUILD_EXCLUDE.to_string(),
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

struct CountingSink<'s> {
    inner: &'s mut dyn DiagnosticSink,
    count: usize,
}

impl DiagnosticSink for CountingSink<'_> {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.inner.push(diagnostic);
    }
}

/// Drives collection and compilation over borrowed collaborators
pub struct Driver<'a> {
    workspace: &'a dyn Workspace,
    search: &'a dyn FileSearch,
    reader: &'a dyn SourceReader,
}

impl<'a> Driver<'a> {
    pub fn new(
        workspace: &'a dyn Workspace,
        search: &'a dyn FileSearch,
        reader: &'a dyn SourceReader,
    ) -> Self {
        Self {
            workspace,
            search,
            reader,
        }
    }

    /// Initialise the project and collect every source it compiles
    pub fn collect(
        &self,
        settings: &Settings,
    ) -> Result<(Project, SourceDocumentCollection<&'a dyn SourceReader>), DriverError> {
        let Some(root) = self.workspace.root_path() else {
            log::warn!("no workspace root, skipping compile");
            return Err(DriverError::RootNotFound);
        };

        let project = Project::initialise(&root, settings)?;
        let mut collection = SourceDocumentCollection::new(self.reader);

        self.add_open_documents(&project, &mut collection);
        self.add_disk_documents(&project, &mut collection)?;

        log::info!(
            "collected {} documents under {}",
            collection.len(),
            project.root().display()
        );

        Ok((project, collection))
    }

    fn add_open_documents(
        &self,
        project: &Project,
        collection: &mut SourceDocumentCollection<&'a dyn SourceReader>,
    ) {
        let mut added = 0;
        for buffer in self.workspace.open_documents() {
            if !has_source_extension(&buffer.path) {
                continue;
            }
            let path = self.reader.canonicalize(&buffer.path);
            if !is_path_subdirectory(project.root(), &path) {
                log::debug!("buffer {} is outside the project", path.display());
                continue;
            }
            if collection.add_document(&path, buffer.text, DocumentOrigin::Buffer, project) {
                added += 1;
            }
        }
        log::debug!("added {} open buffers", added);
    }

    fn add_disk_documents(
        &self,
        project: &Project,
        collection: &mut SourceDocumentCollection<&'a dyn SourceReader>,
    ) -> Result<(), DriverError> {
        let request = SearchRequest {
            base: project.sources_path(),
            include: format!("**/*.{}", SOURCE_EXTENSION),
            exclude: vec![build_exclude(project)],
            max_results: MAX_SEARCH_RESULTS,
        };
        let found = self.search.find(&request).map_err(DriverError::Search)?;
        log::debug!("search under {} found {} files", request.base.display(), found.len());

        for file in found {
            let path = self.reader.canonicalize(&file);
            if project.is_in_build_dir(&path) || collection.contains(&path) {
                continue;
            }
            match self.reader.read_text(&path) {
                Ok(code) => {
                    collection.add_document(&path, code, DocumentOrigin::Disk, project);
                }
                Err(e) => log::warn!("cannot read {}: {}", path.display(), e),
            }
        }

        Ok(())
    }

    /// Collect every source and compile it as one batch
    pub fn compile_all(
        &self,
        settings: &Settings,
        compiler: &mut dyn Compiler,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<CompileSummary, DriverError> {
        let (project, collection) = self.collect(settings)?;
        let mut sink = CountingSink {
            inner: diagnostics,
            count: 0,
        };

        let mut import_errors = 0;
        for (path, error) in collection.import_errors() {
            import_errors += 1;
            sink.push(
                Diagnostic::error(error.to_string())
                    .with_path(path)
                    .with_code("import"),
            );
        }

        let set = collection.compilation_set(&project, settings.optimizer_runs);
        let target = CompileTarget::for_project(&project);
        log::info!(
            "compiling {} sources (optimizer {})",
            set.len(),
            if set.optimizer_enabled() { "on" } else { "off" }
        );
        compiler.compile(&set, &mut sink, &target)?;

        Ok(CompileSummary {
            documents: collection.len(),
            compiled: set.len(),
            import_errors,
            diagnostics: sink.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;
    use std::cell::RefCell;

    struct FakeWorkspace {
        root: Option<PathBuf>,
        buffers: Vec<OpenDocument>,
    }

    impl Workspace for FakeWorkspace {
        fn root_path(&self) -> Option<PathBuf> {
            self.root.clone()
        }

        fn open_documents(&self) -> Vec<OpenDocument> {
            self.buffers.clone()
        }
    }

    struct FixedSearch {
        files: Vec<PathBuf>,
        requests: RefCell<Vec<SearchRequest>>,
    }

    impl FixedSearch {
        fn new(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(PathBuf::from).collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl FileSearch for FixedSearch {
        fn find(&self, request: &SearchRequest) -> io::Result<Vec<PathBuf>> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self.files.clone())
        }
    }

    #[derive(Default)]
    struct RecordingCompiler {
        names: Vec<String>,
        target: Option<CompileTarget>,
    }

    impl Compiler for RecordingCompiler {
        fn compile(
            &mut self,
            set: &CompilationSet,
            _diagnostics: &mut dyn DiagnosticSink,
            target: &CompileTarget,
        ) -> Result<(), CompilerError> {
            self.names = set.units().iter().map(|u| u.name.clone()).collect();
            self.target = Some(target.clone());
            Ok(())
        }
    }

    fn workspace(buffers: Vec<OpenDocument>) -> FakeWorkspace {
        FakeWorkspace {
            root: Some(PathBuf::from("/nonexistent-solbatch/proj")),
            buffers,
        }
    }

    const ROOT: &str = "/nonexistent-solbatch/proj";

    #[test]
    fn test_missing_root_is_error() {
        let workspace = FakeWorkspace {
            root: None,
            buffers: Vec::new(),
        };
        let search = FixedSearch::new(&[]);
        let reader = MemoryReader::new();
        let driver = Driver::new(&workspace, &search, &reader);
        let mut compiler = RecordingCompiler::default();
        let mut sink: Vec<Diagnostic> = Vec::new();

        let result = driver.compile_all(&Settings::default(), &mut compiler, &mut sink);

        assert!(matches!(result, Err(DriverError::RootNotFound)));
        assert!(compiler.target.is_none());
        assert!(search.requests.borrow().is_empty());
    }

    #[test]
    fn test_buffer_beats_disk() {
        let path = format!("{}/A.sol", ROOT);
        let workspace = workspace(vec![OpenDocument::new(&path, "contract Unsaved {}")]);
        let search = FixedSearch::new(&[path.as_str()]);
        let reader = MemoryReader::new().with_file(&path, "contract Saved {}");
        let driver = Driver::new(&workspace, &search, &reader);

        let (_, collection) = driver.collect(&Settings::default()).unwrap();

        assert_eq!(collection.len(), 1);
        let doc = collection.get(Path::new(&path)).unwrap();
        assert_eq!(doc.code(), "contract Unsaved {}");
        assert_eq!(doc.origin(), DocumentOrigin::Buffer);
    }

    #[test]
    fn test_skips_foreign_buffers() {
        let workspace = workspace(vec![
            OpenDocument::new("/elsewhere/X.sol", "contract X {}"),
            OpenDocument::new(format!("{}/notes.md", ROOT), "# notes"),
        ]);
        let search = FixedSearch::new(&[]);
        let reader = MemoryReader::new();
        let driver = Driver::new(&workspace, &search, &reader);

        let (_, collection) = driver.collect(&Settings::default()).unwrap();

        assert!(collection.is_empty());
    }

    #[test]
    fn test_default_bin_exclusion() {
        let workspace = workspace(Vec::new());
        let bin = format!("{}/bin/Out.sol", ROOT);
        let search = FixedSearch::new(&[bin.as_str()]);
        let reader = MemoryReader::new().with_file(&bin, "contract Out {}");
        let driver = Driver::new(&workspace, &search, &reader);

        driver.collect(&Settings::default()).unwrap();

        let requests = search.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].include, "**/*.sol");
        assert_eq!(requests[0].exclude, vec!["**/bin/**".to_string()]);
        assert_eq!(requests[0].max_results, MAX_SEARCH_RESULTS);
        assert_eq!(requests[0].base, PathBuf::from(ROOT));
    }

    #[test]
    fn test_import_errors_become_diagnostics() {
        let path = format!("{}/A.sol", ROOT);
        let workspace = workspace(vec![OpenDocument::new(&path, "import \"./Missing.sol\";")]);
        let search = FixedSearch::new(&[]);
        let reader = MemoryReader::new();
        let driver = Driver::new(&workspace, &search, &reader);
        let mut compiler = RecordingCompiler::default();
        let mut sink: Vec<Diagnostic> = Vec::new();

        let summary = driver
            .compile_all(&Settings::default(), &mut compiler, &mut sink)
            .unwrap();

        assert_eq!(summary.import_errors, 1);
        assert_eq!(summary.diagnostics, 1);
        assert_eq!(sink[0].code.as_deref(), Some("import"));
        assert_eq!(sink[0].path, Some(PathBuf::from(&path)));
        assert!(sink[0].message.contains("./Missing.sol"));
        assert_eq!(compiler.names, vec![path]);
    }

    #[test]
    fn test_compile_target_paths() {
        let workspace = workspace(Vec::new());
        let search = FixedSearch::new(&[]);
        let reader = MemoryReader::new();
        let driver = Driver::new(&workspace, &search, &reader);
        let mut compiler = RecordingCompiler::default();
        let mut sink: Vec<Diagnostic> = Vec::new();

        let summary = driver
            .compile_all(&Settings::default(), &mut compiler, &mut sink)
            .unwrap();

        assert_eq!(summary, CompileSummary::default());
        let target = compiler.target.unwrap();
        assert_eq!(target.project_path, ROOT);
        assert_eq!(target.sources_path, ROOT);
        assert_eq!(target.build_dir, None);
        assert_eq!(target.packages_path, Some(format!("{}/lib", ROOT)));
    }

    #[test]
    fn test_build_exclude_uses_declared_dir() {
        let project = Project::new("/proj").with_manifest(solbatch_pm::PackageManifest {
            build_dir: Some("build".to_string()),
            ..Default::default()
        });
        assert_eq!(build_exclude(&project), "**/build/**");
        assert_eq!(build_exclude(&Project::new("/proj")), "**/bin/**");
    }
}
