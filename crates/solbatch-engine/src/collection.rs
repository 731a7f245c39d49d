//! Source document collection
//!
//! The registry of every document a compile run knows about. Adding a
//! document pulls in everything it imports, transitively, so the collection
//! is always closed over resolvable imports. Imports that cannot be followed
//! are recorded on the importing document instead of failing the run.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use solbatch_pm::Project;

use crate::compilation::{CompilationSet, CompilationUnit};
use crate::document::{DocumentOrigin, ImportError, SourceDocument};
use crate::graph::ImportGraph;
use crate::reader::SourceReader;
use crate::resolver::resolve;

/// Deduplicating registry of source documents keyed by canonical path
#[derive(Debug)]
pub struct SourceDocumentCollection<R> {
    reader: R,
    documents: FxHashMap<PathBuf, SourceDocument>,
    order: Vec<PathBuf>,
}

impl<R: SourceReader> SourceDocumentCollection<R> {
    /// Create an empty collection reading imports through `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            documents: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Add a document and everything it imports
    ///
    /// Returns `false` without touching the collection when the canonical
    /// path is already present, so the first version added always wins.
    /// Imports are followed with an explicit worklist; a target that is
    /// already present (including one still being processed) is never read
    /// again, which also terminates import cycles.
    pub fn add_document(
        &mut self,
        path: &Path,
        code: impl Into<String>,
        origin: DocumentOrigin,
        project: &Project,
    ) -> bool {
        let key = self.reader.canonicalize(path);
        if self.documents.contains_key(&key) {
            log::debug!("{} already collected, keeping first version", key.display());
            return false;
        }

        self.insert(SourceDocument::new(key.clone(), code.into(), origin));

        let mut pending = vec![key];
        while let Some(current) = pending.pop() {
            let imports = match self.documents.get(&current) {
                Some(doc) => doc.imports().to_vec(),
                None => continue,
            };

            let mut dependencies = Vec::new();
            let mut errors = Vec::new();

            for specifier in imports {
                let resolved = match resolve(&specifier, &current, project, &self.reader) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        log::warn!("{}: {}", current.display(), e);
                        errors.push(ImportError::Resolve(e));
                        continue;
                    }
                };

                let target = self.reader.canonicalize(&resolved.path);
                if !self.documents.contains_key(&target) {
                    match self.reader.read_text(&target) {
                        Ok(code) => {
                            log::debug!(
                                "{} imports {} ({:?})",
                                current.display(),
                                target.display(),
                                resolved.kind
                            );
                            let document =
                                SourceDocument::new(target.clone(), code, DocumentOrigin::Disk);
                            self.insert(document);
                            pending.push(target.clone());
                        }
                        Err(e) => {
                            log::warn!(
                                "{}: cannot read import '{}' at {}: {}",
                                current.display(),
                                specifier,
                                target.display(),
                                e
                            );
                            errors.push(ImportError::Read {
                                specifier,
                                path: target,
                                message: e.to_string(),
                            });
                            continue;
                        }
                    }
                }

                dependencies.push(target);
            }

            if let Some(doc) = self.documents.get_mut(&current) {
                for dependency in dependencies {
                    doc.add_dependency(dependency);
                }
                for error in errors {
                    doc.add_error(error);
                }
            }
        }

        true
    }

    fn insert(&mut self, document: SourceDocument) {
        self.order.push(document.path().to_path_buf());
        self.documents.insert(document.path().to_path_buf(), document);
    }

    /// Whether a document with this path's canonical form is present
    pub fn contains(&self, path: &Path) -> bool {
        self.documents.contains_key(&self.reader.canonicalize(path))
    }

    /// Look up a document by path
    pub fn get(&self, path: &Path) -> Option<&SourceDocument> {
        self.documents.get(&self.reader.canonicalize(path))
    }

    /// All documents in the order they were added
    pub fn documents(&self) -> impl Iterator<Item = &SourceDocument> {
        self.order.iter().map(move |path| &self.documents[path])
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every recorded import failure with the document that declared it
    pub fn import_errors(&self) -> impl Iterator<Item = (&Path, &ImportError)> {
        self.documents()
            .flat_map(|doc| doc.errors().iter().map(move |e| (doc.path(), e)))
    }

    /// Import graph over the collected documents
    pub fn graph(&self) -> ImportGraph {
        let mut graph = ImportGraph::new();
        for doc in self.documents() {
            graph.add_module(doc.path().to_path_buf());
            for dependency in doc.dependencies() {
                graph.add_dependency(doc.path().to_path_buf(), dependency.clone());
            }
        }
        graph
    }

    /// The documents to hand to the compiler
    ///
    /// Every document outside the project's build directory, dependencies
    /// first, annotated with the optimizer setting.
    pub fn compilation_set(&self, project: &Project, optimizer_runs: u32) -> CompilationSet {
        let graph = self.graph();
        if log::log_enabled!(log::Level::Debug) {
            if let Some(cycle) = graph.find_cycle() {
                log::debug!(
                    "import cycle: {}",
                    cycle
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ")
                );
            }
        }

        let units = graph
            .dependency_order()
            .into_iter()
            .filter(|path| {
                let excluded = project.is_in_build_dir(path);
                if excluded {
                    log::debug!("skipping {} (build directory)", path.display());
                }
                !excluded
            })
            .filter_map(|path| self.documents.get(&path))
            .map(CompilationUnit::from_document)
            .collect();

        CompilationSet::new(units, optimizer_runs).with_remappings(project.compiler_remappings())
    }
}
