//! Solbatch Engine
//!
//! Builds the set of Solidity sources a project compiles as one batch:
//! - Import extraction from source text
//! - Import resolution (remappings, relative paths, dependency packages)
//! - A deduplicating document collection closed over transitive imports
//! - Dependency ordering and solc standard-JSON input
//! - The two-pass driver (open buffers first, then disk) feeding a compiler

pub mod collection;
pub mod compilation;
pub mod diagnostics;
pub mod document;
pub mod driver;
pub mod graph;
pub mod imports;
pub mod reader;
pub mod resolver;

pub use collection::SourceDocumentCollection;
pub use compilation::{CompilationSet, CompilationUnit};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use document::{DocumentOrigin, ImportError, SourceDocument};
pub use driver::{
    CompileSummary, CompileTarget, Compiler, CompilerError, Driver, DriverError, FileSearch,
    OpenDocument, SearchRequest, Workspace, MAX_SEARCH_RESULTS, SOURCE_EXTENSION,
};
pub use graph::ImportGraph;
pub use imports::extract_imports;
pub use reader::{DiskReader, MemoryReader, SourceReader};
pub use resolver::{resolve, ResolutionKind, ResolveError, ResolvedImport};

pub use solbatch_pm::{Project, Settings};
