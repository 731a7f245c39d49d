//! Filesystem search backed by `glob`
//!
//! Exclude patterns are matched against paths relative to the search base,
//! so directories above the project never trigger them.

use glob::Pattern;
use std::io;
use std::path::PathBuf;

use solbatch_engine::{FileSearch, SearchRequest};

/// Finds files with `glob`, dropping excluded matches
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobSearch;

fn invalid_input(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
}

impl FileSearch for GlobSearch {
    fn find(&self, request: &SearchRequest) -> io::Result<Vec<PathBuf>> {
        let base = request
            .base
            .to_str()
            .ok_or_else(|| invalid_input(format!("non-UTF-8 path {}", request.base.display())))?;
        let pattern = format!(
            "{}/{}",
            Pattern::escape(base.trim_end_matches('/')),
            request.include
        );
        let excludes = request
            .exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_input)?;

        let mut files = Vec::new();
        for entry in glob::glob(&pattern).map_err(invalid_input)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let relative = path.strip_prefix(&request.base).unwrap_or(&path);
            if !path.is_file() || excludes.iter().any(|e| e.matches_path(relative)) {
                continue;
            }
            files.push(path);
            if files.len() >= request.max_results {
                log::warn!(
                    "stopped after {} files under {}",
                    request.max_results,
                    request.base.display()
                );
                break;
            }
        }

        Ok(files)
    }
}
