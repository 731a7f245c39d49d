//! Compilation sets
//!
//! The final, ordered list of sources for one compiler invocation, plus the
//! per-run settings. Serializes to solc's standard-JSON input; sources keep
//! their dependency order in the emitted object.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

use solbatch_pm::format_path;

use crate::document::SourceDocument;

/// One source handed to the compiler
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// Canonical path
    pub path: PathBuf,
    /// Source unit name: the canonical path with forward slashes
    pub name: String,
    /// Source text
    pub content: String,
}

impl CompilationUnit {
    pub fn from_document(document: &SourceDocument) -> Self {
        Self {
            path: document.path().to_path_buf(),
            name: format_path(document.path()),
            content: document.code().to_string(),
        }
    }
}

/// Ordered sources plus optimizer settings for one compile
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationSet {
    units: Vec<CompilationUnit>,
    optimizer_runs: u32,
    remappings: Vec<String>,
}

impl CompilationSet {
    /// Create a set from units already in dependency order
    pub fn new(units: Vec<CompilationUnit>, optimizer_runs: u32) -> Self {
        Self {
            units,
            optimizer_runs,
            remappings: Vec::new(),
        }
    }

    /// Attach compiler remappings
    pub fn with_remappings(mut self, remappings: Vec<String>) -> Self {
        self.remappings = remappings;
        self
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn optimizer_runs(&self) -> u32 {
        self.optimizer_runs
    }

    /// The optimizer runs only when `optimizer_runs` is non-zero
    pub fn optimizer_enabled(&self) -> bool {
        self.optimizer_runs > 0
    }

    pub fn remappings(&self) -> &[String] {
        &self.remappings
    }

    /// solc standard-JSON input for this set
    pub fn standard_json(&self) -> StandardJsonInput<'_> {
        StandardJsonInput {
            language: "Solidity",
            sources: Sources(&self.units),
            settings: InputSettings {
                optimizer: Optimizer {
                    enabled: self.optimizer_enabled(),
                    runs: self.optimizer_runs,
                },
                remappings: &self.remappings,
                output_selection: default_output_selection(),
            },
        }
    }

    /// Pretty-printed standard-JSON input
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.standard_json())
    }
}

fn default_output_selection() -> serde_json::Value {
    json!({
        "*": {
            "": ["ast"],
            "*": [
                "abi",
                "devdoc",
                "userdoc",
                "storageLayout",
                "metadata",
                "evm.bytecode",
                "evm.deployedBytecode",
                "evm.methodIdentifiers",
                "evm.gasEstimates"
            ]
        }
    })
}

/// solc standard-JSON input document
#[derive(Debug, Serialize)]
pub struct StandardJsonInput<'a> {
    language: &'static str,
    sources: Sources<'a>,
    settings: InputSettings<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputSettings<'a> {
    optimizer: Optimizer,
    #[serde(skip_serializing_if = "no_remappings")]
    remappings: &'a [String],
    output_selection: serde_json::Value,
}

fn no_remappings(remappings: &&[String]) -> bool {
    remappings.is_empty()
}

#[derive(Debug, Serialize)]
struct Optimizer {
    enabled: bool,
    runs: u32,
}

/// Sources as a JSON object in dependency order
#[derive(Debug)]
struct Sources<'a>(&'a [CompilationUnit]);

impl Serialize for Sources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for unit in self.0 {
            map.serialize_entry(&unit.name, &json!({ "content": unit.content }))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(path: &str, content: &str) -> CompilationUnit {
        CompilationUnit {
            path: PathBuf::from(path),
            name: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_standard_json_shape() {
        let set = CompilationSet::new(vec![unit("/proj/A.sol", "contract A {}")], 200)
            .with_remappings(vec!["@oz/=/proj/lib/oz/".to_string()]);

        let value = serde_json::to_value(set.standard_json()).unwrap();

        assert_eq!(value["language"], "Solidity");
        assert_eq!(value["sources"]["/proj/A.sol"]["content"], "contract A {}");
        assert_eq!(value["settings"]["optimizer"]["enabled"], true);
        assert_eq!(value["settings"]["optimizer"]["runs"], 200);
        assert_eq!(value["settings"]["remappings"][0], "@oz/=/proj/lib/oz/");
        assert_eq!(value["settings"]["outputSelection"]["*"][""][0], "ast");
    }

    #[test]
    fn test_zero_runs_disables_optimizer() {
        let set = CompilationSet::new(Vec::new(), 0);
        let value = serde_json::to_value(set.standard_json()).unwrap();

        assert!(!set.optimizer_enabled());
        assert_eq!(value["settings"]["optimizer"]["enabled"], false);
        assert!(value["settings"].get("remappings").is_none());
    }

    #[test]
    fn test_sources_keep_dependency_order() {
        let set = CompilationSet::new(
            vec![unit("/proj/Z.sol", ""), unit("/proj/A.sol", "")],
            200,
        );

        let text = set.to_json_string().unwrap();

        let z = text.find("/proj/Z.sol").unwrap();
        let a = text.find("/proj/A.sol").unwrap();
        assert!(z < a);
    }
}
