//! Export configuration
//!
//! Loaded from an optional TOML file; every section falls back to defaults
//! so a partial file is enough.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ExportError, ExportResult};

/// Configuration structure for ds-export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// JSON output settings
    pub output: OutputConfig,

    /// Form deduplication settings
    pub dedup: DedupConfig,

    /// Page component settings
    pub pages: PageConfig,

    /// Deluge function settings
    pub functions: FunctionConfig,
}

/// JSON output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent JSON with two spaces
    pub pretty: bool,

    /// Create the output directory when it is missing
    pub create_dir: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true, create_dir: true }
    }
}

/// Form deduplication settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Treat definitions that differ only in whitespace as duplicates
    pub ignore_whitespace: bool,
}

/// Page component settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// ZML tags reported as page components
    pub component_tags: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            component_tags: ["report", "form", "button", "chart", "image", "text"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Deluge function settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Return types that introduce a function header
    pub return_types: Vec<String>,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            return_types: ["void", "string", "map", "list", "int", "bool", "decimal", "date"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> ExportResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ExportError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|message| ExportError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> ExportResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
