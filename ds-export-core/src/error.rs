//! Error types for export operations
//!
//! This module defines strongly-typed errors for reading, parsing and
//! writing, using thiserror for automatic error trait implementations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structural error raised by the markup parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `{` was never closed
    #[error("unterminated block '{header}' opened at line {line}")]
    UnterminatedBlock { header: String, line: usize },

    /// A `}` appeared with no open block
    #[error("unexpected '}}' at line {line}")]
    UnexpectedClose { line: usize },

    /// A string literal ran to the end of the file
    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },
}

/// Main error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    /// The input path does not exist or is not a file
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// The input could not be read or decoded
    #[error("failed to read input file {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is structurally malformed
    #[error("malformed export file: {0}")]
    Parse(#[from] ParseError),

    /// The output directory or an output file could not be written
    #[error("cannot write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be loaded
    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl ExportError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputWrite { path: path.into(), source }
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
