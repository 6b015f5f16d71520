//! Raw export file reading
//!
//! Decodes the export as UTF-8 and keeps a line index so every byte offset
//! can be reported as a 1-based line number.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ExportError, ExportResult};

const UTF8_BOM: &str = "\u{feff}";

/// The decoded text of a single export file
#[derive(Debug, Clone)]
pub struct SourceText {
    name: String,
    text: String,
    /// Bytes skipped before `text` in the original file (a UTF-8 BOM)
    offset: usize,
    line_starts: Vec<usize>,
}

impl SourceText {
    /// Build from in-memory text; `name` is reported as the source file
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut text = text.into();
        let mut offset = 0;
        if text.starts_with(UTF8_BOM) {
            text.replace_range(..UTF8_BOM.len(), "");
            offset = UTF8_BOM.len();
        }

        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();

        Self { name: name.into(), text, offset, line_starts }
    }

    /// Read and decode an export file
    pub fn read(path: &Path) -> ExportResult<Self> {
        if !path.is_file() {
            return Err(ExportError::InputNotFound { path: path.to_path_buf() });
        }

        let bytes = fs::read(path)
            .map_err(|source| ExportError::InputRead { path: path.to_path_buf(), source })?;

        if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
            return Err(ExportError::InputRead {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, "UTF-16 encoded exports are not supported"),
            });
        }

        let text = String::from_utf8(bytes).map_err(|e| ExportError::InputRead {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self::new(name, text))
    }

    /// Base name of the export file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded text without any BOM
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based line number of a byte offset into [`text`](Self::text)
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Byte offset in the original file for an offset into the decoded text
    pub fn file_position(&self, offset: usize) -> usize {
        offset + self.offset
    }
}
