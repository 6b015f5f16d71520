//! JSON output
//!
//! Every entity kind is written to its own file as one JSON array. Files are
//! staged as temporary files in the output directory and renamed into place,
//! so a failed write never leaves a truncated file under the final name.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::{ExportError, ExportResult};

/// The kinds of records the exporter writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Functions,
    FormWorkflows,
    ReportWorkflows,
    Reports,
    ReportFields,
    Forms,
    FormFields,
    Pages,
    PageComponents,
}

impl EntityKind {
    /// Every kind, in the order a full export writes them
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Functions,
        EntityKind::FormWorkflows,
        EntityKind::ReportWorkflows,
        EntityKind::Reports,
        EntityKind::ReportFields,
        EntityKind::Forms,
        EntityKind::FormFields,
        EntityKind::Pages,
        EntityKind::PageComponents,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            EntityKind::Functions => "functions_with_code.json",
            EntityKind::FormWorkflows => "form_workflows_with_code.json",
            EntityKind::ReportWorkflows => "report_workflows_with_code.json",
            EntityKind::Reports => "reports.json",
            EntityKind::ReportFields => "report_fields.json",
            EntityKind::Forms => "forms.json",
            EntityKind::FormFields => "form_fields.json",
            EntityKind::Pages => "pages.json",
            EntityKind::PageComponents => "page_components.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Functions => "functions",
            EntityKind::FormWorkflows => "form workflows",
            EntityKind::ReportWorkflows => "report workflows",
            EntityKind::Reports => "reports",
            EntityKind::ReportFields => "report fields",
            EntityKind::Forms => "forms",
            EntityKind::FormFields => "form fields",
            EntityKind::Pages => "pages",
            EntityKind::PageComponents => "page components",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Writes record arrays into an output directory
#[derive(Debug, Clone)]
pub struct JsonEmitter {
    out_dir: PathBuf,
    pretty: bool,
}

impl JsonEmitter {
    /// Make sure `out_dir` exists and accepts new files
    pub fn prepare(out_dir: &Path, config: &OutputConfig) -> ExportResult<Self> {
        if !out_dir.exists() {
            if !config.create_dir {
                return Err(ExportError::output(
                    out_dir,
                    io::Error::new(io::ErrorKind::NotFound, "output directory does not exist"),
                ));
            }
            fs::create_dir_all(out_dir).map_err(|e| ExportError::output(out_dir, e))?;
            debug!("Created output directory {}", out_dir.display());
        }

        if !out_dir.is_dir() {
            return Err(ExportError::output(
                out_dir,
                io::Error::new(io::ErrorKind::InvalidInput, "output path is not a directory"),
            ));
        }

        tempfile::Builder::new()
            .prefix(".ds-export-probe")
            .tempfile_in(out_dir)
            .map_err(|e| ExportError::output(out_dir, e))?;

        Ok(Self { out_dir: out_dir.to_path_buf(), pretty: config.pretty })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Final path of a kind's file
    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.out_dir.join(kind.file_name())
    }

    /// Write `records` as the file for `kind`
    pub fn emit<T: Serialize>(&self, kind: EntityKind, records: &[T]) -> ExportResult<PathBuf> {
        let path = self.path_for(kind);
        let staged = tempfile::Builder::new()
            .prefix(kind.file_name())
            .suffix(".tmp")
            .tempfile_in(&self.out_dir)
            .map_err(|e| ExportError::output(&path, e))?;

        {
            let mut writer = BufWriter::new(staged.as_file());
            self.write_json(&mut writer, records).map_err(|e| ExportError::output(&path, e))?;
        }

        staged.persist(&path).map_err(|e| ExportError::output(&path, e.error))?;
        info!("Wrote {} {} to {}", records.len(), kind, path.display());
        Ok(path)
    }

    fn write_json<W: Write, T: Serialize>(&self, writer: &mut W, records: &[T]) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, records)?;
        } else {
            serde_json::to_writer(&mut *writer, records)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        code: &'static str,
    }

    #[test]
    fn test_emit_writes_array() {
        let dir = TempDir::new().unwrap();
        let emitter = JsonEmitter::prepare(dir.path(), &OutputConfig::default()).unwrap();
        let rows = [Row { name: "a", code: "x = \"1\";\nreturn;" }];
        let path = emitter.emit(EntityKind::Functions, &rows).unwrap();

        assert_eq!(path, dir.path().join("functions_with_code.json"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {"));
        assert!(written.ends_with("]\n"));
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value[0]["code"], "x = \"1\";\nreturn;");
    }

    #[test]
    fn test_no_temporary_files_remain() {
        let dir = TempDir::new().unwrap();
        let emitter = JsonEmitter::prepare(dir.path(), &OutputConfig::default()).unwrap();
        emitter.emit::<Row>(EntityKind::Pages, &[]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pages.json".to_string()]);
    }

    #[test]
    fn test_compact_output() {
        let dir = TempDir::new().unwrap();
        let config = OutputConfig { pretty: false, create_dir: true };
        let emitter = JsonEmitter::prepare(dir.path(), &config).unwrap();
        let path = emitter.emit(EntityKind::Forms, &[Row { name: "a", code: "" }]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[{\"name\":\"a\",\"code\":\"\"}]\n");
    }

    #[test]
    fn test_prepare_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        JsonEmitter::prepare(&out, &OutputConfig::default()).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_prepare_rejects_missing_directory_without_create() {
        let dir = TempDir::new().unwrap();
        let config = OutputConfig { pretty: true, create_dir: false };
        let err = JsonEmitter::prepare(&dir.path().join("missing"), &config).unwrap_err();
        assert!(matches!(err, ExportError::OutputWrite { .. }));
    }

    #[test]
    fn test_prepare_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, "x").unwrap();
        let err = JsonEmitter::prepare(&file, &OutputConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::OutputWrite { .. }));
    }

    #[test]
    fn test_file_names() {
        let names: Vec<_> = EntityKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"report_workflows_with_code.json"));
        assert_eq!(EntityKind::FormFields.to_string(), "form fields");
    }
}
