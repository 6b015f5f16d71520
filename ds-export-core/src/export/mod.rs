//! Export orchestration
//!
//! One run reads the input, checks the output directory, parses once,
//! extracts every entity kind and then writes the requested files. Any
//! failure before the first write leaves the output directory untouched.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::dedup::Deduplicator;
use crate::emit::{EntityKind, JsonEmitter};
use crate::error::ExportResult;
use crate::extract;
use crate::markup::MarkupParser;
use crate::model::{
    FormField, FormRecord, FormWorkflow, FunctionRecord, PageComponent, PageRecord, ReportField, ReportRecord,
    ReportWorkflow,
};
use crate::source::SourceText;

mod tests;

/// Every record extracted from one export file
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub functions: Vec<FunctionRecord>,
    pub form_workflows: Vec<FormWorkflow>,
    pub report_workflows: Vec<ReportWorkflow>,
    pub reports: Vec<ReportRecord>,
    pub report_fields: Vec<ReportField>,
    pub forms: Vec<FormRecord>,
    pub form_fields: Vec<FormField>,
    pub pages: Vec<PageRecord>,
    pub page_components: Vec<PageComponent>,
}

impl Extraction {
    /// Number of records of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Functions => self.functions.len(),
            EntityKind::FormWorkflows => self.form_workflows.len(),
            EntityKind::ReportWorkflows => self.report_workflows.len(),
            EntityKind::Reports => self.reports.len(),
            EntityKind::ReportFields => self.report_fields.len(),
            EntityKind::Forms => self.forms.len(),
            EntityKind::FormFields => self.form_fields.len(),
            EntityKind::Pages => self.pages.len(),
            EntityKind::PageComponents => self.page_components.len(),
        }
    }

    fn write(&self, emitter: &JsonEmitter, kind: EntityKind) -> ExportResult<PathBuf> {
        match kind {
            EntityKind::Functions => emitter.emit(kind, &self.functions),
            EntityKind::FormWorkflows => emitter.emit(kind, &self.form_workflows),
            EntityKind::ReportWorkflows => emitter.emit(kind, &self.report_workflows),
            EntityKind::Reports => emitter.emit(kind, &self.reports),
            EntityKind::ReportFields => emitter.emit(kind, &self.report_fields),
            EntityKind::Forms => emitter.emit(kind, &self.forms),
            EntityKind::FormFields => emitter.emit(kind, &self.form_fields),
            EntityKind::Pages => emitter.emit(kind, &self.pages),
            EntityKind::PageComponents => emitter.emit(kind, &self.page_components),
        }
    }
}

/// One written output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub kind: EntityKind,
    pub count: usize,
    pub path: PathBuf,
}

/// Outcome of an export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub out_dir: PathBuf,
    pub files: Vec<WrittenFile>,
}

/// Runs the read, parse, extract, write pipeline
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
    parser: MarkupParser,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        let parser = MarkupParser::with_config(&config.functions);
        Self { config, parser }
    }

    /// Parse a source and extract every entity kind
    pub fn extract(&self, source: SourceText) -> ExportResult<Extraction> {
        let doc = self.parser.parse(source)?;

        let form_workflows = extract::extract_form_workflows(&doc);
        let mut catalog = Deduplicator::new(&self.config.dedup).deduplicate(extract::extract_forms(&doc));
        catalog.link_workflows(&form_workflows);
        let pages = extract::extract_pages(&doc, &self.config.pages, &catalog);
        let (forms, form_fields) = catalog.into_parts();

        Ok(Extraction {
            functions: extract::extract_functions(&doc),
            form_workflows,
            report_workflows: extract::extract_report_workflows(&doc),
            reports: extract::extract_reports(&doc),
            report_fields: extract::extract_report_fields(&doc),
            forms,
            form_fields,
            pages,
            page_components: extract::extract_page_components(&doc, &self.config.pages),
        })
    }

    /// Export `kinds` from `input` into `out_dir`
    pub fn run(&self, input: &Path, out_dir: &Path, kinds: &[EntityKind]) -> ExportResult<ExportSummary> {
        info!("Exporting {} into {}", input.display(), out_dir.display());

        let source = SourceText::read(input)?;
        let emitter = JsonEmitter::prepare(out_dir, &self.config.output)?;
        let extraction = self.extract(source)?;

        let mut files = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let path = extraction.write(&emitter, kind)?;
            files.push(WrittenFile { kind, count: extraction.count(kind), path });
        }
        debug!("Export finished with {} files", files.len());

        Ok(ExportSummary { out_dir: emitter.out_dir().to_path_buf(), files })
    }
}

/// Write all nine files
pub fn export_all(input: &Path, out_dir: &Path, config: ExportConfig) -> ExportResult<ExportSummary> {
    Exporter::new(config).run(input, out_dir, &EntityKind::ALL)
}

/// Write the file of a single kind
pub fn export_entity(
    kind: EntityKind,
    input: &Path,
    out_dir: &Path,
    config: ExportConfig,
) -> ExportResult<ExportSummary> {
    Exporter::new(config).run(input, out_dir, &[kind])
}
