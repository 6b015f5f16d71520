//! Core functionality for ds-export
//!
//! This crate turns a Zoho Creator `.ds` application export into a set of
//! JSON documents: forms and their fields, reports and their columns, form
//! and report workflows with their Deluge code, functions, pages and page
//! components. The pipeline is read, parse, extract, deduplicate, write.

pub mod config;
pub mod dedup;
pub mod emit;
pub mod error;
pub mod export;
pub mod extract;
pub mod markup;
pub mod model;
pub mod source;

pub use config::ExportConfig;
pub use emit::{EntityKind, JsonEmitter};
pub use error::{ExportError, ExportResult, ParseError};
pub use export::{export_all, export_entity, ExportSummary, Exporter, Extraction, WrittenFile};
pub use source::SourceText;
