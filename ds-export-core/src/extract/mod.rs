//! Entity extractors
//!
//! Each extractor walks a parsed [`Document`](crate::markup::Document) and
//! returns the records of one entity kind in document order. Constructs that
//! cannot be read (an unbalanced parenthesis group, a missing column list)
//! are logged and skipped; nothing is inferred that the export does not
//! spell out.

pub mod form_workflows;
pub mod forms;
pub mod functions;
pub mod page_components;
pub mod pages;
pub mod report_fields;
pub mod report_workflows;
pub mod reports;

pub use form_workflows::extract_form_workflows;
pub use forms::{extract_forms, FieldDefinition, FormDefinition};
pub use functions::extract_functions;
pub use page_components::extract_page_components;
pub use pages::extract_pages;
pub use report_fields::extract_report_fields;
pub use report_workflows::extract_report_workflows;
pub use reports::extract_reports;
