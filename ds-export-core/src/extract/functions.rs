//! Deluge function extraction

use tracing::debug;

use crate::markup::{Document, Tag};
use crate::model::{FunctionRecord, Parameter};

/// Extract every function definition, outermost first in document order
pub fn extract_functions(doc: &Document) -> Vec<FunctionRecord> {
    let source = doc.source();
    let functions: Vec<FunctionRecord> = doc
        .find(&|n| matches!(n.tag, Tag::Function { .. }))
        .into_iter()
        .filter_map(|node| {
            let Tag::Function { return_type, full_name, parameters } = &node.tag else {
                return None;
            };
            let (namespace, name) = split_name(full_name);

            Some(FunctionRecord {
                namespace: namespace.map(str::to_string),
                name: name.to_string(),
                full_name: full_name.clone(),
                return_type: return_type.clone(),
                parameters: parse_parameters(parameters),
                header_line: source.line_of(node.header_start),
                body_start: source.file_position(node.open + 1),
                body_end: source.file_position(node.close),
                body: doc.slice(node.body()).to_string(),
                full_source: doc.slice(node.span()).to_string(),
                provenance: doc.provenance(node.span()),
            })
        })
        .collect();

    debug!("Found {} functions", functions.len());
    functions
}

/// Split `ns.name` at the last dot
fn split_name(full_name: &str) -> (Option<&str>, &str) {
    match full_name.rsplit_once('.') {
        Some((namespace, name)) => (Some(namespace), name),
        None => (None, full_name),
    }
}

/// Parse `type name, type name` declarations
fn parse_parameters(raw: &str) -> Vec<Parameter> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.rsplit_once(char::is_whitespace) {
            Some((ty, name)) => Parameter { param_type: ty.trim().to_string(), name: name.to_string() },
            None => Parameter { param_type: String::new(), name: p.to_string() },
        })
        .collect()
}
