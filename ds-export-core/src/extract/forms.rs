//! Form and form field extraction
//!
//! Forms are collected from every `form <Name>` block, whether it sits in the
//! top-level `forms` section or directly inside a page. The same form may
//! therefore be seen several times; folding the copies together is left to
//! [`crate::dedup`].

use regex_utils::{attributes::unquote, form_fields::FIELD_HEADER};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::markup::{parse_attributes, scan, Attribute, Document, Node, Span, Tag};
use crate::model::{FormScript, Provenance};

/// One occurrence of a form definition in the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefinition {
    pub name: String,

    /// `forms` or `page <Name>`
    pub container: String,

    pub display_name: String,
    pub description: String,
    pub success_message: String,
    pub fields: Vec<FieldDefinition>,
    pub scripts: Vec<FormScript>,

    /// Text between the form's braces
    pub body: String,

    pub provenance: Provenance,
}

/// A field as declared inside one form occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub display_name: Option<String>,
    pub field_type: Option<String>,
    pub required: bool,
    pub default_value: Option<String>,
    pub lookup_form: Option<String>,
    pub attributes: BTreeMap<String, String>,

    /// Trimmed text between the configuration parentheses
    pub config: String,

    pub provenance: Provenance,
}

/// Extract every form occurrence in document order
pub fn extract_forms(doc: &Document) -> Vec<FormDefinition> {
    let mut forms = Vec::new();
    doc.walk(&mut |node, ancestors| {
        let Tag::Form { name } = &node.tag else {
            return;
        };
        let container = ancestors
            .iter()
            .rev()
            .find_map(|a| match &a.tag {
                Tag::Page { name } => Some(format!("page {name}")),
                _ => None,
            })
            .unwrap_or_else(|| "forms".to_string());

        forms.push(FormDefinition {
            name: name.clone(),
            container,
            display_name: node.attribute("displayname").map(|v| unquote(v).to_string()).unwrap_or_default(),
            description: node.attribute("description").map(|v| unquote(v).to_string()).unwrap_or_default(),
            success_message: node
                .attribute("success message")
                .map(|v| unquote(v).to_string())
                .unwrap_or_default(),
            fields: extract_fields(doc, node, name),
            scripts: extract_scripts(doc, node),
            body: doc.slice(node.body()).to_string(),
            provenance: doc.provenance(node.span()),
        });
    });

    debug!("Found {} form definitions", forms.len());
    forms
}

/// Field declarations of a form: a bare name line followed by `( ... )`
fn extract_fields(doc: &Document, form: &Node, form_name: &str) -> Vec<FieldDefinition> {
    let text = doc.text();
    let body = form.body();
    let mut fields = Vec::new();
    let mut cursor = body.start;

    for caps in FIELD_HEADER.captures_iter(doc.slice(body)) {
        let Some(name) = caps.get(2) else { continue };
        let start = body.start + caps.get(1).unwrap_or(name).start();
        if start < cursor || form.in_child(start) {
            continue;
        }

        let open = scan::skip_whitespace(text, body.start + name.end());
        if open >= body.end || text.as_bytes()[open] != b'(' {
            continue;
        }
        let close = match scan::matching_paren(text, open) {
            Some(close) if close < body.end => close,
            _ => {
                warn!(
                    "Unbalanced configuration for field {} in form {} at line {}, skipping",
                    name.as_str(),
                    form_name,
                    doc.source().line_of(open)
                );
                continue;
            }
        };
        cursor = close + 1;

        let config = text[open + 1..close].trim();
        let attrs = parse_attributes(config);

        fields.push(FieldDefinition {
            name: name.as_str().to_string(),
            display_name: find(&attrs, "displayname").map(|v| unquote(v).to_string()),
            field_type: find(&attrs, "type").and_then(|v| v.split_whitespace().next()).map(str::to_string),
            required: caps.get(1).is_some() || find(&attrs, "required").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            default_value: find(&attrs, "default").map(|v| unquote(v).to_string()),
            lookup_form: find(&attrs, "form").map(|v| unquote(v).to_string()),
            attributes: attrs.iter().fold(BTreeMap::new(), |mut map, a| {
                map.entry(a.key.clone()).or_insert_with(|| a.value.clone());
                map
            }),
            config: config.to_string(),
            provenance: doc.provenance(Span::new(start, close + 1)),
        });
    }

    fields
}

/// Event blocks written directly inside the form
fn extract_scripts(doc: &Document, form: &Node) -> Vec<FormScript> {
    form.find(&|n| matches!(n.tag, Tag::Event { .. }))
        .into_iter()
        .filter_map(|event| match &event.tag {
            Tag::Event { trigger } => Some(FormScript {
                trigger: trigger.clone(),
                code: doc.slice(event.body()).to_string(),
            }),
            _ => None,
        })
        .collect()
}

fn find<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.key.eq_ignore_ascii_case(key))
        .map(|a| a.value.as_str())
}
