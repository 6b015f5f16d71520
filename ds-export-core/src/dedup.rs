//! Form deduplication
//!
//! A form embedded in several pages shows up once per inclusion. Occurrences
//! with the same [`FormKey`] collapse into the first one, which keeps the
//! later positions as alternate locations. Distinct definitions sharing a
//! name stay separate and get suffixed ids (`Name~2`, `Name~3`, ...).

use regex_utils::whitespace;
use std::collections::HashMap;
use tracing::debug;

use crate::config::DedupConfig;
use crate::extract::{FieldDefinition, FormDefinition};
use crate::model::{FormField, FormRecord, FormWorkflow, Location};

/// Structural identity of a form definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormKey {
    name: String,
    fields: Vec<(String, String)>,
    scripts: Vec<(String, String)>,
}

impl FormKey {
    /// Key of a definition; with `ignore_whitespace` every whitespace run
    /// compares equal to a single space
    ///
    /// Field configs and script bodies are dedented first, so the same
    /// definition nested at different depths yields the same key.
    pub fn of(form: &FormDefinition, ignore_whitespace: bool) -> Self {
        let norm = |s: &str| {
            let text = dedent(s);
            if ignore_whitespace { whitespace::collapse(&text) } else { text }
        };
        Self {
            name: form.name.clone(),
            fields: form.fields.iter().map(|f| (f.name.clone(), norm(&f.config))).collect(),
            scripts: form.scripts.iter().map(|s| (s.trigger.clone(), norm(&s.code))).collect(),
        }
    }
}

/// Strip the indentation shared by every line after the first
///
/// The first line follows an opening delimiter and carries no indentation of
/// its own. Whitespace-only lines become empty.
fn dedent(text: &str) -> String {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .copied()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(common_prefix)
        .unwrap_or_default();

    let mut out = first.to_string();
    for line in rest {
        out.push('\n');
        if !line.trim().is_empty() {
            out.push_str(line.strip_prefix(indent).unwrap_or(line));
        }
    }
    out
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((idx, _), _)| idx);
    &a[..end]
}

/// Collapses repeated form definitions
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    ignore_whitespace: bool,
}

impl Deduplicator {
    pub fn new(config: &DedupConfig) -> Self {
        Self { ignore_whitespace: config.ignore_whitespace }
    }

    /// Fold occurrences into canonical records, keeping encounter order
    pub fn deduplicate(&self, definitions: Vec<FormDefinition>) -> FormCatalog {
        let mut catalog = FormCatalog::default();
        let mut index: HashMap<FormKey, usize> = HashMap::new();
        let mut variants: HashMap<String, usize> = HashMap::new();
        let total = definitions.len();

        for definition in definitions {
            let key = FormKey::of(&definition, self.ignore_whitespace);
            if let Some(&idx) = index.get(&key) {
                let canonical = &mut catalog.forms[idx];
                canonical
                    .alternate_locations
                    .push(Location::from((definition.container.as_str(), &definition.provenance)));
                catalog.containers.push((definition.container, canonical.form_id.clone()));
                continue;
            }

            let count = variants.entry(definition.name.clone()).or_insert(0);
            *count += 1;
            let form_id = match *count {
                1 => definition.name.clone(),
                n => format!("{}~{}", definition.name, n),
            };

            catalog.fields.extend(
                definition
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(idx, field)| form_field(&form_id, &definition.name, idx + 1, field)),
            );
            catalog.containers.push((definition.container.clone(), form_id.clone()));
            index.insert(key, catalog.forms.len());
            catalog.forms.push(FormRecord {
                form_id,
                form_name: definition.name,
                display_name: definition.display_name,
                description: definition.description,
                success_message: definition.success_message,
                container: definition.container,
                fields: definition.fields.into_iter().map(|f| f.name).collect(),
                scripts: definition.scripts,
                workflows: Vec::new(),
                alternate_locations: Vec::new(),
                body: definition.body,
                provenance: definition.provenance,
            });
        }

        debug!("Deduplicated {} form definitions into {} forms", total, catalog.forms.len());
        catalog
    }
}

fn form_field(form_id: &str, form_name: &str, order: usize, field: &FieldDefinition) -> FormField {
    FormField {
        form_id: form_id.to_string(),
        form_name: form_name.to_string(),
        field_name: field.name.clone(),
        display_name: field.display_name.clone(),
        field_type: field.field_type.clone(),
        required: field.required,
        default_value: field.default_value.clone(),
        lookup_details: field
            .lookup_form
            .as_ref()
            .map(|form| [("form".to_string(), form.clone())].into_iter().collect()),
        attributes: field.attributes.clone(),
        order,
        config: field.config.clone(),
        provenance: field.provenance.clone(),
    }
}

/// Canonical forms with their fields and where each occurrence lives
#[derive(Debug, Clone, Default)]
pub struct FormCatalog {
    forms: Vec<FormRecord>,
    fields: Vec<FormField>,
    /// `(container, form_id)` for every occurrence, in encounter order
    containers: Vec<(String, String)>,
}

impl FormCatalog {
    pub fn forms(&self) -> &[FormRecord] {
        &self.forms
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Id of the first canonical form with this name
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.forms
            .iter()
            .find(|f| f.form_name == name)
            .map(|f| f.form_id.as_str())
    }

    /// Ids of the forms defined in a container, without repeats
    pub fn ids_in_container(&self, container: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for (_, id) in self.containers.iter().filter(|(c, _)| c == container) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    /// Record which workflows target each form
    pub fn link_workflows(&mut self, workflows: &[FormWorkflow]) {
        for workflow in workflows {
            for form in self.forms.iter_mut().filter(|f| f.form_name == workflow.form_name) {
                if !form.workflows.contains(&workflow.workflow_name) {
                    form.workflows.push(workflow.workflow_name.clone());
                }
            }
        }
    }

    pub fn into_parts(self) -> (Vec<FormRecord>, Vec<FormField>) {
        (self.forms, self.fields)
    }
}
