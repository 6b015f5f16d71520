//! Output records, one type per JSON file
//!
//! Records are flat and immutable once built. Cross references (a field's
//! form, a page's forms) are plain identifiers and are never validated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a record came from in the export file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Base name of the export file
    pub source_file: String,

    /// 1-based line of the first byte
    pub start_line: usize,

    /// 1-based line of the last byte
    pub end_line: usize,

    /// Byte offset of the first byte in the export file
    pub start_position: usize,

    /// Byte offset one past the last byte
    pub end_position: usize,
}

/// A further occurrence of a deduplicated form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Section the occurrence was found in (`forms` or `page <Name>`)
    pub container: String,

    pub start_line: usize,
    pub end_line: usize,
    pub start_position: usize,
    pub end_position: usize,
}

impl From<(&str, &Provenance)> for Location {
    fn from((container, provenance): (&str, &Provenance)) -> Self {
        Self {
            container: container.to_string(),
            start_line: provenance.start_line,
            end_line: provenance.end_line,
            start_position: provenance.start_position,
            end_position: provenance.end_position,
        }
    }
}

/// Event code embedded directly in a form definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormScript {
    pub trigger: String,
    pub code: String,
}

/// A canonical form definition (`forms.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    /// Stable identifier: the form name, suffixed `~N` for later distinct variants
    pub form_id: String,
    pub form_name: String,
    pub display_name: String,
    pub description: String,
    pub success_message: String,

    /// Section of the first occurrence (`forms` or `page <Name>`)
    pub container: String,

    /// Field names in document order
    pub fields: Vec<String>,

    pub scripts: Vec<FormScript>,

    /// Form workflows whose `form =` targets this form
    pub workflows: Vec<String>,

    /// Identical definitions found later in the file
    pub alternate_locations: Vec<Location>,

    pub body: String,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A field of a form (`form_fields.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub form_id: String,
    pub form_name: String,
    pub field_name: String,
    pub display_name: Option<String>,

    #[serde(rename = "type")]
    pub field_type: Option<String>,

    pub required: bool,
    pub default_value: Option<String>,
    pub lookup_details: Option<BTreeMap<String, String>>,

    /// Every top-level `key = value` of the field configuration
    pub attributes: BTreeMap<String, String>,

    /// 1-based position within the form
    pub order: usize,

    /// Raw configuration text between the parentheses
    pub config: String,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A report definition (`reports.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_name: String,
    pub report_type: String,
    pub display_name: String,
    pub base_form: Option<String>,

    /// Criteria text between `[` and `]` after the base form
    pub criteria: Option<String>,

    pub filters: Option<String>,
    pub sort_by: Option<String>,
    pub group_by: Option<String>,
    pub template: Option<String>,
    pub print_template: Option<String>,
    pub field_count: usize,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A column of a report (`report_fields.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportField {
    pub report_name: String,
    pub field_name: String,
    pub display_name: Option<String>,
    pub expression: String,
    pub order: usize,
    pub config: Option<String>,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A single action executed by a workflow event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAction {
    pub action_type: String,
    pub script: String,
}

/// A trigger inside a form workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// `on <trigger>`, with `on user input` split from its field
    pub event_type: String,
    pub field: Option<String>,
    pub actions: Vec<WorkflowAction>,
}

/// A form workflow with its Deluge code (`form_workflows_with_code.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormWorkflow {
    pub workflow_name: String,
    pub display_name: String,

    #[serde(rename = "type")]
    pub workflow_type: String,

    pub form_name: String,
    pub record_event: String,
    pub events: Vec<WorkflowEvent>,
    pub body: String,
    pub full_source: String,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A custom action button on a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAction {
    pub action_label: String,
    pub workflow_name: String,
    pub settings: BTreeMap<String, String>,
    pub body: String,
    pub full_source: String,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A report together with its custom actions (`report_workflows_with_code.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWorkflow {
    pub report_name: String,
    pub report_type: String,
    pub display_name: String,
    pub actions: Vec<CustomAction>,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// A declared function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub param_type: String,
    pub name: String,
}

/// A Deluge function (`functions_with_code.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub namespace: Option<String>,
    pub name: String,
    pub full_name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub header_line: usize,

    /// Byte offset of the first body byte
    pub body_start: usize,

    /// Byte offset of the closing brace
    pub body_end: usize,

    pub body: String,
    pub full_source: String,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Short component descriptor listed on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub component_id: usize,
    pub component_type: String,
    pub target_name: Option<String>,
}

/// A page (`pages.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_name: String,
    pub display_name: String,
    pub has_content: bool,

    /// Length of the ZML content in characters
    pub content_length: usize,

    /// Forms embedded in or targeted by the page
    pub form_refs: Vec<String>,

    pub components: Vec<ComponentDescriptor>,

    #[serde(flatten)]
    pub provenance: Provenance,
}

/// What a page component points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Form,
    Report,
    Component,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form => write!(f, "form"),
            Self::Report => write!(f, "report"),
            Self::Component => write!(f, "component"),
        }
    }
}

/// A ZML component embedded in a page (`page_components.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageComponent {
    pub page_name: String,

    /// 1-based running number within the page
    pub component_id: usize,

    pub component_type: String,
    pub title: Option<String>,
    pub target_type: Option<TargetType>,
    pub target_name: Option<String>,

    /// Always null; the export does not carry layout regions
    pub layout_region: Option<String>,

    pub order: usize,

    /// The tag exactly as written in the page content
    pub zml: String,

    pub attributes: BTreeMap<String, String>,

    #[serde(flatten)]
    pub provenance: Provenance,
}
