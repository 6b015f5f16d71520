//! Report custom action extraction
//!
//! Actions come in two shapes: a `custom actions ( "Label" ( ... ) ... )`
//! group listing several labelled configurations, and a single inline
//! `custom action "Label" ( ... )`.

use regex_utils::reports::{ACTION_LABEL, CUSTOM_ACTIONS, INLINE_ACTION, WORKFLOW_REF};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::reports::{report_display_name, report_identity, report_nodes};
use crate::markup::{parse_attributes, scan, Document, Node, Span};
use crate::model::{CustomAction, ReportWorkflow};

/// Extract the custom actions of every report that declares any
pub fn extract_report_workflows(doc: &Document) -> Vec<ReportWorkflow> {
    let mut reports = Vec::new();
    for node in report_nodes(doc) {
        let mut actions = block_actions(doc, node);
        actions.extend(inline_actions(doc, node));
        if actions.is_empty() {
            continue;
        }

        let (kind, name) = report_identity(node);
        reports.push(ReportWorkflow {
            report_name: name.to_string(),
            report_type: kind.to_string(),
            display_name: report_display_name(node),
            actions,
            provenance: doc.provenance(node.span()),
        });
    }

    debug!("Found {} reports with custom actions", reports.len());
    reports
}

fn block_actions(doc: &Document, node: &Node) -> Vec<CustomAction> {
    let text = doc.text();
    let body = node.body();
    let mut actions = Vec::new();

    for group in CUSTOM_ACTIONS.find_iter(doc.slice(body)) {
        let open = body.start + group.end() - 1;
        if node.in_child(open) {
            continue;
        }
        let close = match scan::matching_paren(text, open) {
            Some(close) if close < body.end => close,
            _ => {
                warn!("Unbalanced custom actions group at line {}", doc.source().line_of(open));
                continue;
            }
        };

        let list = Span::new(open + 1, close);
        let mut cursor = list.start;
        for caps in ACTION_LABEL.captures_iter(doc.slice(list)) {
            let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = list.start + label.start() - 1;
            if start < cursor {
                continue;
            }
            let label_open = list.start + whole.end() - 1;
            if let Some((action, end)) = configured_action(doc, label.as_str(), start, label_open, list.end) {
                cursor = end;
                actions.push(action);
            }
        }
    }

    actions
}

fn inline_actions(doc: &Document, node: &Node) -> Vec<CustomAction> {
    let body = node.body();
    INLINE_ACTION
        .captures_iter(doc.slice(body))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?;
            let start = body.start + whole.start();
            if node.in_child(start) {
                return None;
            }
            configured_action(doc, label.as_str(), start, body.start + whole.end() - 1, body.end)
                .map(|(action, _)| action)
        })
        .collect()
}

/// Build an action from a label and the `( ... )` configuration at `open`,
/// returning it with the offset just past the configuration
fn configured_action(
    doc: &Document,
    label: &str,
    start: usize,
    open: usize,
    limit: usize,
) -> Option<(CustomAction, usize)> {
    let text = doc.text();
    let close = match scan::matching_paren(text, open) {
        Some(close) if close < limit => close,
        _ => {
            warn!("Unbalanced configuration for custom action '{}' at line {}", label, doc.source().line_of(open));
            return None;
        }
    };

    let conf = &text[open + 1..close];
    let workflow_name = WORKFLOW_REF
        .captures(conf)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let settings: BTreeMap<String, String> = parse_attributes(conf)
        .into_iter()
        .filter(|a| !a.key.eq_ignore_ascii_case("workflow"))
        .map(|a| (a.key, a.value))
        .collect();

    let span = Span::new(start, close + 1);
    let action = CustomAction {
        action_label: label.to_string(),
        workflow_name,
        settings,
        body: conf.to_string(),
        full_source: doc.slice(span).to_string(),
        provenance: doc.provenance(span),
    };
    Some((action, span.end))
}
