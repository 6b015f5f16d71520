//! Form workflow extraction

use tracing::{debug, warn};

use crate::markup::{scan, Document, Node, Tag};
use crate::model::{FormWorkflow, WorkflowAction, WorkflowEvent};

const SCRIPT_MARKER: &str = "custom deluge script";

/// Extract every workflow of the `workflow { form { ... } }` section
pub fn extract_form_workflows(doc: &Document) -> Vec<FormWorkflow> {
    let workflows: Vec<FormWorkflow> = doc
        .find(&|n| matches!(n.tag, Tag::Workflow { .. }))
        .into_iter()
        .filter_map(|node| {
            let Tag::Workflow { name, display_name } = &node.tag else {
                return None;
            };
            let attr = |key: &str| node.attribute(key).unwrap_or_default().to_string();

            Some(FormWorkflow {
                workflow_name: name.clone(),
                display_name: display_name.clone(),
                workflow_type: attr("type"),
                form_name: attr("form"),
                record_event: attr("record event"),
                events: node
                    .find(&|n| matches!(n.tag, Tag::Event { .. }))
                    .into_iter()
                    .filter_map(|event| extract_event(doc, event))
                    .collect(),
                body: doc.slice(node.body()).to_string(),
                full_source: doc.slice(node.span()).to_string(),
                provenance: doc.provenance(node.span()),
            })
        })
        .collect();

    debug!("Found {} form workflows", workflows.len());
    workflows
}

fn extract_event(doc: &Document, event: &Node) -> Option<WorkflowEvent> {
    let Tag::Event { trigger } = &event.tag else {
        return None;
    };

    let (event_type, field) = match split_user_input(trigger) {
        Some(field) => ("on user input".to_string(), Some(field.to_string())),
        None => (format!("on {trigger}"), None),
    };

    Some(WorkflowEvent { event_type, field, actions: extract_actions(doc, event) })
}

/// Field name of an `on user input of <Field>` trigger
fn split_user_input(trigger: &str) -> Option<&str> {
    let prefix = "user input of";
    let head = trigger.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    Some(trigger[prefix.len()..].trim())
}

/// Every `custom deluge script ( ... )` inside an event, in order
fn extract_actions(doc: &Document, event: &Node) -> Vec<WorkflowAction> {
    let text = doc.text();
    let body = event.body();
    let mut actions = Vec::new();
    let mut pos = body.start;

    while let Some(found) = text[pos..body.end].find(SCRIPT_MARKER) {
        let marker = pos + found;
        let open = scan::skip_whitespace(text, marker + SCRIPT_MARKER.len());
        if open >= body.end || text.as_bytes()[open] != b'(' {
            pos = marker + SCRIPT_MARKER.len();
            continue;
        }
        match scan::matching_paren(text, open) {
            Some(close) if close < body.end => {
                actions.push(WorkflowAction {
                    action_type: "custom_deluge_script".to_string(),
                    script: text[open + 1..close].trim().to_string(),
                });
                pos = close + 1;
            }
            _ => {
                warn!("Unbalanced deluge script at line {}, skipping", doc.source().line_of(open));
                break;
            }
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::MarkupParser;
    use crate::source::SourceText;

    const WORKFLOWS: &str = r#"workflow
{
	form
	{
		Validate_Order as "Validate Order"
		{
			type = form
			form = Orders
			record event = on add or edit
			on validate
			{
				actions
				{
					custom deluge script
					(
						if (input.Total < 0)
						{
							alert "Total can't be \"negative\"";
							cancel submit;
						}
					)
				}
			}
			on user input of Quantity
			{
				actions
				{
					custom deluge script
					(
						input.Total = input.Quantity * input.Price;
					)
				}
			}
		}
	}
}
"#;

    #[test]
    fn test_workflow_attributes_and_events() {
        let doc = MarkupParser::new().parse(SourceText::new("app.ds", WORKFLOWS)).unwrap();
        let workflows = extract_form_workflows(&doc);
        assert_eq!(workflows.len(), 1);

        let wf = &workflows[0];
        assert_eq!(wf.workflow_name, "Validate_Order");
        assert_eq!(wf.display_name, "Validate Order");
        assert_eq!(wf.workflow_type, "form");
        assert_eq!(wf.form_name, "Orders");
        assert_eq!(wf.record_event, "on add or edit");
        assert!(wf.full_source.starts_with("Validate_Order as \"Validate Order\""));
        assert_eq!(wf.provenance.start_line, 5);

        assert_eq!(wf.events.len(), 2);
        assert_eq!(wf.events[0].event_type, "on validate");
        assert_eq!(wf.events[0].field, None);
        assert_eq!(wf.events[1].event_type, "on user input");
        assert_eq!(wf.events[1].field.as_deref(), Some("Quantity"));
    }

    #[test]
    fn test_script_text_is_exact() {
        let doc = MarkupParser::new().parse(SourceText::new("app.ds", WORKFLOWS)).unwrap();
        let wf = &extract_form_workflows(&doc)[0];
        let action = &wf.events[0].actions[0];
        assert_eq!(action.action_type, "custom_deluge_script");
        assert!(action.script.starts_with("if (input.Total < 0)"));
        assert!(action.script.contains(r#"alert "Total can't be \"negative\"";"#));
        assert!(action.script.ends_with('}'));
        assert_eq!(wf.events[1].actions[0].script, "input.Total = input.Quantity * input.Price;");
    }

    #[test]
    fn test_split_user_input() {
        assert_eq!(split_user_input("user input of Email"), Some("Email"));
        assert_eq!(split_user_input("User Input of Email"), Some("Email"));
        assert_eq!(split_user_input("load"), None);
    }
}
