//! Report extraction

use regex::Regex;
use regex_utils::attributes::unquote;
use regex_utils::reports::{FILTERS, GROUP_BY, SHOW_ROWS, SORT_BY};
use tracing::{debug, warn};

use crate::markup::{scan, Document, Node, Span, Tag};
use crate::model::ReportRecord;

/// The `show ... rows from <Form> [criteria] ( columns )` clause of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rows {
    pub base_form: String,
    pub criteria: Option<String>,
    /// Text between the column list parentheses
    pub columns: Option<Span>,
}

/// Report blocks in document order
pub(crate) fn report_nodes(doc: &Document) -> Vec<&Node> {
    doc.find(&|n| matches!(n.tag, Tag::Report { .. }))
}

/// `(kind, name)` of a report node
pub(crate) fn report_identity(node: &Node) -> (&str, &str) {
    match &node.tag {
        Tag::Report { kind, name } => (kind.as_str(), name.as_str()),
        _ => ("", ""),
    }
}

/// Display name of a report, empty when not declared
pub(crate) fn report_display_name(node: &Node) -> String {
    node.attribute("displayname").map(|v| unquote(v).to_string()).unwrap_or_default()
}

/// Locate the rows clause of a report
pub(crate) fn report_rows(doc: &Document, node: &Node) -> Option<Rows> {
    let text = doc.text();
    let body = node.body();
    let caps = SHOW_ROWS
        .captures_iter(doc.slice(body))
        .find(|c| c.get(0).is_some_and(|m| !node.in_child(body.start + m.start())))?;
    let whole = caps.get(0)?;
    let base_form = caps.get(1)?.as_str().to_string();

    let mut next = scan::skip_whitespace(text, body.start + whole.end());
    let mut criteria = None;
    if next < body.end && text.as_bytes()[next] == b'[' {
        match scan::matching_bracket(text, next) {
            Some(close) if close < body.end => {
                criteria = Some(text[next + 1..close].trim().to_string());
                next = scan::skip_whitespace(text, close + 1);
            }
            _ => {
                warn!("Unbalanced criteria in report at line {}", doc.source().line_of(next));
            }
        }
    }

    let columns = if next < body.end && text.as_bytes()[next] == b'(' {
        match scan::matching_paren(text, next) {
            Some(close) if close < body.end => Some(Span::new(next + 1, close)),
            _ => {
                warn!("Unbalanced column list in report at line {}", doc.source().line_of(next));
                None
            }
        }
    } else {
        None
    };

    Some(Rows { base_form, criteria, columns })
}

/// Inner text of the first `<clause> ( ... )` group of a report
fn clause(doc: &Document, node: &Node, pattern: &Regex) -> Option<String> {
    let text = doc.text();
    let body = node.body();
    let found = pattern
        .find_iter(doc.slice(body))
        .find(|m| !node.in_child(body.start + m.start()))?;
    let open = body.start + found.end() - 1;
    match scan::matching_paren(text, open) {
        Some(close) if close < body.end => Some(text[open + 1..close].trim().to_string()),
        _ => {
            warn!("Unbalanced '{}' group at line {}", found.as_str().trim(), doc.source().line_of(open));
            None
        }
    }
}

/// Top-level `key = value` setting of a report, unquoted
fn setting(node: &Node, key: &str) -> Option<String> {
    node.attribute(key).map(|v| unquote(v).to_string()).filter(|v| !v.is_empty())
}

/// Extract every report definition
pub fn extract_reports(doc: &Document) -> Vec<ReportRecord> {
    let reports: Vec<ReportRecord> = report_nodes(doc)
        .into_iter()
        .map(|node| {
            let (kind, name) = report_identity(node);
            let rows = report_rows(doc, node);
            if rows.is_none() {
                debug!("Report {} has no rows clause", name);
            }
            let field_count = rows
                .as_ref()
                .and_then(|r| r.columns)
                .map(|span| super::report_fields::column_count(doc, span))
                .unwrap_or(0);

            ReportRecord {
                report_name: name.to_string(),
                report_type: kind.to_string(),
                display_name: report_display_name(node),
                base_form: rows.as_ref().map(|r| r.base_form.clone()),
                criteria: rows.and_then(|r| r.criteria),
                filters: clause(doc, node, &FILTERS),
                sort_by: clause(doc, node, &SORT_BY),
                group_by: clause(doc, node, &GROUP_BY),
                template: setting(node, "template"),
                print_template: setting(node, "print template"),
                field_count,
                provenance: doc.provenance(node.span()),
            }
        })
        .collect();

    debug!("Found {} reports", reports.len());
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::MarkupParser;
    use crate::source::SourceText;

    const REPORTS: &str = r#"reports
{
	list All_Orders
	{
		displayName = "All Orders"
		show all rows from Orders [Status == "Open" && Total > 0]
		(
			Customer.Name as "Customer"
			Total
			(
				width = 100px
			)
		)
		filters
		(
			Status
			Customer
		)
		sort by
		(
			Added_Time descending
		)
		template = Order_Card
		print template = Order_Print
	}
	summary Totals
	{
		show rows from Orders
	}
}
"#;

    fn parse(text: &str) -> Document {
        MarkupParser::new().parse(SourceText::new("app.ds", text)).unwrap()
    }

    #[test]
    fn test_report_fields_and_clauses() {
        let doc = parse(REPORTS);
        let reports = extract_reports(&doc);
        assert_eq!(reports.len(), 2);

        let orders = &reports[0];
        assert_eq!(orders.report_name, "All_Orders");
        assert_eq!(orders.report_type, "list");
        assert_eq!(orders.display_name, "All Orders");
        assert_eq!(orders.base_form.as_deref(), Some("Orders"));
        assert_eq!(orders.criteria.as_deref(), Some("Status == \"Open\" && Total > 0"));
        assert_eq!(orders.filters.as_deref(), Some("Status\n\t\t\tCustomer"));
        assert_eq!(orders.sort_by.as_deref(), Some("Added_Time descending"));
        assert_eq!(orders.group_by, None);
        assert_eq!(orders.template.as_deref(), Some("Order_Card"));
        assert_eq!(orders.print_template.as_deref(), Some("Order_Print"));
        assert_eq!(orders.field_count, 2);
        assert_eq!(orders.provenance.start_line, 3);
    }

    #[test]
    fn test_report_without_columns() {
        let doc = parse(REPORTS);
        let totals = &extract_reports(&doc)[1];
        assert_eq!(totals.report_type, "summary");
        assert_eq!(totals.display_name, "");
        assert_eq!(totals.base_form.as_deref(), Some("Orders"));
        assert_eq!(totals.field_count, 0);
        assert_eq!(totals.template, None);
    }

    #[test]
    fn test_action_settings_are_not_report_templates() {
        let doc = parse(
            "reports\n{\n\tlist Orders_View\n\t{\n\t\tshow all rows from Orders\n\t\tcustom actions\n\t\t(\n\t\t\t\"Print\"\n\t\t\t(\n\t\t\t\tworkflow = Print_Order\n\t\t\t\ttemplate = Inner\n\t\t\t\tprint template = Inner_Print\n\t\t\t)\n\t\t)\n\t}\n}\n",
        );
        let report = &extract_reports(&doc)[0];
        assert_eq!(report.template, None);
        assert_eq!(report.print_template, None);
    }
}
