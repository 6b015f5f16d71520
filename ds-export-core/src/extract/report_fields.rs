//! Report column extraction

use regex_utils::reports::FIELD_LINE;
use tracing::{debug, warn};

use super::reports::{report_identity, report_nodes, report_rows};
use crate::markup::{scan, Document, Span};
use crate::model::ReportField;

/// A column line of a report, with its optional `( ... )` configuration
struct Column<'a> {
    expression: &'a str,
    display_name: Option<&'a str>,
    config: Option<&'a str>,
    span: Span,
}

/// Split the text of a column list into columns
fn columns(doc: &Document, list: Span) -> Vec<Column<'_>> {
    let text = doc.text();
    let mut found = Vec::new();
    let mut pos = list.start;

    while pos < list.end {
        let line_end = text[pos..list.end].find('\n').map_or(list.end, |p| pos + p);
        let line = &text[pos..line_end];
        let trimmed = line.trim();

        let Some(caps) = FIELD_LINE.captures(trimmed) else {
            pos = line_end + 1;
            continue;
        };
        let (Some(expression), display_name) = (caps.get(1), caps.get(2)) else {
            pos = line_end + 1;
            continue;
        };

        let start = pos + (line.len() - line.trim_start().len());
        let mut end = start + trimmed.len();
        let mut config = None;

        let next = scan::skip_whitespace(text, line_end);
        if next < list.end && text.as_bytes()[next] == b'(' {
            match scan::matching_paren(text, next) {
                Some(close) if close < list.end => {
                    config = Some(&text[next..=close]);
                    end = close + 1;
                }
                _ => warn!(
                    "Unbalanced configuration for report column {} at line {}",
                    expression.as_str(),
                    doc.source().line_of(next)
                ),
            }
        }

        found.push(Column {
            expression: &text[start..start + expression.as_str().len()],
            display_name: display_name.map(|m| m.as_str()),
            config,
            span: Span::new(start, end),
        });
        pos = end;
    }

    found
}

/// Number of columns in a column list
pub(crate) fn column_count(doc: &Document, list: Span) -> usize {
    columns(doc, list).len()
}

/// Extract the columns of every report
pub fn extract_report_fields(doc: &Document) -> Vec<ReportField> {
    let mut fields = Vec::new();
    for node in report_nodes(doc) {
        let (_, report_name) = report_identity(node);
        let Some(list) = report_rows(doc, node).and_then(|rows| rows.columns) else {
            continue;
        };

        for (idx, column) in columns(doc, list).into_iter().enumerate() {
            fields.push(ReportField {
                report_name: report_name.to_string(),
                field_name: column.expression.to_string(),
                display_name: column.display_name.map(str::to_string),
                expression: column.expression.to_string(),
                order: idx + 1,
                config: column.config.map(str::to_string),
                provenance: doc.provenance(column.span),
            });
        }
    }

    debug!("Found {} report fields", fields.len());
    fields
}
