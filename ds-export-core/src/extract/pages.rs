//! Page extraction

use regex_utils::{attributes::unquote, zml::CONTENT};
use tracing::{debug, warn};

use super::page_components::parse_components;
use crate::config::PageConfig;
use crate::dedup::FormCatalog;
use crate::markup::{scan, Document, Node, Span, Tag};
use crate::model::{ComponentDescriptor, PageRecord, TargetType};

/// The ZML `Content="..."` string of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageContent {
    /// Text between the quotes
    pub span: Span,
}

/// Page blocks in document order
pub(crate) fn page_nodes(doc: &Document) -> Vec<&Node> {
    doc.find(&|n| matches!(n.tag, Tag::Page { .. }))
}

pub(crate) fn page_name(node: &Node) -> &str {
    match &node.tag {
        Tag::Page { name } => name.as_str(),
        _ => "",
    }
}

/// Locate the content string of a page
pub(crate) fn page_content(doc: &Document, node: &Node) -> Option<PageContent> {
    let text = doc.text();
    let body = node.body();
    let found = CONTENT
        .find_iter(doc.slice(body))
        .find(|m| !node.in_child(body.start + m.start()))?;

    let quote = body.start + found.end() - 1;
    let end = match scan::string_end(text.as_bytes(), quote) {
        Some(end) if end <= body.end => end - 1,
        _ => {
            warn!(
                "Unterminated content string in page {} at line {}",
                page_name(node),
                doc.source().line_of(quote)
            );
            body.end
        }
    };

    Some(PageContent { span: Span::new(quote + 1, end) })
}

/// Extract every page
///
/// Form references are the canonical ids of forms defined inside the page,
/// followed by the forms its ZML targets, resolved through `catalog` by name.
pub fn extract_pages(doc: &Document, config: &PageConfig, catalog: &FormCatalog) -> Vec<PageRecord> {
    let pages: Vec<PageRecord> = page_nodes(doc)
        .into_iter()
        .map(|node| {
            let name = page_name(node);
            let content = page_content(doc, node);
            let components = content
                .map(|c| parse_components(doc, name, c.span, &config.component_tags))
                .unwrap_or_default();

            let mut form_refs = catalog.ids_in_container(&format!("page {name}"));
            for component in &components {
                if component.target_type != Some(TargetType::Form) {
                    continue;
                }
                let Some(target) = &component.target_name else { continue };
                let id = catalog.id_for_name(target).unwrap_or(target.as_str()).to_string();
                if !form_refs.contains(&id) {
                    form_refs.push(id);
                }
            }

            PageRecord {
                page_name: name.to_string(),
                display_name: node.attribute("displayname").map(|v| unquote(v).to_string()).unwrap_or_default(),
                has_content: content.is_some(),
                content_length: content.map_or(0, |c| doc.slice(c.span).chars().count()),
                form_refs,
                components: components
                    .iter()
                    .map(|c| ComponentDescriptor {
                        component_id: c.component_id,
                        component_type: c.component_type.clone(),
                        target_name: c.target_name.clone(),
                    })
                    .collect(),
                provenance: doc.provenance(node.span()),
            }
        })
        .collect();

    debug!("Found {} pages", pages.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedupConfig;
    use crate::dedup::Deduplicator;
    use crate::extract::extract_forms;
    use crate::markup::MarkupParser;
    use crate::source::SourceText;

    const PAGES: &str = "pages\n{\n\tpage Home\n\t{\n\t\tdisplayname = \"Home\"\n\t\tContent=\"<zml><layout><row><column><panel><report viewLinkName='All_Orders' title='Orders'/></panel><panel><form formLinkName='Feedback'/></panel></column></row></layout></zml>\"\n\t\tform Contact\n\t\t{\n\t\t\tSubject\n\t\t\t(\n\t\t\t\ttype = text\n\t\t\t)\n\t\t}\n\t}\n\tpage Empty\n\t{\n\t}\n}\n";

    fn parse(text: &str) -> Document {
        MarkupParser::new().parse(SourceText::new("app.ds", text)).unwrap()
    }

    fn catalog(doc: &Document) -> FormCatalog {
        Deduplicator::new(&DedupConfig::default()).deduplicate(extract_forms(doc))
    }

    #[test]
    fn test_page_records() {
        let doc = parse(PAGES);
        let pages = extract_pages(&doc, &PageConfig::default(), &catalog(&doc));
        assert_eq!(pages.len(), 2);

        let home = &pages[0];
        assert_eq!(home.page_name, "Home");
        assert_eq!(home.display_name, "Home");
        assert!(home.has_content);
        assert_eq!(home.form_refs, vec!["Contact".to_string(), "Feedback".to_string()]);
        assert_eq!(home.components.len(), 2);
        assert_eq!(home.components[0].component_type, "report");
        assert_eq!(home.components[0].target_name.as_deref(), Some("All_Orders"));

        let empty = &pages[1];
        assert!(!empty.has_content);
        assert_eq!(empty.content_length, 0);
        assert!(empty.form_refs.is_empty());
    }

    #[test]
    fn test_content_length_counts_characters() {
        let doc = parse("pages\n{\n\tpage P\n\t{\n\t\tContent=\"<zml>ø</zml>\"\n\t}\n}\n");
        let pages = extract_pages(&doc, &PageConfig::default(), &catalog(&doc));
        assert_eq!(pages[0].content_length, 12);
    }

    #[test]
    fn test_form_targets_resolve_to_ids() {
        let text = "forms\n{\n\tform Feedback\n\t{\n\t}\n}\npages\n{\n\tpage Home\n\t{\n\t\tContent=\"<form formLinkName='Feedback'/>\"\n\t\tform Feedback\n\t\t{\n\t\t\tNote\n\t\t\t(\n\t\t\t\ttype = text\n\t\t\t)\n\t\t}\n\t}\n}\n";
        let doc = parse(text);
        let pages = extract_pages(&doc, &PageConfig::default(), &catalog(&doc));
        assert_eq!(pages[0].form_refs, vec!["Feedback~2".to_string(), "Feedback".to_string()]);
    }
}
