//! ZML page component extraction

use regex_utils::zml::{self, TAG};
use std::collections::BTreeMap;
use tracing::debug;

use super::pages::{page_content, page_name, page_nodes};
use crate::config::PageConfig;
use crate::markup::{Document, Span};
use crate::model::{PageComponent, TargetType};

/// Attributes naming a component's title, by priority
const TITLE_KEYS: [&str; 6] = ["title", "displayName", "displayname", "text", "label", "name"];

/// Attributes naming a component's target, by priority
const TARGET_KEYS: [(&str, TargetType); 8] = [
    ("formLinkName", TargetType::Form),
    ("formName", TargetType::Form),
    ("viewLinkName", TargetType::Report),
    ("reportLinkName", TargetType::Report),
    ("viewName", TargetType::Report),
    ("reportName", TargetType::Report),
    ("componentLinkName", TargetType::Component),
    ("linkName", TargetType::Component),
];

/// Components of the ZML content at `content`, numbered from 1
pub(crate) fn parse_components(doc: &Document, page: &str, content: Span, tags: &[String]) -> Vec<PageComponent> {
    let mut components = Vec::new();
    for caps in TAG.captures_iter(doc.slice(content)) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !tags.iter().any(|t| t == tag.as_str()) {
            continue;
        }

        let attributes: BTreeMap<String, String> =
            zml::attributes(caps.get(2).map_or("", |m| m.as_str())).into_iter().collect();
        let title = TITLE_KEYS.iter().find_map(|key| attributes.get(*key).cloned());
        let target = TARGET_KEYS
            .iter()
            .find_map(|(key, kind)| attributes.get(*key).map(|name| (*kind, name.clone())));

        let component_id = components.len() + 1;
        let span = Span::new(content.start + whole.start(), content.start + whole.end());
        components.push(PageComponent {
            page_name: page.to_string(),
            component_id,
            component_type: tag.as_str().to_string(),
            title,
            target_type: target.as_ref().map(|(kind, _)| *kind),
            target_name: target.map(|(_, name)| name),
            layout_region: None,
            order: component_id,
            zml: whole.as_str().trim().to_string(),
            attributes,
            provenance: doc.provenance(span),
        });
    }
    components
}

/// Extract the components of every page with content
pub fn extract_page_components(doc: &Document, config: &PageConfig) -> Vec<PageComponent> {
    let components: Vec<PageComponent> = page_nodes(doc)
        .into_iter()
        .filter_map(|node| {
            let content = page_content(doc, node)?;
            Some(parse_components(doc, page_name(node), content.span, &config.component_tags))
        })
        .flatten()
        .collect();

    debug!("Found {} page components", components.len());
    components
}
