//! Block tree parser for .ds exports

use regex_utils::{attributes, headers};
use tracing::{debug, trace};

use super::node::{Attribute, Node, Tag};
use super::scan::{self, Skip};
use super::Document;
use crate::config::FunctionConfig;
use crate::error::ParseError;
use crate::source::SourceText;

/// Parses export text into a [`Document`] of typed blocks
#[derive(Debug, Clone)]
pub struct MarkupParser {
    return_types: Vec<String>,
}

struct Frame {
    tag: Tag,
    header: String,
    header_start: usize,
    open: usize,
    in_code: bool,
    boundary: usize,
    children: Vec<Node>,
}

impl MarkupParser {
    /// Create a parser recognizing the default function return types
    pub fn new() -> Self {
        Self::with_config(&FunctionConfig::default())
    }

    /// Create a parser from function settings
    pub fn with_config(config: &FunctionConfig) -> Self {
        Self { return_types: config.return_types.clone() }
    }

    /// Parse a whole export into a block tree
    pub fn parse(&self, source: SourceText) -> Result<Document, ParseError> {
        let roots = self.parse_blocks(&source)?;
        debug!("Parsed {} top-level blocks from {}", roots.len(), source.name());
        Ok(Document::new(source, roots))
    }

    fn parse_blocks(&self, source: &SourceText) -> Result<Vec<Node>, ParseError> {
        let text = source.text();
        let bytes = text.as_bytes();

        let mut roots = Vec::new();
        let mut root_boundary = 0;
        let mut stack: Vec<Frame> = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            match scan::skip_opaque(bytes, i) {
                Skip::To(next) => {
                    i = next;
                    continue;
                }
                Skip::Unterminated => {
                    return Err(ParseError::UnterminatedString { line: source.line_of(i) });
                }
                Skip::None => {}
            }

            match bytes[i] {
                b'{' => {
                    let parent = stack.last();
                    let boundary = parent.map_or(root_boundary, |f| f.boundary);
                    let (header_start, header) = header_before(text, boundary, i);
                    let in_code = parent.is_some_and(|f| f.in_code || matches!(f.tag, Tag::Function { .. }));
                    let tag = if in_code { Tag::Other } else { self.classify(&header, parent.map(|f| &f.tag)) };
                    trace!("Opening block '{}' as {:?} at line {}", header, tag, source.line_of(i));

                    stack.push(Frame {
                        tag,
                        header,
                        header_start,
                        open: i,
                        in_code,
                        boundary: i + 1,
                        children: Vec::new(),
                    });
                }
                b'}' => {
                    let Some(frame) = stack.pop() else {
                        return Err(ParseError::UnexpectedClose { line: source.line_of(i) });
                    };
                    let node = frame.finish(text, i);
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.push(node);
                            parent.boundary = i + 1;
                        }
                        None => {
                            roots.push(node);
                            root_boundary = i + 1;
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        match stack.pop() {
            Some(frame) => Err(ParseError::UnterminatedBlock {
                header: frame.header,
                line: source.line_of(frame.open),
            }),
            None => Ok(roots),
        }
    }

    /// Classify a block header given its parent's tag
    fn classify(&self, header: &str, parent: Option<&Tag>) -> Tag {
        if let Some(caps) = headers::FUNCTION.captures(header) {
            if self.return_types.iter().any(|t| t == &caps[1]) {
                return Tag::Function {
                    return_type: caps[1].to_string(),
                    full_name: caps[2].to_string(),
                    parameters: caps[3].trim().to_string(),
                };
            }
        }

        match (header, parent) {
            ("forms", _) => return Tag::Forms,
            ("reports", _) => return Tag::Reports,
            ("pages", _) => return Tag::Pages,
            ("workflow", _) => return Tag::Workflows,
            ("form", Some(Tag::Workflows)) => return Tag::FormWorkflows,
            _ => {}
        }

        match parent {
            Some(Tag::Forms | Tag::Page { .. }) => {
                if let Some(caps) = headers::FORM.captures(header) {
                    return Tag::Form { name: caps[1].to_string() };
                }
            }
            Some(Tag::Reports) => {
                if let Some(caps) = headers::REPORT.captures(header) {
                    return Tag::Report {
                        kind: headers::report_type(&caps[1]),
                        name: caps[2].to_string(),
                    };
                }
            }
            Some(Tag::Pages) => {
                if let Some(caps) = headers::PAGE.captures(header) {
                    return Tag::Page { name: caps[1].to_string() };
                }
            }
            Some(Tag::FormWorkflows) => {
                if let Some(caps) = headers::WORKFLOW.captures(header) {
                    return Tag::Workflow {
                        name: caps[1].to_string(),
                        display_name: caps[2].to_string(),
                    };
                }
            }
            _ => {}
        }

        if let Some(caps) = headers::EVENT.captures(header) {
            return Tag::Event { trigger: caps[1].to_string() };
        }

        Tag::Other
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    fn finish(self, text: &str, close: usize) -> Node {
        let mut node = Node {
            tag: self.tag,
            header: self.header,
            header_start: self.header_start,
            open: self.open,
            close,
            attributes: Vec::new(),
            children: self.children,
        };
        if node.tag != Tag::Other {
            node.attributes = parse_attributes(&node.own_text(text));
        }
        node
    }
}

/// Header text preceding the `{` at `open`, and its start offset
///
/// The header is the last non-blank line since `boundary`, extended upwards
/// while it closes more parentheses than it opens.
fn header_before(text: &str, boundary: usize, open: usize) -> (usize, String) {
    let trimmed = text[boundary..open].trim_end();
    if trimmed.is_empty() {
        return (open, String::new());
    }

    let mut start = trimmed.rfind('\n').map_or(0, |p| p + 1);
    while start > 0 && scan::paren_delta(&trimmed[start..]) < 0 {
        start = trimmed[..start - 1].rfind('\n').map_or(0, |p| p + 1);
    }

    let header = &trimmed[start..];
    let lead = header.len() - header.trim_start().len();
    (boundary + start + lead, header.trim().to_string())
}

/// `key = value` lines outside any parenthesis group, in order
pub fn parse_attributes(text: &str) -> Vec<Attribute> {
    let mut found = Vec::new();
    let mut depth = 0isize;
    for line in text.lines() {
        if depth == 0 {
            if let Some((key, value)) = attributes::parse_line(line) {
                found.push(Attribute { key, value });
            }
        }
        depth = (depth + scan::paren_delta(line)).max(0);
    }
    found
}
