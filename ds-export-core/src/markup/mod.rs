//! Markup parsing for .ds exports
//!
//! The export is a nest of `header { ... }` blocks. The parser turns it into
//! a tree of typed [`Node`]s; everything the vocabulary does not recognize
//! stays in the tree as [`Tag::Other`] and remains part of its ancestors'
//! body text. Parenthesized groups are matched on demand with the helpers
//! in [`scan`].

pub mod node;
pub mod parser;
pub mod scan;

pub use node::{Attribute, Node, Span, Tag};
pub use parser::{parse_attributes, MarkupParser};

use crate::model::Provenance;
use crate::source::SourceText;

/// A parsed export file
#[derive(Debug, Clone)]
pub struct Document {
    source: SourceText,
    roots: Vec<Node>,
}

impl Document {
    pub(crate) fn new(source: SourceText, roots: Vec<Node>) -> Self {
        Self { source, roots }
    }

    pub fn source(&self) -> &SourceText {
        &self.source
    }

    pub fn text(&self) -> &str {
        self.source.text()
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Text covered by `span`
    pub fn slice(&self, span: Span) -> &str {
        &self.text()[span.range()]
    }

    /// Outermost nodes anywhere in the document matching `pred`
    pub fn find(&self, pred: &dyn Fn(&Node) -> bool) -> Vec<&Node> {
        let mut found = Vec::new();
        node::collect(&self.roots, pred, &mut found);
        found
    }

    /// Visit every node in document order together with its ancestors
    pub fn walk<'a>(&'a self, visitor: &mut dyn FnMut(&'a Node, &[&'a Node])) {
        fn visit<'a>(
            nodes: &'a [Node],
            ancestors: &mut Vec<&'a Node>,
            visitor: &mut dyn FnMut(&'a Node, &[&'a Node]),
        ) {
            for node in nodes {
                visitor(node, ancestors.as_slice());
                ancestors.push(node);
                visit(&node.children, ancestors, visitor);
                ancestors.pop();
            }
        }

        let mut ancestors = Vec::new();
        visit(&self.roots, &mut ancestors, visitor);
    }

    /// Provenance of a byte range
    pub fn provenance(&self, span: Span) -> Provenance {
        let last = span.end.saturating_sub(1).max(span.start);
        Provenance {
            source_file: self.source.name().to_string(),
            start_line: self.source.line_of(span.start),
            end_line: self.source.line_of(last),
            start_position: self.source.file_position(span.start),
            end_position: self.source.file_position(span.end),
        }
    }
}
