//! Document tree nodes

use std::ops::Range;

/// Half-open byte range into the decoded export text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Recognized block kinds of the export vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `forms { ... }`
    Forms,
    /// `form <Name> { ... }` inside `forms` or a page
    Form { name: String },
    /// `reports { ... }`
    Reports,
    /// `<kind> <Name> { ... }` inside `reports`
    Report { kind: String, name: String },
    /// `pages { ... }`
    Pages,
    /// `page <Name> { ... }` inside `pages`
    Page { name: String },
    /// `workflow { ... }`
    Workflows,
    /// `form { ... }` inside `workflow`
    FormWorkflows,
    /// `<Name> as "<Display>" { ... }` inside the form workflows
    Workflow { name: String, display_name: String },
    /// `on <trigger> { ... }`
    Event { trigger: String },
    /// `<type> [<ns>.]<name>(<params>) { ... }`
    Function {
        return_type: String,
        full_name: String,
        parameters: String,
    },
    /// Anything else; kept as opaque text of its ancestors
    Other,
}

/// A top-level `key = value` line of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// A `{ ... }` block with its header and nested blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,

    /// Trimmed text introducing the block
    pub header: String,

    /// Offset of the first header byte (the `{` when the header is empty)
    pub header_start: usize,

    /// Offset of `{`
    pub open: usize,

    /// Offset of the matching `}`
    pub close: usize,

    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Node {
    /// First word of the header
    pub fn name(&self) -> &str {
        self.header.split_whitespace().next().unwrap_or_default()
    }

    /// Header through closing brace
    pub fn span(&self) -> Span {
        Span::new(self.header_start, self.close + 1)
    }

    /// Text between the braces
    pub fn body(&self) -> Span {
        Span::new(self.open + 1, self.close)
    }

    /// Case-insensitive attribute lookup
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key.eq_ignore_ascii_case(key))
            .map(|a| a.value.as_str())
    }

    /// Whether `offset` lies inside one of the child blocks
    pub fn in_child(&self, offset: usize) -> bool {
        self.children.iter().any(|c| c.span().contains(offset))
    }

    /// Body ranges not covered by child blocks, in order
    pub fn own_segments(&self) -> Vec<Span> {
        let mut segments = Vec::new();
        let mut cursor = self.open + 1;
        for child in &self.children {
            let span = child.span();
            if span.start > cursor {
                segments.push(Span::new(cursor, span.start));
            }
            cursor = cursor.max(span.end);
        }
        if self.close > cursor {
            segments.push(Span::new(cursor, self.close));
        }
        segments
    }

    /// Own body text of the node within `text`, child blocks cut out
    pub fn own_text(&self, text: &str) -> String {
        self.own_segments()
            .iter()
            .map(|span| &text[span.range()])
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Outermost descendants matching `pred`, in document order
    pub fn find<'a>(&'a self, pred: &dyn Fn(&Node) -> bool) -> Vec<&'a Node> {
        let mut found = Vec::new();
        collect(&self.children, pred, &mut found);
        found
    }
}

pub(crate) fn collect<'a>(nodes: &'a [Node], pred: &dyn Fn(&Node) -> bool, found: &mut Vec<&'a Node>) {
    for node in nodes {
        if pred(node) {
            found.push(node);
        } else {
            collect(&node.children, pred, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(header_start: usize, open: usize, close: usize, children: Vec<Node>) -> Node {
        Node {
            tag: Tag::Other,
            header: "x".to_string(),
            header_start,
            open,
            close,
            attributes: Vec::new(),
            children,
        }
    }

    #[test]
    fn test_own_segments() {
        let parent = node(0, 2, 30, vec![node(5, 7, 10, vec![]), node(15, 17, 20, vec![])]);
        assert_eq!(
            parent.own_segments(),
            vec![Span::new(3, 5), Span::new(11, 15), Span::new(21, 30)]
        );
        assert!(parent.in_child(8));
        assert!(!parent.in_child(12));
    }

    #[test]
    fn test_find_returns_outermost() {
        let mut inner = node(5, 7, 10, vec![]);
        inner.tag = Tag::Event { trigger: "load".to_string() };
        let mut outer = node(3, 4, 12, vec![inner]);
        outer.tag = Tag::Event { trigger: "add".to_string() };
        let root = node(0, 1, 20, vec![outer]);

        let found = root.find(&|n| matches!(n.tag, Tag::Event { .. }));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, Tag::Event { trigger: "add".to_string() });
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let mut n = node(0, 1, 2, vec![]);
        n.attributes.push(Attribute { key: "displayName".to_string(), value: "\"A\"".to_string() });
        assert_eq!(n.attribute("displayname"), Some("\"A\""));
        assert_eq!(n.attribute("description"), None);
    }
}
