//! Document tree.
//!
//! A closed sum type: every block and inline kind is a variant, so the
//! renderer, the managers and the resolution pass match exhaustively.
//! Position data lives only on top-level [`SpannedNode`]s; stripping it is
//! just ignoring the spans, which is what engine and chunking equivalence
//! compare.

use std::fmt::{self, Write as _};

use crate::Range;

/// Column alignment for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    /// No alignment specified.
    #[default]
    None,
    /// Left-aligned (`:---`).
    Left,
    /// Center-aligned (`:---:`).
    Center,
    /// Right-aligned (`---:`).
    Right,
}

/// Which reference form produced a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceKind {
    /// `[text][id]`
    Full,
    /// `[text][]`
    Collapsed,
    /// `[text]`
    Shortcut,
}

/// A document tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Node {
    /// Paragraph of inline content.
    Paragraph { children: Vec<Node> },
    /// ATX or setext heading.
    Heading {
        /// Heading level (1-6).
        depth: u8,
        children: Vec<Node>,
    },
    /// Horizontal rule.
    ThematicBreak,
    /// `>` blockquote.
    BlockQuote { children: Vec<Node> },
    /// Bullet or ordered list of [`Node::ListItem`]s.
    List {
        ordered: bool,
        /// First number of an ordered list.
        start: Option<u32>,
        /// Loose list: blank lines between items or inside one.
        spread: bool,
        children: Vec<Node>,
    },
    /// One list item.
    ListItem {
        /// Task state for GFM task items.
        checked: Option<bool>,
        /// Blank line between two of the item's children.
        spread: bool,
        children: Vec<Node>,
    },
    /// Fenced or indented code.
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    /// Display math.
    Math { value: String },
    /// Raw HTML block.
    Html { value: String },
    /// Block HTML element whose content was parsed as Markdown.
    HtmlElement {
        tag: String,
        /// Raw attribute text of the opening tag.
        attributes: String,
        children: Vec<Node>,
    },
    /// Custom fenced container (`:::name attrs`).
    Container {
        name: String,
        attributes: String,
        children: Vec<Node>,
    },
    /// GFM table; the first row is the header.
    Table {
        align: Vec<Alignment>,
        children: Vec<Node>,
    },
    TableRow { children: Vec<Node> },
    TableCell { children: Vec<Node> },
    /// Link reference definition `[label]: url "title"`.
    Definition {
        identifier: String,
        label: String,
        url: String,
        title: Option<String>,
    },
    /// Footnote definition `[^label]: ...`.
    FootnoteDefinition {
        identifier: String,
        label: String,
        children: Vec<Node>,
    },

    /// Literal text.
    Text { value: String },
    Emphasis { children: Vec<Node> },
    Strong { children: Vec<Node> },
    /// GFM strikethrough.
    Delete { children: Vec<Node> },
    InlineCode { value: String },
    InlineMath { value: String },
    InlineHtml { value: String },
    /// Hard line break.
    Break,
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    /// Reference-style link, tokenized whether or not `identifier` is defined.
    LinkReference {
        identifier: String,
        label: String,
        kind: ReferenceKind,
        children: Vec<Node>,
    },
    /// Reference-style image, tokenized whether or not `identifier` is defined.
    ImageReference {
        identifier: String,
        label: String,
        kind: ReferenceKind,
        alt: String,
    },
    /// `[^label]` footnote call.
    FootnoteReference { identifier: String, label: String },
}

impl Node {
    /// Text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    /// Tag name of the variant, in mdast spelling.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::ThematicBreak => "thematicBreak",
            Node::BlockQuote { .. } => "blockquote",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "listItem",
            Node::Code { .. } => "code",
            Node::Math { .. } => "math",
            Node::Html { .. } => "html",
            Node::HtmlElement { .. } => "htmlElement",
            Node::Container { .. } => "container",
            Node::Table { .. } => "table",
            Node::TableRow { .. } => "tableRow",
            Node::TableCell { .. } => "tableCell",
            Node::Definition { .. } => "definition",
            Node::FootnoteDefinition { .. } => "footnoteDefinition",
            Node::Text { .. } => "text",
            Node::Emphasis { .. } => "emphasis",
            Node::Strong { .. } => "strong",
            Node::Delete { .. } => "delete",
            Node::InlineCode { .. } => "inlineCode",
            Node::InlineMath { .. } => "inlineMath",
            Node::InlineHtml { .. } => "inlineHtml",
            Node::Break => "break",
            Node::Link { .. } => "link",
            Node::Image { .. } => "image",
            Node::LinkReference { .. } => "linkReference",
            Node::ImageReference { .. } => "imageReference",
            Node::FootnoteReference { .. } => "footnoteReference",
        }
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::HtmlElement { children, .. }
            | Node::Container { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::FootnoteDefinition { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::LinkReference { children, .. } => children,
            Node::ThematicBreak
            | Node::Code { .. }
            | Node::Math { .. }
            | Node::Html { .. }
            | Node::Definition { .. }
            | Node::Text { .. }
            | Node::InlineCode { .. }
            | Node::InlineMath { .. }
            | Node::InlineHtml { .. }
            | Node::Break
            | Node::Image { .. }
            | Node::ImageReference { .. }
            | Node::FootnoteReference { .. } => &[],
        }
    }

    /// Mutable child list, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::HtmlElement { children, .. }
            | Node::Container { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::FootnoteDefinition { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::LinkReference { children, .. } => Some(children),
            Node::ThematicBreak
            | Node::Code { .. }
            | Node::Math { .. }
            | Node::Html { .. }
            | Node::Definition { .. }
            | Node::Text { .. }
            | Node::InlineCode { .. }
            | Node::InlineMath { .. }
            | Node::InlineHtml { .. }
            | Node::Break
            | Node::Image { .. }
            | Node::ImageReference { .. }
            | Node::FootnoteReference { .. } => None,
        }
    }

    /// Pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Concatenated plain text of the subtree (used for image alt text).
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Node::Text { value }
            | Node::InlineCode { value }
            | Node::InlineMath { value }
            | Node::Code { value, .. }
            | Node::Math { value } => out.push_str(value),
            Node::Image { alt, .. } | Node::ImageReference { alt, .. } => out.push_str(alt),
            Node::Break => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }

    fn outline(&self, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.type_name());
        match self {
            Node::Heading { depth, .. } => {
                let _ = write!(out, " h{depth}");
            }
            Node::List { ordered, start, spread, .. } => {
                let _ = write!(out, " ordered={ordered} start={start:?} spread={spread}");
            }
            Node::ListItem { checked, spread, .. } => {
                let _ = write!(out, " checked={checked:?} spread={spread}");
            }
            Node::Code { lang, value, .. } => {
                let _ = write!(out, " lang={lang:?} {value:?}");
            }
            Node::Text { value }
            | Node::InlineCode { value }
            | Node::InlineMath { value }
            | Node::InlineHtml { value }
            | Node::Html { value }
            | Node::Math { value } => {
                let _ = write!(out, " {value:?}");
            }
            Node::Link { url, .. } | Node::Image { url, .. } => {
                let _ = write!(out, " {url:?}");
            }
            Node::Definition { identifier, url, .. } => {
                let _ = write!(out, " [{identifier}] {url:?}");
            }
            Node::LinkReference { identifier, .. }
            | Node::ImageReference { identifier, .. }
            | Node::FootnoteReference { identifier, .. }
            | Node::FootnoteDefinition { identifier, .. } => {
                let _ = write!(out, " [{identifier}]");
            }
            Node::Container { name, .. } => {
                let _ = write!(out, " {name}");
            }
            Node::HtmlElement { tag, .. } => {
                let _ = write!(out, " <{tag}>");
            }
            _ => {}
        }
        out.push('\n');
        for child in self.children() {
            child.outline(depth + 1, out);
        }
    }
}

/// A top-level node with its byte span in the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpannedNode {
    pub node: Node,
    /// Span of the node's source lines, excluding the final newline.
    pub span: Range,
}

/// Result of parsing a text: top-level nodes in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree {
    pub children: Vec<SpannedNode>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node, span: Range) {
        self.children.push(SpannedNode { node, span });
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Top-level nodes without positions.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().map(|c| &c.node)
    }

    /// Position-stripped copy of the tree, for structural comparison.
    pub fn strip_positions(&self) -> Vec<Node> {
        self.nodes().cloned().collect()
    }

    /// Structural equality ignoring spans.
    pub fn same_structure(&self, other: &Tree) -> bool {
        self.children.len() == other.children.len()
            && self.nodes().zip(other.nodes()).all(|(a, b)| a == b)
    }

    /// Pre-order walk over every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.node.walk(visit);
        }
    }

    /// Shift every span right by `base` bytes.
    pub fn shift(&mut self, base: usize) {
        for child in &mut self.children {
            child.span = child.span.shift(base);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for child in &self.children {
            child.node.outline(0, &mut out);
        }
        f.write_str(&out)
    }
}
