//! HTML output.
//!
//! [`HtmlWriter`] is a byte buffer with tag and escaping helpers;
//! [`HtmlRenderer`] walks a resolved [`Tree`] into it. Footnote definitions
//! are pulled out of the flow and written as a trailing section in citation
//! order.

use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::definitions::{DefinitionManager, FootnoteManager};
use crate::engine::Engine;
use crate::escape;
use crate::node::{Alignment, Node, Tree};

/// HTML output writer with a pre-allocated, reusable buffer.
///
/// # Example
/// ```
/// use streammark::render::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(100);
/// writer.write_str("<p>");
/// writer.write_escaped_text("Hello <World>");
/// writer.write_str("</p>");
/// assert_eq!(writer.into_string(), "<p>Hello &lt;World&gt;</p>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    #[inline]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
        }
    }

    /// Create with capacity for rendering roughly `input_len` bytes of
    /// Markdown; HTML runs about 1.25x the input.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(input_len + input_len / 4),
        }
    }

    /// Write a static string without escaping.
    #[inline]
    pub fn write_str(&mut self, s: &'static str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write a dynamic string without escaping.
    #[inline]
    pub fn write_raw(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        self.out.push(b);
    }

    /// Write text content with HTML escaping.
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_text_into(&mut self.out, text.as_bytes());
    }

    /// Write an attribute value with quotes escaped too.
    #[inline]
    pub fn write_escaped_attr(&mut self, attr: &str) {
        escape::escape_attr_into(&mut self.out, attr.as_bytes());
    }

    /// Write a decoded URL percent-encoded for an `href` or `src`.
    #[inline]
    pub fn write_url(&mut self, url: &str) {
        escape::url_encode_into(&mut self.out, url);
    }

    #[inline]
    pub fn newline(&mut self) {
        self.out.push(b'\n');
    }

    /// Newline unless the output is empty or already ends with one.
    #[inline]
    pub fn ensure_newline(&mut self) {
        if self.out.last().is_some_and(|&b| b != b'\n') {
            self.newline();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Clear output for reuse (keeps capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.out.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.out).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// `<hN>`
    #[inline]
    pub fn heading_start(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("<h");
        self.write_byte(b'0' + level);
        self.write_byte(b'>');
    }

    /// `</hN>\n`
    #[inline]
    pub fn heading_end(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("</h");
        self.write_byte(b'0' + level);
        self.write_str(">\n");
    }

    /// Code block start with an optional language class.
    pub fn code_block_start(&mut self, lang: Option<&str>) {
        match lang {
            Some(lang) if !lang.is_empty() => {
                self.write_str("<pre><code class=\"language-");
                self.write_escaped_attr(lang);
                self.write_str("\">");
            }
            _ => self.write_str("<pre><code>"),
        }
    }

    /// `<ol>\n` or `<ol start="N">\n`
    pub fn ol_start(&mut self, start: Option<u32>) {
        match start {
            Some(n) if n != 1 => {
                self.write_str("<ol start=\"");
                self.write_u32(n);
                self.write_str("\">\n");
            }
            _ => self.write_str("<ol>\n"),
        }
    }

    /// `<a href="url" title="title">`
    pub fn link_start(&mut self, url: &str, title: Option<&str>) {
        self.write_str("<a href=\"");
        self.write_url(url);
        if let Some(title) = title {
            self.write_str("\" title=\"");
            self.write_escaped_attr(title);
        }
        self.write_str("\">");
    }

    pub fn write_u32(&mut self, n: u32) {
        self.write_usize(n as usize);
    }

    pub fn write_usize(&mut self, mut n: usize) {
        let mut buf = [0u8; 20];
        let mut i = buf.len();
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.out.extend_from_slice(&buf[i..]);
    }
}

impl std::fmt::Write for HtmlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.out.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Renders resolved trees to HTML.
///
/// References still unresolved in the tree are echoed as the text they
/// were written as.
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer<'o> {
    order: &'o [String],
}

impl<'o> HtmlRenderer<'o> {
    /// Renderer numbering footnotes by `order`, their citation order.
    pub fn new(order: &'o [String]) -> Self {
        Self { order }
    }

    pub fn render(&self, tree: &Tree) -> String {
        let mut definitions: FxHashMap<&str, &Node> = FxHashMap::default();
        tree.walk(&mut |node| {
            if let Node::FootnoteDefinition { identifier, .. } = node {
                definitions.entry(identifier.as_str()).or_insert(node);
            }
        });
        let cited: Vec<&str> = self
            .order
            .iter()
            .map(String::as_str)
            .filter(|id| definitions.contains_key(id))
            .collect();
        let numbers: FxHashMap<&str, usize> = cited.iter().enumerate().map(|(i, id)| (*id, i + 1)).collect();

        let mut state = RenderState {
            writer: HtmlWriter::new(),
            numbers: &numbers,
            citations: FxHashMap::default(),
        };
        for node in tree.nodes() {
            state.block(node, false);
        }

        if !cited.is_empty() {
            state.writer.write_str("<section class=\"footnotes\">\n<ol>\n");
            for id in &cited {
                let Some(Node::FootnoteDefinition { children, .. }) = definitions.get(id).copied() else {
                    continue;
                };
                state.writer.write_str("<li id=\"fn-");
                state.writer.write_escaped_attr(id);
                state.writer.write_str("\">\n");
                for child in children {
                    state.block(child, false);
                }
                let cited = state.citations.get(*id).copied().unwrap_or(1);
                for n in 1..=cited {
                    if n > 1 {
                        state.writer.write_byte(b' ');
                    }
                    state.writer.write_str("<a href=\"#");
                    write_fnref_id(&mut state.writer, id, n);
                    state.writer.write_str("\" class=\"footnote-backref\">\u{21a9}");
                    if n > 1 {
                        state.writer.write_str("<sup>");
                        state.writer.write_usize(n);
                        state.writer.write_str("</sup>");
                    }
                    state.writer.write_str("</a>");
                }
                state.writer.write_str("\n</li>\n");
            }
            state.writer.write_str("</ol>\n</section>\n");
        }
        state.writer.into_string()
    }
}

struct RenderState<'n> {
    writer: HtmlWriter,
    /// Footnote numbers by identifier, for defined and cited footnotes.
    numbers: &'n FxHashMap<&'n str, usize>,
    /// Citations rendered so far, by identifier.
    citations: FxHashMap<String, usize>,
}

/// `fnref-ID` for the first citation, `fnref-ID-N` for repeats.
fn write_fnref_id(writer: &mut HtmlWriter, identifier: &str, n: usize) {
    writer.write_str("fnref-");
    writer.write_escaped_attr(identifier);
    if n > 1 {
        writer.write_byte(b'-');
        writer.write_usize(n);
    }
}

impl RenderState<'_> {
    /// Render a block; `tight` drops paragraph tags inside tight lists.
    fn block(&mut self, node: &Node, tight: bool) {
        match node {
            Node::Paragraph { children } => {
                if tight {
                    self.inlines(children);
                } else {
                    self.writer.write_str("<p>");
                    self.inlines(children);
                    self.writer.write_str("</p>\n");
                }
            }
            Node::Heading { depth, children } => {
                self.writer.heading_start(*depth);
                self.inlines(children);
                self.writer.heading_end(*depth);
            }
            Node::ThematicBreak => self.writer.write_str("<hr />\n"),
            Node::BlockQuote { children } => {
                self.writer.write_str("<blockquote>\n");
                self.blocks(children);
                self.writer.write_str("</blockquote>\n");
            }
            Node::List {
                ordered,
                start,
                spread,
                children,
            } => {
                if *ordered {
                    self.writer.ol_start(*start);
                } else {
                    self.writer.write_str("<ul>\n");
                }
                for item in children {
                    self.list_item(item, !*spread);
                }
                self.writer
                    .write_str(if *ordered { "</ol>\n" } else { "</ul>\n" });
            }
            Node::ListItem { .. } => self.list_item(node, tight),
            Node::Code { lang, value, .. } => {
                self.writer.code_block_start(lang.as_deref());
                self.writer.write_escaped_text(value);
                if !value.is_empty() {
                    self.writer.newline();
                }
                self.writer.write_str("</code></pre>\n");
            }
            Node::Math { value } => {
                self.writer.write_str("<div class=\"math math-display\">");
                self.writer.write_escaped_text(value);
                self.writer.write_str("</div>\n");
            }
            Node::Html { value } => {
                self.writer.write_raw(value);
                self.writer.newline();
            }
            Node::HtmlElement {
                tag,
                attributes,
                children,
            } => {
                self.writer.write_byte(b'<');
                self.writer.write_raw(tag);
                if !attributes.is_empty() {
                    self.writer.write_byte(b' ');
                    self.writer.write_raw(attributes);
                }
                self.writer.write_str(">\n");
                self.blocks(children);
                self.writer.write_str("</");
                self.writer.write_raw(tag);
                self.writer.write_str(">\n");
            }
            Node::Container {
                name,
                attributes,
                children,
            } => {
                self.writer.write_str("<div class=\"container ");
                self.writer.write_escaped_attr(name);
                self.writer.write_byte(b'"');
                if !attributes.is_empty() {
                    self.writer.write_str(" data-attributes=\"");
                    self.writer.write_escaped_attr(attributes);
                    self.writer.write_byte(b'"');
                }
                self.writer.write_str(">\n");
                self.blocks(children);
                self.writer.write_str("</div>\n");
            }
            Node::Table { align, children } => self.table(align, children),
            Node::TableRow { children } | Node::TableCell { children } => self.inlines(children),
            // Definitions render nowhere; footnotes go to the trailing section.
            Node::Definition { .. } | Node::FootnoteDefinition { .. } => {}
            inline => {
                self.inline(inline);
                self.writer.ensure_newline();
            }
        }
    }

    fn blocks(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.block(node, false);
        }
    }

    fn list_item(&mut self, node: &Node, tight: bool) {
        let Node::ListItem { checked, children, .. } = node else {
            self.block(node, tight);
            return;
        };
        self.writer.write_str("<li>");
        if let Some(checked) = checked {
            self.writer.write_str(if *checked {
                "<input type=\"checkbox\" disabled=\"\" checked=\"\" /> "
            } else {
                "<input type=\"checkbox\" disabled=\"\" /> "
            });
        }
        for (i, child) in children.iter().enumerate() {
            let inline_para = tight && matches!(child, Node::Paragraph { .. });
            if !inline_para && (i > 0 || !tight || checked.is_none()) {
                self.writer.ensure_newline();
            }
            self.block(child, tight);
        }
        self.writer.write_str("</li>\n");
    }

    fn table(&mut self, align: &[Alignment], rows: &[Node]) {
        self.writer.write_str("<table>\n");
        for (i, row) in rows.iter().enumerate() {
            let header = i == 0;
            if header {
                self.writer.write_str("<thead>\n");
            } else if i == 1 {
                self.writer.write_str("<tbody>\n");
            }
            self.writer.write_str("<tr>\n");
            for (cell, alignment) in row.children().iter().zip(align.iter().chain(std::iter::repeat(&Alignment::None))) {
                self.writer.write_str(if header { "<th" } else { "<td" });
                match alignment {
                    Alignment::None => {}
                    Alignment::Left => self.writer.write_str(" align=\"left\""),
                    Alignment::Center => self.writer.write_str(" align=\"center\""),
                    Alignment::Right => self.writer.write_str(" align=\"right\""),
                }
                self.writer.write_byte(b'>');
                self.inlines(cell.children());
                self.writer.write_str(if header { "</th>\n" } else { "</td>\n" });
            }
            self.writer.write_str("</tr>\n");
            if header {
                self.writer.write_str("</thead>\n");
            }
        }
        if rows.len() > 1 {
            self.writer.write_str("</tbody>\n");
        }
        self.writer.write_str("</table>\n");
    }

    fn inlines(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.inline(node);
        }
    }

    fn inline(&mut self, node: &Node) {
        match node {
            Node::Text { value } => self.writer.write_escaped_text(value),
            Node::Emphasis { children } => self.wrap("<em>", children, "</em>"),
            Node::Strong { children } => self.wrap("<strong>", children, "</strong>"),
            Node::Delete { children } => self.wrap("<del>", children, "</del>"),
            Node::InlineCode { value } => {
                self.writer.write_str("<code>");
                self.writer.write_escaped_text(value);
                self.writer.write_str("</code>");
            }
            Node::InlineMath { value } => {
                self.writer.write_str("<span class=\"math math-inline\">");
                self.writer.write_escaped_text(value);
                self.writer.write_str("</span>");
            }
            Node::InlineHtml { value } => self.writer.write_raw(value),
            Node::Break => self.writer.write_str("<br />\n"),
            Node::Link { url, title, children } => {
                self.writer.link_start(url, title.as_deref());
                self.inlines(children);
                self.writer.write_str("</a>");
            }
            Node::Image { url, title, alt } => {
                self.writer.write_str("<img src=\"");
                self.writer.write_url(url);
                self.writer.write_str("\" alt=\"");
                self.writer.write_escaped_attr(alt);
                if let Some(title) = title {
                    self.writer.write_str("\" title=\"");
                    self.writer.write_escaped_attr(title);
                }
                self.writer.write_str("\" />");
            }
            Node::LinkReference { .. } | Node::ImageReference { .. } => {
                let mut echo = vec![node.clone()];
                DefinitionManager::new().resolve_nodes(&mut echo);
                self.inlines(&echo);
            }
            Node::FootnoteReference { identifier, label } => match self.numbers.get(identifier.as_str()) {
                Some(&n) => {
                    let count = self.citations.entry(identifier.clone()).or_insert(0);
                    *count += 1;
                    let citation = *count;
                    self.writer.write_str("<sup><a href=\"#fn-");
                    self.writer.write_escaped_attr(identifier);
                    self.writer.write_str("\" id=\"");
                    write_fnref_id(&mut self.writer, identifier, citation);
                    self.writer.write_str("\" class=\"footnote-ref\">");
                    self.writer.write_usize(n);
                    self.writer.write_str("</a></sup>");
                }
                None => {
                    self.writer.write_str("[^");
                    self.writer.write_escaped_text(label);
                    self.writer.write_byte(b']');
                }
            },
            block => self.block(block, false),
        }
    }

    fn wrap(&mut self, open: &'static str, children: &[Node], close: &'static str) {
        self.writer.write_str(open);
        self.inlines(children);
        self.writer.write_str(close);
    }
}

/// Render Markdown to HTML in one shot with GFM syntax.
///
/// # Example
/// ```
/// let html = streammark::to_html("# Hi\n\nSee [x][id].\n\n[id]: /url\n");
/// assert_eq!(html, "<h1>Hi</h1>\n<p>See <a href=\"/url\">x</a>.</p>\n");
/// ```
pub fn to_html(text: &str) -> String {
    to_html_with(text, &Config::gfm())
}

/// Render Markdown to HTML in one shot.
pub fn to_html_with(text: &str, config: &Config) -> String {
    let tree = crate::block::FastEngine.parse(text, config);
    let mut definitions = DefinitionManager::new();
    let mut footnotes = FootnoteManager::new();
    for node in tree.nodes() {
        definitions.extract(node);
    }
    footnotes.collect_references(tree.nodes());
    HtmlRenderer::new(footnotes.reference_order()).render(&definitions.resolve(&tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_escaped_text() {
        let mut writer = HtmlWriter::new();
        writer.write_escaped_text("<script>");
        assert_eq!(writer.into_string(), "&lt;script&gt;");
    }

    #[test]
    fn test_writer_heading_levels() {
        for level in 1..=6 {
            let mut writer = HtmlWriter::new();
            writer.heading_start(level);
            writer.heading_end(level);
            assert_eq!(writer.into_string(), format!("<h{level}></h{level}>\n"));
        }
    }

    #[test]
    fn test_writer_link_escape_url() {
        let mut writer = HtmlWriter::new();
        writer.link_start("https://example.com?a=1&b=2", Some("a \"q\""));
        assert_eq!(
            writer.into_string(),
            "<a href=\"https://example.com?a=1&amp;b=2\" title=\"a &quot;q&quot;\">"
        );
    }

    #[test]
    fn test_write_numbers() {
        let mut writer = HtmlWriter::new();
        writer.write_u32(0);
        writer.write_byte(b' ');
        writer.write_usize(1234567890);
        assert_eq!(writer.into_string(), "0 1234567890");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(to_html("- a\n- b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_list() {
        assert_eq!(
            to_html("1. a\n\n2. b\n"),
            "<ol>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            to_html("- [x] done\n"),
            "<ul>\n<li><input type=\"checkbox\" disabled=\"\" checked=\"\" /> done</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            to_html("```rust\nfn main() {}\n```\n"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_table() {
        let html = to_html("| a | b |\n|:-|-:|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>"), "got: {html}");
        assert!(html.contains("<td align=\"right\">2</td>"), "got: {html}");
        assert!(html.ends_with("</tbody>\n</table>\n"), "got: {html}");
    }

    #[test]
    fn test_unresolved_reference_echoes() {
        assert_eq!(to_html("[a][nope]\n"), "<p>[a][nope]</p>\n");
    }

    #[test]
    fn test_footnotes_in_citation_order() {
        let html = to_html("b[^2] a[^1] x[^none]\n\n[^1]: one\n[^2]: two\n");
        assert!(html.contains("href=\"#fn-2\" id=\"fnref-2\" class=\"footnote-ref\">1</a>"), "got: {html}");
        assert!(html.contains("x[^none]"), "got: {html}");
        let two = html.find("<li id=\"fn-2\">").unwrap();
        let one = html.find("<li id=\"fn-1\">").unwrap();
        assert!(two < one, "footnotes out of order: {html}");
    }

    #[test]
    fn test_repeated_citation_ids_are_unique() {
        let html = to_html("[^1] [^2] [^1]

[^1]: one

[^2]: two
");
        assert_eq!(html.matches("id=\"fnref-1\"").count(), 1, "got: {html}");
        assert!(html.contains("id=\"fnref-1-2\" class=\"footnote-ref\">1</a>"), "got: {html}");
        assert!(html.contains("href=\"#fnref-1-2\" class=\"footnote-backref\">\u{21a9}<sup>2</sup></a>"), "got: {html}");
        assert_eq!(html.matches("href=\"#fnref-2\"").count(), 1, "got: {html}");
    }
}
