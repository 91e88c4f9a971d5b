//! Inline parser for Markdown.
//!
//! One left-to-right pass turns text into a list of pieces: literal text,
//! finished nodes, delimiter runs and bracket openers. Code spans, math,
//! autolinks and raw HTML are finished on the spot. Closing brackets try
//! inline links and then the three reference forms; emphasis is matched
//! inside a link when it closes and over the whole text at the end.
//!
//! Reference forms are tokenized whenever the label is syntactically
//! valid. Whether the label is defined is not known here; see
//! [`crate::definitions`].

mod code_span;
mod emphasis;
mod links;
mod math;

pub use code_span::scan_code_span;
pub use links::{Autolink, LinkTail, scan_autolink, scan_link_tail};

use crate::config::{MathOptions, ScanConfig};
use crate::footnote::{normalize_footnote_label, scan_footnote_label};
use crate::limits::MAX_INLINE_NESTING;
use crate::link_ref::{normalize_label, scan_link_label};
use crate::node::{Node, ReferenceKind};
use crate::syntax::html::scan_tag;

use emphasis::{Delim, classify, process_emphasis};

/// An element of the working list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    Node(Node),
    Delim(Delim),
    /// `[` or `![` that has not (yet) closed.
    Bracket { image: bool },
}

#[derive(Debug, Clone, Copy)]
struct BracketEntry {
    piece: usize,
    image: bool,
    active: bool,
    /// Delimiter stack height when the bracket opened.
    delim_bottom: usize,
    /// Offset just past `[`.
    text_start: usize,
}

/// Inline parser configured for one syntax flavor.
///
/// # Example
/// ```
/// use streammark::config::Config;
/// use streammark::inline::InlineParser;
/// use streammark::Node;
///
/// let config = Config::gfm();
/// let parser = InlineParser::new(&config.scan_config());
/// let nodes = parser.parse("a *b* ~~c~~");
/// assert_eq!(nodes.len(), 4);
/// assert!(matches!(nodes[1], Node::Emphasis { .. }));
/// assert!(matches!(nodes[3], Node::Delete { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineParser {
    gfm: bool,
    math: MathOptions,
}

impl InlineParser {
    pub fn new(scan: &ScanConfig<'_>) -> Self {
        Self {
            gfm: scan.gfm,
            math: scan.math,
        }
    }

    #[inline]
    fn is_special(&self, b: u8) -> bool {
        match b {
            b'\\' | b'`' | b'&' | b'<' | b'*' | b'_' | b'!' | b'[' | b']' | b'\n' => true,
            b'~' => self.gfm,
            b'$' => self.math.enabled,
            _ => false,
        }
    }

    /// Parse inline content into nodes.
    pub fn parse(&self, text: &str) -> Vec<Node> {
        let mut state = InlineState {
            parser: *self,
            text,
            pieces: Vec::new(),
            delims: Vec::new(),
            brackets: Vec::new(),
        };
        state.run();
        let InlineState {
            mut pieces,
            mut delims,
            ..
        } = state;
        process_emphasis(&mut pieces, &mut delims, 0);
        pieces_to_nodes(pieces)
    }
}

/// Parse inline content with the syntax options of `scan`.
pub fn parse_inlines(text: &str, scan: &ScanConfig<'_>) -> Vec<Node> {
    InlineParser::new(scan).parse(text)
}

struct InlineState<'a> {
    parser: InlineParser,
    text: &'a str,
    pieces: Vec<Piece>,
    delims: Vec<usize>,
    brackets: Vec<BracketEntry>,
}

impl<'a> InlineState<'a> {
    fn run(&mut self) {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = 0;
        let mut run_start = 0;
        while pos < bytes.len() {
            if !self.parser.is_special(bytes[pos]) {
                pos += 1;
                continue;
            }
            self.push_text(&text[run_start..pos]);
            pos = self.special(pos);
            run_start = pos;
        }
        self.push_text(&text[run_start..]);
    }

    /// Handle the special byte at `pos`; returns where scanning resumes.
    fn special(&mut self, pos: usize) -> usize {
        let text = self.text;
        let bytes = text.as_bytes();
        match bytes[pos] {
            b'\\' => self.backslash(pos),
            b'`' => match code_span::scan_code_span(text, pos) {
                Some((value, end)) => {
                    self.pieces.push(Piece::Node(Node::InlineCode { value }));
                    end
                }
                None => {
                    let run = code_span::backtick_run(bytes, pos);
                    self.push_text(&text[pos..pos + run]);
                    pos + run
                }
            },
            b'$' => match math::scan_dollar_math(text, pos) {
                Some((value, end)) => {
                    self.pieces.push(Piece::Node(Node::InlineMath { value }));
                    end
                }
                None => {
                    let run = bytes[pos..].iter().take_while(|&&b| b == b'$').count();
                    self.push_text(&text[pos..pos + run]);
                    pos + run
                }
            },
            b'&' => self.entity(pos),
            b'<' => self.angle(pos),
            b'*' | b'_' | b'~' => self.delimiter_run(pos),
            b'!' if bytes.get(pos + 1) == Some(&b'[') => self.open_bracket(pos + 1, true),
            b'[' => self.open_bracket(pos, false),
            b']' => self.close_bracket(pos),
            b'\n' => self.line_ending(pos, false),
            _ => {
                self.push_text(&text[pos..pos + 1]);
                pos + 1
            }
        }
    }

    fn backslash(&mut self, pos: usize) -> usize {
        let text = self.text;
        match text.as_bytes().get(pos + 1) {
            Some(b'\n') => self.line_ending(pos + 1, true),
            Some(b'(') if self.parser.math.tex => match math::scan_tex_math(text, pos) {
                Some((value, end)) => {
                    self.pieces.push(Piece::Node(Node::InlineMath { value }));
                    end
                }
                None => {
                    self.push_text("(");
                    pos + 2
                }
            },
            Some(c) if c.is_ascii_punctuation() => {
                self.push_text(&text[pos + 1..pos + 2]);
                pos + 2
            }
            _ => {
                self.push_text("\\");
                pos + 1
            }
        }
    }

    /// A line ending: hard break after two spaces or a backslash, soft
    /// break otherwise. Leading whitespace of the next line is dropped.
    fn line_ending(&mut self, pos: usize, backslash: bool) -> usize {
        let mut hard = backslash;
        if let Some(Piece::Text(value)) = self.pieces.last_mut() {
            let trimmed = value.trim_end_matches(' ').len();
            hard |= value.len() - trimmed >= 2;
            value.truncate(trimmed);
            if value.is_empty() {
                self.pieces.pop();
            }
        }
        if hard {
            self.pieces.push(Piece::Node(Node::Break));
        } else {
            self.push_text("\n");
        }
        let bytes = self.text.as_bytes();
        let mut next = pos + 1;
        while next < bytes.len() && matches!(bytes[next], b' ' | b'\t') {
            next += 1;
        }
        next
    }

    fn entity(&mut self, pos: usize) -> usize {
        let text = self.text;
        if let Some(end) = scan_entity(text.as_bytes(), pos) {
            let raw = &text[pos..end];
            let decoded = html_escape::decode_html_entities(raw);
            if decoded != raw {
                self.push_text(&decoded);
                return end;
            }
        }
        self.push_text("&");
        pos + 1
    }

    fn angle(&mut self, pos: usize) -> usize {
        let text = self.text;
        if let Some(link) = links::scan_autolink(text, pos) {
            self.pieces.push(Piece::Node(Node::Link {
                url: link.url(),
                title: None,
                children: vec![Node::text(link.content)],
            }));
            return link.end;
        }
        if let Some(end) = scan_tag(text.as_bytes(), pos) {
            self.pieces.push(Piece::Node(Node::InlineHtml {
                value: text[pos..end].to_string(),
            }));
            return end;
        }
        self.push_text("<");
        pos + 1
    }

    fn delimiter_run(&mut self, pos: usize) -> usize {
        let text = self.text;
        let ch = text.as_bytes()[pos];
        let end = pos + text.as_bytes()[pos..].iter().take_while(|&&b| b == ch).count();
        let delim = classify(text, pos, end, ch);
        let usable = (delim.can_open || delim.can_close) && (ch != b'~' || delim.count <= 2);
        if usable {
            self.delims.push(self.pieces.len());
            self.pieces.push(Piece::Delim(delim));
        } else {
            self.push_text(&text[pos..end]);
        }
        end
    }

    /// `pos` is the `[`; for images the `!` precedes it.
    fn open_bracket(&mut self, pos: usize, image: bool) -> usize {
        let text = self.text;
        if !image && self.parser.gfm {
            if let Some((label, end)) = scan_footnote_label(text, pos) {
                self.pieces.push(Piece::Node(Node::FootnoteReference {
                    identifier: normalize_footnote_label(label),
                    label: label.to_string(),
                }));
                return end;
            }
        }
        if self.brackets.len() >= MAX_INLINE_NESTING {
            let start = if image { pos - 1 } else { pos };
            self.push_text(&text[start..pos + 1]);
            return pos + 1;
        }
        self.brackets.push(BracketEntry {
            piece: self.pieces.len(),
            image,
            active: true,
            delim_bottom: self.delims.len(),
            text_start: pos + 1,
        });
        self.pieces.push(Piece::Bracket { image });
        pos + 1
    }

    fn close_bracket(&mut self, pos: usize) -> usize {
        let text = self.text;
        let bytes = text.as_bytes();
        let Some(entry) = self.brackets.pop() else {
            self.push_text("]");
            return pos + 1;
        };
        if !entry.active {
            self.push_text("]");
            return pos + 1;
        }

        let after = pos + 1;
        if let Some(tail) = links::scan_link_tail(text, after) {
            let children = self.take_bracket_children(&entry);
            let node = if entry.image {
                Node::Image {
                    url: tail.url,
                    title: tail.title,
                    alt: plain_text(&children),
                }
            } else {
                Node::Link {
                    url: tail.url,
                    title: tail.title,
                    children,
                }
            };
            self.finish_link(node, entry.image);
            return tail.end;
        }

        let own_label_valid = scan_link_label(bytes, entry.text_start - 1)
            .is_some_and(|(_, end)| end == after);
        let own_label = &text[entry.text_start..pos];
        let reference = if bytes.get(after) == Some(&b'[') {
            if let Some((range, end)) = scan_link_label(bytes, after) {
                Some((ReferenceKind::Full, range.slice(text), end))
            } else if bytes.get(after + 1) == Some(&b']') {
                own_label_valid.then_some((ReferenceKind::Collapsed, own_label, after + 2))
            } else {
                own_label_valid.then_some((ReferenceKind::Shortcut, own_label, after))
            }
        } else {
            own_label_valid.then_some((ReferenceKind::Shortcut, own_label, after))
        };

        let Some((kind, label, end)) = reference else {
            self.push_text("]");
            return after;
        };
        let identifier = normalize_label(label);
        let label = label.to_string();
        let children = self.take_bracket_children(&entry);
        let node = if entry.image {
            Node::ImageReference {
                identifier,
                label,
                kind,
                alt: plain_text(&children),
            }
        } else {
            Node::LinkReference {
                identifier,
                label,
                kind,
                children,
            }
        };
        self.finish_link(node, entry.image);
        end
    }

    /// Resolve emphasis inside the brackets and remove the opener and the
    /// content pieces, returning the content as nodes.
    fn take_bracket_children(&mut self, entry: &BracketEntry) -> Vec<Node> {
        process_emphasis(&mut self.pieces, &mut self.delims, entry.delim_bottom);
        let inner: Vec<Piece> = self.pieces.drain(entry.piece + 1..).collect();
        self.pieces.truncate(entry.piece);
        pieces_to_nodes(inner)
    }

    fn finish_link(&mut self, node: Node, image: bool) {
        self.pieces.push(Piece::Node(node));
        if !image {
            // No links inside links.
            for entry in &mut self.brackets {
                if !entry.image {
                    entry.active = false;
                }
            }
        }
    }

    fn push_text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some(Piece::Text(value)) = self.pieces.last_mut() {
            value.push_str(s);
        } else {
            self.pieces.push(Piece::Text(s.to_string()));
        }
    }
}

/// `&name;`, `&#123;` or `&#x1F;` at `pos`; returns the end offset.
fn scan_entity(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos + 1;
    let (min, max, radix) = match *bytes.get(i)? {
        b'#' => {
            i += 1;
            if matches!(bytes.get(i), Some(b'x' | b'X')) {
                i += 1;
                (1, 6, 16)
            } else {
                (1, 7, 10)
            }
        }
        b if b.is_ascii_alphabetic() => (2, 32, 36),
        _ => return None,
    };
    let len = bytes[i..]
        .iter()
        .take_while(|&&b| char::from(b).is_digit(radix))
        .count();
    if len < min || len > max || bytes.get(i + len) != Some(&b';') {
        return None;
    }
    Some(i + len + 1)
}

fn plain_text(nodes: &[Node]) -> String {
    nodes.iter().map(Node::plain_text).collect()
}

/// Flatten pieces into nodes, turning leftover delimiters and brackets
/// into text and merging adjacent text.
pub(crate) fn pieces_to_nodes(pieces: Vec<Piece>) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Text(value) => push_text_node(&mut nodes, value),
            Piece::Node(node) => match node {
                Node::Text { value } => push_text_node(&mut nodes, value),
                node => nodes.push(node),
            },
            Piece::Delim(delim) => {
                let run = char::from(delim.ch).to_string().repeat(delim.count);
                push_text_node(&mut nodes, run);
            }
            Piece::Bracket { image } => {
                push_text_node(&mut nodes, if image { "![" } else { "[" }.to_string());
            }
        }
    }
    nodes
}

fn push_text_node(nodes: &mut Vec<Node>, value: String) {
    if value.is_empty() {
        return;
    }
    if let Some(Node::Text { value: last }) = nodes.last_mut() {
        last.push_str(&value);
    } else {
        nodes.push(Node::Text { value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn parse(text: &str) -> Vec<Node> {
        parse_inlines(text, &Config::gfm().scan_config())
    }

    fn text(value: &str) -> Node {
        Node::text(value)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse("a `*b*` c"),
            vec![text("a "), Node::InlineCode { value: "*b*".into() }, text(" c")]
        );
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            parse("*a*"),
            vec![Node::Emphasis {
                children: vec![text("a")]
            }]
        );
    }

    #[test]
    fn test_strong() {
        assert_eq!(
            parse("**a**"),
            vec![Node::Strong {
                children: vec![text("a")]
            }]
        );
    }

    #[test]
    fn test_strong_inside_emphasis() {
        assert_eq!(
            parse("***a***"),
            vec![Node::Emphasis {
                children: vec![Node::Strong {
                    children: vec![text("a")]
                }]
            }]
        );
    }

    #[test]
    fn test_unbalanced_emphasis() {
        assert_eq!(
            parse("**a*"),
            vec![
                text("*"),
                Node::Emphasis {
                    children: vec![text("a")]
                }
            ]
        );
        assert_eq!(parse("a * b"), vec![text("a * b")]);
    }

    #[test]
    fn test_intraword_underscore() {
        assert_eq!(parse("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_backslash_escape() {
        assert_eq!(parse(r"\*not\*"), vec![text("*not*")]);
        assert_eq!(parse(r"a\b"), vec![text(r"a\b")]);
    }

    #[test]
    fn test_entities() {
        assert_eq!(parse("&copy; &amp; &#65; &bogus;"), vec![text("\u{a9} & A &bogus;")]);
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(
            parse("~~gone~~"),
            vec![Node::Delete {
                children: vec![text("gone")]
            }]
        );
        assert_eq!(parse("~~~no~~~"), vec![text("~~~no~~~")]);
        let plain = parse_inlines("~~x~~", &Config::default().scan_config());
        assert_eq!(plain, vec![text("~~x~~")]);
    }

    #[test]
    fn test_inline_link() {
        assert_eq!(
            parse("[a *b*](/u \"t\")"),
            vec![Node::Link {
                url: "/u".into(),
                title: Some("t".into()),
                children: vec![
                    text("a "),
                    Node::Emphasis {
                        children: vec![text("b")]
                    }
                ],
            }]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            parse("![alt *x*](img.png)"),
            vec![Node::Image {
                url: "img.png".into(),
                title: None,
                alt: "alt x".into(),
            }]
        );
    }

    #[test]
    fn test_reference_forms_are_always_tokenized() {
        let full = parse("[text][Id]");
        assert!(matches!(
            &full[0],
            Node::LinkReference { identifier, kind: ReferenceKind::Full, .. } if identifier == "id"
        ));
        let collapsed = parse("[Text][]");
        assert!(matches!(
            &collapsed[0],
            Node::LinkReference { identifier, kind: ReferenceKind::Collapsed, .. } if identifier == "text"
        ));
        let shortcut = parse("see [x] now");
        assert!(matches!(
            &shortcut[1],
            Node::LinkReference { kind: ReferenceKind::Shortcut, .. }
        ));
        let image = parse("![pic][p]");
        assert!(matches!(&image[0], Node::ImageReference { alt, .. } if alt == "pic"));
    }

    #[test]
    fn test_invalid_labels_stay_text() {
        assert_eq!(parse("[ ]"), vec![text("[ ]")]);
        assert_eq!(parse("a ] b ["), vec![text("a ] b [")]);
    }

    #[test]
    fn test_no_links_in_links() {
        let nodes = parse("[a [b](/x) c](/y)");
        assert_eq!(nodes[0], text("[a "));
        assert!(matches!(&nodes[1], Node::Link { url, .. } if url == "/x"));
        assert_eq!(nodes[2], text(" c](/y)"));
    }

    #[test]
    fn test_footnote_reference() {
        let nodes = parse("claim[^Note].");
        assert_eq!(
            nodes[1],
            Node::FootnoteReference {
                identifier: "note".into(),
                label: "Note".into()
            }
        );
        let plain = parse_inlines("claim[^n]", &Config::default().scan_config());
        assert!(matches!(&plain[1], Node::LinkReference { label, .. } if label == "^n"));
    }

    #[test]
    fn test_autolink_and_html() {
        let nodes = parse("<https://a.b> <em>");
        assert!(matches!(&nodes[0], Node::Link { url, .. } if url == "https://a.b"));
        assert_eq!(nodes[2], Node::InlineHtml { value: "<em>".into() });
        assert_eq!(parse("a < b"), vec![text("a < b")]);
    }

    #[test]
    fn test_breaks() {
        assert_eq!(parse("a\n  b"), vec![text("a\nb")]);
        assert_eq!(parse("a  \nb"), vec![text("a"), Node::Break, text("b")]);
        assert_eq!(parse("a\\\nb"), vec![text("a"), Node::Break, text("b")]);
    }

    #[test]
    fn test_inline_math() {
        let config = Config::full();
        let nodes = parse_inlines("x $a^2$ \\(b\\)", &config.scan_config());
        assert_eq!(nodes[1], Node::InlineMath { value: "a^2".into() });
        assert_eq!(nodes[3], Node::InlineMath { value: "b".into() });
        assert_eq!(parse("costs $5"), vec![text("costs $5")]);
    }
}
