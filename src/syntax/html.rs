//! Raw HTML: block start conditions, end conditions and tag scanning.

use memchr::memmem;

use crate::config::ScanConfig;
use crate::cursor::Cursor;

use super::line::{block_content, is_blank};

/// The seven CommonMark HTML block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HtmlBlockKind {
    /// `<script>`, `<pre>`, `<style>`, `<textarea>`
    Raw,
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`
    Instruction,
    /// `<!DOCTYPE ...>`
    Declaration,
    /// `<![CDATA[ ... ]]>`
    Cdata,
    /// Known block-level tag; ends at a blank line.
    BlockTag,
    /// Any other complete tag alone on its line; ends at a blank line.
    Generic,
}

const RAW_TAGS: [&str; 4] = ["script", "pre", "style", "textarea"];

const BLOCK_TAGS: [&str; 62] = [
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

impl HtmlBlockKind {
    /// Recognize the start of an HTML block.
    pub fn start(line: &str) -> Option<HtmlBlockKind> {
        let content = block_content(line)?;
        let bytes = content.as_bytes();
        if bytes.first() != Some(&b'<') {
            return None;
        }
        let mut cursor = Cursor::new_at(bytes, 1);

        if cursor.eat_bytes(b"!--") {
            return Some(HtmlBlockKind::Comment);
        }
        if cursor.eat(b'?') {
            return Some(HtmlBlockKind::Instruction);
        }
        if cursor.eat_bytes(b"![CDATA[") {
            return Some(HtmlBlockKind::Cdata);
        }
        if cursor.eat(b'!') {
            return cursor
                .peek()
                .filter(u8::is_ascii_alphabetic)
                .map(|_| HtmlBlockKind::Declaration);
        }

        let closing = cursor.eat(b'/');
        let name_start = cursor.offset();
        cursor.skip_while(|b| b.is_ascii_alphanumeric() || b == b'-');
        let name = &content[name_start..cursor.offset()];
        if name.is_empty() || !name.as_bytes()[0].is_ascii_alphabetic() {
            return None;
        }

        let after = cursor.peek();
        let delimited = matches!(after, None | Some(b' ' | b'\t' | b'>'));
        if !closing && delimited && RAW_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name)) {
            return Some(HtmlBlockKind::Raw);
        }
        let self_close = after == Some(b'/') && cursor.peek_ahead(1) == Some(b'>');
        if (delimited || self_close) && BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name)) {
            return Some(HtmlBlockKind::BlockTag);
        }

        // Generic: one complete tag followed only by whitespace.
        let end = scan_tag(bytes, 0)?;
        let is_tag = bytes[1] == b'/' || bytes[1].is_ascii_alphabetic();
        (is_tag && is_blank(&content[end..])).then_some(HtmlBlockKind::Generic)
    }

    /// Whether this kind may interrupt an open paragraph.
    #[inline]
    pub fn can_interrupt_paragraph(self) -> bool {
        self != HtmlBlockKind::Generic
    }

    /// Whether the block runs until a blank line rather than an end marker.
    #[inline]
    pub fn ends_at_blank(self) -> bool {
        matches!(self, HtmlBlockKind::BlockTag | HtmlBlockKind::Generic)
    }

    /// Whether `line` contains this kind's end marker. The start line is
    /// checked too, so a block can open and close on one line.
    pub fn ends_on(self, line: &str) -> bool {
        let bytes = line.as_bytes();
        match self {
            HtmlBlockKind::Raw => RAW_TAGS.iter().any(|tag| {
                let closer = format!("</{tag}>");
                contains_ignore_case(bytes, closer.as_bytes())
            }),
            HtmlBlockKind::Comment => memmem::find(bytes, b"-->").is_some(),
            HtmlBlockKind::Instruction => memmem::find(bytes, b"?>").is_some(),
            HtmlBlockKind::Declaration => bytes.contains(&b'>'),
            HtmlBlockKind::Cdata => memmem::find(bytes, b"]]>").is_some(),
            HtmlBlockKind::BlockTag | HtmlBlockKind::Generic => false,
        }
    }
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len()
        && haystack
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
}

/// Scan one HTML construct starting at `start` (which must be `<`).
///
/// Recognizes open tags, closing tags, comments, processing instructions,
/// declarations and CDATA sections. Returns the exclusive end offset.
pub fn scan_tag(bytes: &[u8], start: usize) -> Option<usize> {
    let mut cursor = Cursor::new_at(bytes, start);
    if !cursor.eat(b'<') {
        return None;
    }

    if cursor.eat_bytes(b"!--") {
        if cursor.eat(b'>') || cursor.eat_bytes(b"->") {
            return Some(cursor.offset());
        }
        let rest = cursor.remaining_slice();
        return memmem::find(rest, b"-->").map(|pos| cursor.offset() + pos + 3);
    }
    if cursor.eat(b'?') {
        let rest = cursor.remaining_slice();
        return memmem::find(rest, b"?>").map(|pos| cursor.offset() + pos + 2);
    }
    if cursor.eat_bytes(b"![CDATA[") {
        let rest = cursor.remaining_slice();
        return memmem::find(rest, b"]]>").map(|pos| cursor.offset() + pos + 3);
    }
    if cursor.eat(b'!') {
        if !cursor.peek()?.is_ascii_alphabetic() {
            return None;
        }
        return cursor.find(b'>').map(|pos| cursor.offset() + pos + 1);
    }

    if cursor.eat(b'/') {
        scan_tag_name(&mut cursor)?;
        skip_ws(&mut cursor);
        return cursor.eat(b'>').then(|| cursor.offset());
    }

    scan_tag_name(&mut cursor)?;
    loop {
        let had_ws = skip_ws(&mut cursor) > 0;
        match cursor.peek()? {
            b'>' => {
                cursor.bump();
                return Some(cursor.offset());
            }
            b'/' => {
                cursor.bump();
                return cursor.eat(b'>').then(|| cursor.offset());
            }
            _ if had_ws => scan_attribute(&mut cursor)?,
            _ => return None,
        }
    }
}

fn scan_tag_name(cursor: &mut Cursor<'_>) -> Option<()> {
    if !cursor.peek()?.is_ascii_alphabetic() {
        return None;
    }
    cursor.skip_while(|b| b.is_ascii_alphanumeric() || b == b'-');
    Some(())
}

fn skip_ws(cursor: &mut Cursor<'_>) -> usize {
    cursor.skip_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

fn scan_attribute(cursor: &mut Cursor<'_>) -> Option<()> {
    let first = cursor.peek()?;
    if !(first.is_ascii_alphabetic() || first == b'_' || first == b':') {
        return None;
    }
    cursor.skip_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-'));

    let save = *cursor;
    skip_ws(cursor);
    if !cursor.eat(b'=') {
        *cursor = save;
        return Some(());
    }
    skip_ws(cursor);
    match cursor.peek()? {
        quote @ (b'"' | b'\'') => {
            cursor.bump();
            let end = cursor.find(quote)?;
            cursor.advance(end + 1);
        }
        _ => {
            let len = cursor.skip_while(|b| {
                !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
            });
            if len == 0 {
                return None;
            }
        }
    }
    Some(())
}

/// An HTML element line that opens a region with Markdown content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementOpen<'a> {
    /// Tag name as written.
    pub tag: &'a str,
    /// Raw attribute text, trimmed.
    pub attributes: &'a str,
}

/// Recognize a line holding only `<tag ...>` for a configured tree tag.
pub fn element_open<'a>(line: &'a str, scan: &ScanConfig<'_>) -> Option<ElementOpen<'a>> {
    scan.html_tags?;
    let content = block_content(line)?;
    let bytes = content.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'<' || !bytes[1].is_ascii_alphabetic() {
        return None;
    }
    let end = scan_tag(bytes, 0)?;
    if !is_blank(&content[end..]) || bytes[end - 2] == b'/' {
        return None;
    }
    let mut cursor = Cursor::new_at(bytes, 1);
    cursor.skip_while(|b| b.is_ascii_alphanumeric() || b == b'-');
    let tag = &content[1..cursor.offset()];
    if !scan.is_tree_tag(tag) {
        return None;
    }
    let attributes = content[cursor.offset()..end - 1].trim();
    Some(ElementOpen { tag, attributes })
}

/// Whether `line` holds only `</tag>`.
pub fn element_close(line: &str, tag: &str) -> bool {
    let Some(content) = block_content(line) else {
        return false;
    };
    let content = content.trim_end_matches([' ', '\t']);
    content
        .strip_prefix("</")
        .and_then(|rest| rest.strip_suffix('>'))
        .is_some_and(|name| name.trim_end().eq_ignore_ascii_case(tag))
}
