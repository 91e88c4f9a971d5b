//! Single-line block recognizers: headings, breaks, quotes, the ordered
//! block-start classification and the paragraph continuation rule.

use crate::config::ScanConfig;
use crate::cursor::Cursor;
use crate::footnote::{FootnoteStart, footnote_def_start};
use crate::node::Alignment;

use super::fence::{Fence, FenceOpen};
use super::html::HtmlBlockKind;
use super::line::{block_content, is_blank, trim_end_ws};
use super::list::{ListMarker, list_marker};
use super::region::{RegionOpen, region_open};
use super::table::{count_cells, has_pipe, parse_delimiter_row};

/// Whether the line is a thematic break (`***`, `- - -`, `___`).
pub fn thematic_break(line: &str) -> bool {
    let Some(content) = block_content(line) else {
        return false;
    };
    let marker = match content.as_bytes().first() {
        Some(&b @ (b'-' | b'*' | b'_')) => b,
        _ => return false,
    };
    let mut count = 0;
    for b in content.bytes() {
        if b == marker {
            count += 1;
        } else if b != b' ' && b != b'\t' {
            return false;
        }
    }
    count >= 3
}

/// An ATX heading line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtxHeading<'a> {
    pub depth: u8,
    /// Content with the closing `#` sequence removed.
    pub content: &'a str,
}

/// Recognize an ATX heading (`#` through `######`).
pub fn atx_heading(line: &str) -> Option<AtxHeading<'_>> {
    let content = block_content(line)?;
    let mut cursor = Cursor::new(content.as_bytes());
    let level = cursor.skip_run(b'#');
    if level == 0 || level > 6 {
        return None;
    }
    if !cursor.is_eof() && !cursor.at_any(b" \t") {
        return None;
    }
    cursor.skip_spaces();
    let text = &content[cursor.offset()..];
    Some(AtxHeading {
        depth: level as u8,
        content: trim_heading_end(text),
    })
}

/// Trim trailing whitespace and an optional closing `#` run. The run only
/// counts when preceded by whitespace or when it is the whole content.
fn trim_heading_end(text: &str) -> &str {
    let trimmed = trim_end_ws(text);
    let without_hashes = trimmed.trim_end_matches('#');
    if without_hashes.len() == trimmed.len() {
        return trimmed;
    }
    if without_hashes.is_empty() {
        return without_hashes;
    }
    if without_hashes.ends_with([' ', '\t']) {
        trim_end_ws(without_hashes)
    } else {
        trimmed
    }
}

/// Recognize a setext underline; returns the heading depth (1 for `=`,
/// 2 for `-`).
pub fn setext_underline(line: &str) -> Option<u8> {
    let content = block_content(line)?;
    let mut cursor = Cursor::new(content.as_bytes());
    let depth = match cursor.peek()? {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    cursor.skip_run(if depth == 1 { b'=' } else { b'-' });
    cursor.rest_is_blank().then_some(depth)
}

/// Content after a blockquote marker, with one following space removed.
pub fn quote_content(line: &str) -> Option<&str> {
    let content = block_content(line)?;
    let rest = content.strip_prefix('>')?;
    Some(
        rest.strip_prefix(' ')
            .or_else(|| rest.strip_prefix('\t'))
            .unwrap_or(rest),
    )
}

/// A line that opens a block, in recognition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStart<'a> {
    Fence(FenceOpen<'a>),
    Region(RegionOpen<'a>),
    ThematicBreak,
    Heading(AtxHeading<'a>),
    /// Blockquote line with its content.
    Quote(&'a str),
    Html(HtmlBlockKind),
    Footnote(FootnoteStart<'a>),
    ListItem(ListMarker<'a>),
}

impl BlockStart<'_> {
    /// Whether this start ends an open paragraph.
    pub fn interrupts_paragraph(&self) -> bool {
        match self {
            BlockStart::Html(kind) => kind.can_interrupt_paragraph(),
            BlockStart::ListItem(marker) => marker.can_interrupt_paragraph(),
            _ => true,
        }
    }

    /// Whether the start opens a container whose content is more blocks.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockStart::Region(_) | BlockStart::Quote(_) | BlockStart::Footnote(_) | BlockStart::ListItem(_)
        )
    }
}

/// Recognize the block a line at up to three columns of indentation
/// starts, if any. Blank lines, indented lines and paragraph text give
/// `None`.
///
/// With `containers` off (nesting limit reached) quotes, lists, footnotes
/// and regions are not recognized and read as paragraph text.
pub fn block_start<'a>(line: &'a str, scan: &ScanConfig<'_>, containers: bool) -> Option<BlockStart<'a>> {
    if is_blank(line) {
        return None;
    }
    block_content(line)?;
    if let Some(open) = Fence::open(line, scan) {
        return Some(BlockStart::Fence(open));
    }
    if containers {
        if let Some(open) = region_open(line, scan) {
            return Some(BlockStart::Region(open));
        }
    }
    if thematic_break(line) {
        return Some(BlockStart::ThematicBreak);
    }
    if let Some(heading) = atx_heading(line) {
        return Some(BlockStart::Heading(heading));
    }
    if containers {
        if let Some(content) = quote_content(line) {
            return Some(BlockStart::Quote(content));
        }
    }
    if let Some(kind) = HtmlBlockKind::start(line) {
        return Some(BlockStart::Html(kind));
    }
    if !containers {
        return None;
    }
    if scan.gfm {
        if let Some(start) = footnote_def_start(line) {
            return Some(BlockStart::Footnote(start));
        }
    }
    list_marker(line).map(BlockStart::ListItem)
}

/// Whether a line opens a block that ends an open paragraph.
///
/// Setext underlines and table delimiter rows are handled by the paragraph
/// itself and are not interruptions.
pub fn interrupts_paragraph(line: &str, scan: &ScanConfig<'_>) -> bool {
    block_start(line, scan, true).is_some_and(|start| start.interrupts_paragraph())
}

/// What a line does to an open paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphLine {
    /// Blank: the paragraph ends and the line is consumed.
    Blank,
    /// Underline: the paragraph becomes a heading of this depth.
    Setext(u8),
    /// Delimiter row: the paragraph's last line becomes a table header.
    TableStart(Vec<Alignment>),
    /// Another block starts; the paragraph ends before this line.
    Interrupt,
    /// The line joins the paragraph.
    Continue,
}

/// Cell count of a line that could head a table, if it has a pipe.
pub fn header_cells(line: &str) -> Option<usize> {
    has_pipe(line).then(|| count_cells(line))
}

/// Classify `line` against an open paragraph whose last line had
/// `last_cells` cells (see [`header_cells`]).
///
/// Indented lines always continue: indented code cannot interrupt.
pub fn paragraph_line(
    last_cells: Option<usize>,
    line: &str,
    scan: &ScanConfig<'_>,
    containers: bool,
) -> ParagraphLine {
    if is_blank(line) {
        return ParagraphLine::Blank;
    }
    if block_content(line).is_none() {
        return ParagraphLine::Continue;
    }
    if let Some(depth) = setext_underline(line) {
        return ParagraphLine::Setext(depth);
    }
    if block_start(line, scan, containers).is_some_and(|start| start.interrupts_paragraph()) {
        return ParagraphLine::Interrupt;
    }
    if scan.gfm {
        if let Some(cells) = last_cells {
            if has_pipe(line) {
                if let Some(align) = parse_delimiter_row(line) {
                    if align.len() == cells {
                        return ParagraphLine::TableStart(align);
                    }
                }
            }
        }
    }
    ParagraphLine::Continue
}

/// Whether `line` is another row of an open table.
pub fn continues_table(line: &str, scan: &ScanConfig<'_>, containers: bool) -> bool {
    !is_blank(line) && !block_start(line, scan, containers).is_some_and(|start| start.interrupts_paragraph())
}
