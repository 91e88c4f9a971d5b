//! Per-line block context.
//!
//! A [`BlockContext`] records what is open at the top level after a line:
//! a fence, a region, a list, a footnote definition, or an open leaf
//! block. [`update_context`] derives the next snapshot from the previous
//! one and the literal text of the next line, nothing else. The boundary
//! detector reads pairs of snapshots to decide where a block can no longer
//! change.
//!
//! Nested structure is not tracked: inside a list or footnote only the
//! indentation matters, and inside a fence or region only the closer does.

use crate::config::ScanConfig;
use crate::syntax::html::HtmlBlockKind;
use crate::syntax::line::{indent_columns, is_blank};
use crate::syntax::scan::{
    BlockStart, ParagraphLine, block_start, continues_table, header_cells, paragraph_line, quote_content,
};
use crate::syntax::{Fence, RegionTracker};

/// An open top-level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListContext {
    /// Content column of the current item.
    pub content_indent: usize,
    /// The last line was blank; the next line's indentation decides
    /// whether the list goes on.
    pub may_end: bool,
}

/// An open top-level footnote definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootnoteContext {
    pub may_end: bool,
}

/// Leaf block left open by the last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenLeaf {
    #[default]
    None,
    /// Paragraph; `cells` is the cell count of its last line when that
    /// line could head a table.
    Paragraph { cells: Option<usize> },
    Table,
    IndentedCode,
    Quote,
    Html(HtmlBlockKind),
}

/// Snapshot of the top-level block state after one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockContext {
    pub fence: Option<Fence>,
    pub region: Option<RegionTracker>,
    pub list: Option<ListContext>,
    pub footnote: Option<FootnoteContext>,
    pub leaf: OpenLeaf,
    /// The line was blank.
    pub blank: bool,
    /// The line completed a block (heading, break, fence or region close).
    pub closed: bool,
}

impl BlockContext {
    #[inline]
    pub fn in_fenced_code(&self) -> bool {
        self.fence.is_some()
    }

    /// Marker byte of the open fence.
    pub fn fence_char(&self) -> Option<u8> {
        self.fence.map(|f| f.kind.marker())
    }

    /// Marker length of the open fence, 0 when none is open.
    pub fn fence_length(&self) -> usize {
        self.fence.map_or(0, |f| f.len)
    }

    #[inline]
    pub fn in_container(&self) -> bool {
        self.region.is_some()
    }

    /// Number of nested regions open.
    pub fn container_depth(&self) -> usize {
        self.region.as_ref().map_or(0, RegionTracker::depth)
    }

    #[inline]
    pub fn in_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn list_indent(&self) -> usize {
        self.list.map_or(0, |l| l.content_indent)
    }

    pub fn list_may_end(&self) -> bool {
        self.list.is_some_and(|l| l.may_end)
    }

    #[inline]
    pub fn in_footnote(&self) -> bool {
        self.footnote.is_some()
    }

    /// Nothing that swallows lines wholesale is open.
    pub fn at_top_level(&self) -> bool {
        self.fence.is_none() && self.region.is_none() && self.list.is_none() && self.footnote.is_none()
    }
}

/// Compute the context after `line` given the context before it.
pub fn update_context(line: &str, prev: &BlockContext, scan: &ScanConfig<'_>) -> BlockContext {
    let blank = is_blank(line);
    let mut next = BlockContext {
        blank,
        ..BlockContext::default()
    };

    if let Some(fence) = prev.fence {
        if fence.closes(line) {
            next.closed = true;
        } else {
            next.fence = Some(fence);
        }
        return next;
    }

    if let Some(region) = &prev.region {
        let mut region = region.clone();
        if region.feed(line, scan) {
            next.closed = true;
        } else {
            next.region = Some(region);
        }
        return next;
    }

    if prev.footnote.is_some() {
        if blank {
            next.footnote = Some(FootnoteContext { may_end: true });
            return next;
        }
        if indent_columns(line) >= 4 {
            next.footnote = Some(FootnoteContext { may_end: false });
            return next;
        }
        return classify(line, next, scan);
    }

    if let Some(list) = prev.list {
        if blank {
            next.list = Some(ListContext { may_end: true, ..list });
            return next;
        }
        if indent_columns(line) >= list.content_indent {
            next.list = Some(ListContext { may_end: false, ..list });
            return next;
        }
        if let Some(BlockStart::ListItem(marker)) = block_start(line, scan, true) {
            next.list = Some(ListContext {
                content_indent: marker.content_indent,
                may_end: false,
            });
            return next;
        }
        return classify(line, next, scan);
    }

    match prev.leaf {
        OpenLeaf::Html(kind) if kind.ends_at_blank() => {
            if !blank {
                next.leaf = prev.leaf;
            }
            return next;
        }
        OpenLeaf::Html(kind) => {
            if kind.ends_on(line) {
                next.closed = true;
            } else {
                next.leaf = prev.leaf;
            }
            return next;
        }
        _ if blank => return next,
        OpenLeaf::Paragraph { cells } => match paragraph_line(cells, line, scan, true) {
            ParagraphLine::Blank => return next,
            ParagraphLine::Setext(_) => {
                next.closed = true;
                return next;
            }
            ParagraphLine::TableStart(_) => {
                next.leaf = OpenLeaf::Table;
                return next;
            }
            ParagraphLine::Continue => {
                next.leaf = OpenLeaf::Paragraph {
                    cells: header_cells(line),
                };
                return next;
            }
            ParagraphLine::Interrupt => {}
        },
        OpenLeaf::Table => {
            if continues_table(line, scan, true) {
                next.leaf = OpenLeaf::Table;
                return next;
            }
        }
        OpenLeaf::IndentedCode => {
            if indent_columns(line) >= 4 {
                next.leaf = OpenLeaf::IndentedCode;
                return next;
            }
        }
        OpenLeaf::Quote => {
            if quote_content(line).is_some() {
                next.leaf = OpenLeaf::Quote;
                return next;
            }
        }
        OpenLeaf::None => {}
    }

    classify(line, next, scan)
}

/// Classify a line that starts fresh at the top level.
fn classify(line: &str, mut next: BlockContext, scan: &ScanConfig<'_>) -> BlockContext {
    if next.blank {
        return next;
    }
    if indent_columns(line) >= 4 {
        next.leaf = OpenLeaf::IndentedCode;
        return next;
    }
    match block_start(line, scan, true) {
        Some(BlockStart::Fence(open)) => next.fence = Some(open.fence),
        Some(BlockStart::Region(open)) => next.region = Some(RegionTracker::new(open.kind())),
        Some(BlockStart::ThematicBreak | BlockStart::Heading(_)) => next.closed = true,
        Some(BlockStart::Quote(_)) => next.leaf = OpenLeaf::Quote,
        Some(BlockStart::Html(kind)) => {
            if !kind.ends_at_blank() && kind.ends_on(line) {
                next.closed = true;
            } else {
                next.leaf = OpenLeaf::Html(kind);
            }
        }
        Some(BlockStart::Footnote(_)) => next.footnote = Some(FootnoteContext { may_end: false }),
        Some(BlockStart::ListItem(marker)) => {
            next.list = Some(ListContext {
                content_indent: marker.content_indent,
                may_end: false,
            });
        }
        None => {
            next.leaf = OpenLeaf::Paragraph {
                cells: header_cells(line),
            };
        }
    }
    next
}

/// Contexts after each line of `lines`, starting from the document start.
pub fn contexts_for(lines: &[&str], scan: &ScanConfig<'_>) -> Vec<BlockContext> {
    let mut prev = BlockContext::default();
    lines
        .iter()
        .map(|line| {
            prev = update_context(line, &prev, scan);
            prev.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ContainerConfig};

    fn run(lines: &[&str]) -> Vec<BlockContext> {
        let config = Config::gfm();
        contexts_for(lines, &config.scan_config())
    }

    #[test]
    fn test_fence_open_and_close() {
        let ctx = run(&["```rust", "# not a heading", "```", "after"]);
        assert!(ctx[0].in_fenced_code());
        assert_eq!(ctx[0].fence_char(), Some(b'`'));
        assert_eq!(ctx[0].fence_length(), 3);
        assert!(ctx[1].in_fenced_code());
        assert!(!ctx[1].closed);
        assert!(!ctx[2].in_fenced_code());
        assert!(ctx[2].closed);
        assert_eq!(ctx[3].leaf, OpenLeaf::Paragraph { cells: None });
    }

    #[test]
    fn test_shorter_fence_does_not_close() {
        let ctx = run(&["````", "```", "````"]);
        assert!(ctx[1].in_fenced_code());
        assert!(!ctx[2].in_fenced_code());
    }

    #[test]
    fn test_container_nesting() {
        let config = Config::gfm().with_containers(ContainerConfig::default());
        let scan = config.scan_config();
        let ctx = contexts_for(&[":::note", "::::inner x", "::::", "text", ":::", "after"], &scan);
        assert!(ctx[0].in_container());
        assert_eq!(ctx[0].container_depth(), 1);
        assert_eq!(ctx[1].container_depth(), 2);
        assert_eq!(ctx[2].container_depth(), 1);
        assert!(ctx[3].in_container());
        assert!(!ctx[4].in_container());
        assert!(ctx[4].closed);
        assert!(!ctx[5].in_container());
    }

    #[test]
    fn test_list_may_end() {
        let ctx = run(&["- a", "", "  b", "", "c"]);
        assert!(ctx[0].in_list());
        assert_eq!(ctx[0].list_indent(), 2);
        assert!(ctx[1].list_may_end());
        assert!(ctx[2].in_list() && !ctx[2].list_may_end());
        assert!(ctx[3].list_may_end());
        assert!(!ctx[4].in_list());
    }

    #[test]
    fn test_list_new_item_updates_indent() {
        let ctx = run(&["- a", "10. b", "    c"]);
        assert_eq!(ctx[1].list_indent(), 4);
        assert!(ctx[2].in_list());
    }

    #[test]
    fn test_list_closed_by_unindented_text() {
        let ctx = run(&["- a", "b"]);
        assert!(!ctx[1].in_list());
        assert_eq!(ctx[1].leaf, OpenLeaf::Paragraph { cells: None });
    }

    #[test]
    fn test_footnote_continuation() {
        let ctx = run(&["[^1]: one", "    two", "", "    three", "plain"]);
        assert!(ctx[0].in_footnote());
        assert!(ctx[1].in_footnote());
        assert!(ctx[2].footnote.is_some_and(|f| f.may_end));
        assert!(ctx[3].in_footnote());
        assert!(!ctx[4].in_footnote());
    }

    #[test]
    fn test_footnote_needs_gfm() {
        let ctx = contexts_for(&["[^1]: one"], &Config::default().scan_config());
        assert!(!ctx[0].in_footnote());
    }

    #[test]
    fn test_setext_closes_paragraph() {
        let ctx = run(&["Title", "---", "next"]);
        assert!(ctx[1].closed);
        assert_eq!(ctx[1].leaf, OpenLeaf::None);
    }

    #[test]
    fn test_table_tracking() {
        let ctx = run(&["a | b", "--|--", "1 | 2", "", "x"]);
        assert_eq!(ctx[0].leaf, OpenLeaf::Paragraph { cells: Some(2) });
        assert_eq!(ctx[1].leaf, OpenLeaf::Table);
        assert_eq!(ctx[2].leaf, OpenLeaf::Table);
        assert_eq!(ctx[3].leaf, OpenLeaf::None);
    }

    #[test]
    fn test_html_block_kinds() {
        let ctx = run(&["<div>", "text", "", "<!--", "x", "-->", "<!-- one line -->"]);
        assert_eq!(ctx[0].leaf, OpenLeaf::Html(HtmlBlockKind::BlockTag));
        assert_eq!(ctx[1].leaf, OpenLeaf::Html(HtmlBlockKind::BlockTag));
        assert_eq!(ctx[2].leaf, OpenLeaf::None);
        assert_eq!(ctx[4].leaf, OpenLeaf::Html(HtmlBlockKind::Comment));
        assert!(ctx[5].closed);
        assert!(ctx[6].closed);
    }

    #[test]
    fn test_headings_and_breaks_close() {
        let ctx = run(&["# h", "***", "> q", "> r", "s"]);
        assert!(ctx[0].closed && ctx[1].closed);
        assert_eq!(ctx[2].leaf, OpenLeaf::Quote);
        assert_eq!(ctx[3].leaf, OpenLeaf::Quote);
        assert_eq!(ctx[4].leaf, OpenLeaf::Paragraph { cells: None });
    }

    #[test]
    fn test_context_is_pure() {
        let config = Config::gfm();
        let scan = config.scan_config();
        let prev = BlockContext::default();
        let a = update_context("- item", &prev, &scan);
        let b = update_context("- item", &prev, &scan);
        assert_eq!(a, b);
    }
}
