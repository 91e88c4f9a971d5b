//! Block parser implementation.
//!
//! One pass over the lines with a stack of open containers. For each line
//! the open containers are matched outermost first. Containers that do not
//! match are closed, since nothing continues lazily. The open leaf then
//! takes the line if it can, and whatever is left of the line starts new
//! blocks.

use crate::config::ScanConfig;
use crate::limits::MAX_BLOCK_NESTING;
use crate::node::Alignment;
use crate::syntax::build::item_content;
use crate::syntax::fence::FenceOpen;
use crate::syntax::html::HtmlBlockKind;
use crate::syntax::line::{indent_columns, is_blank, strip_columns};
use crate::syntax::list::ListMarker;
use crate::syntax::region::RegionTracker;
use crate::syntax::scan::{
    BlockStart, ParagraphLine, block_start, continues_table, header_cells, paragraph_line, quote_content,
};

use super::event::{BlockEvent, ContainerStart, LeafBlock};
use super::sink::BlockSink;

/// An open container.
#[derive(Debug)]
enum FrameKind {
    BlockQuote,
    /// Holds items; matched through its current item.
    List { delimiter: u8, ordered: bool },
    Item { content_indent: usize },
    Footnote,
    Region(RegionTracker),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Last line that was non-blank at the parent's level.
    last_line: usize,
}

/// State of the open leaf block.
#[derive(Debug)]
enum LeafState<'a> {
    Paragraph {
        lines: Vec<&'a str>,
        /// Cells of the last line, if it could head a table.
        cells: Option<usize>,
    },
    Table {
        header: &'a str,
        align: Vec<Alignment>,
        rows: Vec<&'a str>,
    },
    IndentedCode(Vec<&'a str>),
    Fence {
        open: FenceOpen<'a>,
        lines: Vec<&'a str>,
    },
    Html {
        kind: HtmlBlockKind,
        lines: Vec<&'a str>,
    },
}

#[derive(Debug)]
struct OpenLeaf<'a> {
    state: LeafState<'a>,
    first_line: usize,
    last_line: usize,
}

/// What the open leaf did with a line.
#[derive(Debug, PartialEq, Eq)]
enum LeafStep {
    /// The line belongs to the leaf.
    Consumed,
    /// The line belongs to the leaf and finishes it.
    Closed,
    /// The leaf ends before the line.
    Ended,
    Setext(u8),
    TableStart(Vec<Alignment>),
}

/// Block parser state.
pub struct BlockParser<'a, 's> {
    lines: Vec<&'a str>,
    scan: ScanConfig<'s>,
    stack: Vec<Frame>,
    leaf: Option<OpenLeaf<'a>>,
}

impl<'a, 's> BlockParser<'a, 's> {
    /// Create a parser over document lines (without terminators).
    pub fn new(lines: Vec<&'a str>, scan: ScanConfig<'s>) -> Self {
        Self {
            lines,
            scan,
            stack: Vec::new(),
            leaf: None,
        }
    }

    /// Parse all lines, sending events to `sink`.
    pub fn parse(&mut self, sink: &mut impl BlockSink<'a>) {
        for n in 0..self.lines.len() {
            let line = self.lines[n];
            self.parse_line(n, line, sink);
        }
        self.close_leaf(sink);
        self.close_frames(0, sink);
    }

    /// Container depth for the nesting limit; lists count through their items.
    fn nesting(&self) -> usize {
        self.stack
            .iter()
            .filter(|f| !matches!(f.kind, FrameKind::List { .. }))
            .count()
    }

    fn containers_allowed(&self) -> bool {
        self.nesting() < MAX_BLOCK_NESTING
    }

    fn parse_line(&mut self, n: usize, line: &'a str, sink: &mut impl BlockSink<'a>) {
        let mut rest = line;
        let mut matched = 0;
        let mut region_closed = false;

        while matched < self.stack.len() {
            let frame = &mut self.stack[matched];
            let parent_blank = is_blank(rest);
            match &mut frame.kind {
                FrameKind::BlockQuote => match quote_content(rest) {
                    Some(content) => rest = content,
                    None => break,
                },
                FrameKind::List { .. } => {
                    matched += 1;
                    continue;
                }
                FrameKind::Item { content_indent } => {
                    if !parent_blank && indent_columns(rest) < *content_indent {
                        break;
                    }
                    rest = strip_columns(rest, *content_indent);
                }
                FrameKind::Footnote => {
                    if !parent_blank && indent_columns(rest) < 4 {
                        break;
                    }
                    rest = strip_columns(rest, 4);
                }
                FrameKind::Region(tracker) => {
                    region_closed = tracker.feed(rest, &self.scan);
                }
            }
            if !parent_blank {
                frame.last_line = n;
            }
            matched += 1;
            if region_closed {
                break;
            }
        }

        if region_closed {
            // The closer line belongs to the region itself.
            self.close_leaf(sink);
            self.close_frames(matched - 1, sink);
            return;
        }
        if matched < self.stack.len() {
            self.close_leaf(sink);
            self.close_frames(matched, sink);
        }

        let containers = self.containers_allowed();
        match self.continue_leaf(n, rest, containers) {
            None => {}
            Some(LeafStep::Consumed) => return,
            Some(LeafStep::Closed) => {
                self.close_leaf(sink);
                return;
            }
            Some(LeafStep::Ended) => self.close_leaf(sink),
            Some(LeafStep::Setext(depth)) => {
                if let Some(leaf) = self.leaf.take() {
                    if let LeafState::Paragraph { lines, .. } = leaf.state {
                        sink.event(BlockEvent::Leaf {
                            block: LeafBlock::SetextHeading { depth, lines },
                            first_line: leaf.first_line,
                            last_line: n,
                        });
                    }
                }
                return;
            }
            Some(LeafStep::TableStart(align)) => {
                self.start_table(n, align, sink);
                return;
            }
        }

        self.start_blocks(n, rest, sink);
    }

    /// Offer a line to the open leaf.
    fn continue_leaf(&mut self, n: usize, rest: &'a str, containers: bool) -> Option<LeafStep> {
        let scan = self.scan;
        let leaf = self.leaf.as_mut()?;
        let blank = is_blank(rest);
        let step = match &mut leaf.state {
            LeafState::Fence { open, lines } => {
                if open.fence.closes(rest) {
                    leaf.last_line = n;
                    return Some(LeafStep::Closed);
                }
                lines.push(open.fence.content(rest));
                if !blank {
                    leaf.last_line = n;
                }
                LeafStep::Consumed
            }
            LeafState::Html { kind, lines } => {
                if kind.ends_at_blank() {
                    if blank {
                        return Some(LeafStep::Ended);
                    }
                    lines.push(rest);
                    leaf.last_line = n;
                    LeafStep::Consumed
                } else {
                    lines.push(rest);
                    if !blank {
                        leaf.last_line = n;
                    }
                    if kind.ends_on(rest) {
                        LeafStep::Closed
                    } else {
                        LeafStep::Consumed
                    }
                }
            }
            LeafState::IndentedCode(lines) => {
                if !blank && indent_columns(rest) < 4 {
                    return Some(LeafStep::Ended);
                }
                lines.push(rest);
                if !blank {
                    leaf.last_line = n;
                }
                LeafStep::Consumed
            }
            LeafState::Paragraph { lines, cells } => match paragraph_line(*cells, rest, &scan, containers) {
                ParagraphLine::Blank => LeafStep::Closed,
                ParagraphLine::Continue => {
                    lines.push(rest);
                    *cells = header_cells(rest);
                    leaf.last_line = n;
                    LeafStep::Consumed
                }
                ParagraphLine::Setext(depth) => LeafStep::Setext(depth),
                ParagraphLine::TableStart(align) => LeafStep::TableStart(align),
                ParagraphLine::Interrupt => LeafStep::Ended,
            },
            LeafState::Table { rows, .. } => {
                if continues_table(rest, &scan, containers) {
                    rows.push(rest);
                    leaf.last_line = n;
                    LeafStep::Consumed
                } else {
                    LeafStep::Ended
                }
            }
        };
        Some(step)
    }

    /// The paragraph's last line becomes the header of a table whose
    /// delimiter row is line `n`.
    fn start_table(&mut self, n: usize, align: Vec<Alignment>, sink: &mut impl BlockSink<'a>) {
        let Some(leaf) = self.leaf.take() else {
            return;
        };
        let LeafState::Paragraph { mut lines, .. } = leaf.state else {
            return;
        };
        let Some(header) = lines.pop() else {
            return;
        };
        if !lines.is_empty() {
            sink.event(BlockEvent::Leaf {
                block: LeafBlock::Paragraph(lines),
                first_line: leaf.first_line,
                last_line: n - 2,
            });
        }
        self.leaf = Some(OpenLeaf {
            state: LeafState::Table {
                header,
                align,
                rows: Vec::new(),
            },
            first_line: n - 1,
            last_line: n,
        });
    }

    /// Start blocks on what is left of a line once containers and the open
    /// leaf have had their turn.
    fn start_blocks(&mut self, n: usize, mut rest: &'a str, sink: &mut impl BlockSink<'a>) {
        // An item just ended; only a sibling marker keeps its list open.
        if let Some(&Frame {
            kind: FrameKind::List { delimiter, ordered },
            ..
        }) = self.stack.last()
        {
            match block_start(rest, &self.scan, self.containers_allowed()) {
                Some(BlockStart::ListItem(marker)) if marker.same_list(delimiter, ordered) => {
                    rest = self.open_item(n, &marker, sink);
                }
                _ => self.close_frames(self.stack.len() - 1, sink),
            }
        }

        loop {
            if is_blank(rest) {
                return;
            }
            if indent_columns(rest) >= 4 {
                self.open_leaf(LeafState::IndentedCode(vec![rest]), n);
                return;
            }
            let Some(start) = block_start(rest, &self.scan, self.containers_allowed()) else {
                let cells = header_cells(rest);
                self.open_leaf(
                    LeafState::Paragraph {
                        lines: vec![rest],
                        cells,
                    },
                    n,
                );
                return;
            };
            match start {
                BlockStart::Fence(open) => {
                    self.open_leaf(
                        LeafState::Fence {
                            open,
                            lines: Vec::new(),
                        },
                        n,
                    );
                    return;
                }
                BlockStart::Region(open) => {
                    let tracker = RegionTracker::new(open.kind());
                    sink.event(BlockEvent::Enter {
                        container: ContainerStart::Region(open),
                        first_line: n,
                    });
                    self.push_frame(FrameKind::Region(tracker), n);
                    return;
                }
                BlockStart::ThematicBreak => {
                    sink.event(BlockEvent::Leaf {
                        block: LeafBlock::ThematicBreak,
                        first_line: n,
                        last_line: n,
                    });
                    return;
                }
                BlockStart::Heading(heading) => {
                    sink.event(BlockEvent::Leaf {
                        block: LeafBlock::Heading {
                            depth: heading.depth,
                            content: heading.content,
                        },
                        first_line: n,
                        last_line: n,
                    });
                    return;
                }
                BlockStart::Quote(content) => {
                    sink.event(BlockEvent::Enter {
                        container: ContainerStart::BlockQuote,
                        first_line: n,
                    });
                    self.push_frame(FrameKind::BlockQuote, n);
                    rest = content;
                }
                BlockStart::Html(kind) => {
                    self.open_leaf(
                        LeafState::Html {
                            kind,
                            lines: vec![rest],
                        },
                        n,
                    );
                    if !kind.ends_at_blank() && kind.ends_on(rest) {
                        self.close_leaf(sink);
                    }
                    return;
                }
                BlockStart::Footnote(footnote) => {
                    sink.event(BlockEvent::Enter {
                        container: ContainerStart::FootnoteDefinition {
                            label: footnote.label,
                        },
                        first_line: n,
                    });
                    self.push_frame(FrameKind::Footnote, n);
                    rest = footnote.content;
                }
                BlockStart::ListItem(marker) => {
                    sink.event(BlockEvent::Enter {
                        container: ContainerStart::List {
                            ordered: marker.ordered,
                            start: marker.start,
                        },
                        first_line: n,
                    });
                    self.push_frame(
                        FrameKind::List {
                            delimiter: marker.delimiter,
                            ordered: marker.ordered,
                        },
                        n,
                    );
                    rest = self.open_item(n, &marker, sink);
                }
            }
        }
    }

    /// Open a list item; returns its first-line content.
    fn open_item(&mut self, n: usize, marker: &ListMarker<'a>, sink: &mut impl BlockSink<'a>) -> &'a str {
        let (checked, content) = item_content(marker, self.scan.gfm);
        sink.event(BlockEvent::Enter {
            container: ContainerStart::ListItem { checked },
            first_line: n,
        });
        self.push_frame(
            FrameKind::Item {
                content_indent: marker.content_indent,
            },
            n,
        );
        content
    }

    fn push_frame(&mut self, kind: FrameKind, n: usize) {
        self.stack.push(Frame { kind, last_line: n });
    }

    fn open_leaf(&mut self, state: LeafState<'a>, n: usize) {
        self.leaf = Some(OpenLeaf {
            state,
            first_line: n,
            last_line: n,
        });
    }

    fn close_leaf(&mut self, sink: &mut impl BlockSink<'a>) {
        let Some(leaf) = self.leaf.take() else {
            return;
        };
        let block = match leaf.state {
            LeafState::Paragraph { lines, .. } => LeafBlock::Paragraph(lines),
            LeafState::Table { header, align, rows } => LeafBlock::Table { header, align, rows },
            LeafState::IndentedCode(lines) => LeafBlock::IndentedCode(lines),
            LeafState::Fence { open, lines } => LeafBlock::FencedCode {
                info: open.info,
                math: open.fence.kind.is_math(),
                lines,
            },
            LeafState::Html { lines, .. } => LeafBlock::Html(lines),
        };
        sink.event(BlockEvent::Leaf {
            block,
            first_line: leaf.first_line,
            last_line: leaf.last_line,
        });
    }

    /// Close frames until `keep` remain.
    fn close_frames(&mut self, keep: usize, sink: &mut impl BlockSink<'a>) {
        while self.stack.len() > keep {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            if let FrameKind::Item { .. } = frame.kind {
                if let Some(parent) = self.stack.last_mut() {
                    parent.last_line = parent.last_line.max(frame.last_line);
                }
            }
            sink.event(BlockEvent::Exit {
                last_line: frame.last_line,
            });
        }
    }
}
