//! Stable boundary detection.
//!
//! A boundary before line `i` is stable when nothing appended later can
//! change how the lines before it parse. Each line is judged by a fixed
//! chain of checkers over `(context before, line, context after)`; the
//! first checker with an opinion decides, and no opinion means unstable.
//!
//! Only complete lines are judged, and the verdict for a line needs the
//! whole line, so the last complete line of a buffer is never behind a
//! boundary until another line follows it.

use std::collections::VecDeque;

use memchr::memchr;

use crate::config::ScanConfig;
use crate::context::{BlockContext, OpenLeaf, update_context};
use crate::footnote::footnote_def_start;
use crate::syntax::line::{indent_columns, is_blank};
use crate::syntax::scan::{interrupts_paragraph, quote_content, setext_underline};

/// Outcome of judging one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Everything before the line is final.
    Stable,
    Unstable,
}

/// One rule of the checker chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checker {
    /// Open fences, regions and multi-line HTML swallow everything.
    Container,
    /// A list ends only when a line neither continues nor restarts it.
    List,
    /// A footnote ends at an unindented line or a new definition.
    Footnote,
    /// A top-level block is cut off by a line that interrupts it.
    NewBlockStart,
    /// A blank line followed by an unindented line.
    EmptyLine,
}

/// The chain, in evaluation order.
pub const CHECKERS: [Checker; 5] = [
    Checker::Container,
    Checker::List,
    Checker::Footnote,
    Checker::NewBlockStart,
    Checker::EmptyLine,
];

impl Checker {
    pub fn name(self) -> &'static str {
        match self {
            Checker::Container => "container",
            Checker::List => "list",
            Checker::Footnote => "footnote",
            Checker::NewBlockStart => "new-block-start",
            Checker::EmptyLine => "empty-line",
        }
    }

    /// Judge the boundary before `line`, or defer with `None`.
    pub fn check(
        self,
        prev: &BlockContext,
        line: &str,
        next: &BlockContext,
        scan: &ScanConfig<'_>,
    ) -> Option<Verdict> {
        match self {
            Checker::Container => (prev.in_fenced_code()
                || prev.in_container()
                || matches!(prev.leaf, OpenLeaf::Html(_)))
            .then_some(Verdict::Unstable),
            Checker::List => prev.list.map(|_| {
                if next.in_list() {
                    Verdict::Unstable
                } else {
                    Verdict::Stable
                }
            }),
            Checker::Footnote => prev.footnote.map(|_| {
                if !next.in_footnote() || (scan.gfm && footnote_def_start(line).is_some()) {
                    Verdict::Stable
                } else {
                    Verdict::Unstable
                }
            }),
            Checker::NewBlockStart => {
                if prev.blank || !prev.at_top_level() {
                    return None;
                }
                if prev.closed {
                    return Some(Verdict::Stable);
                }
                match prev.leaf {
                    OpenLeaf::Quote => Some(if quote_content(line).is_some() {
                        Verdict::Unstable
                    } else {
                        Verdict::Stable
                    }),
                    OpenLeaf::Paragraph { .. } if setext_underline(line).is_some() => Some(Verdict::Unstable),
                    OpenLeaf::Paragraph { .. } | OpenLeaf::Table | OpenLeaf::IndentedCode => {
                        Some(if interrupts_paragraph(line, scan) {
                            Verdict::Stable
                        } else {
                            Verdict::Unstable
                        })
                    }
                    OpenLeaf::None | OpenLeaf::Html(_) => None,
                }
            }
            Checker::EmptyLine => (prev.blank
                && prev.at_top_level()
                && !is_blank(line)
                && indent_columns(line) < 4)
                .then_some(Verdict::Stable),
        }
    }
}

/// Run the chain over one line.
pub fn judge(prev: &BlockContext, line: &str, next: &BlockContext, scan: &ScanConfig<'_>) -> (Verdict, Option<Checker>) {
    for checker in CHECKERS {
        if let Some(verdict) = checker.check(prev, line, next, scan) {
            return (verdict, Some(checker));
        }
    }
    (Verdict::Unstable, None)
}

/// The furthest stable boundary found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableBoundary {
    /// Index of the first line after the boundary.
    pub line: usize,
    /// Context after the line before the boundary.
    pub context: BlockContext,
}

/// Walk `lines` from `start_line` with `context` as the state before it
/// and return the furthest stable boundary past `start_line`.
///
/// All of `lines` must be complete. A boundary exactly at `start_line` is
/// the one already known and is not reported again.
pub fn find_stable_boundary(
    lines: &[&str],
    start_line: usize,
    context: &BlockContext,
    scan: &ScanConfig<'_>,
) -> Option<StableBoundary> {
    let mut prev = context.clone();
    let mut found = None;
    for (i, line) in lines.iter().enumerate().skip(start_line) {
        let next = update_context(line, &prev, scan);
        if i > start_line && judge(&prev, line, &next, scan).0 == Verdict::Stable {
            found = Some(StableBoundary {
                line: i,
                context: prev.clone(),
            });
        }
        prev = next;
    }
    found
}

/// Context after the line starting at `start`.
#[derive(Debug, Clone)]
struct CachedContext {
    start: usize,
    context: BlockContext,
}

/// Contexts of the lines past the stable boundary, by line start offset.
///
/// Entries before the boundary are pruned whenever it advances, except the
/// one right before it, which is the state the next scan continues from.
#[derive(Debug, Clone, Default)]
pub struct ContextCache {
    entries: VecDeque<CachedContext>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Context after the most recently scanned line.
    pub fn last(&self) -> Option<&BlockContext> {
        self.entries.back().map(|e| &e.context)
    }

    /// Context after the line starting at `start`, if cached.
    pub fn get(&self, start: usize) -> Option<&BlockContext> {
        self.entries
            .binary_search_by_key(&start, |e| e.start)
            .ok()
            .map(|i| &self.entries[i].context)
    }

    fn push(&mut self, start: usize, context: BlockContext) {
        self.entries.push_back(CachedContext { start, context });
    }

    /// Drop entries of lines that end before the line at `boundary`
    /// starts, keeping the one directly before it.
    fn prune(&mut self, boundary: usize) {
        while self.entries.len() > 1 && self.entries[1].start < boundary {
            self.entries.pop_front();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Incremental boundary scanner over a growing buffer.
///
/// Remembers how far it has scanned so each append only judges new lines.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    cache: ContextCache,
    /// Offset of the first line not yet scanned.
    scanned: usize,
    /// Offset of the furthest stable boundary.
    stable: usize,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset of the furthest stable boundary.
    pub fn stable_offset(&self) -> usize {
        self.stable
    }

    /// Byte offset up to which complete lines have been scanned.
    pub fn scanned_offset(&self) -> usize {
        self.scanned
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Context at the stable boundary.
    pub fn boundary_context(&self) -> BlockContext {
        self.cache
            .entries
            .iter()
            .rev()
            .find(|e| e.start < self.stable)
            .map(|e| e.context.clone())
            .unwrap_or_default()
    }

    /// Scan the complete lines appended since the last call. Returns the
    /// new stable offset when the boundary moved.
    pub fn advance(&mut self, buffer: &str, scan: &ScanConfig<'_>) -> Option<usize> {
        let bytes = buffer.as_bytes();
        let mut advanced = None;
        while let Some(pos) = memchr(b'\n', &bytes[self.scanned..]) {
            let start = self.scanned;
            let end = start + pos;
            let raw = &buffer[start..end];
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            let prev = self.cache.last().cloned().unwrap_or_default();
            let next = update_context(line, &prev, scan);
            if start > self.stable {
                let (verdict, checker) = judge(&prev, line, &next, scan);
                log::trace!(
                    "line at {start}: {verdict:?} ({})",
                    checker.map_or("default", Checker::name)
                );
                if verdict == Verdict::Stable {
                    advanced = Some(start);
                }
            }
            self.cache.push(start, next);
            self.scanned = end + 1;
        }

        if let Some(offset) = advanced {
            log::debug!("stable boundary {} -> {offset}", self.stable);
            self.stable = offset;
            self.cache.prune(offset);
        }
        advanced
    }

    pub fn reset(&mut self) {
        self.cache.clear();
        self.scanned = 0;
        self.stable = 0;
    }
}
