//! Regions: custom containers and HTML elements whose content is Markdown.
//!
//! Region extent is decided lexically, before any block structure inside
//! is known. Fences inside a region hide closers; nested openers push onto
//! a stack, and a closer matching any open entry pops down to it.

use smallvec::SmallVec;

use crate::config::ScanConfig;
use crate::cursor::Cursor;
use crate::limits::MAX_REGION_DEPTH;

use super::fence::Fence;
use super::html::{ElementOpen, element_close, element_open};
use super::line::{block_content, trim_end_ws};

/// One open region on the tracker stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// `:::name`, closed by a marker run of the same length.
    Container { marker: u8, len: usize },
    /// `<tag>`, closed by `</tag>`.
    Element { tag: String },
}

impl RegionKind {
    /// Whether `line` closes a region of this kind.
    pub fn closes(&self, line: &str) -> bool {
        match self {
            RegionKind::Container { marker, len } => {
                let Some(content) = block_content(line) else {
                    return false;
                };
                let mut cursor = Cursor::new(content.as_bytes());
                cursor.skip_run(*marker) == *len && cursor.rest_is_blank()
            }
            RegionKind::Element { tag } => element_close(line, tag),
        }
    }
}

/// A line that opens a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOpen<'a> {
    Container {
        marker: u8,
        len: usize,
        name: &'a str,
        attributes: &'a str,
    },
    Element(ElementOpen<'a>),
}

impl RegionOpen<'_> {
    pub fn kind(&self) -> RegionKind {
        match *self {
            RegionOpen::Container { marker, len, .. } => RegionKind::Container { marker, len },
            RegionOpen::Element(open) => RegionKind::Element {
                tag: open.tag.to_ascii_lowercase(),
            },
        }
    }
}

/// Recognize a region opener.
pub fn region_open<'a>(line: &'a str, scan: &ScanConfig<'_>) -> Option<RegionOpen<'a>> {
    if let Some(containers) = scan.containers {
        if let Some(content) = block_content(line) {
            let mut cursor = Cursor::new(content.as_bytes());
            let len = cursor.skip_run(containers.marker);
            if len >= containers.min_len {
                let rest = trim_end_ws(content[len..].trim_start_matches([' ', '\t']));
                let name_len = rest
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
                    .count();
                if name_len == 0 {
                    return None;
                }
                return Some(RegionOpen::Container {
                    marker: containers.marker,
                    len,
                    name: &rest[..name_len],
                    attributes: rest[name_len..].trim_start_matches([' ', '\t']),
                });
            }
        }
    }
    element_open(line, scan).map(RegionOpen::Element)
}

/// Lexical state of an open region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionTracker {
    stack: SmallVec<[RegionKind; 2]>,
    fence: Option<Fence>,
}

impl RegionTracker {
    /// Start tracking after the opener line.
    pub fn new(kind: RegionKind) -> Self {
        let mut stack = SmallVec::new();
        stack.push(kind);
        Self { stack, fence: None }
    }

    /// Number of regions open, counting the outermost.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the tracker sits inside a fence.
    #[inline]
    pub fn in_fence(&self) -> bool {
        self.fence.is_some()
    }

    /// Consume the next line. Returns `true` when it closes the outermost
    /// region.
    pub fn feed(&mut self, line: &str, scan: &ScanConfig<'_>) -> bool {
        if let Some(fence) = self.fence {
            if fence.closes(line) {
                self.fence = None;
            }
            return false;
        }
        if let Some(open) = Fence::open(line, scan) {
            self.fence = Some(open.fence);
            return false;
        }
        if let Some(pos) = self.stack.iter().rposition(|kind| kind.closes(line)) {
            self.stack.truncate(pos);
            return self.stack.is_empty();
        }
        if let Some(open) = region_open(line, scan) {
            if self.stack.len() < MAX_REGION_DEPTH {
                self.stack.push(open.kind());
            }
        }
        false
    }
}
