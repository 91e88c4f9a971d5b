//! Line-level Markdown syntax shared by the context model and both engines.
//!
//! Everything here is a pure function of one line (or one group of lines)
//! plus the [`ScanConfig`](crate::config::ScanConfig). Keeping the
//! recognizers in one place is what lets the boundary detector and the
//! engines agree on where blocks start and end.

pub mod build;
pub mod fence;
pub mod html;
pub mod leaf;
pub mod line;
pub mod list;
pub mod region;
pub mod scan;
pub mod table;

pub use fence::{Fence, FenceKind, FenceOpen};
pub use html::HtmlBlockKind;
pub use line::{Line, document_lines, split_lines};
pub use list::{ListMarker, list_marker, task_marker};
pub use region::{RegionKind, RegionOpen, RegionTracker, region_open};
pub use scan::{
    AtxHeading, BlockStart, ParagraphLine, atx_heading, block_start, continues_table, header_cells,
    interrupts_paragraph, paragraph_line, quote_content, setext_underline, thematic_break,
};
