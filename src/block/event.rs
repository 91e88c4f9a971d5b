//! Block-level event types.

use crate::node::Alignment;
use crate::syntax::region::RegionOpen;

/// A container opened by the block parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStart<'a> {
    BlockQuote,
    List {
        ordered: bool,
        /// Number of the first item of an ordered list.
        start: u32,
    },
    ListItem {
        /// Task state for GFM task items.
        checked: Option<bool>,
    },
    FootnoteDefinition {
        label: &'a str,
    },
    /// Custom container or HTML element.
    Region(RegionOpen<'a>),
}

/// A finished leaf block with its source lines, relative to its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafBlock<'a> {
    /// Paragraph lines; definitions at the start are split off when built.
    Paragraph(Vec<&'a str>),
    Heading {
        /// Heading level (1-6).
        depth: u8,
        content: &'a str,
    },
    SetextHeading {
        depth: u8,
        lines: Vec<&'a str>,
    },
    ThematicBreak,
    FencedCode {
        info: &'a str,
        /// Display math instead of code.
        math: bool,
        lines: Vec<&'a str>,
    },
    IndentedCode(Vec<&'a str>),
    Html(Vec<&'a str>),
    Table {
        header: &'a str,
        align: Vec<Alignment>,
        rows: Vec<&'a str>,
    },
}

/// Events emitted by the block parser.
///
/// Line numbers are document line indices. `last_line` is the last line
/// of a block that is non-blank at the level of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent<'a> {
    /// Start of a container.
    Enter {
        container: ContainerStart<'a>,
        first_line: usize,
    },
    /// End of the innermost open container.
    Exit { last_line: usize },
    /// A complete leaf block.
    Leaf {
        block: LeafBlock<'a>,
        first_line: usize,
        last_line: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_size() {
        assert!(std::mem::size_of::<BlockEvent<'_>>() <= 128);
    }

    #[test]
    fn test_container_start_eq() {
        let a = ContainerStart::List { ordered: true, start: 1 };
        let b = ContainerStart::List { ordered: false, start: 1 };
        assert_ne!(a, b);
    }
}
