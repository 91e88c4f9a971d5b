//! Consumers of block events.

use crate::config::ScanConfig;
use crate::node::Node;
use crate::syntax::build::{
    Built, blockquote, footnote_definition, list, list_item, paragraph_blocks, region,
};
use crate::syntax::leaf;

use super::event::{BlockEvent, ContainerStart, LeafBlock};

/// Receives block events in document order.
pub trait BlockSink<'a> {
    fn event(&mut self, event: BlockEvent<'a>);
}

impl<'a> BlockSink<'a> for Vec<BlockEvent<'a>> {
    #[inline]
    fn event(&mut self, event: BlockEvent<'a>) {
        self.push(event);
    }
}

struct OpenContainer<'a> {
    container: ContainerStart<'a>,
    first_line: usize,
    children: Vec<Built>,
}

/// Builds nodes from events as they arrive.
pub struct TreeSink<'a, 's> {
    scan: ScanConfig<'s>,
    stack: Vec<OpenContainer<'a>>,
    blocks: Vec<Built>,
}

impl<'a, 's> TreeSink<'a, 's> {
    pub fn new(scan: ScanConfig<'s>) -> Self {
        Self {
            scan,
            stack: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Top-level blocks. Containers still open are closed at their first line.
    pub fn finish(mut self) -> Vec<Built> {
        while let Some(open) = self.stack.last() {
            let last_line = open.first_line;
            self.exit(last_line);
        }
        self.blocks
    }

    fn push(&mut self, built: Built) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(built),
            None => self.blocks.push(built),
        }
    }

    fn exit(&mut self, last_line: usize) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let node = match open.container {
            ContainerStart::BlockQuote => blockquote(open.children),
            ContainerStart::List { ordered, start } => list(ordered, start, open.children),
            ContainerStart::ListItem { checked } => list_item(checked, open.children),
            ContainerStart::FootnoteDefinition { label } => footnote_definition(label, open.children),
            ContainerStart::Region(ref start) => region(start, open.children),
        };
        self.push(Built::new(node, open.first_line, last_line));
    }

    fn leaf(&mut self, block: LeafBlock<'a>, first_line: usize, last_line: usize) {
        let scan = self.scan;
        let node = match block {
            LeafBlock::Paragraph(lines) => {
                for built in paragraph_blocks(&lines, first_line, &scan) {
                    self.push(built);
                }
                return;
            }
            LeafBlock::Heading { depth, content } => leaf::heading(depth, content, &scan),
            LeafBlock::SetextHeading { depth, lines } => leaf::setext_heading(depth, &lines, &scan),
            LeafBlock::ThematicBreak => Node::ThematicBreak,
            LeafBlock::FencedCode { info, math, lines } => {
                if math {
                    leaf::math_block(&lines)
                } else {
                    leaf::fenced_code(info, &lines)
                }
            }
            LeafBlock::IndentedCode(lines) => leaf::indented_code(&lines),
            LeafBlock::Html(lines) => leaf::html_block(&lines),
            LeafBlock::Table { header, align, rows } => leaf::table(header, align, &rows, &scan),
        };
        self.push(Built::new(node, first_line, last_line));
    }
}

impl<'a> BlockSink<'a> for TreeSink<'a, '_> {
    fn event(&mut self, event: BlockEvent<'a>) {
        match event {
            BlockEvent::Enter {
                container,
                first_line,
            } => self.stack.push(OpenContainer {
                container,
                first_line,
                children: Vec::new(),
            }),
            BlockEvent::Exit { last_line } => self.exit(last_line),
            BlockEvent::Leaf {
                block,
                first_line,
                last_line,
            } => self.leaf(block, first_line, last_line),
        }
    }
}
