//! Fast block engine.
//!
//! A line-oriented parser keeps a stack of open containers and emits
//! events. A [`TreeSink`] assembles the events into nodes. Inline content is
//! parsed by the leaf builders as each leaf closes.

mod event;
mod parser;
mod sink;

pub use event::{BlockEvent, ContainerStart, LeafBlock};
pub use parser::BlockParser;
pub use sink::{BlockSink, TreeSink};

use crate::config::Config;
use crate::engine::Engine;
use crate::node::Tree;
use crate::syntax::build::into_tree;
use crate::syntax::line::document_lines;

/// Single-pass engine over an open-container stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastEngine;

impl Engine for FastEngine {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn build(&self, text: &str, config: &Config) -> Tree {
        let scan = config.scan_config();
        let lines = document_lines(text);
        let mut sink = TreeSink::new(scan);
        BlockParser::new(lines.iter().map(|l| l.text).collect(), scan).parse(&mut sink);
        into_tree(sink.finish(), &lines)
    }
}
