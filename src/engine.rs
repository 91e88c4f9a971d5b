//! The engine strategy and parsed blocks.
//!
//! An engine turns a standalone Markdown text into a [`Tree`]. The parser
//! hands it either a settled span (whose result is frozen) or the pending
//! suffix (whose result is replaced on the next append). Engines are
//! interchangeable: for the same text and configuration every engine must
//! build the same tree once spans are ignored.

use std::fmt;

use crate::config::Config;
use crate::error::{Result, StreamError};
use crate::ids::{BlockId, IdGenerator};
use crate::node::{Node, Tree};

/// Lifecycle state of a parsed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum BlockStatus {
    /// Tentative; replaced by the next parse.
    Pending,
    /// Frozen.
    Completed,
}

/// One top-level block of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedBlock {
    pub id: BlockId,
    pub status: BlockStatus,
    pub node: Node,
    /// Absolute byte offset of the block in the buffer.
    pub start_offset: usize,
    pub end_offset: usize,
    /// Source text of the block.
    pub raw_text: String,
}

/// A Markdown-to-tree engine.
pub trait Engine: fmt::Debug + Send + Sync {
    /// Short name, used in logs and by the CLI.
    fn name(&self) -> &'static str;

    /// Build the tree of a standalone text. Spans are relative to `text`.
    fn build(&self, text: &str, config: &Config) -> Tree;

    /// [`Engine::build`] followed by the configured plugins.
    fn parse(&self, text: &str, config: &Config) -> Tree {
        let mut tree = self.build(text, config);
        config.apply_plugins(&mut tree);
        tree
    }

    /// Turn a tree built from `raw` into blocks positioned at
    /// `base_offset` in the buffer.
    fn nodes_to_blocks(
        &self,
        tree: Tree,
        base_offset: usize,
        raw: &str,
        status: BlockStatus,
        ids: &IdGenerator,
    ) -> Result<Vec<ParsedBlock>> {
        tree.children
            .into_iter()
            .map(|child| {
                let raw_text = child.span.get(raw).ok_or(StreamError::SpanOutOfRange {
                    start: child.span.start_usize(),
                    end: child.span.end_usize(),
                    len: raw.len(),
                })?;
                let start_offset = base_offset + child.span.start_usize();
                Ok(ParsedBlock {
                    id: ids.block_id(start_offset),
                    status,
                    node: child.node,
                    start_offset,
                    end_offset: base_offset + child.span.end_usize(),
                    raw_text: raw_text.to_string(),
                })
            })
            .collect()
    }
}

/// Engine selected by name: `fast` or `conservative`.
pub fn engine_named(name: &str) -> Option<Box<dyn Engine>> {
    match name {
        "fast" => Some(Box::new(crate::block::FastEngine)),
        "conservative" => Some(Box::new(crate::descent::ConservativeEngine)),
        _ => None,
    }
}
