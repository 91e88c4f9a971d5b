//! The streaming parser.
//!
//! [`Parser`] owns the text buffer. Each [`Parser::append`] advances the
//! boundary detector over the new complete lines. Text behind a newly
//! found boundary is parsed once and frozen; the rest of the buffer is
//! parsed again from scratch as pending blocks.
//!
//! One instance serves one writer. Calling back into a parser from code
//! it is currently running is not supported.

use std::mem;

use crate::boundary::BoundaryDetector;
use crate::config::Config;
use crate::definitions::{DefinitionManager, FootnoteManager};
use crate::engine::{BlockStatus, Engine, ParsedBlock};
use crate::error::{Result, StreamError};
use crate::ids::IdGenerator;
use crate::node::Tree;
use crate::range::Range;
use crate::render::HtmlRenderer;

/// Lifecycle of a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Nothing appended since creation or the last reset.
    #[default]
    Idle,
    /// Text appended, stream still open.
    Accumulating,
    /// Finalized or aborted; only reset reopens the stream.
    Finalized,
}

/// What one call changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncrementalUpdate {
    /// Blocks frozen by this call.
    pub completed: Vec<ParsedBlock>,
    /// Pending blocks that existed before this call and changed.
    pub updated: Vec<ParsedBlock>,
    /// All pending blocks.
    pub pending: Vec<ParsedBlock>,
    /// Completed blocks followed by pending ones.
    pub ast: Tree,
    /// Footnote identifiers in first-citation order.
    pub footnote_reference_order: Vec<String>,
}

/// Incremental Markdown parser.
///
/// # Example
/// ```
/// use streammark::{Config, Parser};
///
/// let mut parser = Parser::new(Config::gfm());
/// parser.append("# Title\n\nSome ").unwrap();
/// let update = parser.append("text\n").unwrap();
/// assert_eq!(parser.get_completed_blocks().len(), 1);
/// assert_eq!(update.pending.len(), 1);
///
/// let done = parser.finalize();
/// assert!(done.pending.is_empty());
/// assert_eq!(parser.get_completed_blocks().len(), 2);
/// ```
#[derive(Debug)]
pub struct Parser {
    config: Config,
    engine: Box<dyn Engine>,
    ids: IdGenerator,
    buffer: String,
    detector: BoundaryDetector,
    /// Buffer offset where pending text starts.
    frozen: usize,
    completed: Vec<ParsedBlock>,
    pending: Vec<ParsedBlock>,
    definitions: DefinitionManager,
    footnotes: FootnoteManager,
    state: ParserState,
    /// Result handed out by finalize or abort.
    last_final: Option<IncrementalUpdate>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Parser {
    /// Parser using the fast engine.
    ///
    /// Each instance gets its own id namespace, so blocks of two parsers
    /// never share an id. Use [`Parser::with_ids`] to pick the namespace.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: Box::new(crate::block::FastEngine),
            ids: IdGenerator::unique(),
            buffer: String::new(),
            detector: BoundaryDetector::new(),
            frozen: 0,
            completed: Vec::new(),
            pending: Vec::new(),
            definitions: DefinitionManager::new(),
            footnotes: FootnoteManager::new(),
            state: ParserState::Idle,
            last_final: None,
        }
    }

    pub fn with_engine(mut self, engine: Box<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Swap the engine. Blocks parsed by the old engine are dropped.
    pub fn set_engine(&mut self, engine: Box<dyn Engine>) {
        log::debug!("engine {} -> {}", self.engine.name(), engine.name());
        self.engine = engine;
        self.reset();
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Buffer offset up to which blocks are completed.
    pub fn stable_offset(&self) -> usize {
        self.frozen
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Append a chunk and re-parse what is still pending.
    ///
    /// Fails with [`StreamError::AlreadyFinalized`] once the stream was
    /// finalized or aborted.
    pub fn append(&mut self, chunk: &str) -> Result<IncrementalUpdate> {
        if self.state == ParserState::Finalized {
            return Err(StreamError::AlreadyFinalized);
        }
        self.buffer.push_str(chunk);
        if !self.buffer.is_empty() {
            self.state = ParserState::Accumulating;
        }

        let scan = self.config.scan_config();
        let mut completed = Vec::new();
        if let Some(boundary) = self.detector.advance(&self.buffer, &scan) {
            if boundary > self.buffer.len() {
                return Err(StreamError::BoundaryOutOfRange {
                    boundary,
                    len: self.buffer.len(),
                });
            }
            if boundary > self.frozen {
                completed = self.parse_span(self.frozen, boundary, BlockStatus::Completed)?;
                self.freeze(&completed, boundary);
            }
        }

        let pending = self.parse_span(self.frozen, self.buffer.len(), BlockStatus::Pending)?;
        let previous = mem::replace(&mut self.pending, pending);
        let updated = self
            .pending
            .iter()
            .filter(|block| {
                previous
                    .iter()
                    .any(|old| old.id == block.id && old.node != block.node)
            })
            .cloned()
            .collect();
        Ok(self.update(completed, updated))
    }

    /// End the stream: pending text is parsed once more and completed.
    ///
    /// Calling it again hands back the same result.
    pub fn finalize(&mut self) -> IncrementalUpdate {
        if let Some(done) = &self.last_final {
            return done.clone();
        }
        let end = self.buffer.len();
        let completed = match self.parse_span(self.frozen, end, BlockStatus::Completed) {
            Ok(blocks) => blocks,
            Err(err) => {
                log::debug!("final parse failed ({err}); keeping pending blocks");
                promote(mem::take(&mut self.pending))
            }
        };
        log::debug!("finalize: {} blocks completed at end {end}", completed.len());
        self.finish(completed)
    }

    /// End the stream without a final parse: pending blocks are completed
    /// as they stand and later appends are refused.
    pub fn abort(&mut self) -> IncrementalUpdate {
        if let Some(done) = &self.last_final {
            return done.clone();
        }
        let completed = promote(mem::take(&mut self.pending));
        log::debug!("abort: {} pending blocks kept", completed.len());
        self.finish(completed)
    }

    /// Drop all text and blocks; back to [`ParserState::Idle`].
    pub fn reset(&mut self) {
        log::debug!("reset after {} bytes", self.buffer.len());
        self.buffer.clear();
        self.detector.reset();
        self.frozen = 0;
        self.completed.clear();
        self.pending.clear();
        self.definitions.clear();
        self.footnotes.clear();
        self.state = ParserState::Idle;
        self.last_final = None;
    }

    /// Parse a whole document: reset, append and finalize.
    pub fn render(&mut self, text: &str) -> Result<IncrementalUpdate> {
        self.reset();
        self.append(text)?;
        Ok(self.finalize())
    }

    /// Completed blocks followed by pending ones.
    pub fn get_ast(&self) -> Tree {
        let mut tree = Tree::new();
        for block in self.completed.iter().chain(&self.pending) {
            tree.push(block.node.clone(), Range::from_usize(block.start_offset, block.end_offset));
        }
        tree
    }

    pub fn get_buffer(&self) -> &str {
        &self.buffer
    }

    pub fn get_completed_blocks(&self) -> &[ParsedBlock] {
        &self.completed
    }

    pub fn get_pending_blocks(&self) -> &[ParsedBlock] {
        &self.pending
    }

    pub fn definitions(&self) -> &DefinitionManager {
        &self.definitions
    }

    pub fn footnotes(&self) -> &FootnoteManager {
        &self.footnotes
    }

    /// Footnote citation order over completed and pending blocks.
    pub fn footnote_reference_order(&self) -> Vec<String> {
        self.footnotes
            .order_with(self.pending.iter().map(|block| &block.node))
    }

    /// The AST with references resolved against every definition seen so
    /// far, pending ones included.
    pub fn resolved_ast(&self) -> Tree {
        let mut definitions = self.definitions.clone();
        for block in &self.pending {
            definitions.extract(&block.node);
        }
        definitions.resolve(&self.get_ast())
    }

    /// HTML for the current AST.
    pub fn to_html(&self) -> String {
        let order = self.footnote_reference_order();
        HtmlRenderer::new(&order).render(&self.resolved_ast())
    }

    fn parse_span(&self, start: usize, end: usize, status: BlockStatus) -> Result<Vec<ParsedBlock>> {
        let raw = self.buffer.get(start..end).ok_or(StreamError::BoundaryOutOfRange {
            boundary: end,
            len: self.buffer.len(),
        })?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let tree = self.engine.parse(raw, &self.config);
        self.engine.nodes_to_blocks(tree, start, raw, status, &self.ids)
    }

    fn freeze(&mut self, blocks: &[ParsedBlock], boundary: usize) {
        self.definitions.extract_from_blocks(blocks);
        self.footnotes.extract_from_blocks(blocks);
        self.completed.extend_from_slice(blocks);
        self.frozen = boundary;
    }

    fn finish(&mut self, completed: Vec<ParsedBlock>) -> IncrementalUpdate {
        let end = self.buffer.len();
        self.freeze(&completed, end);
        self.pending.clear();
        self.state = ParserState::Finalized;
        let done = self.update(completed, Vec::new());
        self.last_final = Some(done.clone());
        done
    }

    fn update(&self, completed: Vec<ParsedBlock>, updated: Vec<ParsedBlock>) -> IncrementalUpdate {
        IncrementalUpdate {
            completed,
            updated,
            pending: self.pending.clone(),
            ast: self.get_ast(),
            footnote_reference_order: self.footnote_reference_order(),
        }
    }
}

fn promote(blocks: Vec<ParsedBlock>) -> Vec<ParsedBlock> {
    blocks
        .into_iter()
        .map(|block| ParsedBlock {
            status: BlockStatus::Completed,
            ..block
        })
        .collect()
}
