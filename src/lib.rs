//! streammark: incremental Markdown parsing for streamed text
//!
//! Text arrives in chunks of any size, typically tokens of a generated
//! response. The parser keeps a buffer and a stable boundary: blocks
//! before the boundary are parsed once and never change, the rest is
//! re-parsed on every append. Once the stream is finalized the tree equals
//! a one-shot parse of the whole text.
//!
//! # Design Principles
//! - Line-level context decides stability; no block is frozen while a
//!   later line could still extend it
//! - Two interchangeable engines that must agree node for node
//! - Reference links and footnotes are tokenized before their definitions
//!   exist and resolved when the tree is read
//! - No regex, no backtracking: byte-level scanning throughout
//!
//! # Example
//! ```
//! use streammark::{Config, Node, Parser};
//!
//! let mut parser = Parser::new(Config::gfm());
//! for chunk in ["See [docs][d", "].\n\n[d]: https://", "example.com\n"] {
//!     parser.append(chunk).unwrap();
//! }
//! parser.finalize();
//!
//! let ast = parser.resolved_ast();
//! let Node::Paragraph { children } = &ast.children[0].node else { panic!() };
//! assert!(matches!(&children[1], Node::Link { url, .. } if url == "https://example.com"));
//! ```

pub mod block;
pub mod boundary;
pub mod config;
pub mod context;
pub mod cursor;
pub mod definitions;
pub mod descent;
pub mod engine;
pub mod error;
pub mod escape;
pub mod footnote;
pub mod ids;
pub mod inline;
pub mod limits;
pub mod link_ref;
pub mod node;
pub mod range;
pub mod render;
pub mod stream;
pub mod syntax;

// Re-export primary types
pub use block::FastEngine;
pub use boundary::BoundaryDetector;
pub use config::{Config, ContainerConfig, EnginePlugin, HtmlTreeOptions, MathOptions};
pub use context::{BlockContext, update_context};
pub use definitions::{DefinitionManager, FootnoteManager};
pub use descent::ConservativeEngine;
pub use engine::{BlockStatus, Engine, ParsedBlock, engine_named};
pub use error::{Result, StreamError};
pub use ids::{BlockId, IdGenerator};
pub use node::{Alignment, Node, ReferenceKind, SpannedNode, Tree};
pub use range::Range;
pub use render::{HtmlRenderer, HtmlWriter, to_html, to_html_with};
pub use stream::{IncrementalUpdate, Parser, ParserState};

/// Parse a whole document with the fast engine, without streaming.
///
/// # Example
/// ```
/// let tree = streammark::parse("# Hi\n\ntext\n", &streammark::Config::default());
/// assert_eq!(tree.len(), 2);
/// ```
pub fn parse(text: &str, config: &Config) -> Tree {
    FastEngine.parse(text, config)
}
