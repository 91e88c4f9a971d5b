//! Contract-violation errors.
//!
//! Markdown content never fails to parse; every input has a best-effort
//! tree. The variants here only fire when a caller breaks the parser's
//! state machine or an internal invariant does not hold.

/// Errors surfaced by the streaming parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("parser already finalized; call reset() before appending again")]
    AlreadyFinalized,
    #[error("stable boundary {boundary} lies past the end of the buffer ({len} bytes)")]
    BoundaryOutOfRange { boundary: usize, len: usize },
    #[error("engine span {start}..{end} does not fit the parsed text ({len} bytes)")]
    SpanOutOfRange { start: usize, end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, StreamError>;
