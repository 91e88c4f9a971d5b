//! Block ids.
//!
//! An id is derived from the block's start offset in the stream buffer, so
//! re-parsing a pending span hands back the same id for the same block.
//! The namespace keeps ids of separate parser instances apart.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Next namespace handed out by [`IdGenerator::unique`].
static NEXT_NAMESPACE: AtomicU32 = AtomicU32::new(1);

/// Stable identifier of a parsed block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockId {
    pub namespace: u32,
    /// Absolute start offset of the block in the buffer.
    pub offset: usize,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.offset)
    }
}

/// Mints block ids for one parser instance.
///
/// # Example
/// ```
/// use streammark::ids::IdGenerator;
///
/// let ids = IdGenerator::new(7);
/// assert_eq!(ids.block_id(42).to_string(), "7-42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdGenerator {
    namespace: u32,
}

impl IdGenerator {
    pub fn new(namespace: u32) -> Self {
        Self { namespace }
    }

    /// Generator with a namespace no other `unique` call in this process
    /// has returned. Namespace 0 is never handed out.
    pub fn unique() -> Self {
        Self::new(NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn namespace(&self) -> u32 {
        self.namespace
    }

    /// Id of the block starting at `offset`.
    #[inline]
    pub fn block_id(&self, offset: usize) -> BlockId {
        BlockId {
            namespace: self.namespace,
            offset,
        }
    }
}
