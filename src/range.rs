//! Compact byte spans into the stream buffer.
//!
//! Uses `u32` offsets to keep node positions small. Buffers up to 4GB are
//! supported, which is far beyond any streamed response.

/// Half-open byte span `[start, end)`.
///
/// # Example
/// ```
/// use streammark::Range;
///
/// let input = "Hello, World!";
/// let range = Range::new(0, 5);
/// assert_eq!(range.slice(input), "Hello");
/// assert_eq!(range.shift(7), Range::new(7, 12));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

const _: () = assert!(std::mem::size_of::<Range>() == 8);

impl Range {
    /// Create a new range.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a range from usize values.
    ///
    /// # Panics
    /// Panics in debug mode if values exceed u32::MAX.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(end <= u32::MAX as usize);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Get the text this range refers to.
    ///
    /// Callers only build ranges on line and char boundaries, so slicing
    /// never splits a UTF-8 sequence.
    #[inline]
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start as usize..self.end as usize]
    }

    /// Like [`Range::slice`] but returns `None` when out of bounds.
    #[inline]
    pub fn get<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start as usize..self.end as usize)
    }

    /// Length of the range in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub const fn start_usize(&self) -> usize {
        self.start as usize
    }

    #[inline]
    pub const fn end_usize(&self) -> usize {
        self.end as usize
    }

    /// Check if this range contains a position.
    #[inline]
    pub const fn contains(&self, pos: u32) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Move the range right by `base` bytes.
    ///
    /// Engines report spans relative to the text they parsed; shifting by
    /// the text's buffer offset makes them absolute.
    #[inline]
    pub fn shift(&self, base: usize) -> Self {
        Self::from_usize(self.start_usize() + base, self.end_usize() + base)
    }

    /// Smallest range covering both.
    #[inline]
    pub fn cover(&self, other: Range) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::from_usize(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start as usize..r.end as usize
    }
}
