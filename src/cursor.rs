//! Byte cursor for scanning a single line or inline span.
//!
//! Index-based and bounds-checked; lines handed to scanners are short, so
//! the checks never show up next to the per-line work.

/// A cursor over a byte slice.
///
/// # Example
/// ```
/// use streammark::cursor::Cursor;
///
/// let mut cursor = Cursor::new(b"   ## Title");
/// assert_eq!(cursor.skip_spaces(), 3);
/// assert_eq!(cursor.skip_run(b'#'), 2);
/// assert_eq!(cursor.peek(), Some(b' '));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `input`.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Create a cursor at `offset` (clamped to the input length).
    #[inline]
    pub fn new_at(input: &'a [u8], offset: usize) -> Self {
        Self {
            input,
            pos: offset.min(input.len()),
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Byte `n` positions ahead of the cursor.
    #[inline]
    pub fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.input.get(self.pos + n).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    #[inline]
    pub fn bump(&mut self) {
        self.advance(1);
    }

    #[inline]
    pub fn at_any(&self, bytes: &[u8]) -> bool {
        self.peek().is_some_and(|b| bytes.contains(&b))
    }

    /// Skip bytes while `predicate` holds; returns the count skipped.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip spaces and tabs.
    #[inline]
    pub fn skip_spaces(&mut self) -> usize {
        self.skip_while(|b| b == b' ' || b == b'\t')
    }

    /// Skip a run of one byte value; returns the run length.
    #[inline]
    pub fn skip_run(&mut self, b: u8) -> usize {
        self.skip_while(|c| c == b)
    }

    /// Consume `b` if it is next.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `bytes` if they are next.
    #[inline]
    pub fn eat_bytes(&mut self, bytes: &[u8]) -> bool {
        if self.input[self.pos..].starts_with(bytes) {
            self.pos += bytes.len();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Offset of the next `needle` relative to the cursor.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.remaining_slice())
    }

    /// Whether only spaces and tabs remain.
    #[inline]
    pub fn rest_is_blank(&self) -> bool {
        self.remaining_slice().iter().all(|&b| b == b' ' || b == b'\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basics() {
        let mut c = Cursor::new(b"abc");
        assert_eq!(c.peek(), Some(b'a'));
        c.bump();
        assert_eq!(c.offset(), 1);
        assert_eq!(c.peek_ahead(1), Some(b'c'));
        c.advance(10);
        assert!(c.is_eof());
        assert_eq!(c.peek(), None);
    }

    #[test]
    fn test_cursor_skips() {
        let mut c = Cursor::new(b" \t ```rust");
        assert_eq!(c.skip_spaces(), 3);
        assert_eq!(c.skip_run(b'`'), 3);
        assert!(c.eat_bytes(b"rust"));
        assert!(c.rest_is_blank());
    }

    #[test]
    fn test_cursor_find() {
        let c = Cursor::new_at(b"a|b|c", 2);
        assert_eq!(c.find(b'|'), Some(1));
        assert!(c.at_any(b"|b"));
        assert_eq!(c.find(b'z'), None);
    }
}
