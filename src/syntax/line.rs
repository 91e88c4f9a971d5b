//! Line splitting and indentation.
//!
//! Indentation is measured in columns with a tab counting as four. When a
//! strip would land inside a tab the whole tab is dropped, so stripped
//! lines stay subslices of the input.

use memchr::memchr;

/// One source line without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    /// Byte offset of `text` in the split input.
    pub start: usize,
    /// Whether a `\n` followed the line.
    pub terminated: bool,
}

impl<'a> Line<'a> {
    /// Byte offset just past the line text (before any `\r\n`).
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Split `input` into lines.
///
/// A trailing `\r` is dropped from each line. The segment after the final
/// `\n` is returned as an unterminated line, even when empty, so a buffer
/// always has exactly one more line than it has newlines.
///
/// # Example
/// ```
/// use streammark::syntax::line::split_lines;
///
/// let lines = split_lines("a\r\nb\n");
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[0].text, "a");
/// assert_eq!(lines[1].start, 3);
/// assert!(!lines[2].terminated);
/// ```
pub fn split_lines(input: &str) -> Vec<Line<'_>> {
    let bytes = input.as_bytes();
    let mut lines = Vec::with_capacity(bytes.len() / 40 + 1);
    let mut start = 0;
    while let Some(pos) = memchr(b'\n', &bytes[start..]) {
        let end = start + pos;
        lines.push(Line {
            text: trim_cr(&input[start..end]),
            start,
            terminated: true,
        });
        start = end + 1;
    }
    lines.push(Line {
        text: trim_cr(&input[start..]),
        start,
        terminated: false,
    });
    lines
}

/// Split a whole document into lines, leaving out the empty segment after
/// a final newline.
pub fn document_lines(input: &str) -> Vec<Line<'_>> {
    let mut lines = split_lines(input);
    if lines.len() > 1 && lines.last().is_some_and(|l| l.text.is_empty()) {
        lines.pop();
    }
    lines
}

/// Count the complete (newline-terminated) lines of `input`.
#[inline]
pub fn count_terminated(input: &str) -> usize {
    memchr::memchr_iter(b'\n', input.as_bytes()).count()
}

#[inline]
fn trim_cr(s: &str) -> &str {
    s.strip_suffix('\r').unwrap_or(s)
}

/// Whether the line holds only spaces and tabs.
#[inline]
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Indentation width in columns.
#[inline]
pub fn indent_columns(line: &str) -> usize {
    let mut cols = 0;
    for b in line.bytes() {
        match b {
            b' ' => cols += 1,
            b'\t' => cols += 4,
            _ => break,
        }
    }
    cols
}

/// Remove up to `cols` columns of leading whitespace.
#[inline]
pub fn strip_columns(line: &str, cols: usize) -> &str {
    let mut taken = 0;
    let mut idx = 0;
    for b in line.bytes() {
        if taken >= cols {
            break;
        }
        match b {
            b' ' => taken += 1,
            b'\t' => taken += 4,
            _ => break,
        }
        idx += 1;
    }
    &line[idx..]
}

/// Strip all leading spaces and tabs.
#[inline]
pub fn trim_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// Strip trailing spaces and tabs.
#[inline]
pub fn trim_end_ws(line: &str) -> &str {
    line.trim_end_matches([' ', '\t'])
}

/// Line content after at most three columns of indentation, or `None`
/// when the line is indented four or more (indented code territory).
#[inline]
pub fn block_content(line: &str) -> Option<&str> {
    if indent_columns(line) >= 4 {
        None
    } else {
        Some(trim_indent(line))
    }
}
