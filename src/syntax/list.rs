//! List item markers and GFM task markers.

use crate::cursor::Cursor;
use crate::limits::MAX_LIST_MARKER_DIGITS;

use super::line::{block_content, indent_columns, is_blank, strip_columns};

/// A recognized list item marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'a> {
    /// Bullet byte (`-`, `*`, `+`) or ordered delimiter (`.`, `)`).
    pub delimiter: u8,
    pub ordered: bool,
    /// Number of an ordered marker.
    pub start: u32,
    /// Column where item content begins; continuation lines must be
    /// indented at least this far.
    pub content_indent: usize,
    /// First-line content after the marker.
    pub content: &'a str,
}

impl<'a> ListMarker<'a> {
    /// Whether the marker is followed by nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        is_blank(self.content)
    }

    /// Items with the same bullet or delimiter continue one list.
    #[inline]
    pub fn same_list(&self, other_delimiter: u8, other_ordered: bool) -> bool {
        self.delimiter == other_delimiter && self.ordered == other_ordered
    }

    /// Only non-empty items, and ordered ones starting at 1, may interrupt
    /// a paragraph.
    #[inline]
    pub fn can_interrupt_paragraph(&self) -> bool {
        !self.is_empty() && (!self.ordered || self.start == 1)
    }
}

/// Recognize a list item marker.
///
/// Callers must test for thematic breaks first: `- - -` and `* * *` are
/// breaks, not items.
pub fn list_marker(line: &str) -> Option<ListMarker<'_>> {
    let content = block_content(line)?;
    let indent = indent_columns(line);
    let bytes = content.as_bytes();
    let mut cursor = Cursor::new(bytes);

    let (delimiter, ordered, start) = match cursor.peek()? {
        b @ (b'-' | b'*' | b'+') => {
            cursor.bump();
            (b, false, 0)
        }
        b'0'..=b'9' => {
            let digits = cursor.skip_while(|b| b.is_ascii_digit());
            if digits > MAX_LIST_MARKER_DIGITS {
                return None;
            }
            let start = content[..digits].parse::<u32>().ok()?;
            let delimiter = cursor.peek().filter(|&b| b == b'.' || b == b')')?;
            cursor.bump();
            (delimiter, true, start)
        }
        _ => return None,
    };

    let marker_width = cursor.offset();
    let rest = &content[marker_width..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let spaces = indent_columns(rest);
    let (content_indent, item_content) = if is_blank(rest) {
        (indent + marker_width + 1, "")
    } else if spaces > 4 {
        // Five or more spaces: the item starts with indented code.
        (indent + marker_width + 1, strip_columns(rest, 1))
    } else {
        (indent + marker_width + spaces, strip_columns(rest, spaces))
    };

    Some(ListMarker {
        delimiter,
        ordered,
        start,
        content_indent,
        content: item_content,
    })
}

/// Split a GFM task marker (`[ ]`, `[x]`, `[X]`) off item content.
pub fn task_marker(content: &str) -> Option<(bool, &str)> {
    let bytes = content.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'[' || bytes[2] != b']' {
        return None;
    }
    let checked = match bytes[1] {
        b' ' => false,
        b'x' | b'X' => true,
        _ => return None,
    };
    let rest = &content[3..];
    if rest.is_empty() {
        return Some((checked, rest));
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((checked, &rest[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_marker() {
        let m = list_marker("- item").unwrap();
        assert_eq!(m.delimiter, b'-');
        assert!(!m.ordered);
        assert_eq!(m.content_indent, 2);
        assert_eq!(m.content, "item");
    }

    #[test]
    fn test_ordered_marker() {
        let m = list_marker("12) twelve").unwrap();
        assert!(m.ordered);
        assert_eq!(m.start, 12);
        assert_eq!(m.delimiter, b')');
        assert_eq!(m.content_indent, 4);
        assert!(!m.can_interrupt_paragraph());
        assert!(list_marker("1. one").unwrap().can_interrupt_paragraph());
    }

    #[test]
    fn test_marker_needs_space() {
        assert!(list_marker("-item").is_none());
        assert!(list_marker("1.item").is_none());
        assert!(list_marker("#1. x").is_none());
    }

    #[test]
    fn test_empty_item() {
        let m = list_marker("-").unwrap();
        assert!(m.is_empty());
        assert_eq!(m.content_indent, 2);
        assert!(!m.can_interrupt_paragraph());
    }

    #[test]
    fn test_wide_marker_spacing() {
        let m = list_marker("-      code").unwrap();
        assert_eq!(m.content_indent, 2);
        assert_eq!(m.content, "     code");
        let m = list_marker(" -   x").unwrap();
        assert_eq!(m.content_indent, 5);
    }

    #[test]
    fn test_too_many_digits() {
        assert!(list_marker("1234567890. x").is_none());
        assert!(list_marker("123456789. x").is_some());
    }

    #[test]
    fn test_task_marker() {
        assert_eq!(task_marker("[ ] todo"), Some((false, "todo")));
        assert_eq!(task_marker("[x] done"), Some((true, "done")));
        assert_eq!(task_marker("[X]"), Some((true, "")));
        assert_eq!(task_marker("[y] no"), None);
        assert_eq!(task_marker("[x]no"), None);
    }
}
