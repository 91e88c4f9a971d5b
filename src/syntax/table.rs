//! GFM table rows.

use std::borrow::Cow;

use memchr::memchr;

use crate::limits::MAX_TABLE_COLUMNS;
use crate::node::Alignment;

use super::line::{block_content, trim_end_ws};

/// Whether the line has an unescaped `|`.
pub fn has_pipe(line: &str) -> bool {
    let bytes = line.as_bytes();
    let mut start = 0;
    while let Some(pos) = memchr(b'|', &bytes[start..]) {
        let at = start + pos;
        if !is_escaped(bytes, at) {
            return true;
        }
        start = at + 1;
    }
    false
}

fn is_escaped(bytes: &[u8], at: usize) -> bool {
    let backslashes = bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count();
    backslashes % 2 == 1
}

/// Split a row into trimmed cell texts. Leading and trailing pipes are
/// optional; `\|` inside a cell becomes `|`.
pub fn split_row(line: &str) -> Vec<Cow<'_, str>> {
    let mut text = line.trim_matches([' ', '\t']);
    if let Some(rest) = text.strip_prefix('|') {
        text = rest;
    }
    if text.ends_with('|') && !is_escaped(text.as_bytes(), text.len() - 1) {
        text = &text[..text.len() - 1];
    }

    let bytes = text.as_bytes();
    let mut cells = Vec::new();
    let mut cell_start = 0;
    let mut i = 0;
    while i <= bytes.len() {
        let at_end = i == bytes.len();
        if at_end || (bytes[i] == b'|' && !is_escaped(bytes, i)) {
            let cell = text[cell_start..i].trim_matches([' ', '\t']);
            cells.push(unescape_pipes(cell));
            if cells.len() == MAX_TABLE_COLUMNS {
                break;
            }
            cell_start = i + 1;
        }
        i += 1;
    }
    cells
}

fn unescape_pipes(cell: &str) -> Cow<'_, str> {
    if cell.contains("\\|") {
        Cow::Owned(cell.replace("\\|", "|"))
    } else {
        Cow::Borrowed(cell)
    }
}

/// Number of cells in a row.
#[inline]
pub fn count_cells(line: &str) -> usize {
    split_row(line).len()
}

/// Parse a delimiter row (`| :--- | ---: |`) into column alignments.
pub fn parse_delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    let content = trim_end_ws(block_content(line)?);
    if !has_pipe(content) && !content.contains('-') {
        return None;
    }
    let cells = split_row(content);
    let mut align = Vec::with_capacity(cells.len());
    for cell in &cells {
        let cell = cell.as_ref();
        let left = cell.starts_with(':');
        let right = cell.len() > 1 && cell.ends_with(':');
        let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        align.push(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        });
    }
    Some(align)
}

/// Whether `delimiter` opens a table under header line `header`.
pub fn starts_table(header: &str, delimiter: &str) -> Option<Vec<Alignment>> {
    if !has_pipe(header) || !has_pipe(delimiter) {
        return None;
    }
    let align = parse_delimiter_row(delimiter)?;
    (align.len() == count_cells(header)).then_some(align)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a|b"), vec!["a", "b"]);
        assert_eq!(split_row("| a \\| b |"), vec!["a | b"]);
        assert_eq!(split_row("|  |"), vec![""]);
        assert_eq!(split_row("a \\|"), vec!["a |"]);
    }

    #[test]
    fn test_delimiter_row() {
        assert_eq!(
            parse_delimiter_row("| :-- | :-: | --: | --- |"),
            Some(vec![Alignment::Left, Alignment::Center, Alignment::Right, Alignment::None])
        );
        assert_eq!(parse_delimiter_row("|---|"), Some(vec![Alignment::None]));
        assert_eq!(parse_delimiter_row("| a |"), None);
        assert_eq!(parse_delimiter_row("| : |"), None);
        assert_eq!(parse_delimiter_row("    |---|"), None);
    }

    #[test]
    fn test_starts_table() {
        assert!(starts_table("| a | b |", "|---|---|").is_some());
        assert!(starts_table("| a | b |", "|---|").is_none());
        assert!(starts_table("a", "|---|").is_none());
        assert!(starts_table("a | b", "--- | ---").is_some());
    }

    #[test]
    fn test_has_pipe() {
        assert!(has_pipe("a | b"));
        assert!(!has_pipe("a \\| b"));
        assert!(has_pipe("a \\\\| b"));
    }
}
