//! Footnote label syntax.
//!
//! Labels may not contain whitespace or brackets. Identifiers are the
//! lowercased label, so `[^Note]` and `[^note]` refer to one footnote.

use crate::limits::MAX_LINK_LABEL_LEN;
use crate::syntax::line::block_content;

/// Scan `[^label]` at `start`; returns the label and the offset past `]`.
pub fn scan_footnote_label(text: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'[') || bytes.get(start + 1) != Some(&b'^') {
        return None;
    }
    let label_start = start + 2;
    let mut i = label_start;
    while i < bytes.len() {
        match bytes[i] {
            b']' => break,
            b'[' | b' ' | b'\t' | b'\n' | b'\r' => return None,
            b'\\' if i + 1 < bytes.len() => i += 2,
            _ => i += 1,
        }
        if i - label_start > MAX_LINK_LABEL_LEN {
            return None;
        }
    }
    if i >= bytes.len() || i == label_start {
        return None;
    }
    Some((&text[label_start..i], i + 1))
}

/// Identifier for a footnote label.
pub fn normalize_footnote_label(label: &str) -> String {
    label.to_lowercase()
}

/// The opening line of a footnote definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootnoteStart<'a> {
    pub label: &'a str,
    /// Content after `]:` with leading whitespace removed.
    pub content: &'a str,
}

/// Recognize `[^label]:` at up to three columns of indentation.
pub fn footnote_def_start(line: &str) -> Option<FootnoteStart<'_>> {
    let content = block_content(line)?;
    let (label, end) = scan_footnote_label(content, 0)?;
    let rest = content[end..].strip_prefix(':')?;
    Some(FootnoteStart {
        label,
        content: rest.trim_start_matches([' ', '\t']),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_label() {
        assert_eq!(scan_footnote_label("[^1] x", 0), Some(("1", 4)));
        assert_eq!(scan_footnote_label("a[^note-a]", 1), Some(("note-a", 10)));
        assert_eq!(scan_footnote_label("[^]", 0), None);
        assert_eq!(scan_footnote_label("[^a b]", 0), None);
        assert_eq!(scan_footnote_label("[^open", 0), None);
        assert_eq!(scan_footnote_label("[x]", 0), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_footnote_label("Note"), "note");
    }

    #[test]
    fn test_def_start() {
        let start = footnote_def_start("[^1]: line one").unwrap();
        assert_eq!(start.label, "1");
        assert_eq!(start.content, "line one");
        assert_eq!(footnote_def_start("   [^x]:").unwrap().content, "");
        assert!(footnote_def_start("[^x] no colon").is_none());
        assert!(footnote_def_start("    [^x]: code").is_none());
    }
}
