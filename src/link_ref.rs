//! Link reference syntax: labels, destinations, titles and definitions.
//!
//! These scanners decide only whether text *is* reference syntax. Whether
//! a reference resolves is decided later, against whatever definitions
//! have been collected by then, so a reference may precede its definition.

use crate::Range;
use crate::escape::unescape;
use crate::limits::{MAX_LINK_LABEL_LEN, MAX_LINK_PAREN_DEPTH};

/// Scan a link label `[...]` starting at `start`.
///
/// Returns the inner range and the offset past `]`. Labels may not contain
/// unescaped brackets and must have a non-whitespace character.
pub fn scan_link_label(bytes: &[u8], start: usize) -> Option<(Range, usize)> {
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let inner_start = start + 1;
    let mut pos = inner_start;
    let mut has_content = false;
    loop {
        match *bytes.get(pos)? {
            b']' => break,
            b'[' => return None,
            b'\\' if pos + 1 < bytes.len() => {
                has_content = true;
                pos += 2;
            }
            b => {
                has_content |= !b.is_ascii_whitespace();
                pos += 1;
            }
        }
        if pos - inner_start > MAX_LINK_LABEL_LEN {
            return None;
        }
    }
    has_content.then(|| (Range::from_usize(inner_start, pos), pos + 1))
}

/// Scan a link destination at `start`: `<...>` or a bare run with
/// balanced parentheses. Returns the raw (still escaped) range and the end.
pub fn scan_destination(bytes: &[u8], start: usize) -> Option<(Range, usize)> {
    let len = bytes.len();
    let mut pos = start;
    if bytes.get(pos) == Some(&b'<') {
        pos += 1;
        let url_start = pos;
        while pos < len {
            match bytes[pos] {
                b'>' => return Some((Range::from_usize(url_start, pos), pos + 1)),
                b'\n' | b'<' => return None,
                b'\\' if pos + 1 < len => pos += 2,
                _ => pos += 1,
            }
        }
        return None;
    }

    let mut depth = 0usize;
    while pos < len {
        match bytes[pos] {
            b'(' => {
                depth += 1;
                if depth > MAX_LINK_PAREN_DEPTH {
                    return None;
                }
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b'\\' if pos + 1 < len && bytes[pos + 1].is_ascii_punctuation() => pos += 1,
            b if b.is_ascii_whitespace() || b.is_ascii_control() => break,
            _ => {}
        }
        pos += 1;
    }
    if pos == start || depth != 0 {
        return None;
    }
    Some((Range::from_usize(start, pos), pos))
}

/// Scan a link title (`"..."`, `'...'` or `(...)`) at `start`. Returns the
/// inner range and the end. A title may span lines but not a blank line.
pub fn scan_title(bytes: &[u8], start: usize) -> Option<(Range, usize)> {
    let close = match *bytes.get(start)? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let inner_start = start + 1;
    let mut pos = inner_start;
    let mut line_blank = false;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == close {
            return Some((Range::from_usize(inner_start, pos), pos + 1));
        }
        match b {
            b'(' if close == b')' => return None,
            b'\\' if pos + 1 < bytes.len() => pos += 2,
            b'\n' => {
                if line_blank {
                    return None;
                }
                line_blank = true;
                pos += 1;
            }
            b' ' | b'\t' => pos += 1,
            _ => {
                line_blank = false;
                pos += 1;
            }
        }
    }
    None
}

/// Skip spaces and tabs plus at most one line ending.
fn skip_space_one_newline(bytes: &[u8], mut pos: usize) -> (usize, bool) {
    let mut newline = false;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' => pos += 1,
            b'\n' if !newline => {
                newline = true;
                pos += 1;
            }
            _ => break,
        }
    }
    (pos, newline)
}

/// Offset past the line ending if only whitespace remains on the line.
fn line_end_after(bytes: &[u8], mut pos: usize) -> Option<usize> {
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' => pos += 1,
            b'\n' => return Some(pos + 1),
            _ => return None,
        }
    }
    Some(pos)
}

/// A parsed link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionParts {
    /// Label as written.
    pub label: String,
    /// Normalized label.
    pub identifier: String,
    pub url: String,
    pub title: Option<String>,
}

/// Parse one link reference definition at the start of `text`.
///
/// Returns the definition and the number of bytes it consumed, which
/// always ends at a line ending or the end of `text`.
///
/// # Example
/// ```
/// use streammark::link_ref::parse_definition;
///
/// let (def, used) = parse_definition("[Foo]: /url \"title\"\nrest").unwrap();
/// assert_eq!(def.identifier, "foo");
/// assert_eq!(def.url, "/url");
/// assert_eq!(def.title.as_deref(), Some("title"));
/// assert_eq!(used, 20);
/// ```
pub fn parse_definition(text: &str) -> Option<(DefinitionParts, usize)> {
    let bytes = text.as_bytes();
    let (label, pos) = scan_link_label(bytes, 0)?;
    if bytes.get(pos) != Some(&b':') {
        return None;
    }
    let (pos, _) = skip_space_one_newline(bytes, pos + 1);
    let (dest, dest_end) = scan_destination(bytes, pos)?;

    let url = unescape(dest.slice(text)).into_owned();
    let label_text = label.slice(text);
    let parts = |title: Option<String>| DefinitionParts {
        label: label_text.to_string(),
        identifier: normalize_label(label_text),
        url: url.clone(),
        title,
    };

    let (title_pos, crossed_newline) = skip_space_one_newline(bytes, dest_end);
    if title_pos > dest_end || crossed_newline {
        if let Some((title, title_end)) = scan_title(bytes, title_pos) {
            if let Some(end) = line_end_after(bytes, title_end) {
                let title = unescape(title.slice(text)).into_owned();
                return Some((parts(Some(title)), end));
            }
        }
    }
    let end = line_end_after(bytes, dest_end)?;
    Some((parts(None), end))
}

/// Normalize a link label for matching: collapse whitespace, trim and
/// case-fold.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last_was_space = true;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        if ch == 'ß' || ch == 'ẞ' {
            out.push_str("ss");
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_label() {
        assert_eq!(scan_link_label(b"[foo] x", 0), Some((Range::new(1, 4), 5)));
        assert_eq!(scan_link_label(b"[a\\]b]", 0), Some((Range::new(1, 5), 6)));
        assert_eq!(scan_link_label(b"[  ]", 0), None);
        assert_eq!(scan_link_label(b"[a[b]", 0), None);
        assert_eq!(scan_link_label(b"[open", 0), None);
    }

    #[test]
    fn test_scan_destination() {
        assert_eq!(scan_destination(b"<a b>", 0), Some((Range::new(1, 4), 5)));
        assert_eq!(scan_destination(b"/u(r)l) x", 0), Some((Range::new(0, 6), 6)));
        assert_eq!(scan_destination(b"/url \"t\"", 0), Some((Range::new(0, 4), 4)));
        assert_eq!(scan_destination(b"(unbalanced", 0), None);
        assert_eq!(scan_destination(b"<a\nb>", 0), None);
        assert_eq!(scan_destination(b"<>", 0), Some((Range::new(1, 1), 2)));
    }

    #[test]
    fn test_scan_title() {
        assert_eq!(scan_title(b"\"t\"", 0), Some((Range::new(1, 2), 3)));
        assert_eq!(scan_title(b"'a\nb'", 0), Some((Range::new(1, 4), 5)));
        assert_eq!(scan_title(b"\"a\n\nb\"", 0), None);
        assert_eq!(scan_title(b"(a(b)", 0), None);
    }

    #[test]
    fn test_definition_without_title() {
        let (def, used) = parse_definition("[x]: https://e.com\n").unwrap();
        assert_eq!(def.url, "https://e.com");
        assert_eq!(def.title, None);
        assert_eq!(used, 19);
    }

    #[test]
    fn test_definition_title_on_next_line() {
        let (def, used) = parse_definition("[x]: /u\n  'ti\ntle'\nnext").unwrap();
        assert_eq!(def.title.as_deref(), Some("ti\ntle"));
        assert_eq!(used, 19);
    }

    #[test]
    fn test_definition_bad_title_falls_back() {
        let (def, used) = parse_definition("[x]: /u\n\"t\" junk").unwrap();
        assert_eq!(def.title, None);
        assert_eq!(used, 8);
        assert!(parse_definition("[x]: /u \"t\" junk").is_none());
    }

    #[test]
    fn test_definition_rejects() {
        assert!(parse_definition("[x] /u").is_none());
        assert!(parse_definition("[x]:").is_none());
        assert!(parse_definition("[x]: /u junk").is_none());
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Foo   BAR\n baz "), "foo bar baz");
        assert_eq!(normalize_label("Straße"), "strasse");
    }
}
