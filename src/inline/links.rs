//! Link tails and autolinks.
//!
//! Handles:
//! - Inline link tails: `(url "title")` after a closing bracket
//! - Autolinks: `<https://example.com>` and `<email@example.com>`

use crate::escape::unescape;
use crate::link_ref::{scan_destination, scan_title};

/// Destination and title of an inline link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTail {
    pub url: String,
    pub title: Option<String>,
    /// Offset past the closing `)`.
    pub end: usize,
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
        pos += 1;
    }
    pos
}

/// Parse `(destination "title")` starting at the `(`.
pub fn scan_link_tail(text: &str, start: usize) -> Option<LinkTail> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'(') {
        return None;
    }
    let mut pos = skip_whitespace(bytes, start + 1);
    if bytes.get(pos) == Some(&b')') {
        return Some(LinkTail {
            url: String::new(),
            title: None,
            end: pos + 1,
        });
    }

    let (dest, dest_end) = scan_destination(bytes, pos)?;
    pos = skip_whitespace(bytes, dest_end);
    let mut title = None;
    if pos > dest_end {
        if let Some((range, title_end)) = scan_title(bytes, pos) {
            title = Some(unescape(range.slice(text)).into_owned());
            pos = skip_whitespace(bytes, title_end);
        }
    }
    if bytes.get(pos) != Some(&b')') {
        return None;
    }
    Some(LinkTail {
        url: unescape(dest.slice(text)).into_owned(),
        title,
        end: pos + 1,
    })
}

/// A recognized autolink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autolink<'a> {
    /// Text between the angle brackets.
    pub content: &'a str,
    pub is_email: bool,
    /// Offset past the `>`.
    pub end: usize,
}

impl Autolink<'_> {
    /// Link target; email autolinks get a `mailto:` scheme.
    pub fn url(&self) -> String {
        if self.is_email {
            format!("mailto:{}", self.content)
        } else {
            self.content.to_string()
        }
    }
}

/// Try to parse an autolink at `start` (which must be `<`).
pub fn scan_autolink(text: &str, start: usize) -> Option<Autolink<'_>> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return None;
    }
    let content_start = start + 1;
    let len = bytes[content_start..]
        .iter()
        .take_while(|&&b| b != b'>' && b != b'<' && !b.is_ascii_whitespace() && !b.is_ascii_control())
        .count();
    let content_end = content_start + len;
    if bytes.get(content_end) != Some(&b'>') {
        return None;
    }
    let content = &text[content_start..content_end];
    let is_email = if is_uri_autolink(content.as_bytes()) {
        false
    } else if is_email_autolink(content.as_bytes()) {
        true
    } else {
        return None;
    };
    Some(Autolink {
        content,
        is_email,
        end: content_end + 1,
    })
}

/// Scheme of 2-32 characters (letter first, then letters, digits, `+`,
/// `-`, `.`), a colon, and the rest.
fn is_uri_autolink(content: &[u8]) -> bool {
    let Some(colon) = content.iter().position(|&b| b == b':') else {
        return false;
    };
    if !(2..=32).contains(&colon) || !content[0].is_ascii_alphabetic() {
        return false;
    }
    content[1..colon]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

fn is_email_autolink(content: &[u8]) -> bool {
    let Some(at) = content.iter().position(|&b| b == b'@') else {
        return false;
    };
    let (local, domain) = (&content[..at], &content[at + 1..]);
    let local_valid = !local.is_empty()
        && local.iter().all(|&b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+/=?^_`{|}~.-".contains(&b)
        });
    let domain_valid = !domain.is_empty()
        && domain.split(|&b| b == b'.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label[0] != b'-'
                && label[label.len() - 1] != b'-'
                && label.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-')
        });
    local_valid && domain_valid
}
