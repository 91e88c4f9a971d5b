//! Code spans.
//!
//! A backtick run opens a span closed by the next run of exactly the same
//! length. Content is taken literally: line endings become spaces and one
//! space is stripped from each side when both sides have one.

use crate::limits::MAX_CODE_SPAN_BACKTICKS;

/// Length of the backtick run at `start`.
#[inline]
pub fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

/// Try to close a code span whose opening run starts at `start`.
///
/// Returns the normalized content and the offset past the closing run.
pub fn scan_code_span(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let run = backtick_run(bytes, start);
    if run == 0 || run > MAX_CODE_SPAN_BACKTICKS {
        return None;
    }
    let content_start = start + run;
    let mut pos = content_start;
    while let Some(offset) = memchr::memchr(b'`', &bytes[pos..]) {
        let closer = pos + offset;
        let len = backtick_run(bytes, closer);
        if len == run {
            let content = normalize(&text[content_start..closer]);
            return Some((content, closer + len));
        }
        pos = closer + len;
    }
    None
}

fn normalize(raw: &str) -> String {
    let mut content = raw.replace('\n', " ");
    let bytes = content.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == b' '
        && bytes[bytes.len() - 1] == b' '
        && bytes.iter().any(|&b| b != b' ')
    {
        content = content[1..content.len() - 1].to_string();
    }
    content
}
