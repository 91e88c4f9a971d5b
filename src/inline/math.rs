//! Inline math.
//!
//! `$..$` and `$$..$$` follow the code span pattern: a run closes on the
//! next run of the same length and the content is taken literally. With
//! TeX delimiters enabled, `\(..\)` is accepted too.

/// Try to close a dollar math span opening at `start`.
///
/// Returns the content and the offset past the closing run.
pub fn scan_dollar_math(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let run = bytes[start..].iter().take_while(|&&b| b == b'$').count();
    if run == 0 || run > 2 {
        return None;
    }
    let content_start = start + run;
    let mut pos = content_start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() && bytes[pos + 1] == b'$' => pos += 2,
            b'$' => {
                let len = bytes[pos..].iter().take_while(|&&b| b == b'$').count();
                if len == run {
                    if pos == content_start {
                        return None;
                    }
                    return Some((text[content_start..pos].to_string(), pos + len));
                }
                pos += len;
            }
            _ => pos += 1,
        }
    }
    None
}

/// Try to close a `\(..\)` span opening at `start`.
pub fn scan_tex_math(text: &str, start: usize) -> Option<(String, usize)> {
    let content_start = start + 2;
    if text.get(start..content_start)? != "\\(" {
        return None;
    }
    let close = text[content_start..].find("\\)")?;
    let end = content_start + close;
    (close > 0).then(|| (text[content_start..end].to_string(), end + 2))
}
