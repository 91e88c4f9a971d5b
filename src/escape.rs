//! Escaping in both directions.
//!
//! Parsing needs backslash-escape and entity *decoding* for text, link
//! destinations, titles and labels. Rendering needs HTML escaping and URL
//! percent-encoding. Escapers scan for the first escapable byte and copy
//! the segments in between in bulk.

use std::borrow::Cow;

use memchr::memchr2;

/// Lookup table for bytes escaped in HTML text content.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Lookup table for bytes escaped in attribute values.
const ATTR_ESCAPE_TABLE: [bool; 256] = {
    let mut table = TEXT_ESCAPE_TABLE;
    table[b'\'' as usize] = true;
    table
};

/// Bytes left untouched by [`url_encode_into`]: unreserved and reserved URL
/// characters plus `%` (already-encoded sequences pass through).
const URL_SAFE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut b = b'0';
    while b <= b'9' {
        table[b as usize] = true;
        b += 1;
    }
    b = b'A';
    while b <= b'Z' {
        table[b as usize] = true;
        table[(b + 32) as usize] = true;
        b += 1;
    }
    let extra = b"-_.~!*'();:@&=+$,/?#[]%";
    let mut i = 0;
    while i < extra.len() {
        table[extra[i] as usize] = true;
        i += 1;
    }
    table
};

/// Check if a byte is ASCII punctuation (backslash-escapable).
#[inline]
pub fn is_ascii_punctuation(b: u8) -> bool {
    b.is_ascii_punctuation()
}

/// Escape HTML text content into the output buffer.
///
/// # Example
/// ```
/// use streammark::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"<script>");
/// assert_eq!(out, b"&lt;script&gt;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    escape_into_with_table(out, input, &TEXT_ESCAPE_TABLE)
}

/// Escape an HTML attribute value into the output buffer.
#[inline]
pub fn escape_attr_into(out: &mut Vec<u8>, input: &[u8]) {
    escape_into_with_table(out, input, &ATTR_ESCAPE_TABLE)
}

#[inline]
fn escape_into_with_table(out: &mut Vec<u8>, input: &[u8], table: &[bool; 256]) {
    let mut last = 0;
    for (i, &b) in input.iter().enumerate() {
        if !table[b as usize] {
            continue;
        }
        out.extend_from_slice(&input[last..i]);
        out.extend_from_slice(match b {
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'&' => b"&amp;",
            b'"' => b"&quot;",
            _ => b"&#39;",
        });
        last = i + 1;
    }
    out.extend_from_slice(&input[last..]);
}

/// Percent-encode a decoded URL for use in `href`/`src`, then HTML-escape
/// the characters that remain significant inside an attribute.
pub fn url_encode_into(out: &mut Vec<u8>, url: &str) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in url.as_bytes() {
        if URL_SAFE_TABLE[b as usize] {
            match b {
                b'&' => out.extend_from_slice(b"&amp;"),
                b'\'' => out.extend_from_slice(b"&#39;"),
                _ => out.push(b),
            }
        } else {
            out.push(b'%');
            out.push(HEX[(b >> 4) as usize]);
            out.push(HEX[(b & 0x0f) as usize]);
        }
    }
}

/// Resolve backslash escapes and entity references.
///
/// Escaped characters are protected from entity decoding, so `\&amp;`
/// stays `&amp;` literally.
///
/// # Example
/// ```
/// use streammark::escape::unescape;
///
/// assert_eq!(unescape(r"a\*b &amp; c"), "a*b & c");
/// assert_eq!(unescape(r"\&amp;"), "&amp;");
/// ```
pub fn unescape(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if memchr2(b'\\', b'&', bytes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut segment_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) {
            out.push_str(&html_escape::decode_html_entities(&input[segment_start..i]));
            out.push(bytes[i + 1] as char);
            i += 2;
            segment_start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&html_escape::decode_html_entities(&input[segment_start..]));
    Cow::Owned(out)
}

/// Decode entity references only (backslashes are literal, as in code).
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        let mut out = Vec::new();
        escape_text_into(&mut out, input.as_bytes());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(text("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert_eq!(text("plain"), "plain");
        assert_eq!(text(""), "");
    }

    #[test]
    fn test_escape_attr_single_quote() {
        let mut out = Vec::new();
        escape_attr_into(&mut out, b"it's");
        assert_eq!(out, b"it&#39;s");
    }

    #[test]
    fn test_url_encode() {
        let mut out = Vec::new();
        url_encode_into(&mut out, "https://x.y/a b?q=1&r=ä");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://x.y/a%20b?q=1&amp;r=%C3%A4"
        );
    }

    #[test]
    fn test_unescape_borrowed_fast_path() {
        assert!(matches!(unescape("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_escapes_and_entities() {
        assert_eq!(unescape(r"\[x\]"), "[x]");
        assert_eq!(unescape("&copy; 2024"), "\u{a9} 2024");
        assert_eq!(unescape(r"back\slash"), r"back\slash");
        assert_eq!(unescape(r"\\&lt;"), r"\<");
    }
}
