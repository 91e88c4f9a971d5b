//! DoS prevention constants.
//!
//! These limits keep pathological streams (deep nesting, giant marker
//! runs) from causing quadratic or worse time while appending.

/// Maximum nesting depth for block containers (lists, blockquotes, regions)
pub const MAX_BLOCK_NESTING: usize = 32;

/// Maximum nesting depth for inline elements (emphasis, links)
pub const MAX_INLINE_NESTING: usize = 32;

/// Maximum open custom containers or HTML elements tracked per region
pub const MAX_REGION_DEPTH: usize = 16;

/// Maximum backtick run length for code spans
/// Longer runs are treated as literal text
pub const MAX_CODE_SPAN_BACKTICKS: usize = 32;

/// Maximum parentheses nesting in link destinations (CommonMark: 32)
pub const MAX_LINK_PAREN_DEPTH: usize = 32;

/// Maximum characters inside a link label (CommonMark: 999)
pub const MAX_LINK_LABEL_LEN: usize = 999;

/// Maximum digits in ordered list marker (prevents big-integer parsing)
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum table columns
pub const MAX_TABLE_COLUMNS: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_reasonable() {
        const { assert!(MAX_BLOCK_NESTING >= 16) };
        const { assert!(MAX_BLOCK_NESTING <= 64) };
        const { assert!(MAX_INLINE_NESTING >= 16) };
        const { assert!(MAX_REGION_DEPTH <= MAX_BLOCK_NESTING) };
        const { assert!(MAX_LINK_LABEL_LEN == 999) };
    }
}
