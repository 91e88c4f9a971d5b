//! Code and math fences.

use crate::config::ScanConfig;
use crate::cursor::Cursor;

use super::line::{block_content, indent_columns, trim_end_ws};

/// Which fence syntax opened a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FenceKind {
    /// ```` ``` ````
    Backtick,
    /// `~~~`
    Tilde,
    /// `$$` display math.
    Dollar,
    /// `\[` ... `\]` display math.
    TexBracket,
}

impl FenceKind {
    /// Marker byte, as reported by the context model.
    pub fn marker(self) -> u8 {
        match self {
            FenceKind::Backtick => b'`',
            FenceKind::Tilde => b'~',
            FenceKind::Dollar => b'$',
            FenceKind::TexBracket => b'\\',
        }
    }

    /// Math fences produce [`crate::Node::Math`] instead of code.
    pub fn is_math(self) -> bool {
        matches!(self, FenceKind::Dollar | FenceKind::TexBracket)
    }
}

/// An open fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fence {
    pub kind: FenceKind,
    /// Length of the opening marker run.
    pub len: usize,
    /// Indentation of the opening line; stripped from content lines.
    pub indent: usize,
}

/// Result of recognizing an opening fence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceOpen<'a> {
    pub fence: Fence,
    /// Info string, trimmed. Empty when absent.
    pub info: &'a str,
}

impl Fence {
    /// Recognize an opening fence.
    pub fn open<'a>(line: &'a str, scan: &ScanConfig<'_>) -> Option<FenceOpen<'a>> {
        let content = block_content(line)?;
        let indent = indent_columns(line);
        let bytes = content.as_bytes();
        let first = *bytes.first()?;

        let kind = match first {
            b'`' => FenceKind::Backtick,
            b'~' => FenceKind::Tilde,
            b'$' if scan.math.enabled => FenceKind::Dollar,
            b'\\' if scan.math.tex => {
                return (trim_end_ws(content) == "\\[").then_some(FenceOpen {
                    fence: Fence {
                        kind: FenceKind::TexBracket,
                        len: 2,
                        indent,
                    },
                    info: "",
                });
            }
            _ => return None,
        };

        let mut cursor = Cursor::new(bytes);
        let len = cursor.skip_run(first);
        let min = if kind == FenceKind::Dollar { 2 } else { 3 };
        if len < min {
            return None;
        }
        let info = content[len..].trim_matches([' ', '\t']);
        match kind {
            FenceKind::Backtick if info.contains('`') => return None,
            // `$$x$$` on one line is inline math, not a fence
            FenceKind::Dollar if !info.is_empty() => return None,
            _ => {}
        }

        Some(FenceOpen {
            fence: Fence { kind, len, indent },
            info,
        })
    }

    /// Whether `line` closes this fence.
    pub fn closes(&self, line: &str) -> bool {
        let Some(content) = block_content(line) else {
            return false;
        };
        if self.kind == FenceKind::TexBracket {
            return trim_end_ws(content) == "\\]";
        }
        let marker = self.kind.marker();
        let mut cursor = Cursor::new(content.as_bytes());
        let len = cursor.skip_run(marker);
        len >= self.len && cursor.rest_is_blank()
    }

    /// Content of a line inside the fence: up to `indent` columns stripped.
    pub fn content<'a>(&self, line: &'a str) -> &'a str {
        super::line::strip_columns(line, self.indent)
    }
}
