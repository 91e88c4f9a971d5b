//! Leaf node builders shared by both engines.
//!
//! Engines decide which lines form a block; everything after that is
//! here, so identical line groups always become identical nodes.

use crate::config::ScanConfig;
use crate::escape::unescape;
use crate::inline::parse_inlines;
use crate::link_ref::parse_definition;
use crate::node::{Alignment, Node};

use super::line::{is_blank, strip_columns, trim_end_ws, trim_indent};
use super::table::split_row;

/// Join paragraph-like lines with their indentation removed.
fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(trim_indent(line));
    }
    let len = trim_end_ws(&out).len();
    out.truncate(len);
    out
}

/// Build the nodes of a paragraph: link reference definitions at its
/// start, then the paragraph itself if anything remains.
///
/// Each node comes with the number of lines it consumed.
pub fn paragraph_nodes(lines: &[&str], scan: &ScanConfig<'_>) -> Vec<(Node, usize)> {
    let text = join_lines(lines);
    let mut nodes = Vec::new();
    let mut rest = text.as_str();
    let mut lines_left = lines.len();

    while rest.starts_with('[') {
        let Some((def, used)) = parse_definition(rest) else {
            break;
        };
        let consumed = &rest[..used];
        let line_count = consumed.matches('\n').count() + usize::from(!consumed.ends_with('\n'));
        nodes.push((
            Node::Definition {
                identifier: def.identifier,
                label: def.label,
                url: def.url,
                title: def.title,
            },
            line_count,
        ));
        lines_left = lines_left.saturating_sub(line_count);
        rest = &rest[used..];
    }

    if !rest.is_empty() {
        nodes.push((
            Node::Paragraph {
                children: parse_inlines(rest, scan),
            },
            lines_left,
        ));
    }
    nodes
}

/// ATX heading from its already trimmed content.
pub fn heading(depth: u8, content: &str, scan: &ScanConfig<'_>) -> Node {
    Node::Heading {
        depth,
        children: parse_inlines(content.trim_matches([' ', '\t']), scan),
    }
}

/// Setext heading from the paragraph lines above the underline.
pub fn setext_heading(depth: u8, lines: &[&str], scan: &ScanConfig<'_>) -> Node {
    Node::Heading {
        depth,
        children: parse_inlines(&join_lines(lines), scan),
    }
}

/// Fenced code block; `info` splits into language and meta.
pub fn fenced_code(info: &str, lines: &[&str]) -> Node {
    let info = unescape(info);
    let info = info.trim();
    let (lang, meta) = match info.split_once([' ', '\t']) {
        Some((lang, meta)) => (lang, meta.trim()),
        None => (info, ""),
    };
    Node::Code {
        lang: (!lang.is_empty()).then(|| lang.to_string()),
        meta: (!meta.is_empty()).then(|| meta.to_string()),
        value: lines.join("\n"),
    }
}

/// Display math block.
pub fn math_block(lines: &[&str]) -> Node {
    Node::Math {
        value: lines.join("\n"),
    }
}

/// Indented code from lines still carrying their indentation.
/// Leading and trailing blank lines are dropped.
pub fn indented_code(lines: &[&str]) -> Node {
    let first = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let last = lines.iter().rposition(|l| !is_blank(l)).map_or(first, |i| i + 1);
    let value = lines[first..last.max(first)]
        .iter()
        .map(|line| strip_columns(line, 4))
        .collect::<Vec<_>>()
        .join("\n");
    Node::Code {
        lang: None,
        meta: None,
        value,
    }
}

/// Raw HTML block; trailing blank lines are dropped.
pub fn html_block(lines: &[&str]) -> Node {
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(0, |i| i + 1);
    Node::Html {
        value: lines[..end].join("\n"),
    }
}

/// GFM table; rows are padded or cut to the header's column count.
pub fn table(header: &str, align: Vec<Alignment>, rows: &[&str], scan: &ScanConfig<'_>) -> Node {
    let columns = align.len();
    let row = |line: &str| {
        let mut cells = split_row(trim_indent(line));
        cells.resize(columns, "".into());
        Node::TableRow {
            children: cells
                .iter()
                .map(|cell| Node::TableCell {
                    children: parse_inlines(cell, scan),
                })
                .collect(),
        }
    };
    let mut children = Vec::with_capacity(rows.len() + 1);
    children.push(row(header));
    children.extend(rows.iter().map(|line| row(line)));
    Node::Table { align, children }
}
