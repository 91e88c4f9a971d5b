//! Container node assembly shared by both engines.
//!
//! Engines decide which lines belong to which block. Turning a finished
//! group of children into a list, item, footnote or region node happens
//! here, along with the spread rule, so both engines agree on it.

use crate::Range;
use crate::config::ScanConfig;
use crate::footnote::normalize_footnote_label;
use crate::node::{Node, Tree};

use super::leaf::paragraph_nodes;
use super::line::{Line, is_blank};
use super::list::{ListMarker, task_marker};
use super::region::RegionOpen;

/// A finished block with the lines it covers at its parent's level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub node: Node,
    pub first_line: usize,
    /// Last non-blank line of the block.
    pub last_line: usize,
}

impl Built {
    pub fn new(node: Node, first_line: usize, last_line: usize) -> Self {
        Self {
            node,
            first_line,
            last_line,
        }
    }
}

/// Definitions and paragraph from consecutive paragraph lines starting at
/// `first_line`.
pub fn paragraph_blocks(lines: &[&str], first_line: usize, scan: &ScanConfig<'_>) -> Vec<Built> {
    let mut line = first_line;
    paragraph_nodes(lines, scan)
        .into_iter()
        .map(|(node, count)| {
            let built = Built::new(node, line, line + count.max(1) - 1);
            line += count;
            built
        })
        .collect()
}

/// Whether any two neighbours are separated by a blank line.
pub fn has_gap(blocks: &[Built]) -> bool {
    blocks.windows(2).any(|w| w[1].first_line > w[0].last_line + 1)
}

fn nodes(blocks: Vec<Built>) -> Vec<Node> {
    blocks.into_iter().map(|b| b.node).collect()
}

/// Task state and first-line content of a list item.
pub fn item_content<'a>(marker: &ListMarker<'a>, gfm: bool) -> (Option<bool>, &'a str) {
    if gfm {
        if let Some((checked, rest)) = task_marker(marker.content) {
            if !is_blank(rest) {
                return (Some(checked), rest);
            }
        }
    }
    (None, marker.content)
}

pub fn list_item(checked: Option<bool>, children: Vec<Built>) -> Node {
    Node::ListItem {
        checked,
        spread: has_gap(&children),
        children: nodes(children),
    }
}

/// List from its items; loose when items are apart or any item is.
pub fn list(ordered: bool, start: u32, items: Vec<Built>) -> Node {
    let spread = has_gap(&items)
        || items
            .iter()
            .any(|item| matches!(item.node, Node::ListItem { spread: true, .. }));
    Node::List {
        ordered,
        start: ordered.then_some(start),
        spread,
        children: nodes(items),
    }
}

pub fn blockquote(children: Vec<Built>) -> Node {
    Node::BlockQuote {
        children: nodes(children),
    }
}

pub fn footnote_definition(label: &str, children: Vec<Built>) -> Node {
    Node::FootnoteDefinition {
        identifier: normalize_footnote_label(label),
        label: label.to_string(),
        children: nodes(children),
    }
}

pub fn region(open: &RegionOpen<'_>, children: Vec<Built>) -> Node {
    match open {
        RegionOpen::Container { name, attributes, .. } => Node::Container {
            name: name.to_string(),
            attributes: attributes.to_string(),
            children: nodes(children),
        },
        RegionOpen::Element(element) => Node::HtmlElement {
            tag: element.tag.to_ascii_lowercase(),
            attributes: element.attributes.to_string(),
            children: nodes(children),
        },
    }
}

/// Top-level blocks with spans from their first line's start to their
/// last line's end.
pub fn into_tree(blocks: Vec<Built>, lines: &[Line<'_>]) -> Tree {
    let mut tree = Tree::new();
    for block in blocks {
        let start = lines.get(block.first_line).map_or(0, |l| l.start);
        let end = lines.get(block.last_line).map_or(start, Line::end);
        tree.push(block.node, Range::from_usize(start, end.max(start)));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::list::list_marker;

    fn para(first: usize, last: usize) -> Built {
        Built::new(Node::ThematicBreak, first, last)
    }

    #[test]
    fn test_gap_detection() {
        assert!(!has_gap(&[para(0, 0), para(1, 2)]));
        assert!(has_gap(&[para(0, 0), para(2, 2)]));
        assert!(!has_gap(&[para(0, 3)]));
    }

    #[test]
    fn test_list_spread_from_items() {
        let tight = Built::new(list_item(None, vec![para(0, 0)]), 0, 0);
        let loose = Built::new(list_item(None, vec![para(1, 1), para(3, 3)]), 1, 3);
        assert!(matches!(list(false, 0, vec![tight.clone()]), Node::List { spread: false, .. }));
        assert!(matches!(list(false, 0, vec![tight, loose]), Node::List { spread: true, .. }));
    }

    #[test]
    fn test_ordered_start() {
        assert!(matches!(list(true, 3, vec![]), Node::List { start: Some(3), .. }));
        assert!(matches!(list(false, 3, vec![]), Node::List { start: None, .. }));
    }

    #[test]
    fn test_task_item_content() {
        let marker = list_marker("- [x] done").unwrap();
        assert_eq!(item_content(&marker, true), (Some(true), "done"));
        assert_eq!(item_content(&marker, false), (None, "[x] done"));
        let marker = list_marker("- [ ]").unwrap();
        assert_eq!(item_content(&marker, true), (None, "[ ]"));
    }

    #[test]
    fn test_into_tree_spans() {
        let text = "a\n\nb\nc\n";
        let lines = crate::syntax::line::document_lines(text);
        let tree = into_tree(vec![para(0, 0), para(2, 3)], &lines);
        assert_eq!(tree.children[0].span, Range::new(0, 1));
        assert_eq!(tree.children[1].span.slice(text), "b\nc");
    }
}
