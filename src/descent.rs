//! Conservative engine.
//!
//! Recursive descent over line groups: each container first collects all
//! of its lines, then parses them as a document of their own. Slower than
//! [`FastEngine`](crate::block::FastEngine) since nested lines are copied
//! once per level, but every container is parsed in isolation.

use crate::config::{Config, ScanConfig};
use crate::engine::Engine;
use crate::limits::MAX_BLOCK_NESTING;
use crate::node::{Node, Tree};
use crate::syntax::build::{
    Built, blockquote, footnote_definition, into_tree, item_content, list, list_item, paragraph_blocks, region,
};
use crate::syntax::fence::FenceOpen;
use crate::syntax::html::HtmlBlockKind;
use crate::syntax::leaf;
use crate::syntax::line::{document_lines, indent_columns, is_blank, strip_columns};
use crate::syntax::list::ListMarker;
use crate::syntax::region::{RegionOpen, RegionTracker};
use crate::syntax::scan::{
    BlockStart, ParagraphLine, block_start, continues_table, header_cells, paragraph_line, quote_content,
};

/// Engine that parses each container's lines separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativeEngine;

impl Engine for ConservativeEngine {
    fn name(&self) -> &'static str {
        "conservative"
    }

    fn build(&self, text: &str, config: &Config) -> Tree {
        let scan = config.scan_config();
        let lines = document_lines(text);
        let texts: Vec<&str> = lines.iter().map(|l| l.text).collect();
        let blocks = Descent { scan: &scan }.blocks(&texts, 0, 0);
        into_tree(blocks, &lines)
    }
}

/// Index of the last non-blank line in `from..to`, or `from`.
fn last_non_blank(lines: &[&str], from: usize, to: usize) -> usize {
    (from..to).rev().find(|&k| !is_blank(lines[k])).unwrap_or(from)
}

struct Descent<'c, 's> {
    scan: &'c ScanConfig<'s>,
}

impl Descent<'_, '_> {
    /// Blocks of `lines`, whose first line is document line `base`.
    fn blocks(&self, lines: &[&str], base: usize, depth: usize) -> Vec<Built> {
        let containers = depth < MAX_BLOCK_NESTING;
        let mut out = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) {
                i += 1;
                continue;
            }
            if indent_columns(line) >= 4 {
                i = self.indented_code(lines, i, base, &mut out);
                continue;
            }
            i = match block_start(line, self.scan, containers) {
                None => self.paragraph(lines, i, base, containers, &mut out),
                Some(BlockStart::Fence(open)) => self.fence(lines, i, base, &open, &mut out),
                Some(BlockStart::Region(open)) => self.region(lines, i, base, depth, &open, &mut out),
                Some(BlockStart::ThematicBreak) => {
                    out.push(Built::new(Node::ThematicBreak, base + i, base + i));
                    i + 1
                }
                Some(BlockStart::Heading(heading)) => {
                    let node = leaf::heading(heading.depth, heading.content, self.scan);
                    out.push(Built::new(node, base + i, base + i));
                    i + 1
                }
                Some(BlockStart::Quote(content)) => self.quote(lines, i, base, depth, content, &mut out),
                Some(BlockStart::Html(kind)) => self.html(lines, i, base, kind, &mut out),
                Some(BlockStart::Footnote(start)) => {
                    let mut inner = vec![start.content];
                    let mut j = i + 1;
                    while j < lines.len() && (is_blank(lines[j]) || indent_columns(lines[j]) >= 4) {
                        inner.push(strip_columns(lines[j], 4));
                        j += 1;
                    }
                    let children = self.blocks(&inner, base + i, depth + 1);
                    let last = last_non_blank(lines, i, j);
                    out.push(Built::new(
                        footnote_definition(start.label, children),
                        base + i,
                        base + last,
                    ));
                    j
                }
                Some(BlockStart::ListItem(marker)) => {
                    self.list(lines, i, base, depth, containers, marker, &mut out)
                }
            };
        }
        out
    }

    fn indented_code(&self, lines: &[&str], i: usize, base: usize, out: &mut Vec<Built>) -> usize {
        let mut j = i + 1;
        while j < lines.len() && (is_blank(lines[j]) || indent_columns(lines[j]) >= 4) {
            j += 1;
        }
        let last = last_non_blank(lines, i, j);
        out.push(Built::new(leaf::indented_code(&lines[i..j]), base + i, base + last));
        j
    }

    fn fence(&self, lines: &[&str], i: usize, base: usize, open: &FenceOpen<'_>, out: &mut Vec<Built>) -> usize {
        let mut content = Vec::new();
        let mut last = i;
        let mut j = i + 1;
        while j < lines.len() {
            let line = lines[j];
            j += 1;
            if open.fence.closes(line) {
                last = j - 1;
                break;
            }
            content.push(open.fence.content(line));
            if !is_blank(line) {
                last = j - 1;
            }
        }
        let node = if open.fence.kind.is_math() {
            leaf::math_block(&content)
        } else {
            leaf::fenced_code(open.info, &content)
        };
        out.push(Built::new(node, base + i, base + last));
        j
    }

    fn region(
        &self,
        lines: &[&str],
        i: usize,
        base: usize,
        depth: usize,
        open: &RegionOpen<'_>,
        out: &mut Vec<Built>,
    ) -> usize {
        let mut tracker = RegionTracker::new(open.kind());
        let mut inner_end = lines.len();
        let mut j = i + 1;
        while j < lines.len() {
            let closed = tracker.feed(lines[j], self.scan);
            j += 1;
            if closed {
                inner_end = j - 1;
                break;
            }
        }
        let children = self.blocks(&lines[i + 1..inner_end], base + i + 1, depth + 1);
        let last = last_non_blank(lines, i, j);
        out.push(Built::new(region(open, children), base + i, base + last));
        j
    }

    fn quote(
        &self,
        lines: &[&str],
        i: usize,
        base: usize,
        depth: usize,
        content: &str,
        out: &mut Vec<Built>,
    ) -> usize {
        let mut inner = vec![content];
        let mut j = i + 1;
        while j < lines.len() {
            match quote_content(lines[j]) {
                Some(content) => inner.push(content),
                None => break,
            }
            j += 1;
        }
        let children = self.blocks(&inner, base + i, depth + 1);
        out.push(Built::new(blockquote(children), base + i, base + j - 1));
        j
    }

    fn html(&self, lines: &[&str], i: usize, base: usize, kind: HtmlBlockKind, out: &mut Vec<Built>) -> usize {
        let mut j = i + 1;
        if kind.ends_at_blank() {
            while j < lines.len() && !is_blank(lines[j]) {
                j += 1;
            }
        } else if !kind.ends_on(lines[i]) {
            while j < lines.len() {
                j += 1;
                if kind.ends_on(lines[j - 1]) {
                    break;
                }
            }
        }
        let last = last_non_blank(lines, i, j);
        out.push(Built::new(leaf::html_block(&lines[i..j]), base + i, base + last));
        j
    }

    #[allow(clippy::too_many_arguments)]
    fn list(
        &self,
        lines: &[&str],
        i: usize,
        base: usize,
        depth: usize,
        containers: bool,
        first: ListMarker<'_>,
        out: &mut Vec<Built>,
    ) -> usize {
        let (delimiter, ordered, start) = (first.delimiter, first.ordered, first.start);
        let mut items = Vec::new();
        let mut marker = first;
        let mut item_start = i;
        loop {
            let (checked, content) = item_content(&marker, self.scan.gfm);
            let indent = marker.content_indent;
            let mut inner = vec![content];
            let mut j = item_start + 1;
            while j < lines.len() && (is_blank(lines[j]) || indent_columns(lines[j]) >= indent) {
                inner.push(strip_columns(lines[j], indent));
                j += 1;
            }
            let children = self.blocks(&inner, base + item_start, depth + 1);
            let last = last_non_blank(lines, item_start, j);
            items.push(Built::new(list_item(checked, children), base + item_start, base + last));

            if j < lines.len() {
                if let Some(BlockStart::ListItem(next)) = block_start(lines[j], self.scan, containers) {
                    if next.same_list(delimiter, ordered) {
                        marker = next;
                        item_start = j;
                        continue;
                    }
                }
            }
            let last = items.last().map_or(base + i, |item| item.last_line);
            out.push(Built::new(list(ordered, start, items), base + i, last));
            return j;
        }
    }

    /// Paragraph lines and whatever they turn into: definitions, a setext
    /// heading or a table.
    fn paragraph(&self, lines: &[&str], i: usize, base: usize, containers: bool, out: &mut Vec<Built>) -> usize {
        let mut para = vec![lines[i]];
        let mut cells = header_cells(lines[i]);
        let mut j = i + 1;
        while j < lines.len() {
            match paragraph_line(cells, lines[j], self.scan, containers) {
                ParagraphLine::Continue => {
                    para.push(lines[j]);
                    cells = header_cells(lines[j]);
                    j += 1;
                }
                ParagraphLine::Blank => {
                    out.extend(paragraph_blocks(&para, base + i, self.scan));
                    return j + 1;
                }
                ParagraphLine::Interrupt => break,
                ParagraphLine::Setext(depth) => {
                    let node = leaf::setext_heading(depth, &para, self.scan);
                    out.push(Built::new(node, base + i, base + j));
                    return j + 1;
                }
                ParagraphLine::TableStart(align) => {
                    let Some(header) = para.pop() else {
                        break;
                    };
                    if !para.is_empty() {
                        out.extend(paragraph_blocks(&para, base + i, self.scan));
                    }
                    let mut k = j + 1;
                    while k < lines.len() && continues_table(lines[k], self.scan, containers) {
                        k += 1;
                    }
                    let node = leaf::table(header, align, &lines[j + 1..k], self.scan);
                    out.push(Built::new(node, base + j - 1, base + k - 1));
                    return k;
                }
            }
        }
        out.extend(paragraph_blocks(&para, base + i, self.scan));
        j
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::FastEngine;
    use pretty_assertions::assert_eq;

    fn both(text: &str, config: &Config) -> Tree {
        let fast = FastEngine.build(text, config);
        let conservative = ConservativeEngine.build(text, config);
        assert_eq!(conservative, fast, "engines disagree on {text:?}");
        conservative
    }

    #[test]
    fn test_nested_list_in_quote() {
        let tree = both("> - a\n>   - b\n> - c\n", &Config::default());
        let Node::BlockQuote { children } = &tree.children[0].node else {
            panic!("expected quote");
        };
        assert!(matches!(&children[0], Node::List { children, .. } if children.len() == 2));
    }

    #[test]
    fn test_unclosed_fence_in_item() {
        both("- ```\n  code\n\n\nafter\n", &Config::default());
    }

    #[test]
    fn test_table_after_paragraph() {
        let tree = both("intro\n| a | b |\n|---|:-:|\n| 1 | 2 |\ntail\n\nnext", &Config::gfm());
        assert_eq!(tree.children.len(), 3);
        assert!(matches!(tree.children[1].node, Node::Table { .. }));
    }

    #[test]
    fn test_footnote_and_definition() {
        let tree = both(
            "[^n]: note\n\n    more\n[a]: /url\ntext [^n]\n",
            &Config::gfm(),
        );
        assert!(matches!(tree.children[0].node, Node::FootnoteDefinition { .. }));
        assert!(matches!(tree.children[1].node, Node::Definition { .. }));
        assert!(matches!(tree.children[2].node, Node::Paragraph { .. }));
    }

    #[test]
    fn test_regions() {
        let config = Config::full();
        let tree = both(":::note\n<div>\n*x*\n</div>\n:::\n", &config);
        let Node::Container { children, .. } = &tree.children[0].node else {
            panic!("expected container: {:?}", tree.children[0].node);
        };
        assert!(matches!(&children[0], Node::HtmlElement { tag, .. } if tag == "div"));
    }

    #[test]
    fn test_html_comment_spans_lines() {
        let tree = both("<!--\n\nx\n-->\npara", &Config::default());
        assert_eq!(tree.children.len(), 2);
        assert_eq!(
            tree.children[0].node,
            Node::Html {
                value: "<!--\n\nx\n-->".into()
            }
        );
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let text = format!("{} x\n", "> ".repeat(MAX_BLOCK_NESTING * 2));
        both(&text, &Config::default());
    }
}
