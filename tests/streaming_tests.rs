use pretty_assertions::assert_eq;
use streammark::{
    BlockStatus, Config, IdGenerator, Node, Parser, ParserState, StreamError, Tree, parse,
};

fn one_shot(text: &str, config: &Config) -> Tree {
    let mut parser = Parser::new(config.clone());
    parser.append(text).unwrap();
    parser.finalize().ast
}

fn chunked<'a>(chunks: impl IntoIterator<Item = &'a str>, config: &Config) -> Tree {
    let mut parser = Parser::new(config.clone());
    for chunk in chunks {
        parser.append(chunk).unwrap();
    }
    parser.finalize().ast
}

fn by_char(text: &str, config: &Config) -> Tree {
    let chars: Vec<String> = text.chars().map(String::from).collect();
    chunked(chars.iter().map(String::as_str), config)
}

fn by_line(text: &str, config: &Config) -> Tree {
    chunked(text.split_inclusive('\n'), config)
}

const DOCUMENT: &str = "# Streaming\n\nSome *emphasis* and `code`.\nSecond line.\n\n- one\n- two\n\n  still two\n- three\n\n> quoted\n> more\n\n```rust\nfn main() {}\n\n```\n\n| a | b |\n|---|:-:|\n| 1 | 2 |\n\n[^n]: a note\n    continued\n\nSee [^n] and [ref].\n\n[ref]: https://example.com\n";

#[test]
fn char_by_char_matches_one_shot() {
    let config = Config::gfm();
    let expected = one_shot(DOCUMENT, &config);
    assert_eq!(by_char(DOCUMENT, &config).strip_positions(), expected.strip_positions());
}

#[test]
fn line_by_line_matches_one_shot() {
    let config = Config::gfm();
    let expected = one_shot(DOCUMENT, &config);
    assert_eq!(by_line(DOCUMENT, &config).strip_positions(), expected.strip_positions());
}

#[test]
fn fixed_chunks_match_one_shot() {
    let config = Config::gfm();
    let expected = parse(DOCUMENT, &config);
    for size in [2, 5, 7, 13, 50] {
        let pieces: Vec<&str> = DOCUMENT
            .as_bytes()
            .chunks(size)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect();
        let tree = chunked(pieces, &config);
        assert!(tree.same_structure(&expected), "chunk size {size}");
    }
}

#[test]
fn list_with_blank_line_is_one_list() {
    let text = "- a\n\n- b";
    let config = Config::default();
    let tree = one_shot(text, &config);
    assert_eq!(tree.len(), 1);
    let Node::List { children, spread, .. } = &tree.children[0].node else {
        panic!("expected list, got {tree}");
    };
    assert_eq!(children.len(), 2);
    assert!(*spread);
    assert_eq!(by_char(text, &config).strip_positions(), tree.strip_positions());
}

#[test]
fn footnote_continuation_one_shot_and_by_line() {
    let text = "[^1]: line one\n    line two\n\nplain";
    let config = Config::gfm();
    for tree in [one_shot(text, &config), by_line(text, &config)] {
        assert_eq!(tree.len(), 2, "tree:\n{tree}");
        let Node::FootnoteDefinition { identifier, children, .. } = &tree.children[0].node else {
            panic!("expected footnote definition, got {tree}");
        };
        assert_eq!(identifier, "1");
        assert_eq!(children[0].plain_text(), "line one\nline two");
        assert!(matches!(&tree.children[1].node, Node::Paragraph { .. }));
        assert_eq!(tree.children[1].node.plain_text(), "plain");
    }
}

#[test]
fn completion_is_monotonic() {
    let mut parser = Parser::new(Config::gfm());
    let mut seen = Vec::new();
    for piece in DOCUMENT.split_inclusive(' ') {
        let update = parser.append(piece).unwrap();
        let completed = parser.get_completed_blocks();
        assert!(completed.len() >= seen.len());
        assert_eq!(&completed[..seen.len()], &seen[..]);
        assert!(update.completed.iter().all(|b| b.status == BlockStatus::Completed));
        assert!(update.pending.iter().all(|b| b.status == BlockStatus::Pending));
        seen = completed.to_vec();
    }
}

#[test]
fn completed_blocks_have_buffer_offsets() {
    let mut parser = Parser::new(Config::default());
    parser.append("# a\n\nfirst\n\nsecond").unwrap();
    parser.finalize();
    let buffer = parser.get_buffer().to_string();
    for block in parser.get_completed_blocks() {
        assert_eq!(&buffer[block.start_offset..block.end_offset], block.raw_text);
        assert!(!block.raw_text.trim().is_empty());
    }
}

#[test]
fn update_reports_changed_pending_blocks() {
    let mut parser = Parser::new(Config::default());
    parser.append("hel").unwrap();
    let update = parser.append("lo").unwrap();
    assert_eq!(update.updated.len(), 1);
    assert_eq!(update.updated[0].node.plain_text(), "hello");

    // nothing changed
    let update = parser.append("").unwrap();
    assert!(update.updated.is_empty());
    assert_eq!(update.pending.len(), 1);
}

#[test]
fn finalize_is_idempotent() {
    let mut parser = Parser::new(Config::gfm());
    parser.append("text [^a]\n\n[^a]: note").unwrap();
    let first = parser.finalize();
    let second = parser.finalize();
    assert_eq!(first, second);
    assert_eq!(parser.state(), ParserState::Finalized);
}

#[test]
fn append_after_finalize_is_rejected() {
    let mut parser = Parser::new(Config::default());
    parser.append("a").unwrap();
    parser.finalize();
    assert_eq!(parser.append("b"), Err(StreamError::AlreadyFinalized));
    assert_eq!(parser.get_buffer(), "a");
}

#[test]
fn abort_keeps_pending_blocks() {
    let mut parser = Parser::new(Config::default());
    parser.append("# done\n\nhalf a sente").unwrap();
    let update = parser.abort();
    assert_eq!(parser.state(), ParserState::Finalized);
    assert!(update.pending.is_empty());
    assert_eq!(parser.get_completed_blocks().len(), 2);
    assert_eq!(update.ast.children[1].node.plain_text(), "half a sente");
    assert!(parser.append("nce").is_err());
    assert_eq!(parser.finalize(), update);
}

#[test]
fn reset_clears_all_state() {
    let mut parser = Parser::new(Config::gfm());
    parser.append("[d]: /x\n\n[^f]: note\n\ntext [^f]\n").unwrap();
    parser.finalize();
    parser.reset();
    assert!(parser.get_completed_blocks().is_empty());
    assert!(parser.get_pending_blocks().is_empty());
    assert_eq!(parser.get_buffer(), "");
    assert!(parser.definitions().is_empty());
    assert!(parser.footnotes().is_empty());
    assert!(parser.footnote_reference_order().is_empty());
    assert_eq!(parser.state(), ParserState::Idle);
    assert_eq!(parser.stable_offset(), 0);

    parser.append("again").unwrap();
    assert_eq!(parser.finalize().ast.len(), 1);
}

#[test]
fn render_replaces_previous_document() {
    let mut parser = Parser::new(Config::default());
    parser.render("# one\n").unwrap();
    let update = parser.render("two\n\nthree").unwrap();
    assert_eq!(update.ast.len(), 2);
    assert_eq!(parser.get_buffer(), "two\n\nthree");
}

#[test]
fn ids_are_namespaced_per_instance() {
    let mut a = Parser::new(Config::default()).with_ids(IdGenerator::new(1));
    let mut b = Parser::new(Config::default()).with_ids(IdGenerator::new(2));
    let a_blocks = a.render("x\n\ny").unwrap().completed;
    let b_blocks = b.render("x\n\ny").unwrap().completed;
    for (left, right) in a_blocks.iter().zip(&b_blocks) {
        assert_ne!(left.id, right.id);
        assert_eq!(left.start_offset, right.start_offset);
    }
    assert_eq!(a_blocks[1].id.to_string(), "1-3");
}

#[test]
fn default_parsers_do_not_share_ids() {
    let mut a = Parser::new(Config::default());
    let mut b = Parser::new(Config::default());
    let a_id = a.render("x\n").unwrap().completed[0].id.clone();
    let b_id = b.render("x\n").unwrap().completed[0].id.clone();
    assert_eq!(a_id.offset, b_id.offset);
    assert_ne!(a_id, b_id);
}

#[test]
fn crlf_input_streams_like_lf() {
    let config = Config::default();
    let lf = one_shot("# a\n\nb\nc\n", &config);
    let crlf = by_char("# a\r\n\r\nb\r\nc\r\n", &config);
    assert!(crlf.same_structure(&lf), "crlf:\n{crlf}\nlf:\n{lf}");
}

#[test]
fn unicode_chunks_split_on_char_boundaries() {
    let text = "# Überschrift\n\nnaïve café 🎉 text\n";
    let config = Config::default();
    assert!(by_char(text, &config).same_structure(&one_shot(text, &config)));
}

/// Char-by-char and line-by-line streams of `text` must build the one-shot
/// tree under `config`.
fn assert_streams(text: &str, config: &Config) {
    let expected = one_shot(text, config).strip_positions();
    assert_eq!(by_char(text, config).strip_positions(), expected, "by char: {text:?}");
    assert_eq!(by_line(text, config).strip_positions(), expected, "by line: {text:?}");
}

#[test]
fn setext_headings_stream() {
    let config = Config::default();
    assert_streams("Title\n===\n\nSub\ntitle\n---\nafter\n", &config);
    assert_streams("- item\n---\n", &config);
    assert_streams("para\n\n---\n", &config);
}

#[test]
fn html_blocks_stream() {
    let config = Config::default();
    assert_streams("<!-- a\n\n# b\n-->\n\ntext\n", &config);
    assert_streams("<div>\n*raw*\n\nafter\n", &config);
    assert_streams("<pre>\ncode\n\nstill\n</pre>\nafter\n", &config);
    assert_streams("<custom-tag>\nx\n\n<?php echo 1; ?>\n", &config);
    assert_streams("para\n<div>\nmore\n", &config);
}

#[test]
fn fences_stream() {
    let config = Config::full();
    assert_streams("~~~ rust\n```\n\n~~~\nafter\n", &config);
    assert_streams("$$\nx^2\n\n$$\n\ntext\n", &config);
    assert_streams("\\[\ny\n\\]\nafter\n", &config);
    assert_streams("````\nunclosed\n\n# still code\n", &config);
}

#[test]
fn containers_stream() {
    let config = Config::full();
    assert_streams(":::note title\n# h\n\ntext\n:::\n\nafter\n", &config);
    assert_streams("::::outer\n:::inner\nx\n:::\n\n::::\ntail\n", &config);
    assert_streams(":::open\n\nnever closed\n", &config);
}

#[test]
fn html_tree_regions_stream() {
    let config = Config::full();
    assert_streams("<div class=\"box\">\n\n# Inside\n\n- item\n\n</div>\n\nafter\n", &config);
    assert_streams("<section>\n<div>\ninner\n</div>\n</section>\n", &config);
    assert_streams("<details>\n\nno close\n", &config);
}

#[test]
fn footnotes_stream() {
    let config = Config::gfm();
    assert_streams("[^1]: one\n    two\n\n    para\n\nafter [^1]\n", &config);
    assert_streams("[^a]: a\n[^b]: b\n    more\nplain\n", &config);
}

#[test]
fn tables_and_quotes_stream() {
    let config = Config::gfm();
    assert_streams("intro\n| a | b |\n|---|:-:|\n| 1 | 2 |\n\nafter\n", &config);
    assert_streams("> a\n> > b\n>\n> c\nd\n", &config);
    assert_streams("- a\n  - b\n\n    code?\n- c\n\nend\n", &config);
}
