use streammark::{Config, Node, Parser, Tree, to_html_with};

fn finalize_chunked(text: &str, chunk: usize) -> Parser {
    let mut parser = Parser::new(Config::gfm());
    let bytes = text.as_bytes();
    for piece in bytes.chunks(chunk) {
        parser.append(std::str::from_utf8(piece).unwrap()).unwrap();
    }
    parser.finalize();
    parser
}

fn links(tree: &Tree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    tree.walk(&mut |node| {
        if let Node::Link { url, children, .. } = node {
            let text = children.iter().map(Node::plain_text).collect();
            out.push((url.clone(), text));
        }
    });
    out
}

#[test]
fn reference_before_and_after_definition() {
    let forward = finalize_chunked("ref [text][id]\n\n[id]: https://x", 1);
    let backward = finalize_chunked("[id]: https://x\n\nref [text][id]", 1);
    let expected = vec![("https://x".to_string(), "text".to_string())];
    assert_eq!(links(&forward.resolved_ast()), expected);
    assert_eq!(links(&backward.resolved_ast()), expected);
}

#[test]
fn unresolved_reference_stays_a_reference_until_read() {
    let mut parser = Parser::new(Config::default());
    parser.append("see [docs]\n\nmore\n").unwrap();
    let mut found = false;
    parser.get_ast().walk(&mut |node| {
        found |= matches!(node, Node::LinkReference { identifier, .. } if identifier == "docs");
    });
    assert!(found, "reference not tokenized");
    assert!(links(&parser.resolved_ast()).is_empty());

    parser.append("\n[Docs]: /manual\n").unwrap();
    assert_eq!(
        links(&parser.resolved_ast()),
        vec![("/manual".to_string(), "docs".to_string())]
    );
}

#[test]
fn pending_definition_resolves_before_completion() {
    let mut parser = Parser::new(Config::default());
    parser.append("[a] and [b][]\n\n[a]: /one\n[b]: /two").unwrap();
    assert!(parser.definitions().is_empty());
    let resolved = links(&parser.resolved_ast());
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].0, "/one");
    assert_eq!(resolved[1].0, "/two");
}

#[test]
fn first_definition_wins() {
    let parser = finalize_chunked("[x]\n\n[x]: /first\n\n[X]: /second\n", 3);
    assert_eq!(parser.definitions().len(), 1);
    assert_eq!(links(&parser.resolved_ast())[0].0, "/first");
}

#[test]
fn undefined_reference_echoes_source() {
    let parser = finalize_chunked("a [b][c] d [e][] f [g]\n", 4);
    let ast = parser.resolved_ast();
    assert_eq!(ast.children[0].node.plain_text(), "a [b][c] d [e][] f [g]");
}

#[test]
fn image_reference_resolves() {
    let parser = finalize_chunked("![logo][l]\n\n[l]: /logo.png \"Logo\"\n", 2);
    let mut found = None;
    parser.resolved_ast().walk(&mut |node| {
        if let Node::Image { url, title, alt } = node {
            found = Some((url.clone(), title.clone(), alt.clone()));
        }
    });
    assert_eq!(
        found,
        Some(("/logo.png".to_string(), Some("Logo".to_string()), "logo".to_string()))
    );
}

#[test]
fn footnote_order_follows_first_citation() {
    let parser = finalize_chunked(
        "b[^beta] a[^alpha] b again[^beta]\n\n[^alpha]: A\n\n[^beta]: B\n",
        5,
    );
    assert_eq!(parser.footnote_reference_order(), ["beta", "alpha"]);
    assert_eq!(parser.footnotes().len(), 2);
    assert!(parser.footnotes().definition("alpha").is_some());
}

#[test]
fn footnote_order_includes_pending_citations() {
    let mut parser = Parser::new(Config::gfm());
    let update = parser.append("first[^1] then[^2]").unwrap();
    assert_eq!(update.footnote_reference_order, ["1", "2"]);
    assert!(parser.footnotes().reference_order().is_empty());
}

#[test]
fn footnote_html_uses_citation_numbers() {
    let html = to_html_with("x[^b] y[^a]\n\n[^a]: Alpha\n\n[^b]: Beta\n", &Config::gfm());
    let beta = html.find("id=\"fn-b\"").unwrap();
    let alpha = html.find("id=\"fn-a\"").unwrap();
    assert!(beta < alpha, "{html}");
    assert!(html.contains("class=\"footnote-ref\">1</a>"), "{html}");
    assert!(html.contains("<section class=\"footnotes\">"), "{html}");
}

#[test]
fn streamed_html_matches_one_shot() {
    let text = "Intro [link][l] and note[^n].\n\n[^n]: The note.\n\n[l]: https://example.com\n";
    let parser = finalize_chunked(text, 3);
    assert_eq!(parser.to_html(), to_html_with(text, &Config::gfm()));
    assert!(parser.to_html().contains("<a href=\"https://example.com\">link</a>"));
}

#[test]
fn repeated_citations_get_distinct_anchor_ids() {
    let parser = finalize_chunked("[^1] [^2] [^1]\n\n[^1]: one\n\n[^2]: two\n", 2);
    let html = parser.to_html();
    assert_eq!(html.matches("id=\"fnref-1\"").count(), 1, "{html}");
    assert_eq!(html.matches("id=\"fnref-1-2\"").count(), 1, "{html}");
    assert!(html.contains("href=\"#fnref-1-2\""), "{html}");
}
