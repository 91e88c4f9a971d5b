//! Both engines must build the same tree for every construct.

use pretty_assertions::assert_eq;
use streammark::{Config, ConservativeEngine, Engine, FastEngine, Node, Parser, engine_named};

fn assert_same(text: &str, config: &Config) {
    let fast = FastEngine.parse(text, config);
    let conservative = ConservativeEngine.parse(text, config);
    assert_eq!(
        fast.strip_positions(),
        conservative.strip_positions(),
        "input: {text:?}"
    );
}

fn assert_same_all(text: &str) {
    for config in [Config::default(), Config::gfm(), Config::full()] {
        assert_same(text, &config);
    }
}

#[test]
fn headings() {
    assert_same_all("# one\n## two ##\n###### six\n####### seven\n#no\n");
    assert_same_all("Title\n=====\n\nSub\n---\n");
}

#[test]
fn paragraphs_and_breaks() {
    assert_same_all("a\nb  \nc\\\nd\n\n\n\ne\n");
    assert_same_all("text\n***\nmore\n- - -\n");
}

#[test]
fn code_blocks() {
    assert_same_all("```rust title=\"x\"\nfn main() {}\n```\n");
    assert_same_all("~~~\n```\n~~~\n");
    assert_same_all("    indented\n\n    more\nafter\n");
    assert_same_all("para\n    not code\n");
    assert_same_all("```\nunclosed\n\n# still code\n");
}

#[test]
fn block_quotes() {
    assert_same_all("> a\n> b\n\n> c\n");
    assert_same_all("> # h\n> - x\n>   - y\n");
    assert_same_all("> a\nlazy\n");
    assert_same_all(">> nested\n> back\n");
}

#[test]
fn lists() {
    assert_same_all("- a\n- b\n\n- c\n");
    assert_same_all("1. one\n2. two\n3) other\n");
    assert_same_all("- a\n\n  para\n\n      code\n- b\n");
    assert_same_all("* x\n+ y\n- z\n");
    assert_same_all("- a\n  - b\n    - c\n- d\n");
    assert_same_all("7. seven\n\ntext\n");
    assert_same_all("- ```\n  code\n- next\n");
}

#[test]
fn task_lists() {
    assert_same_all("- [ ] open\n- [x] done\n- [X] Done\n- [y] not a task\n");
}

#[test]
fn html_blocks() {
    assert_same_all("<div>\n*raw*\n</div>\n\ntext\n");
    assert_same_all("<!-- a\n\nb -->\nafter\n");
    assert_same_all("<script>\nlet x = 1;\n\n</script>\n");
    assert_same_all("<custom-tag>\ntext\n\nafter\n");
}

#[test]
fn html_tree_elements() {
    let config = Config::full();
    assert_same("<section class=\"a\">\n\n# Inside\n\n- item\n\n</section>\n", &config);
    assert_same("<div>\n<aside>\ninner\n</aside>\n</div>\n", &config);
    assert_same("<details>\nno close\n", &config);
}

#[test]
fn tables() {
    let config = Config::gfm();
    assert_same("| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 |\n", &config);
    assert_same("intro\n| a | b |\n| - | - |\n", &config);
    assert_same("| a | b |\n| - |\n", &config);
    assert_same("| a |\n|---|\n\n| b |\n", &config);
    assert_same("> | a |\n> |---|\n> | 1 |\n", &config);
}

#[test]
fn definitions_and_references() {
    assert_same_all("[a]: /url \"title\"\n[b]:\n  /other\n  'multi\nline'\n\n[a] [x][b] ![i][a]\n");
    assert_same_all("[not]: \ntext\n");
}

#[test]
fn footnotes() {
    let config = Config::gfm();
    assert_same("x[^1]\n\n[^1]: one\n    two\n\n    para\n\nafter\n", &config);
    assert_same("[^a]: a\n[^b]: b\n", &config);
    assert_same("- [^a]: in item\n", &config);
}

#[test]
fn math() {
    let config = Config::full();
    assert_same("$$\nx^2\n$$\n\ninline $a$ and $$b$$\n", &config);
    assert_same("\\[\ny\n\\]\n\\(z\\)\n", &config);
    assert_same("$$\nunclosed\n", &config);
}

#[test]
fn containers() {
    let config = Config::full();
    assert_same(":::note title\n# h\n:::\n", &config);
    assert_same("::::outer\n:::inner\ntext\n:::\n::::\n", &config);
    assert_same(":::open\nnever closed\n", &config);
    assert_same("> :::quoted\n> x\n> :::\n", &config);
}

#[test]
fn inline_constructs() {
    assert_same_all("*a* **b** ***c*** _d_ __e__ ~~f~~ `g` <https://h> <i@j.k> <b>raw</b> &amp; \\*\n");
    assert_same_all("[inline](/u \"t\") ![img](/p) [^fn] [shortcut] [collapsed][]\n");
}

#[test]
fn deep_nesting() {
    let deep = "> ".repeat(200) + "bottom\n";
    assert_same_all(&deep);
    let list = (0..150).map(|i| format!("{}- x\n", "  ".repeat(i))).collect::<String>();
    assert_same_all(&list);
}

#[test]
fn streaming_with_either_engine() {
    let text = "# t\n\n> q\n\n- a\n\n- b\n\n```\nc\n```\n\ntail";
    let mut trees = Vec::new();
    for name in ["fast", "conservative"] {
        let engine = engine_named(name).unwrap();
        let mut parser = Parser::new(Config::gfm()).with_engine(engine);
        assert_eq!(parser.engine_name(), name);
        for ch in text.chars() {
            parser.append(&ch.to_string()).unwrap();
        }
        trees.push(parser.finalize().ast.strip_positions());
    }
    assert_eq!(trees[0], trees[1]);
    assert!(matches!(trees[0][2], Node::List { .. }));
}

#[test]
fn unknown_engine_name() {
    assert!(engine_named("regex").is_none());
}
