//! Link definitions, footnote definitions and reference resolution.
//!
//! Inline parsing tokenizes every `[text][id]`, `[text]` and `[^id]` as a
//! reference whether or not its target exists yet. The managers here
//! collect targets from blocks as they complete; [`DefinitionManager::resolve`]
//! decides what each reference becomes when the tree is read.
//!
//! The first definition of an identifier wins. Later duplicates are dropped
//! and references already resolved are never revisited.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::engine::ParsedBlock;
use crate::node::{Node, ReferenceKind, Tree};

/// Target of a link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
}

/// Link reference definitions by normalized identifier.
#[derive(Debug, Clone, Default)]
pub struct DefinitionManager {
    targets: FxHashMap<String, LinkTarget>,
}

impl DefinitionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record definitions from newly completed blocks.
    pub fn extract_from_blocks(&mut self, blocks: &[ParsedBlock]) {
        for block in blocks {
            self.extract(&block.node);
        }
    }

    /// Record every definition in `node`'s subtree.
    pub fn extract(&mut self, node: &Node) {
        node.walk(&mut |n| {
            if let Node::Definition {
                identifier, url, title, ..
            } = n
            {
                if !self.targets.contains_key(identifier) {
                    log::trace!("definition [{identifier}] -> {url}");
                    self.targets.insert(
                        identifier.clone(),
                        LinkTarget {
                            url: url.clone(),
                            title: title.clone(),
                        },
                    );
                }
            }
        });
    }

    pub fn get(&self, identifier: &str) -> Option<&LinkTarget> {
        self.targets.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.targets.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Copy of `tree` with references replaced by what they resolve to.
    ///
    /// A defined reference becomes a `Link` or `Image`. An undefined one
    /// becomes the literal text it was written as, with a link's children
    /// kept in place.
    pub fn resolve(&self, tree: &Tree) -> Tree {
        let mut tree = tree.clone();
        for child in &mut tree.children {
            if let Some(children) = child.node.children_mut() {
                self.resolve_nodes(children);
            }
        }
        tree
    }

    /// Resolve references among `nodes` and their descendants in place.
    pub(crate) fn resolve_nodes(&self, nodes: &mut Vec<Node>) {
        let old = std::mem::take(nodes);
        for mut node in old {
            if let Some(children) = node.children_mut() {
                self.resolve_nodes(children);
            }
            match node {
                Node::LinkReference {
                    identifier,
                    label,
                    kind,
                    children,
                } => match self.get(&identifier) {
                    Some(target) => nodes.push(Node::Link {
                        url: target.url.clone(),
                        title: target.title.clone(),
                        children,
                    }),
                    None => {
                        push_text(nodes, "[");
                        for child in children {
                            match child {
                                Node::Text { value } => push_text(nodes, &value),
                                other => nodes.push(other),
                            }
                        }
                        push_text(nodes, &reference_suffix(kind, &label));
                    }
                },
                Node::ImageReference {
                    identifier,
                    label,
                    kind,
                    alt,
                } => match self.get(&identifier) {
                    Some(target) => nodes.push(Node::Image {
                        url: target.url.clone(),
                        title: target.title.clone(),
                        alt,
                    }),
                    None => push_text(nodes, &format!("![{alt}{}", reference_suffix(kind, &label))),
                },
                other => nodes.push(other),
            }
        }
    }
}

/// Closing part of a reference as written: `][label]`, `][]` or `]`.
fn reference_suffix(kind: ReferenceKind, label: &str) -> String {
    match kind {
        ReferenceKind::Full => format!("][{label}]"),
        ReferenceKind::Collapsed => "][]".to_string(),
        ReferenceKind::Shortcut => "]".to_string(),
    }
}

/// Append text, merging into a preceding text node.
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text { value }) = nodes.last_mut() {
        value.push_str(text);
    } else {
        nodes.push(Node::text(text));
    }
}

/// Footnote definitions and the order footnotes are first cited in.
#[derive(Debug, Clone, Default)]
pub struct FootnoteManager {
    definitions: FxHashMap<String, Node>,
    order: Vec<String>,
    seen: FxHashSet<String>,
}

impl FootnoteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record footnote definitions and citations from newly completed
    /// blocks.
    pub fn extract_from_blocks(&mut self, blocks: &[ParsedBlock]) {
        for block in blocks {
            self.extract(&block.node);
        }
        self.collect_references(blocks.iter().map(|b| &b.node));
    }

    /// Record every footnote definition in `node`'s subtree.
    pub fn extract(&mut self, node: &Node) {
        node.walk(&mut |n| {
            if let Node::FootnoteDefinition { identifier, .. } = n {
                if !self.definitions.contains_key(identifier) {
                    self.definitions.insert(identifier.clone(), n.clone());
                }
            }
        });
    }

    /// Append identifiers cited in `nodes` that were not cited before.
    pub fn collect_references<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        for node in nodes {
            node.walk(&mut |n| {
                if let Node::FootnoteReference { identifier, .. } = n {
                    if self.seen.insert(identifier.clone()) {
                        self.order.push(identifier.clone());
                    }
                }
            });
        }
    }

    /// Citation order so far.
    pub fn reference_order(&self) -> &[String] {
        &self.order
    }

    /// Citation order extended by `nodes`, without recording them.
    pub fn order_with<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<String> {
        let mut scratch = FootnoteManager {
            definitions: FxHashMap::default(),
            order: self.order.clone(),
            seen: self.seen.clone(),
        };
        scratch.collect_references(nodes);
        scratch.order
    }

    /// The `FootnoteDefinition` node recorded for `identifier`.
    pub fn definition(&self, identifier: &str) -> Option<&Node> {
        self.definitions.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
        self.order.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::FastEngine;
    use crate::config::Config;
    use crate::engine::Engine;

    fn tree(text: &str) -> Tree {
        FastEngine.parse(text, &Config::gfm())
    }

    fn definitions(text: &str) -> DefinitionManager {
        let mut defs = DefinitionManager::new();
        for node in tree(text).nodes() {
            defs.extract(node);
        }
        defs
    }

    #[test]
    fn test_first_definition_wins() {
        let defs = definitions("[a]: /first\n\n[A]: /second \"t\"\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs.get("a").map(|t| t.url.as_str()), Some("/first"));
    }

    #[test]
    fn test_definitions_inside_containers() {
        let defs = definitions("> [q]: /quoted\n\n- [i]: /item\n");
        assert!(defs.contains("q"));
        assert!(defs.contains("i"));
    }

    #[test]
    fn test_resolve_defined_reference() {
        let defs = definitions("[id]: https://x \"T\"\n");
        let resolved = defs.resolve(&tree("see [text][id] and ![pic][id]\n"));
        let Node::Paragraph { children } = &resolved.children[0].node else {
            panic!("expected paragraph");
        };
        assert!(children.iter().any(|n| matches!(
            n,
            Node::Link { url, title: Some(t), .. } if url == "https://x" && t == "T"
        )));
        assert!(children.iter().any(|n| matches!(n, Node::Image { alt, .. } if alt == "pic")));
    }

    #[test]
    fn test_resolve_missing_reference_echoes_source() {
        let defs = DefinitionManager::new();
        let resolved = defs.resolve(&tree("a [text][id] b [c][] d [e]\n"));
        assert_eq!(
            resolved.children[0].node.plain_text(),
            "a [text][id] b [c][] d [e]"
        );
    }

    #[test]
    fn test_reference_order_dedups() {
        let mut notes = FootnoteManager::new();
        let t = tree("x[^b] y[^a] z[^b]\n\n[^a]: A\n[^b]: B\n");
        notes.collect_references(t.nodes());
        assert_eq!(notes.reference_order(), ["b", "a"]);
        for node in t.nodes() {
            notes.extract(node);
        }
        assert_eq!(notes.len(), 2);
        assert!(notes.definition("a").is_some());
    }

    #[test]
    fn test_order_with_does_not_record() {
        let mut notes = FootnoteManager::new();
        notes.collect_references(tree("[^1]\n").nodes());
        let extended = notes.order_with(tree("[^2] [^1]\n").nodes());
        assert_eq!(extended, ["1", "2"]);
        assert_eq!(notes.reference_order(), ["1"]);
    }
}
