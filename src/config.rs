//! Parser configuration.

use std::fmt;
use std::sync::Arc;

use crate::node::Tree;

/// Math syntax switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MathOptions {
    /// `$inline$`, `$$inline$$` and `$$` display fences.
    pub enabled: bool,
    /// Also accept TeX delimiters: `\(inline\)` and `\[` / `\]` display fences.
    pub tex: bool,
}

impl MathOptions {
    /// Dollar math only.
    pub const fn dollars() -> Self {
        Self {
            enabled: true,
            tex: false,
        }
    }

    /// Dollar and TeX math.
    pub const fn with_tex() -> Self {
        Self {
            enabled: true,
            tex: true,
        }
    }
}

impl From<bool> for MathOptions {
    fn from(enabled: bool) -> Self {
        Self {
            enabled,
            tex: false,
        }
    }
}

/// Options for parsing block-level HTML into element nodes whose
/// children are Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HtmlTreeOptions {
    /// Lowercase tag names that open an element region.
    pub tags: Vec<String>,
}

impl Default for HtmlTreeOptions {
    fn default() -> Self {
        let tags = [
            "article", "aside", "center", "details", "div", "figure", "footer", "header", "main",
            "nav", "section",
        ];
        Self {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Custom fenced-directive syntax (`:::name` ... `:::`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerConfig {
    /// Marker byte repeated to open and close a container.
    pub marker: u8,
    /// Minimum marker run that opens a container.
    pub min_len: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            marker: b':',
            min_len: 3,
        }
    }
}

/// Post-parse tree transform applied by every engine.
///
/// Plugins run on each parsed span after the engine has built it, so they
/// see completed and pending spans independently. A plugin must be a pure
/// function of its input tree or chunked and one-shot parses diverge.
pub trait EnginePlugin: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Rewrite the tree in place.
    fn transform(&self, tree: &mut Tree);
}

impl fmt::Debug for dyn EnginePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnginePlugin({})", self.name())
    }
}

/// Parser configuration.
///
/// Every engine must produce the same tree for the same configuration.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists, footnotes.
    pub gfm: bool,
    /// Math syntax.
    pub math: MathOptions,
    /// Parse block HTML into element nodes with Markdown children.
    pub html_tree: Option<HtmlTreeOptions>,
    /// Custom fenced containers.
    pub containers: Option<ContainerConfig>,
    /// Tree transforms run after each parse.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub plugins: Vec<Arc<dyn EnginePlugin>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gfm", &self.gfm)
            .field("math", &self.math)
            .field("html_tree", &self.html_tree)
            .field("containers", &self.containers)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

impl Config {
    /// CommonMark plus GFM extensions.
    pub fn gfm() -> Self {
        Self {
            gfm: true,
            ..Self::default()
        }
    }

    /// Everything switched on: GFM, math with TeX, HTML trees, containers.
    pub fn full() -> Self {
        Self {
            gfm: true,
            math: MathOptions::with_tex(),
            html_tree: Some(HtmlTreeOptions::default()),
            containers: Some(ContainerConfig::default()),
            plugins: Vec::new(),
        }
    }

    pub fn with_gfm(mut self, gfm: bool) -> Self {
        self.gfm = gfm;
        self
    }

    pub fn with_math(mut self, math: impl Into<MathOptions>) -> Self {
        self.math = math.into();
        self
    }

    pub fn with_html_tree(mut self, options: HtmlTreeOptions) -> Self {
        self.html_tree = Some(options);
        self
    }

    pub fn with_containers(mut self, containers: ContainerConfig) -> Self {
        self.containers = Some(containers);
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn EnginePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// The subset of options the line scanners need.
    pub fn scan_config(&self) -> ScanConfig<'_> {
        ScanConfig {
            gfm: self.gfm,
            math: self.math,
            containers: self.containers,
            html_tags: self.html_tree.as_ref().map(|h| h.tags.as_slice()),
        }
    }

    /// Run plugins over a freshly built tree.
    pub(crate) fn apply_plugins(&self, tree: &mut Tree) {
        for plugin in &self.plugins {
            log::trace!("applying plugin {}", plugin.name());
            plugin.transform(tree);
        }
    }
}

/// Borrowed view of the options that decide line-level syntax.
///
/// Shared by the context model and both engines so they agree on which
/// lines open fences, containers and HTML element regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanConfig<'a> {
    pub gfm: bool,
    pub math: MathOptions,
    pub containers: Option<ContainerConfig>,
    pub html_tags: Option<&'a [String]>,
}

impl ScanConfig<'_> {
    /// Whether `tag` (any case) opens an HTML element region.
    pub fn is_tree_tag(&self, tag: &str) -> bool {
        self.html_tags
            .is_some_and(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}
