use crate::rules::{Body, Element, RenderRegistry};
use pagecraft_model::{Node, Tree};
use serde::{Deserialize, Serialize};

/// Which audience the markup is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Editor preview: hidden nodes are still rendered
    Edit,
    /// Published page: hidden nodes and their subtrees are omitted
    #[default]
    Publish,
}

/// Options for HTML compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub mode: RenderMode,
    /// One element per line, indented by depth
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl CompileOptions {
    pub fn for_mode(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Publish,
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a CompileOptions,
    registry: &'a RenderRegistry,
}

impl Context<'_> {
    fn add_indent(&self, out: &mut String, depth: usize) {
        if self.options.pretty {
            for _ in 0..depth {
                out.push_str(&self.options.indent);
            }
        }
    }

    fn add_newline(&self, out: &mut String) {
        if self.options.pretty {
            out.push('\n');
        }
    }

    fn skips(&self, node: &Node) -> bool {
        self.options.mode == RenderMode::Publish && node.hidden
    }
}

/// Renders trees with a fixed registry and options
#[derive(Debug, Default)]
pub struct Compiler {
    registry: RenderRegistry,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            registry: RenderRegistry::default(),
            options,
        }
    }

    pub fn with_registry(registry: RenderRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn registry_mut(&mut self) -> &mut RenderRegistry {
        &mut self.registry
    }

    /// Render the whole tree from its root
    pub fn compile(&self, tree: &Tree) -> String {
        let ctx = Context {
            options: &self.options,
            registry: &self.registry,
        };
        compile_root(tree, &ctx)
    }
}

/// Compile a page tree to HTML with the default render rules
pub fn compile_to_html(tree: &Tree, options: &CompileOptions) -> String {
    let ctx = Context {
        options,
        registry: &RenderRegistry::default(),
    };
    compile_root(tree, &ctx)
}

fn compile_root(tree: &Tree, ctx: &Context) -> String {
    match tree.root() {
        Some(root) => compile_node(tree, root, ctx, 0),
        None => {
            tracing::warn!(root = %tree.root_id(), "Tree has no root node, nothing to render");
            String::new()
        }
    }
}

fn compile_node(tree: &Tree, node: &Node, ctx: &Context, depth: usize) -> String {
    if ctx.skips(node) {
        return String::new();
    }

    if !ctx.registry.is_registered(&node.type_name) {
        tracing::debug!(
            "No render rule for {} ({}), using generic wrapper",
            node.type_name,
            node.id
        );
    }

    let element = ctx.registry.rule_for(&node.type_name).element(node);

    // Post-order: children first, in `children` order
    let children = if element.wants_children() {
        node.children
            .iter()
            .filter_map(|id| tree.get(id.as_str()))
            .map(|child| compile_node(tree, child, ctx, depth + 1))
            .collect::<String>()
    } else {
        String::new()
    };

    wrap(&element, &children, ctx, depth)
}

fn wrap(element: &Element, children: &str, ctx: &Context, depth: usize) -> String {
    let mut out = String::new();

    ctx.add_indent(&mut out, depth);
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    match &element.body {
        Body::Text(text) => out.push_str(&escape_html(text)),
        Body::Children if !children.is_empty() => {
            ctx.add_newline(&mut out);
            out.push_str(children);
            ctx.add_indent(&mut out, depth);
        }
        Body::Children => {}
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
    ctx.add_newline(&mut out);

    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
