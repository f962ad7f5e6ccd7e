//! Per-block render rules.
//!
//! A rule turns one node into an [`Element`] description; the compiler owns
//! escaping, child placement and formatting.

use pagecraft_model::Node;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// What goes between an element's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// The node's rendered children
    Children,
    /// Escaped text; children are not rendered
    Text(String),
}

/// Markup description of a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Written in order, values escaped by the compiler
    pub attributes: Vec<(String, String)>,
    pub body: Body,
}

impl Element {
    pub fn new(tag: impl Into<String>, body: Body) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            body,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Whether the compiler needs the node's children
    pub fn wants_children(&self) -> bool {
        matches!(self.body, Body::Children)
    }
}

/// Rendering rule for one block kind
pub trait RenderRule: fmt::Debug + Send + Sync {
    fn element(&self, node: &Node) -> Element;
}

/// `<div class="...">children</div>`; no class for the generic fallback
#[derive(Debug, Clone, Default)]
pub struct WrapperRule {
    pub class: Option<&'static str>,
}

impl WrapperRule {
    pub fn with_class(class: &'static str) -> Self {
        Self { class: Some(class) }
    }
}

impl RenderRule for WrapperRule {
    fn element(&self, _node: &Node) -> Element {
        let element = Element::new("div", Body::Children);
        match self.class {
            Some(class) => element.with_attribute("class", class),
            None => element,
        }
    }
}

/// `<div>{props.text}</div>`
#[derive(Debug, Clone, Default)]
pub struct TextRule;

impl RenderRule for TextRule {
    fn element(&self, node: &Node) -> Element {
        Element::new("div", Body::Text(prop_text(node, "text")))
    }
}

/// `<h1>`..`<h6>` chosen by `props.tag`, `h2` otherwise
#[derive(Debug, Clone, Default)]
pub struct HeadingRule;

impl RenderRule for HeadingRule {
    fn element(&self, node: &Node) -> Element {
        let tag = match node.prop_str("tag") {
            Some(tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => tag,
            _ => "h2",
        };
        Element::new(tag, Body::Text(prop_text(node, "text")))
    }
}

/// `<div data-aos="{animationType}">children</div>`
#[derive(Debug, Clone, Default)]
pub struct AnimateRule;

impl RenderRule for AnimateRule {
    fn element(&self, node: &Node) -> Element {
        let animation = match node.prop_str("animationType") {
            Some(kind) if !kind.is_empty() => kind,
            _ => "fade-up",
        };
        Element::new("div", Body::Children).with_attribute("data-aos", animation)
    }
}

/// Rules keyed by resolved block name, plus the fallback for unknown kinds
#[derive(Debug)]
pub struct RenderRegistry {
    rules: BTreeMap<String, Box<dyn RenderRule>>,
    fallback: Box<dyn RenderRule>,
}

impl RenderRegistry {
    /// Registry with no specific rules; everything renders as a plain wrapper
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            fallback: Box::new(WrapperRule::default()),
        }
    }

    /// Register or replace the rule for `type_name`
    pub fn register(&mut self, type_name: impl Into<String>, rule: impl RenderRule + 'static) {
        self.rules.insert(type_name.into(), Box::new(rule));
    }

    pub fn rule_for(&self, type_name: &str) -> &dyn RenderRule {
        self.rules
            .get(type_name)
            .map(|rule| rule.as_ref())
            .unwrap_or_else(|| self.fallback.as_ref())
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.rules.contains_key(type_name)
    }
}

impl Default for RenderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("TextBlock", TextRule);
        registry.register("AdvancedTextBlock", TextRule);
        registry.register("HeadingBlock", HeadingRule);
        registry.register("ContainerBlock", WrapperRule::with_class("container"));
        registry.register("SliderBlock", WrapperRule::with_class("swiper-container"));
        registry.register("AnimateBlock", AnimateRule);
        registry.register("AccordionBlock", WrapperRule::with_class("accordion"));
        registry.register("TabsBlock", WrapperRule::with_class("tabs"));
        registry
    }
}

/// Printable form of a prop: strings as-is, numbers and booleans formatted,
/// anything else empty.
fn prop_text(node: &Node, key: &str) -> String {
    match node.props.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
