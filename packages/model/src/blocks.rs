//! # Block Registry
//!
//! Known block kinds and the prop shape each one expects. The core carries
//! props opaquely; this registry only supplies defaults and presentation
//! metadata. Unknown `type_name`s resolve to [`BlockKind::Unknown`] and are
//! never an error.

use crate::node::Props;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Container,
    Text,
    Heading,
    AdvancedText,
    Slider,
    Animate,
    Accordion,
    Tabs,
    Unknown(String),
}

impl BlockKind {
    /// Every known kind, in palette order
    pub const KNOWN: [BlockKind; 8] = [
        BlockKind::Container,
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::AdvancedText,
        BlockKind::Slider,
        BlockKind::Animate,
        BlockKind::Accordion,
        BlockKind::Tabs,
    ];

    pub fn from_type_name(name: &str) -> Self {
        match name {
            "ContainerBlock" => BlockKind::Container,
            "TextBlock" => BlockKind::Text,
            "HeadingBlock" => BlockKind::Heading,
            "AdvancedTextBlock" => BlockKind::AdvancedText,
            "SliderBlock" => BlockKind::Slider,
            "AnimateBlock" => BlockKind::Animate,
            "AccordionBlock" => BlockKind::Accordion,
            "TabsBlock" => BlockKind::Tabs,
            other => BlockKind::Unknown(other.to_string()),
        }
    }

    /// Name stored under `type.resolvedName`
    pub fn resolved_name(&self) -> &str {
        match self {
            BlockKind::Container => "ContainerBlock",
            BlockKind::Text => "TextBlock",
            BlockKind::Heading => "HeadingBlock",
            BlockKind::AdvancedText => "AdvancedTextBlock",
            BlockKind::Slider => "SliderBlock",
            BlockKind::Animate => "AnimateBlock",
            BlockKind::Accordion => "AccordionBlock",
            BlockKind::Tabs => "TabsBlock",
            BlockKind::Unknown(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            BlockKind::Container => "Container",
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading",
            BlockKind::AdvancedText => "Advanced Text",
            BlockKind::Slider => "Slider",
            BlockKind::Animate => "Animate",
            BlockKind::Accordion => "Accordion",
            BlockKind::Tabs => "Tabs",
            BlockKind::Unknown(name) => name,
        }
    }

    /// Grouping blocks own children; the rest are leaves
    pub fn is_canvas(&self) -> bool {
        matches!(
            self,
            BlockKind::Container
                | BlockKind::Slider
                | BlockKind::Animate
                | BlockKind::Accordion
                | BlockKind::Tabs
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BlockKind::Unknown(_))
    }

    /// Props a freshly dropped block starts with
    pub fn default_props(&self) -> Props {
        let value = match self {
            BlockKind::Container => json!({
                "backgroundColor": "#f9fafb",
                "padding": 24,
            }),
            BlockKind::Text => json!({
                "text": "Edit me in settings panel",
                "fontSize": 18,
                "color": "#000000",
            }),
            BlockKind::Heading => json!({
                "text": "Heading Text",
                "link": "",
                "targetBlank": true,
                "tag": "h2",
                "size": 24,
                "align": "left",
                "color": "#000000",
            }),
            BlockKind::AdvancedText => json!({
                "text": "Edit me in settings panel",
                "fontSize": 18,
                "lineHeight": 1.5,
                "fontWeight": "normal",
                "textAlign": "left",
            }),
            BlockKind::Slider => json!({
                "slides": [],
                "effect": "slide",
                "autoplay": true,
                "delay": 3000,
            }),
            BlockKind::Animate => json!({
                "text": "Animated Text",
                "animationType": "fade-up",
            }),
            BlockKind::Accordion => json!({
                "title": "Accordion Title",
                "content": "Accordion content goes here...",
            }),
            BlockKind::Tabs => json!({
                "tabs": [
                    { "title": "Tab 1", "content": "Content for Tab 1" },
                    { "title": "Tab 2", "content": "Content for Tab 2" },
                ],
            }),
            BlockKind::Unknown(_) => Value::Object(Default::default()),
        };

        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Props::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_names_round_trip() {
        for kind in BlockKind::KNOWN.iter() {
            assert_eq!(&BlockKind::from_type_name(kind.resolved_name()), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_tolerated() {
        let kind = BlockKind::from_type_name("VideoBlock");

        assert_eq!(kind, BlockKind::Unknown("VideoBlock".to_string()));
        assert_eq!(kind.resolved_name(), "VideoBlock");
        assert!(!kind.is_known());
        assert!(!kind.is_canvas());
        assert!(kind.default_props().is_empty());
    }

    #[test]
    fn test_text_is_leaf_and_container_is_canvas() {
        assert!(!BlockKind::Text.is_canvas());
        assert!(BlockKind::Container.is_canvas());
        assert_eq!(
            BlockKind::Text.default_props().get("text"),
            Some(&json!("Edit me in settings panel"))
        );
    }
}
