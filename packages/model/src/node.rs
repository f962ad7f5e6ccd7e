//! # Nodes
//!
//! A [`Node`] is one block instance in a page. Nodes are plain data: links to
//! the parent and children are ids, resolved through the tree that owns them.

use crate::blocks::BlockKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Conventional id of the root node in persisted documents
pub const ROOT_ID: &str = "ROOT";

/// Property bag of a node. Sorted keys keep serialization deterministic.
pub type Props = BTreeMap<String, Value>;

/// Opaque node identifier, stable for the node's lifetime
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A single document element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    /// Resolved name of the block kind (e.g. `TextBlock`)
    pub type_name: String,

    #[serde(default)]
    pub props: Props,

    /// Whether this node may own children
    #[serde(default)]
    pub is_canvas: bool,

    /// Ordered child ids (empty unless `is_canvas`)
    #[serde(default)]
    pub children: Vec<NodeId>,

    /// `None` only for the root
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// Suppressed from published output, still part of the tree
    #[serde(default)]
    pub hidden: bool,

    /// Presentation label, independent of `type_name`
    #[serde(default)]
    pub display_name: String,

    /// Opaque editor metadata, carried through persistence untouched
    #[serde(default)]
    pub custom: Props,
}

impl Node {
    /// Create a leaf node
    pub fn new(id: impl Into<NodeId>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            id: id.into(),
            display_name: type_name.clone(),
            type_name,
            props: Props::new(),
            is_canvas: false,
            children: Vec::new(),
            parent_id: None,
            hidden: false,
            custom: Props::new(),
        }
    }

    /// Create a canvas node (may own children)
    pub fn canvas(id: impl Into<NodeId>, type_name: impl Into<String>) -> Self {
        let mut node = Self::new(id, type_name);
        node.is_canvas = true;
        node
    }

    /// Create a node pre-populated with a block kind's defaults
    pub fn from_block(id: impl Into<NodeId>, kind: &BlockKind) -> Self {
        let mut node = Self::new(id, kind.resolved_name());
        node.is_canvas = kind.is_canvas();
        node.display_name = kind.display_name().to_string();
        node.props = kind.default_props();
        node
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Block kind this node's `type_name` resolves to
    pub fn kind(&self) -> BlockKind {
        BlockKind::from_type_name(&self.type_name)
    }

    /// String value of a prop, if present and a string
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}
