//! # Document Serializer
//!
//! Lossless conversion between a [`Tree`] and the persisted page document:
//!
//! ```json
//! {
//!   "ROOT": {
//!     "type": { "resolvedName": "ContainerBlock" },
//!     "isCanvas": true,
//!     "props": { "padding": 24 },
//!     "displayName": "Container",
//!     "custom": {},
//!     "hidden": false,
//!     "nodes": ["a1"],
//!     "linkedNodes": {}
//!   },
//!   "a1": { ... }
//! }
//! ```
//!
//! Output is deterministic: entries are written in pre-order from the root,
//! children keep their order, and node fields and prop keys have a fixed
//! order. Loading validates every tree invariant and never repairs.

use crate::error::{DocumentError, InvariantViolation};
use crate::node::{Node, NodeId, Props};
use crate::tree::Tree;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// `type` field of a persisted node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    #[serde(rename = "resolvedName")]
    pub resolved_name: String,
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Plain DOM elements are stored as a bare tag name
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Resolved {
                #[serde(rename = "resolvedName")]
                resolved_name: String,
            },
            Tag(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Resolved { resolved_name } => TypeRef { resolved_name },
            Repr::Tag(resolved_name) => TypeRef { resolved_name },
        })
    }
}

/// One persisted node entry. Field order here is the output key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,

    #[serde(default)]
    pub is_canvas: bool,

    #[serde(default)]
    pub props: Props,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub custom: Props,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub nodes: Vec<NodeId>,

    #[serde(default)]
    pub linked_nodes: BTreeMap<String, NodeId>,

    /// Accepted on input and checked against `nodes`; never written
    #[serde(default, skip_serializing)]
    pub parent: Option<NodeId>,
}

impl SerializedNode {
    fn from_node(node: &Node) -> Self {
        Self {
            type_ref: TypeRef {
                resolved_name: node.type_name.clone(),
            },
            is_canvas: node.is_canvas,
            props: node.props.clone(),
            display_name: node.display_name.clone(),
            custom: node.custom.clone(),
            hidden: node.hidden,
            nodes: node.children.clone(),
            linked_nodes: BTreeMap::new(),
            parent: None,
        }
    }
}

/// Persisted form of a page tree: node entries keyed by id, in entry order.
///
/// Duplicate keys survive deserialization so they can be reported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Vec<(NodeId, SerializedNode)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a tree (pure and deterministic)
    pub fn from_tree(tree: &Tree) -> Self {
        let entries = tree
            .iter_preorder()
            .map(|node| (node.id.clone(), SerializedNode::from_node(node)))
            .collect();

        Self { entries }
    }

    /// Append an entry as-is (no validation until [`Document::into_tree`])
    pub fn push(&mut self, id: impl Into<NodeId>, node: SerializedNode) {
        self.entries.push((id.into(), node));
    }

    pub fn entries(&self) -> &[(NodeId, SerializedNode)] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SerializedNode> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild and validate the tree
    pub fn into_tree(self) -> Result<Tree, DocumentError> {
        Ok(rebuild(self.entries)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl TryFrom<Document> for Tree {
    type Error = DocumentError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        doc.into_tree()
    }
}

impl From<&Tree> for Document {
    fn from(tree: &Tree) -> Self {
        Document::from_tree(tree)
    }
}

fn rebuild(entries: Vec<(NodeId, SerializedNode)>) -> Result<Tree, InvariantViolation> {
    let mut seen = HashSet::new();
    for (id, node) in &entries {
        if !seen.insert(id.clone()) {
            return Err(InvariantViolation::DuplicateId(id.clone()));
        }
        if !node.linked_nodes.is_empty() {
            return Err(InvariantViolation::UnsupportedLinkedNodes(id.clone()));
        }
    }

    // Parent links come from the child lists
    let mut parent_of: HashMap<NodeId, NodeId> = HashMap::new();
    for (id, node) in &entries {
        for child in &node.nodes {
            if !seen.contains(child) {
                return Err(InvariantViolation::DanglingChild {
                    parent: id.clone(),
                    child: child.clone(),
                });
            }
            if parent_of.insert(child.clone(), id.clone()).is_some() {
                return Err(InvariantViolation::DuplicateChild(child.clone()));
            }
        }
    }

    let roots: Vec<NodeId> = entries
        .iter()
        .filter(|(id, _)| !parent_of.contains_key(id))
        .map(|(id, _)| id.clone())
        .collect();
    let root_id = match roots.len() {
        0 => return Err(InvariantViolation::MissingRoot),
        1 => roots[0].clone(),
        _ => return Err(InvariantViolation::MultipleRoots(roots)),
    };

    let mut nodes = BTreeMap::new();
    for (id, entry) in entries {
        let derived = parent_of.remove(&id);

        if let Some(declared) = &entry.parent {
            if !seen.contains(declared) {
                return Err(InvariantViolation::DanglingParent {
                    node: id,
                    parent: declared.clone(),
                });
            }
            match &derived {
                Some(actual) if actual == declared => {}
                Some(actual) => {
                    return Err(InvariantViolation::ParentMismatch {
                        node: id,
                        declared: declared.clone(),
                        actual: actual.clone(),
                    });
                }
                None => {
                    return Err(InvariantViolation::MissingFromParent {
                        node: id,
                        parent: declared.clone(),
                    });
                }
            }
        }

        let node = Node {
            id: id.clone(),
            type_name: entry.type_ref.resolved_name,
            props: entry.props,
            is_canvas: entry.is_canvas,
            children: entry.nodes,
            parent_id: derived,
            hidden: entry.hidden,
            display_name: entry.display_name,
            custom: entry.custom,
        };
        nodes.insert(id, node);
    }

    Tree::from_parts(root_id, nodes)
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, node) in &self.entries {
            map.serialize_entry(id, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of node id to node")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Document, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, node)) = access.next_entry::<NodeId, SerializedNode>()? {
                    entries.push((id, node));
                }
                Ok(Document { entries })
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(type_name: &str) -> SerializedNode {
        SerializedNode {
            type_ref: TypeRef {
                resolved_name: type_name.to_string(),
            },
            is_canvas: false,
            props: Props::new(),
            display_name: type_name.to_string(),
            custom: Props::new(),
            hidden: false,
            nodes: vec![],
            linked_nodes: BTreeMap::new(),
            parent: None,
        }
    }

    fn canvas(type_name: &str, children: &[&str]) -> SerializedNode {
        let mut node = leaf(type_name);
        node.is_canvas = true;
        node.nodes = children.iter().map(|c| NodeId::from(*c)).collect();
        node
    }

    fn malformed(doc: Document) -> InvariantViolation {
        match doc.into_tree() {
            Err(DocumentError::Malformed(reason)) => reason,
            other => panic!("expected malformed document, got {:?}", other),
        }
    }

    #[test]
    fn test_field_order_is_fixed() {
        let tree = Tree::with_root(Node::canvas("ROOT", "ContainerBlock"));
        let json = Document::from_tree(&tree).to_json().unwrap();

        assert_eq!(
            json,
            r#"{"ROOT":{"type":{"resolvedName":"ContainerBlock"},"isCanvas":true,"props":{},"displayName":"ContainerBlock","custom":{},"hidden":false,"nodes":[],"linkedNodes":{}}}"#
        );
    }

    #[test]
    fn test_parses_craft_document() {
        let source = json!({
            "ROOT": {
                "type": { "resolvedName": "ContainerBlock" },
                "isCanvas": true,
                "props": { "backgroundColor": "#f9fafb", "padding": 24 },
                "displayName": "Container",
                "custom": {},
                "hidden": false,
                "nodes": ["t1"],
                "linkedNodes": {},
                "parent": null
            },
            "t1": {
                "type": { "resolvedName": "TextBlock" },
                "isCanvas": false,
                "props": { "text": "hi" },
                "displayName": "Text",
                "custom": {},
                "hidden": false,
                "nodes": [],
                "linkedNodes": {},
                "parent": "ROOT"
            }
        })
        .to_string();

        let tree = Document::from_json(&source).unwrap().into_tree().unwrap();

        assert_eq!(tree.root_id(), "ROOT");
        assert_eq!(tree.get("t1").unwrap().parent_id, Some(NodeId::from("ROOT")));
        assert_eq!(tree.get("t1").unwrap().prop_str("text"), Some("hi"));
    }

    #[test]
    fn test_bare_tag_type_is_accepted() {
        let source = r#"{"ROOT":{"type":"div","isCanvas":true,"nodes":[]}}"#;
        let tree = Document::from_json(source).unwrap().into_tree().unwrap();
        assert_eq!(tree.root().unwrap().type_name, "div");
    }

    #[test]
    fn test_dangling_parent_reference_is_rejected() {
        let mut doc = Document::new();
        doc.push("ROOT", canvas("ContainerBlock", &["a"]));
        let mut a = leaf("TextBlock");
        a.parent = Some(NodeId::from("ghost"));
        doc.push("a", a);

        assert_eq!(
            malformed(doc),
            InvariantViolation::DanglingParent {
                node: NodeId::from("a"),
                parent: NodeId::from("ghost"),
            }
        );
    }

    #[test]
    fn test_dangling_child_reference_is_rejected() {
        let mut doc = Document::new();
        doc.push("ROOT", canvas("ContainerBlock", &["a", "ghost"]));
        doc.push("a", leaf("TextBlock"));

        assert_eq!(
            malformed(doc),
            InvariantViolation::DanglingChild {
                parent: NodeId::from("ROOT"),
                child: NodeId::from("ghost"),
            }
        );
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let source = r#"{"ROOT":{"type":"div","isCanvas":true},"ROOT":{"type":"div","isCanvas":true}}"#;
        let doc = Document::from_json(source).unwrap();

        assert_eq!(malformed(doc), InvariantViolation::DuplicateId(NodeId::from("ROOT")));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut doc = Document::new();
        doc.push("ROOT", canvas("ContainerBlock", &[]));
        doc.push("a", canvas("ContainerBlock", &["b"]));
        doc.push("b", canvas("ContainerBlock", &["a"]));

        assert_eq!(malformed(doc), InvariantViolation::Cycle(NodeId::from("a")));
    }

    #[test]
    fn test_unknown_root_is_rejected() {
        let mut doc = Document::new();
        doc.push("a", canvas("ContainerBlock", &["b"]));
        doc.push("b", canvas("ContainerBlock", &["a"]));

        assert_eq!(malformed(doc), InvariantViolation::MissingRoot);
    }

    #[test]
    fn test_multiple_roots_are_rejected() {
        let mut doc = Document::new();
        doc.push("ROOT", canvas("ContainerBlock", &[]));
        doc.push("stray", leaf("TextBlock"));

        assert_eq!(
            malformed(doc),
            InvariantViolation::MultipleRoots(vec![NodeId::from("ROOT"), NodeId::from("stray")])
        );
    }

    #[test]
    fn test_non_canvas_with_children_is_rejected() {
        let mut doc = Document::new();
        doc.push("ROOT", canvas("ContainerBlock", &["t"]));
        let mut t = leaf("TextBlock");
        t.nodes = vec![NodeId::from("u")];
        doc.push("t", t);
        doc.push("u", leaf("TextBlock"));

        assert_eq!(
            malformed(doc),
            InvariantViolation::NonCanvasWithChildren(NodeId::from("t"))
        );
    }

    #[test]
    fn test_linked_nodes_are_rejected() {
        let mut doc = Document::new();
        let mut root = canvas("ContainerBlock", &[]);
        root.linked_nodes.insert("header".to_string(), NodeId::from("h"));
        doc.push("ROOT", root);

        assert_eq!(
            malformed(doc),
            InvariantViolation::UnsupportedLinkedNodes(NodeId::from("ROOT"))
        );
    }

    #[test]
    fn test_invalid_json_is_a_json_error() {
        assert!(matches!(
            Document::from_json("{not json"),
            Err(DocumentError::Json(_))
        ));
    }
}
