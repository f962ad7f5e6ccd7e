//! # Document Tree
//!
//! An id-keyed arena of [`Node`]s plus the id of the root.
//!
//! ## Invariants
//!
//! - Exactly one node has no parent, and it is `root_id`
//! - A node's parent exists and lists it exactly once among its children
//! - Every listed child exists and names the lister as its parent
//! - Every node is reachable from the root (no cycles)
//! - Non-canvas nodes have no children
//!
//! [`Tree::validate`] checks all of them; the scan walks nodes in id order so
//! the reported violation is stable for a given tree.

use crate::error::InvariantViolation;
use crate::node::{Node, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root_id: NodeId,
    nodes: BTreeMap<NodeId, Node>,
}

impl Tree {
    /// Create a tree holding only `root`. The root's parent and children are reset.
    pub fn with_root(mut root: Node) -> Self {
        root.parent_id = None;
        root.children.clear();

        let root_id = root.id.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), root);

        Self { root_id, nodes }
    }

    /// Assemble a tree from parts, rejecting any invariant violation
    pub fn from_parts(
        root_id: NodeId,
        nodes: BTreeMap<NodeId, Node>,
    ) -> Result<Self, InvariantViolation> {
        let tree = Self { root_id, nodes };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    /// `None` only for a tree broken through the unchecked mutators
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Children of `id`; empty for leaves and unknown ids
    pub fn children(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Whether `ancestor` is `id` itself or lies on the path from `id` to the root
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.nodes.get(id);
        let mut steps = 0;

        while let Some(node) = current {
            if node.id == ancestor {
                return true;
            }
            // A well-formed tree cannot be deeper than its node count
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = node.parent_id.as_ref().and_then(|p| self.nodes.get(p));
        }

        false
    }

    /// Ids of the subtree rooted at `id` in pre-order, starting with `id`
    pub fn subtree_ids(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(start) = self.nodes.get(id) else {
            return out;
        };

        let mut stack = vec![start.id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().cloned());
            }
            out.push(current);
        }

        out
    }

    /// All nodes in pre-order from the root, following `children` order
    pub fn iter_preorder(&self) -> impl Iterator<Item = &Node> {
        self.subtree_ids(self.root_id.as_str())
            .into_iter()
            .filter_map(move |id| self.nodes.get(&id))
    }

    /// Mutable access without invariant checks. Callers must restore the
    /// invariants before the tree is observed again.
    pub fn node_mut_unchecked(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Insert a node without invariant checks
    pub fn insert_unchecked(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    /// Remove a node without invariant checks
    pub fn remove_unchecked(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Check every tree invariant
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(InvariantViolation::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
        }

        let root = self
            .nodes
            .get(&self.root_id)
            .ok_or(InvariantViolation::MissingRoot)?;
        if root.parent_id.is_some() {
            return Err(InvariantViolation::RootHasParent(self.root_id.clone()));
        }

        let parentless: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.parent_id.is_none())
            .map(|node| node.id.clone())
            .collect();
        if parentless.len() > 1 {
            return Err(InvariantViolation::MultipleRoots(parentless));
        }

        // Child side: every listed child exists and is listed once overall
        let mut listed_under: HashMap<&NodeId, &NodeId> = HashMap::new();
        for node in self.nodes.values() {
            if !node.is_canvas && !node.children.is_empty() {
                return Err(InvariantViolation::NonCanvasWithChildren(node.id.clone()));
            }
            for child in &node.children {
                if !self.nodes.contains_key(child) {
                    return Err(InvariantViolation::DanglingChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }
                if listed_under.insert(child, &node.id).is_some() {
                    return Err(InvariantViolation::DuplicateChild(child.clone()));
                }
            }
        }

        if listed_under.contains_key(&self.root_id) {
            return Err(InvariantViolation::RootHasParent(self.root_id.clone()));
        }

        // Parent side: back-references agree with the child lists
        for node in self.nodes.values() {
            let Some(parent) = &node.parent_id else {
                continue;
            };
            if !self.nodes.contains_key(parent) {
                return Err(InvariantViolation::DanglingParent {
                    node: node.id.clone(),
                    parent: parent.clone(),
                });
            }
            match listed_under.get(&node.id) {
                Some(actual) if *actual == parent => {}
                Some(actual) => {
                    return Err(InvariantViolation::ParentMismatch {
                        node: node.id.clone(),
                        declared: parent.clone(),
                        actual: (*actual).clone(),
                    });
                }
                None => {
                    return Err(InvariantViolation::MissingFromParent {
                        node: node.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // Everything must hang off the root; leftovers form a cycle
        let reachable: BTreeSet<NodeId> = self
            .subtree_ids(self.root_id.as_str())
            .into_iter()
            .collect();
        if let Some(stray) = self.nodes.keys().find(|id| !reachable.contains(*id)) {
            return Err(InvariantViolation::Cycle(stray.clone()));
        }

        Ok(())
    }
}
