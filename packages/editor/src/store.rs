//! # Tree Store
//!
//! The single source of truth for one page's tree.
//!
//! ## Operation Semantics
//!
//! Every operation is atomic: all preconditions are checked before the first
//! write, so a rejected operation leaves the store exactly as it was.
//!
//! ### Add
//! - Index is clamped to `[0, len]`
//! - Parent must exist and be a canvas
//! - Ids of deleted nodes stay retired for the store's lifetime
//!
//! ### Move
//! - Index refers to the target's children after the node is detached
//! - Target must not be the node itself or one of its descendants
//!
//! ### Delete
//! - Removes the node and all descendants
//! - The root cannot be deleted

use pagecraft_model::{IDGenerator, Node, NodeId, Tree};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Why a parent was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentProblem {
    Missing,
    NotCanvas,
    WouldCreateCycle,
}

impl fmt::Display for ParentProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentProblem::Missing => write!(f, "parent does not exist"),
            ParentProblem::NotCanvas => write!(f, "parent is not a canvas"),
            ParentProblem::WouldCreateCycle => write!(f, "parent is the node or one of its descendants"),
        }
    }
}

/// Structural errors. The store is unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Invalid parent {parent}: {problem}")]
    InvalidParent {
        parent: NodeId,
        problem: ParentProblem,
    },

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Index {index} out of range for {parent} ({len} children)")]
    IndexOutOfRange {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("Cannot delete the root node")]
    CannotDeleteRoot,

    #[error("Invalid node {id}: {reason}")]
    InvalidNode { id: NodeId, reason: String },
}

impl StoreError {
    fn invalid_parent(parent: &str, problem: ParentProblem) -> Self {
        StoreError::InvalidParent {
            parent: NodeId::from(parent),
            problem,
        }
    }

    fn invalid_node(id: &NodeId, reason: impl Into<String>) -> Self {
        StoreError::InvalidNode {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

/// Whether an insert may bring back a retired id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Revive {
    Forbidden,
    Allowed,
}

/// Saved store state, used to roll back multi-step history replays
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    tree: Tree,
    retired: HashSet<NodeId>,
    version: u64,
}

/// In-memory, id-keyed page tree with checked structural operations
#[derive(Debug, Clone)]
pub struct TreeStore {
    tree: Tree,
    retired: HashSet<NodeId>,
    ids: IDGenerator,
    version: u64,
}

impl TreeStore {
    /// Create a store holding only `root`
    pub fn new(root: Node) -> Self {
        let seed = root.id.to_string();
        Self::from_tree_seeded(Tree::with_root(root), &seed)
    }

    /// Adopt an already validated tree
    pub fn from_tree(tree: Tree) -> Self {
        let seed = tree.root_id().to_string();
        Self::from_tree_seeded(tree, &seed)
    }

    /// Adopt a tree, deriving generated ids from `slug`
    pub fn from_tree_seeded(tree: Tree, slug: &str) -> Self {
        let ids = IDGenerator::resume(slug, tree.nodes().map(|node| &node.id));

        Self {
            tree,
            retired: HashSet::new(),
            ids,
            version: 0,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn root_id(&self) -> &NodeId {
        self.tree.root_id()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.tree.get(id)
    }

    /// Children of `id`; empty for leaves, childless and unknown nodes
    pub fn get_children(&self, id: &str) -> &[NodeId] {
        self.tree.children(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tree.contains(id)
    }

    pub fn is_retired(&self, id: &str) -> bool {
        self.retired.contains(id)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Incremented on every committed mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Parent id and index of `id` within the parent's children
    pub fn position_of(&self, id: &str) -> Option<(NodeId, usize)> {
        let parent_id = self.tree.get(id)?.parent_id.clone()?;
        let index = self
            .tree
            .children(parent_id.as_str())
            .iter()
            .position(|child| child == id)?;
        Some((parent_id, index))
    }

    /// Read-only view of the live tree
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Immutable deep copy of the current tree
    pub fn snapshot(&self) -> Tree {
        self.tree.clone()
    }

    /// A fresh id that is neither live nor retired
    pub fn next_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_id();
            if !self.tree.contains(id.as_str()) && !self.retired.contains(&id) {
                return id;
            }
        }
    }

    // ── Structural operations ───────────────────────────────────────────

    /// Insert `node` under `parent_id` at `index` (clamped)
    pub fn add_node(&mut self, node: Node, parent_id: &str, index: usize) -> Result<(), StoreError> {
        self.insert_subtree(vec![node], parent_id, index, Revive::Forbidden)
    }

    /// Relocate `id` under `new_parent_id` at `index`
    pub fn move_node(&mut self, id: &str, new_parent_id: &str, index: usize) -> Result<(), StoreError> {
        let node = self
            .tree
            .get(id)
            .ok_or_else(|| StoreError::NotFound(NodeId::from(id)))?;
        let node_id = node.id.clone();

        let target = self
            .tree
            .get(new_parent_id)
            .ok_or_else(|| StoreError::invalid_parent(new_parent_id, ParentProblem::Missing))?;
        if !target.is_canvas {
            return Err(StoreError::invalid_parent(new_parent_id, ParentProblem::NotCanvas));
        }
        if self.tree.is_ancestor_or_self(id, new_parent_id) {
            return Err(StoreError::invalid_parent(new_parent_id, ParentProblem::WouldCreateCycle));
        }

        // Not the root: the root is an ancestor of every possible target
        let (old_parent, old_index) = self
            .position_of(id)
            .ok_or_else(|| StoreError::invalid_node(&node_id, "node is detached from the tree"))?;

        let len_after_detach = if old_parent == new_parent_id {
            target.children.len() - 1
        } else {
            target.children.len()
        };
        if index > len_after_detach {
            return Err(StoreError::IndexOutOfRange {
                parent: NodeId::from(new_parent_id),
                index,
                len: len_after_detach,
            });
        }

        let new_parent = target.id.clone();
        self.children_mut(old_parent.as_str()).remove(old_index);
        self.children_mut(new_parent.as_str()).insert(index, node_id.clone());
        if let Some(node) = self.tree.node_mut_unchecked(node_id.as_str()) {
            node.parent_id = Some(new_parent);
        }

        self.commit();
        Ok(())
    }

    /// Remove `id` and its descendants; returns the removed nodes in pre-order
    pub fn delete_node(&mut self, id: &str) -> Result<Vec<Node>, StoreError> {
        if !self.tree.contains(id) {
            return Err(StoreError::NotFound(NodeId::from(id)));
        }
        let (parent_id, index) = self.position_of(id).ok_or(StoreError::CannotDeleteRoot)?;

        self.children_mut(parent_id.as_str()).remove(index);

        let removed: Vec<Node> = self
            .tree
            .subtree_ids(id)
            .into_iter()
            .filter_map(|node_id| self.tree.remove_unchecked(node_id.as_str()))
            .collect();
        self.retired.extend(removed.iter().map(|node| node.id.clone()));

        self.commit();
        Ok(removed)
    }

    /// Insert a pre-ordered subtree (first node is its root) under `parent_id`.
    ///
    /// Descendants keep their own `parent_id` and `children`; the subtree root
    /// is attached at `index` (clamped).
    pub(crate) fn insert_subtree(
        &mut self,
        mut nodes: Vec<Node>,
        parent_id: &str,
        index: usize,
        revive: Revive,
    ) -> Result<(), StoreError> {
        let Some(first) = nodes.first() else {
            return Err(StoreError::invalid_node(&NodeId::from(parent_id), "empty subtree"));
        };
        let subtree_root = first.id.clone();

        let parent = self
            .tree
            .get(parent_id)
            .ok_or_else(|| StoreError::invalid_parent(parent_id, ParentProblem::Missing))?;
        if !parent.is_canvas {
            return Err(StoreError::invalid_parent(parent_id, ParentProblem::NotCanvas));
        }
        let parent_id = parent.id.clone();

        let mut incoming = HashSet::new();
        for node in &nodes {
            if self.tree.contains(node.id.as_str()) || !incoming.insert(node.id.clone()) {
                return Err(StoreError::DuplicateId(node.id.clone()));
            }
            if revive == Revive::Forbidden && self.retired.contains(&node.id) {
                return Err(StoreError::DuplicateId(node.id.clone()));
            }
            if !node.is_canvas && !node.children.is_empty() {
                return Err(StoreError::invalid_node(&node.id, "non-canvas node has children"));
            }
        }

        // Every incoming node must be reached exactly once from the subtree root
        let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|node| (&node.id, node)).collect();
        let mut seen = HashSet::new();
        let mut stack = vec![&subtree_root];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                return Err(StoreError::invalid_node(current, "subtree contains a cycle"));
            }
            let Some(node) = by_id.get(current) else {
                return Err(StoreError::invalid_node(current, "child outside the subtree"));
            };
            for child in &node.children {
                let linked = by_id
                    .get(child)
                    .map(|c| c.parent_id.as_ref() == Some(current))
                    .unwrap_or(false);
                if !linked {
                    return Err(StoreError::invalid_node(child, "subtree parent link is broken"));
                }
                stack.push(child);
            }
        }
        if seen.len() != nodes.len() {
            return Err(StoreError::invalid_node(&subtree_root, "subtree has unreachable nodes"));
        }

        nodes[0].parent_id = Some(parent_id.clone());
        for node in nodes {
            self.retired.remove(&node.id);
            self.tree.insert_unchecked(node);
        }

        let children = self.children_mut(parent_id.as_str());
        let at = index.min(children.len());
        children.insert(at, subtree_root);

        self.commit();
        Ok(())
    }

    // ── Property operations ─────────────────────────────────────────────

    /// Set one prop; returns the previous value
    pub fn set_prop(&mut self, id: &str, key: &str, value: Value) -> Result<Option<Value>, StoreError> {
        let node = self.node_mut(id)?;
        let previous = node.props.insert(key.to_string(), value);
        self.commit();
        Ok(previous)
    }

    /// Remove one prop; returns the previous value
    pub fn remove_prop(&mut self, id: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let node = self.node_mut(id)?;
        let previous = node.props.remove(key);
        self.commit();
        Ok(previous)
    }

    /// Returns the previous flag
    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> Result<bool, StoreError> {
        let node = self.node_mut(id)?;
        let previous = std::mem::replace(&mut node.hidden, hidden);
        self.commit();
        Ok(previous)
    }

    /// Returns the previous name
    pub fn set_display_name(&mut self, id: &str, name: &str) -> Result<String, StoreError> {
        let node = self.node_mut(id)?;
        let previous = std::mem::replace(&mut node.display_name, name.to_string());
        self.commit();
        Ok(previous)
    }

    // ── Internals ───────────────────────────────────────────────────────

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tree: self.tree.clone(),
            retired: self.retired.clone(),
            version: self.version,
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.tree = checkpoint.tree;
        self.retired = checkpoint.retired;
        self.version = checkpoint.version;
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, StoreError> {
        self.tree
            .node_mut_unchecked(id)
            .ok_or_else(|| StoreError::NotFound(NodeId::from(id)))
    }

    /// Children list of a node already known to exist
    fn children_mut(&mut self, id: &str) -> &mut Vec<NodeId> {
        match self.tree.node_mut_unchecked(id) {
            Some(node) => &mut node.children,
            None => unreachable!("children_mut called for missing node {}", id),
        }
    }

    fn commit(&mut self) {
        self.version += 1;
        debug_assert_eq!(self.tree.validate(), Ok(()), "tree invariants broken by commit");
    }
}
