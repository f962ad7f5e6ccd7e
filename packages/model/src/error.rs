use crate::node::NodeId;
use thiserror::Error;

/// A broken tree invariant, reported with the offending node(s).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("no root node: every entry is referenced by a parent")]
    MissingRoot,

    #[error("root {0} has a parent")]
    RootHasParent(NodeId),

    #[error("more than one root: {}", join_ids(.0))]
    MultipleRoots(Vec<NodeId>),

    #[error("entry keyed {key} carries id {id}")]
    KeyMismatch { key: NodeId, id: NodeId },

    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("node {parent} lists missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("node {node} names {declared} as parent but is listed under {actual}")]
    ParentMismatch {
        node: NodeId,
        declared: NodeId,
        actual: NodeId,
    },

    #[error("node {node} names {parent} as parent but is not among its children")]
    MissingFromParent { node: NodeId, parent: NodeId },

    #[error("node {0} is listed as a child more than once")]
    DuplicateChild(NodeId),

    #[error("node {0} is part of a cycle or unreachable from the root")]
    Cycle(NodeId),

    #[error("non-canvas node {0} has children")]
    NonCanvasWithChildren(NodeId),

    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("node {0} uses linked nodes, which are not supported")]
    UnsupportedLinkedNodes(NodeId),
}

/// Errors raised while loading a persisted document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] InvariantViolation),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
