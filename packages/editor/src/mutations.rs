//! # Tree Mutations
//!
//! Semantic edits to a [`TreeStore`]. Each mutation can compute its exact
//! inverse against the store *before* it is applied, which is what history
//! records.
//!
//! ## Mutation Semantics
//!
//! ### AddNode / DeleteNode
//! - The inverse of an add is a delete of the same id
//! - The inverse of a delete is a `RestoreSubtree` carrying every removed node
//!
//! ### MoveNode
//! - The inverse moves the node back to its old parent and index
//! - Moving the root is always rejected
//!
//! ### SetProp / RemoveProp
//! - Atomic replacement of one key, last write wins
//! - Setting a key that was absent inverts to `RemoveProp`

use crate::store::{ParentProblem, Revive, StoreError, TreeStore};
use pagecraft_model::{Node, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a new childless node under a canvas parent
    AddNode {
        parent_id: NodeId,
        index: usize,
        node: Node,
    },

    /// Move a node to a new parent at index
    MoveNode {
        node_id: NodeId,
        new_parent_id: NodeId,
        index: usize,
    },

    /// Remove a node and all its descendants
    DeleteNode { node_id: NodeId },

    /// Re-insert a deleted subtree, nodes in pre-order
    RestoreSubtree {
        parent_id: NodeId,
        index: usize,
        nodes: Vec<Node>,
    },

    /// Set one prop (atomic replacement)
    SetProp {
        node_id: NodeId,
        key: String,
        value: Value,
    },

    RemoveProp { node_id: NodeId, key: String },

    SetHidden { node_id: NodeId, hidden: bool },

    SetDisplayName { node_id: NodeId, name: String },
}

impl Mutation {
    /// Apply to the store. Ids retired by earlier deletes are refused.
    pub fn apply(&self, store: &mut TreeStore) -> Result<(), StoreError> {
        self.apply_with(store, Revive::Forbidden)
    }

    /// Apply as part of an undo/redo replay, where a deleted node may come back
    pub(crate) fn replay(&self, store: &mut TreeStore) -> Result<(), StoreError> {
        self.apply_with(store, Revive::Allowed)
    }

    fn apply_with(&self, store: &mut TreeStore, revive: Revive) -> Result<(), StoreError> {
        match self {
            Mutation::AddNode { parent_id, index, node } => {
                store.insert_subtree(vec![node.clone()], parent_id.as_str(), *index, revive)
            }

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => store.move_node(node_id.as_str(), new_parent_id.as_str(), *index),

            Mutation::DeleteNode { node_id } => store.delete_node(node_id.as_str()).map(|_| ()),

            Mutation::RestoreSubtree {
                parent_id,
                index,
                nodes,
            } => store.insert_subtree(nodes.clone(), parent_id.as_str(), *index, revive),

            Mutation::SetProp { node_id, key, value } => {
                store.set_prop(node_id.as_str(), key, value.clone()).map(|_| ())
            }

            Mutation::RemoveProp { node_id, key } => store.remove_prop(node_id.as_str(), key).map(|_| ()),

            Mutation::SetHidden { node_id, hidden } => store.set_hidden(node_id.as_str(), *hidden).map(|_| ()),

            Mutation::SetDisplayName { node_id, name } => {
                store.set_display_name(node_id.as_str(), name).map(|_| ())
            }
        }
    }

    /// Compute the mutation that undoes `self`, given the store as it is
    /// before `self` is applied.
    pub fn to_inverse(&self, store: &TreeStore) -> Result<Mutation, StoreError> {
        match self {
            Mutation::AddNode { node, .. } => Ok(Mutation::DeleteNode {
                node_id: node.id.clone(),
            }),

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                ..
            } => {
                if !store.contains(node_id.as_str()) {
                    return Err(StoreError::NotFound(node_id.clone()));
                }
                let (parent_id, index) = store.position_of(node_id.as_str()).ok_or_else(|| {
                    StoreError::InvalidParent {
                        parent: new_parent_id.clone(),
                        problem: ParentProblem::WouldCreateCycle,
                    }
                })?;
                Ok(Mutation::MoveNode {
                    node_id: node_id.clone(),
                    new_parent_id: parent_id,
                    index,
                })
            }

            Mutation::DeleteNode { node_id } => {
                if !store.contains(node_id.as_str()) {
                    return Err(StoreError::NotFound(node_id.clone()));
                }
                let (parent_id, index) = store
                    .position_of(node_id.as_str())
                    .ok_or(StoreError::CannotDeleteRoot)?;
                let nodes = store
                    .tree()
                    .subtree_ids(node_id.as_str())
                    .iter()
                    .filter_map(|id| store.get_node(id.as_str()).cloned())
                    .collect();
                Ok(Mutation::RestoreSubtree {
                    parent_id,
                    index,
                    nodes,
                })
            }

            Mutation::RestoreSubtree { parent_id, nodes, .. } => match nodes.first() {
                Some(root) => Ok(Mutation::DeleteNode {
                    node_id: root.id.clone(),
                }),
                None => Err(StoreError::InvalidNode {
                    id: parent_id.clone(),
                    reason: "empty subtree".to_string(),
                }),
            },

            Mutation::SetProp { node_id, key, .. } | Mutation::RemoveProp { node_id, key } => {
                let node = existing(store, node_id)?;
                Ok(match node.props.get(key) {
                    Some(previous) => Mutation::SetProp {
                        node_id: node_id.clone(),
                        key: key.clone(),
                        value: previous.clone(),
                    },
                    None => Mutation::RemoveProp {
                        node_id: node_id.clone(),
                        key: key.clone(),
                    },
                })
            }

            Mutation::SetHidden { node_id, .. } => Ok(Mutation::SetHidden {
                node_id: node_id.clone(),
                hidden: existing(store, node_id)?.hidden,
            }),

            Mutation::SetDisplayName { node_id, .. } => Ok(Mutation::SetDisplayName {
                node_id: node_id.clone(),
                name: existing(store, node_id)?.display_name.clone(),
            }),
        }
    }

    /// The node this mutation is about
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Mutation::AddNode { node, .. } => Some(&node.id),
            Mutation::RestoreSubtree { nodes, .. } => nodes.first().map(|node| &node.id),
            Mutation::MoveNode { node_id, .. }
            | Mutation::DeleteNode { node_id }
            | Mutation::SetProp { node_id, .. }
            | Mutation::RemoveProp { node_id, .. }
            | Mutation::SetHidden { node_id, .. }
            | Mutation::SetDisplayName { node_id, .. } => Some(node_id),
        }
    }

    /// Whether the mutation changes the shape of the tree
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::AddNode { .. }
                | Mutation::MoveNode { .. }
                | Mutation::DeleteNode { .. }
                | Mutation::RestoreSubtree { .. }
        )
    }

    /// Successive edits sharing a key may merge into one history entry
    pub fn coalesce_key(&self) -> Option<(NodeId, String)> {
        match self {
            Mutation::SetProp { node_id, key, .. } => Some((node_id.clone(), key.clone())),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddNode { .. } => "add_node",
            Mutation::MoveNode { .. } => "move_node",
            Mutation::DeleteNode { .. } => "delete_node",
            Mutation::RestoreSubtree { .. } => "restore_subtree",
            Mutation::SetProp { .. } => "set_prop",
            Mutation::RemoveProp { .. } => "remove_prop",
            Mutation::SetHidden { .. } => "set_hidden",
            Mutation::SetDisplayName { .. } => "set_display_name",
        }
    }
}

fn existing<'a>(store: &'a TreeStore, id: &NodeId) -> Result<&'a Node, StoreError> {
    store
        .get_node(id.as_str())
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> TreeStore {
        let mut store = TreeStore::new(Node::canvas("ROOT", "ContainerBlock"));
        store.add_node(Node::canvas("box", "ContainerBlock"), "ROOT", 0).unwrap();
        store
            .add_node(Node::new("txt", "TextBlock").with_prop("text", "hi"), "box", 0)
            .unwrap();
        store
    }

    fn apply_and_invert(mutation: Mutation, store: &mut TreeStore) {
        let before = store.snapshot();
        let inverse = mutation.to_inverse(store).unwrap();
        mutation.apply(store).unwrap();
        inverse.replay(store).unwrap();
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_set_prop_inverse_of_absent_key_is_remove() {
        let store = store();
        let mutation = Mutation::SetProp {
            node_id: NodeId::from("txt"),
            key: "color".into(),
            value: json!("red"),
        };

        assert_eq!(
            mutation.to_inverse(&store).unwrap(),
            Mutation::RemoveProp {
                node_id: NodeId::from("txt"),
                key: "color".into(),
            }
        );
    }

    #[test]
    fn test_every_mutation_round_trips_through_its_inverse() {
        let mut store = store();

        apply_and_invert(
            Mutation::SetProp {
                node_id: NodeId::from("txt"),
                key: "text".into(),
                value: json!("bye"),
            },
            &mut store,
        );
        apply_and_invert(
            Mutation::MoveNode {
                node_id: NodeId::from("txt"),
                new_parent_id: NodeId::from("ROOT"),
                index: 0,
            },
            &mut store,
        );
        apply_and_invert(
            Mutation::DeleteNode {
                node_id: NodeId::from("box"),
            },
            &mut store,
        );
        apply_and_invert(
            Mutation::SetHidden {
                node_id: NodeId::from("box"),
                hidden: true,
            },
            &mut store,
        );
        apply_and_invert(
            Mutation::SetDisplayName {
                node_id: NodeId::from("box"),
                name: "Hero".into(),
            },
            &mut store,
        );
    }

    #[test]
    fn test_moving_root_is_rejected_before_apply() {
        let store = store();
        let mutation = Mutation::MoveNode {
            node_id: NodeId::from("ROOT"),
            new_parent_id: NodeId::from("box"),
            index: 0,
        };

        assert!(matches!(
            mutation.to_inverse(&store),
            Err(StoreError::InvalidParent {
                problem: ParentProblem::WouldCreateCycle,
                ..
            })
        ));
    }

    #[test]
    fn test_restore_after_strict_apply_is_refused() {
        let mut store = store();
        let delete = Mutation::DeleteNode {
            node_id: NodeId::from("txt"),
        };
        let restore = delete.to_inverse(&store).unwrap();
        delete.apply(&mut store).unwrap();

        assert_eq!(
            restore.apply(&mut store),
            Err(StoreError::DuplicateId(NodeId::from("txt")))
        );
        restore.replay(&mut store).unwrap();
        assert!(store.contains("txt"));
    }

    #[test]
    fn test_mutations_serialize_externally_tagged() {
        let mutation = Mutation::SetHidden {
            node_id: NodeId::from("txt"),
            hidden: true,
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json, json!({"SetHidden": {"node_id": "txt", "hidden": true}}));
    }
}
