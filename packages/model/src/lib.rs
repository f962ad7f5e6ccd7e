//! # Pagecraft Model
//!
//! Shared data model for the page editor: nodes, the document tree and its
//! invariants, the block-kind registry and the persisted document format.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ Tree { root_id, nodes }       │  in-memory, id-keyed arena
//! └───────────────────────────────┘
//!          ↑                 ↓
//!   Document::into_tree   Document::from_tree
//!          ↑                 ↓
//! ┌───────────────────────────────┐
//! │ Document (craft-style JSON)   │  persisted form, keyed by node id
//! └───────────────────────────────┘
//! ```
//!
//! Nodes never hold references to each other; parent/child links are ids
//! resolved through the owning [`Tree`].

pub mod blocks;
pub mod error;
pub mod id_generator;
pub mod node;
pub mod serializer;
pub mod tree;

pub use blocks::BlockKind;
pub use error::{DocumentError, InvariantViolation};
pub use id_generator::{slug_seed, IDGenerator};
pub use node::{Node, NodeId, Props, ROOT_ID};
pub use serializer::{Document, SerializedNode, TypeRef};
pub use tree::Tree;
