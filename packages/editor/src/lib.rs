//! # Pagecraft Editor
//!
//! Document-tree editing engine for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: one open page                  │
//! │  - Mutation → inverse → apply → record      │
//! └─────────────────────────────────────────────┘
//!            ↓                      ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ TreeStore            │  │ History              │
//! │  checked structural  │  │  undo/redo stacks,   │
//! │  operations          │  │  batches, coalescing │
//! └──────────────────────┘  └──────────────────────┘
//!            ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: Document (persisted) / compiler-html │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: documents and markup are derived
//! 2. **Atomic edits**: a rejected mutation leaves the tree untouched
//! 3. **Exact inverses**: computed before a mutation runs, replayed on undo
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::EditSession;
//! use pagecraft_model::BlockKind;
//!
//! let mut session = EditSession::new("home", tree);
//! let id = session.add_block(&BlockKind::Text, "ROOT", 0)?;
//! session.set_prop(id.as_str(), "text", "Hello")?;
//! session.undo()?;
//!
//! let (document, html) = session.publish();
//! ```

mod errors;
mod mutations;
mod session;
mod store;
mod undo_stack;

pub use errors::EditorError;
pub use mutations::Mutation;
pub use session::EditSession;
pub use store::{ParentProblem, StoreError, TreeStore};
pub use undo_stack::{History, HistoryError, HistoryOptions, ReversibleAction};
