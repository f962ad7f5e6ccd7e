//! # Undo/Redo History
//!
//! Tracks applied mutations so they can be undone and redone.
//!
//! ## Design
//!
//! - Each mutation records its inverse before being applied
//! - Undo replays the inverses and moves the entry to the redo stack
//! - Redo replays the forward mutations
//! - Recording a new entry clears the redo stack
//! - Batches group several mutations into one undo step
//! - Successive `SetProp` edits of the same node and key coalesce into one
//!   entry while the chain is open
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! let mut store = TreeStore::new(Node::canvas("ROOT", "ContainerBlock"));
//!
//! history.apply(&Mutation::SetHidden { .. }, &mut store)?;
//! history.undo(&mut store)?;
//! history.redo(&mut store)?;
//! ```

use crate::mutations::Mutation;
use crate::store::{StoreError, TreeStore};
use pagecraft_model::NodeId;
use std::time::{Duration, Instant};
use thiserror::Error;

/// History and tree disagree; the history has been cleared
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("History replay failed during {operation}: {source}")]
    Inconsistent {
        operation: &'static str,
        source: StoreError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOptions {
    /// Maximum number of undo levels (0 = unlimited)
    pub max_levels: usize,

    /// Longest pause between coalesced edits (`None` = no limit)
    pub coalesce_window: Option<Duration>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_levels: 100,
            coalesce_window: Some(Duration::from_secs(1)),
        }
    }
}

/// One undoable step
#[derive(Debug, Clone)]
pub struct ReversibleAction {
    /// Mutations in application order
    pub forward: Vec<Mutation>,

    /// Inverse mutations, already in the order undo applies them
    pub inverse: Vec<Mutation>,

    pub description: Option<String>,

    coalesce_key: Option<(NodeId, String)>,
    recorded_at: Instant,
}

impl ReversibleAction {
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            coalesce_key: mutation.coalesce_key(),
            forward: vec![mutation],
            inverse: vec![inverse],
            description: None,
            recorded_at: Instant::now(),
        }
    }

    /// `inverse` must already be reversed relative to `forward`
    pub fn from_mutations(forward: Vec<Mutation>, inverse: Vec<Mutation>) -> Self {
        Self {
            forward,
            inverse,
            description: None,
            coalesce_key: None,
            recorded_at: Instant::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: Instant) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    pub fn coalesce_key(&self) -> Option<&(NodeId, String)> {
        self.coalesce_key.as_ref()
    }

    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }

    fn empty() -> Self {
        Self::from_mutations(Vec::new(), Vec::new())
    }
}

/// Undo/redo history for one tree store
#[derive(Debug)]
pub struct History {
    /// Applied entries (most recent last)
    past: Vec<ReversibleAction>,

    /// Undone entries (most recent last)
    future: Vec<ReversibleAction>,

    options: HistoryOptions,

    /// Currently building a batch
    current_batch: Option<ReversibleAction>,

    /// Whether the top of `past` may absorb the next matching edit
    chain_open: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_options(HistoryOptions::default())
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self::with_options(HistoryOptions {
            max_levels,
            ..HistoryOptions::default()
        })
    }

    pub fn with_options(options: HistoryOptions) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            options,
            current_batch: None,
            chain_open: false,
        }
    }

    pub fn options(&self) -> &HistoryOptions {
        &self.options
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, store: &mut TreeStore) -> Result<(), StoreError> {
        // Inverse first: it describes the state being replaced
        let inverse = mutation.to_inverse(store)?;
        mutation.apply(store)?;

        tracing::debug!(
            mutation = mutation.name(),
            node = ?mutation.node_id(),
            version = store.version(),
            "Applied mutation"
        );

        self.record(ReversibleAction::single(mutation.clone(), inverse));
        Ok(())
    }

    /// Record an entry whose mutations have already been applied
    pub fn record(&mut self, action: ReversibleAction) {
        if let Some(batch) = &mut self.current_batch {
            batch.forward.extend(action.forward);
            let mut inverse = action.inverse;
            inverse.append(&mut batch.inverse);
            batch.inverse = inverse;
            return;
        }

        if self.can_coalesce(&action) {
            if let Some(top) = self.past.last_mut() {
                // Keep the first inverse, take the newest value
                top.forward = action.forward;
                top.recorded_at = action.recorded_at;
                self.future.clear();
                return;
            }
        }

        self.chain_open = action.coalesce_key.is_some();
        self.push_entry(action);
    }

    fn can_coalesce(&self, action: &ReversibleAction) -> bool {
        let Some(top) = self.past.last() else {
            return false;
        };
        if !self.chain_open || action.coalesce_key.is_none() || top.coalesce_key != action.coalesce_key {
            return false;
        }

        match self.options.coalesce_window {
            Some(window) => action.recorded_at.saturating_duration_since(top.recorded_at) <= window,
            None => true,
        }
    }

    /// Start a batch of mutations (undone/redone together)
    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.chain_open = false;
        self.current_batch = Some(ReversibleAction::empty());
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            self.chain_open = false;
            if !batch.forward.is_empty() {
                self.push_entry(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn in_batch(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Close the coalescing chain; the next edit starts a new entry
    pub fn seal(&mut self) {
        self.chain_open = false;
    }

    fn push_entry(&mut self, action: ReversibleAction) {
        self.past.push(action);

        if self.options.max_levels > 0 && self.past.len() > self.options.max_levels {
            self.past.remove(0);
        }

        // A new action invalidates the undone future
        self.future.clear();
    }

    /// Undo the most recent entry. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, store: &mut TreeStore) -> Result<bool, HistoryError> {
        self.end_batch();
        self.chain_open = false;

        let Some(action) = self.past.pop() else {
            return Ok(false);
        };

        match replay_all(&action.inverse, store) {
            Ok(()) => {
                self.future.push(action);
                Ok(true)
            }
            Err(source) => Err(self.inconsistent("undo", source)),
        }
    }

    /// Redo the most recently undone entry. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, store: &mut TreeStore) -> Result<bool, HistoryError> {
        self.end_batch();
        self.chain_open = false;

        let Some(action) = self.future.pop() else {
            return Ok(false);
        };

        match replay_all(&action.forward, store) {
            Ok(()) => {
                self.past.push(action);
                Ok(true)
            }
            Err(source) => Err(self.inconsistent("redo", source)),
        }
    }

    fn inconsistent(&mut self, operation: &'static str, source: StoreError) -> HistoryError {
        tracing::error!(
            operation,
            error = %source,
            "History no longer matches the tree, clearing it"
        );
        self.clear();
        HistoryError::Inconsistent { operation, source }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.current_batch = None;
        self.chain_open = false;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.past.last().and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.future.last().and_then(|entry| entry.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay a list of mutations, rolling the store back if any step fails
fn replay_all(mutations: &[Mutation], store: &mut TreeStore) -> Result<(), StoreError> {
    let checkpoint = store.checkpoint();
    for mutation in mutations {
        if let Err(err) = mutation.replay(store) {
            store.rollback(checkpoint);
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::Node;
    use serde_json::json;

    fn store() -> TreeStore {
        let mut store = TreeStore::new(Node::canvas("ROOT", "ContainerBlock"));
        store
            .add_node(Node::new("t", "TextBlock").with_prop("text", "Hello"), "ROOT", 0)
            .unwrap();
        store
    }

    fn set_text(text: &str) -> Mutation {
        Mutation::SetProp {
            node_id: NodeId::from("t"),
            key: "text".to_string(),
            value: json!(text),
        }
    }

    fn text_of(store: &TreeStore) -> Option<&str> {
        store.get_node("t").and_then(|node| node.prop_str("text"))
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_apply_undo_redo() {
        let mut store = store();
        let mut history = History::new();

        history.apply(&set_text("World"), &mut store).unwrap();
        assert_eq!(text_of(&store), Some("World"));

        assert!(history.undo(&mut store).unwrap());
        assert_eq!(text_of(&store), Some("Hello"));
        assert!(history.can_redo());

        assert!(history.redo(&mut store).unwrap());
        assert_eq!(text_of(&store), Some("World"));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_empty_stacks_are_not_errors() {
        let mut store = store();
        let mut history = History::new();

        assert_eq!(history.undo(&mut store), Ok(false));
        assert_eq!(history.redo(&mut store), Ok(false));
    }

    #[test]
    fn test_batched_mutations() {
        let mut store = store();
        let mut history = History::new();

        history.begin_batch();
        history.set_batch_description("Rewrite greeting");
        history.apply(&set_text("World"), &mut store).unwrap();
        history
            .apply(
                &Mutation::SetHidden {
                    node_id: NodeId::from("t"),
                    hidden: true,
                },
                &mut store,
            )
            .unwrap();
        history.end_batch();

        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.undo_description(), Some("Rewrite greeting"));

        history.undo(&mut store).unwrap();
        assert_eq!(text_of(&store), Some("Hello"));
        assert!(!store.get_node("t").unwrap().hidden);
    }

    #[test]
    fn test_same_key_edits_coalesce() {
        let mut store = store();
        let mut history = History::with_options(HistoryOptions {
            coalesce_window: None,
            ..HistoryOptions::default()
        });

        for text in ["W", "Wo", "World"] {
            history.apply(&set_text(text), &mut store).unwrap();
        }
        assert_eq!(history.undo_levels(), 1);

        history.undo(&mut store).unwrap();
        assert_eq!(text_of(&store), Some("Hello"));

        history.redo(&mut store).unwrap();
        assert_eq!(text_of(&store), Some("World"));
    }

    #[test]
    fn test_seal_and_window_break_the_chain() {
        let mut history = History::new();
        let start = Instant::now();
        let inverse = set_text("Hello");

        history.record(ReversibleAction::single(set_text("a"), inverse.clone()).with_recorded_at(start));
        history.seal();
        history.record(ReversibleAction::single(set_text("b"), inverse.clone()).with_recorded_at(start));
        assert_eq!(history.undo_levels(), 2);

        let late = start + Duration::from_secs(5);
        history.record(ReversibleAction::single(set_text("c"), inverse).with_recorded_at(late));
        assert_eq!(history.undo_levels(), 3);
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut store = store();
        let mut history = History::new();

        history.apply(&set_text("World"), &mut store).unwrap();
        history.undo(&mut store).unwrap();
        assert_eq!(history.redo_levels(), 1);

        history.apply(&set_text("Everyone"), &mut store).unwrap();
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut store = store();
        let mut history = History::with_max_levels(2);

        for i in 0..3 {
            history.apply(&set_text(&format!("Text {}", i)), &mut store).unwrap();
            history.seal();
        }

        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_failed_replay_clears_history() {
        let mut store = store();
        let mut history = History::new();

        history.apply(&set_text("World"), &mut store).unwrap();
        // Out-of-band delete leaves the recorded inverse pointing at nothing
        store.delete_node("t").unwrap();

        let err = history.undo(&mut store).unwrap_err();
        assert!(matches!(err, HistoryError::Inconsistent { operation: "undo", .. }));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
