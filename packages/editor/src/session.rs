//! # Edit Session
//!
//! One open page: the tree store, its history and the slug it is saved under.
//! Every edit goes through the history so it can be undone.

use crate::{EditorError, History, HistoryOptions, Mutation, TreeStore};
use pagecraft_compiler_html::{compile_to_html, CompileOptions, RenderMode};
use pagecraft_model::{BlockKind, Document, Node, NodeId, Tree};
use serde_json::Value;

#[derive(Debug)]
pub struct EditSession {
    slug: String,
    store: TreeStore,
    history: History,
}

impl EditSession {
    pub fn new(slug: impl Into<String>, tree: Tree) -> Self {
        Self::with_options(slug, tree, HistoryOptions::default())
    }

    pub fn with_options(slug: impl Into<String>, tree: Tree, options: HistoryOptions) -> Self {
        let slug = slug.into();
        Self {
            store: TreeStore::from_tree_seeded(tree, &slug),
            history: History::with_options(options),
            slug,
        }
    }

    /// Open a session on a persisted document
    pub fn from_document(
        slug: impl Into<String>,
        document: Document,
        options: HistoryOptions,
    ) -> Result<Self, EditorError> {
        let tree = document.into_tree()?;
        Ok(Self::with_options(slug, tree, options))
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        self.history.apply(&mutation, &mut self.store)?;
        Ok(())
    }

    // ── Convenience edits ───────────────────────────────────────────────

    pub fn add_node(&mut self, node: Node, parent_id: &str, index: usize) -> Result<NodeId, EditorError> {
        let id = node.id.clone();
        self.apply(Mutation::AddNode {
            parent_id: NodeId::from(parent_id),
            index,
            node,
        })?;
        Ok(id)
    }

    /// Add a block with its default props under a freshly generated id
    pub fn add_block(&mut self, kind: &BlockKind, parent_id: &str, index: usize) -> Result<NodeId, EditorError> {
        let id = self.store.next_id();
        self.add_node(Node::from_block(id, kind), parent_id, index)
    }

    pub fn move_node(&mut self, id: &str, new_parent_id: &str, index: usize) -> Result<(), EditorError> {
        self.apply(Mutation::MoveNode {
            node_id: NodeId::from(id),
            new_parent_id: NodeId::from(new_parent_id),
            index,
        })
    }

    pub fn delete_node(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteNode {
            node_id: NodeId::from(id),
        })
    }

    pub fn set_prop(&mut self, id: &str, key: &str, value: impl Into<Value>) -> Result<(), EditorError> {
        self.apply(Mutation::SetProp {
            node_id: NodeId::from(id),
            key: key.to_string(),
            value: value.into(),
        })
    }

    pub fn remove_prop(&mut self, id: &str, key: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveProp {
            node_id: NodeId::from(id),
            key: key.to_string(),
        })
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> Result<(), EditorError> {
        self.apply(Mutation::SetHidden {
            node_id: NodeId::from(id),
            hidden,
        })
    }

    pub fn set_display_name(&mut self, id: &str, name: &str) -> Result<(), EditorError> {
        self.apply(Mutation::SetDisplayName {
            node_id: NodeId::from(id),
            name: name.to_string(),
        })
    }

    // ── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        Ok(self.history.undo(&mut self.store)?)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        Ok(self.history.redo(&mut self.store)?)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Stop coalescing the current run of edits (e.g. on input blur)
    pub fn seal_history(&mut self) {
        self.history.seal();
    }

    // ── Output ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Tree {
        self.store.snapshot()
    }

    pub fn to_document(&self) -> Document {
        Document::from_tree(self.store.tree())
    }

    pub fn render(&self, mode: RenderMode) -> String {
        self.render_with(&CompileOptions::for_mode(mode))
    }

    pub fn render_with(&self, options: &CompileOptions) -> String {
        compile_to_html(self.store.tree(), options)
    }

    /// The persisted document and its published markup
    pub fn publish(&self) -> (Document, String) {
        (self.to_document(), self.render(RenderMode::Publish))
    }

    /// Swap in a freshly loaded document. On error the working tree is untouched.
    pub fn replace_from_document(&mut self, document: Document) -> Result<(), EditorError> {
        let tree = document.into_tree()?;
        self.store = TreeStore::from_tree_seeded(tree, &self.slug);
        self.history.clear();

        tracing::debug!(slug = %self.slug, nodes = self.store.len(), "Replaced document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditSession {
        EditSession::new("home", Tree::with_root(Node::from_block("ROOT", &BlockKind::Container)))
    }

    #[test]
    fn test_add_block_generates_fresh_ids() {
        let mut session = session();
        let a = session.add_block(&BlockKind::Text, "ROOT", 0).unwrap();
        let b = session.add_block(&BlockKind::Text, "ROOT", 1).unwrap();

        assert_ne!(a, b);
        assert_eq!(session.store().get_children("ROOT"), &[a, b]);
    }

    #[test]
    fn test_batch_is_one_undo_step() {
        let mut session = session();
        session.begin_batch("Insert hero");
        let hero = session.add_block(&BlockKind::Container, "ROOT", 0).unwrap();
        session.add_block(&BlockKind::Heading, hero.as_str(), 0).unwrap();
        session.end_batch();

        assert_eq!(session.history().undo_description(), Some("Insert hero"));
        assert!(session.undo().unwrap());
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_publish_hides_hidden_nodes() {
        let mut session = session();
        let text = session.add_block(&BlockKind::Text, "ROOT", 0).unwrap();
        session.set_hidden(text.as_str(), true).unwrap();

        let (_, html) = session.publish();
        assert_eq!(html, r#"<div class="container"></div>"#);
        assert!(session.render(RenderMode::Edit).contains("Edit me"));
    }
}
