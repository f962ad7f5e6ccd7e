//! The persistence gateway and the page-level flows built on it.

use crate::{normalize_slug, PageMetadata, StoreError, DEFAULT_SLUG};
use async_trait::async_trait;
use pagecraft_compiler_html::{compile_to_html, CompileOptions};
use pagecraft_editor::EditSession;
use pagecraft_model::{BlockKind, Document, Node, Tree, ROOT_ID};

/// A page as loaded from storage
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub slug: String,
    pub document: Document,
    /// Last published markup, if any was saved
    pub markup: Option<String>,
    pub metadata: PageMetadata,
}

/// Storage for page documents, markup and metadata, keyed by slug.
///
/// Implementations key pages by [`normalize_slug`] of the slug they are
/// given. Saving overwrites the whole page; there is no revision check.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Load one page. `StoreError::NotFound` if it does not exist.
    async fn get(&self, slug: &str) -> Result<StoredPage, StoreError>;

    /// Save a document and its markup, replacing whatever was there
    async fn put(&self, slug: &str, document: &Document, markup: &str) -> Result<(), StoreError>;

    async fn put_metadata(&self, metadata: &PageMetadata) -> Result<(), StoreError>;

    /// Metadata of every stored page, ordered by slug
    async fn list(&self) -> Result<Vec<PageMetadata>, StoreError>;

    async fn exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Create a page holding the default container tree
    async fn create(&self, title: &str, slug: Option<&str>) -> Result<PageMetadata, StoreError> {
        let slug = normalize_slug(slug.unwrap_or(title));
        if self.exists(&slug).await? {
            return Err(StoreError::AlreadyExists(slug));
        }

        let tree = default_tree();
        let metadata = PageMetadata::new(title, &slug);
        self.put_metadata(&metadata).await?;
        self.put(
            &slug,
            &Document::from_tree(&tree),
            &compile_to_html(&tree, &CompileOptions::default()),
        )
        .await?;

        tracing::info!(slug = %slug, title = %metadata.title, "Created page");
        Ok(metadata)
    }
}

/// Tree of a freshly created page: one empty container
pub fn default_tree() -> Tree {
    Tree::with_root(Node::from_block(ROOT_ID, &BlockKind::Container))
}

/// Load `slug`, falling back to the default page when it is missing.
///
/// Callers that must not fall back should check [`PageStore::exists`] first.
pub async fn load_or_default<S>(store: &S, slug: &str) -> Result<StoredPage, StoreError>
where
    S: PageStore + ?Sized,
{
    load_or(store, slug, DEFAULT_SLUG).await
}

/// Load `slug`, falling back to `fallback` when it is missing
pub async fn load_or<S>(store: &S, slug: &str, fallback: &str) -> Result<StoredPage, StoreError>
where
    S: PageStore + ?Sized,
{
    let slug = normalize_slug(slug);
    let fallback = normalize_slug(fallback);
    match store.get(&slug).await {
        Err(StoreError::NotFound(_)) if slug != fallback => {
            tracing::warn!(slug = %slug, fallback = %fallback, "Page not found, loading fallback");
            store.get(&fallback).await
        }
        other => other,
    }
}

/// Snapshot the session, render it for publishing and save both
pub async fn save_session<S>(store: &S, session: &EditSession) -> Result<(), StoreError>
where
    S: PageStore + ?Sized,
{
    let slug = normalize_slug(session.slug());
    let (document, markup) = session.publish();
    store.put(&slug, &document, &markup).await?;

    tracing::info!(
        slug = %slug,
        nodes = document.len(),
        version = session.version(),
        "Saved page"
    );
    Ok(())
}
