//! In-memory page store for tests and embedding

use crate::{normalize_slug, PageMetadata, PageStore, StoreError, StoredPage};
use async_trait::async_trait;
use pagecraft_model::Document;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    document: Option<Document>,
    markup: Option<String>,
    metadata: Option<PageMetadata>,
}

/// Pages kept in a map; data is lost when the store is dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.pages
            .read()
            .await
            .values()
            .filter(|entry| entry.document.is_some())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn get(&self, slug: &str) -> Result<StoredPage, StoreError> {
        let slug = normalize_slug(slug);
        let pages = self.pages.read().await;
        let entry = pages
            .get(&slug)
            .filter(|entry| entry.document.is_some())
            .ok_or_else(|| StoreError::NotFound(slug.clone()))?;

        Ok(StoredPage {
            document: entry.document.clone().unwrap_or_default(),
            markup: entry.markup.clone(),
            metadata: entry
                .metadata
                .clone()
                .unwrap_or_else(|| PageMetadata::derived(&slug)),
            slug,
        })
    }

    async fn put(&self, slug: &str, document: &Document, markup: &str) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        let entry = pages.entry(normalize_slug(slug)).or_insert(Entry {
            document: None,
            markup: None,
            metadata: None,
        });

        entry.document = Some(document.clone());
        entry.markup = Some(markup.to_string());
        if let Some(metadata) = &mut entry.metadata {
            metadata.touch();
        }
        Ok(())
    }

    async fn put_metadata(&self, metadata: &PageMetadata) -> Result<(), StoreError> {
        let mut pages = self.pages.write().await;
        let entry = pages.entry(normalize_slug(&metadata.slug)).or_insert(Entry {
            document: None,
            markup: None,
            metadata: None,
        });
        entry.metadata = Some(metadata.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PageMetadata>, StoreError> {
        let pages = self.pages.read().await;
        Ok(pages
            .iter()
            .filter(|(_, entry)| entry.markup.is_some())
            .map(|(slug, entry)| {
                entry
                    .metadata
                    .clone()
                    .unwrap_or_else(|| PageMetadata::derived(slug))
            })
            .collect())
    }

    async fn exists(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self
            .pages
            .read()
            .await
            .get(&normalize_slug(slug))
            .map(|entry| entry.document.is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_or_default, save_session};
    use pagecraft_editor::EditSession;
    use pagecraft_model::BlockKind;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let metadata = store.create("About Us", None).await.unwrap();

        assert_eq!(metadata.slug, "about-us");
        let page = store.get("about-us").await.unwrap();
        assert_eq!(page.metadata.title, "About Us");
        assert_eq!(page.markup.as_deref(), Some(r#"<div class="container"></div>"#));
        assert_eq!(page.document.into_tree().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_refuses_existing_slug() {
        let store = MemoryStore::new();
        store.create("Home", None).await.unwrap();

        assert!(matches!(
            store.create("Other", Some("home")).await,
            Err(StoreError::AlreadyExists(slug)) if slug == "home"
        ));
    }

    #[tokio::test]
    async fn test_missing_page_falls_back_to_home() {
        let store = MemoryStore::new();
        store.create("Home", None).await.unwrap();

        let page = load_or_default(&store, "Nope").await.unwrap();
        assert_eq!(page.slug, "home");

        let store = MemoryStore::new();
        assert!(matches!(
            load_or_default(&store, "home").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_session_overwrites() {
        let store = MemoryStore::new();
        store.create("Home", None).await.unwrap();
        let page = store.get("home").await.unwrap();

        let mut session = EditSession::new("home", page.document.into_tree().unwrap());
        session.add_block(&BlockKind::Text, "ROOT", 0).unwrap();
        save_session(&store, &session).await.unwrap();

        let saved = store.get("home").await.unwrap();
        assert_eq!(saved.document, session.to_document());
        assert!(saved.markup.unwrap().contains("Edit me in settings panel"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_saved_slug_is_normalized() {
        let store = MemoryStore::new();
        let session = EditSession::new("About Us", crate::default_tree());
        save_session(&store, &session).await.unwrap();

        assert!(store.exists("about-us").await.unwrap());
        assert!(store.exists("About Us").await.unwrap());

        let page = load_or_default(&store, "About Us").await.unwrap();
        assert_eq!(page.slug, "about-us");
        let page = store.get("about-us").await.unwrap();
        assert_eq!(page.document, session.to_document());
    }

    #[tokio::test]
    async fn test_fallback_slug_is_normalized() {
        let store = MemoryStore::new();
        store.create("Landing Page", None).await.unwrap();

        let page = crate::load_or(&store, "missing", "Landing Page").await.unwrap();
        assert_eq!(page.slug, "landing-page");
    }
}
