//! Pages on disk: `<dir>/<slug>.json`, `<slug>.html` and `<slug>.meta.json`.

use crate::{normalize_slug, PageMetadata, PageStore, StoreError, StoredPage};
use async_trait::async_trait;
use pagecraft_model::Document;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document_path(&self, slug: &str) -> PathBuf {
        self.page_path(slug, "json")
    }

    pub fn markup_path(&self, slug: &str) -> PathBuf {
        self.page_path(slug, "html")
    }

    pub fn metadata_path(&self, slug: &str) -> PathBuf {
        self.page_path(slug, "meta.json")
    }

    // Normalized slugs hold no separators or dots, so every path stays in `dir`
    fn page_path(&self, slug: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", normalize_slug(slug), extension))
    }

    async fn read_metadata(&self, slug: &str) -> Result<Option<PageMetadata>, StoreError> {
        match read_optional(&self.metadata_path(slug)).await? {
            Some(source) => Ok(Some(serde_json::from_str(&source)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PageStore for FileStore {
    async fn get(&self, slug: &str) -> Result<StoredPage, StoreError> {
        let slug = normalize_slug(slug);
        let source = read_optional(&self.document_path(&slug))
            .await?
            .ok_or_else(|| StoreError::NotFound(slug.clone()))?;
        let document = Document::from_json(&source)?;
        let markup = read_optional(&self.markup_path(&slug)).await?;
        let metadata = match self.read_metadata(&slug).await? {
            Some(metadata) => metadata,
            None => PageMetadata::derived(&slug),
        };

        Ok(StoredPage {
            slug,
            document,
            markup,
            metadata,
        })
    }

    async fn put(&self, slug: &str, document: &Document, markup: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.document_path(slug), document.to_json_pretty()?).await?;
        tokio::fs::write(self.markup_path(slug), markup).await?;

        if let Some(mut metadata) = self.read_metadata(slug).await? {
            metadata.touch();
            self.put_metadata(&metadata).await?;
        }

        tracing::debug!(slug = %normalize_slug(slug), dir = %self.dir.display(), "Wrote page files");
        Ok(())
    }

    async fn put_metadata(&self, metadata: &PageMetadata) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let source = serde_json::to_string_pretty(metadata)?;
        tokio::fs::write(self.metadata_path(&metadata.slug), source).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PageMetadata>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        // A page is listed once its markup has been written
        let mut slugs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(slug) = name.to_str().and_then(|name| name.strip_suffix(".html")) {
                slugs.push(slug.to_string());
            }
        }
        slugs.sort();

        let mut pages = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let metadata = match self.read_metadata(&slug).await {
                Ok(Some(metadata)) => metadata,
                Ok(None) => PageMetadata::derived(&slug),
                Err(err) => {
                    tracing::warn!(slug = %slug, error = %err, "Unreadable page metadata");
                    PageMetadata::derived(&slug)
                }
            };
            pages.push(metadata);
        }

        Ok(pages)
    }

    async fn exists(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.document_path(slug)).await?)
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => Ok(Some(source)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
