use crate::slug::title_from_slug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing information stored next to a page (`<slug>.meta.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageMetadata {
    /// Metadata for a page created now. An empty title falls back to the slug.
    pub fn new(title: &str, slug: &str) -> Self {
        let now = Utc::now();
        Self {
            title: if title.is_empty() { slug.to_string() } else { title.to_string() },
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Metadata for a page that was saved without any
    pub fn derived(slug: &str) -> Self {
        Self::new(&title_from_slug(slug), slug)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
