//! # Pagecraft Pages
//!
//! Persistence for page documents. A [`PageStore`] keeps, per slug, the
//! persisted document, its last published markup and listing metadata.
//!
//! - [`FileStore`]: one directory, three files per page
//! - [`MemoryStore`]: a map behind an async lock
//!
//! Slugs are normalized to `[a-z0-9-]` with [`normalize_slug`]; lookups of a
//! missing page fall back to `home` via [`load_or_default`].

mod error;
mod file_store;
mod memory_store;
mod metadata;
mod slug;
mod store;

pub use error::StoreError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use metadata::PageMetadata;
pub use slug::{normalize_slug, title_from_slug, DEFAULT_SLUG};
pub use store::{default_tree, load_or, load_or_default, save_session, PageStore, StoredPage};
