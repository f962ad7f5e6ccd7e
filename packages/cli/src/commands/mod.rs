pub mod check;
pub mod create;
pub mod edit;
pub mod init;
pub mod list;
pub mod publish;
pub mod render;

pub use check::{check, CheckArgs};
pub use create::{create, CreateArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::list;
pub use publish::{publish, PublishArgs};
pub use render::{render, RenderArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use pagecraft_pages::{normalize_slug, FileStore, PageStore, StoredPage};

fn open_store(config: &Config, cwd: &str) -> FileStore {
    FileStore::new(config.get_pages_dir(cwd))
}

/// Load a page without falling back to the default one
async fn load_strict(store: &FileStore, slug: &str) -> Result<StoredPage> {
    let slug = normalize_slug(slug);
    if !store.exists(&slug).await? {
        return Err(anyhow!("Page does not exist: {}", slug));
    }
    Ok(store.get(&slug).await?)
}
