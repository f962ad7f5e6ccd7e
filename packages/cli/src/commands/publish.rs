use super::{load_strict, open_store};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::EditSession;
use pagecraft_pages::save_session;

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Page slug
    pub slug: String,
}

/// Re-render a page's published markup from its stored document
pub async fn publish(args: PublishArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let page = load_strict(&store, &args.slug).await?;
    let session = EditSession::from_document(&page.slug, page.document, config.history_options())?;
    save_session(&store, &session).await?;

    println!(
        "{} Published {} → {}",
        "✓".green(),
        page.slug,
        store.markup_path(&page.slug).display()
    );
    Ok(())
}
