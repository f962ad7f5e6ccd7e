use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_pages::PageStore;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Page title
    pub title: String,

    /// Slug to store the page under (derived from the title by default)
    #[arg(short, long)]
    pub slug: Option<String>,
}

pub async fn create(args: CreateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let metadata = store.create(&args.title, args.slug.as_deref()).await?;

    println!(
        "{} Created page \"{}\" → {}",
        "✓".green(),
        metadata.title,
        store.document_path(&metadata.slug).display()
    );
    Ok(())
}
