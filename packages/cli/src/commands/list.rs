use super::open_store;
use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use pagecraft_pages::PageStore;

pub async fn list(cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let pages = store.list().await?;
    if pages.is_empty() {
        println!("{}", "⚠️  No pages found".yellow());
        return Ok(());
    }

    for page in &pages {
        println!(
            "  {:<24} {:<32} {}",
            page.slug.bright_white(),
            page.title,
            page.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    println!();
    println!("{} pages", pages.len());

    Ok(())
}
