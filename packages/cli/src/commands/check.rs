use super::{load_strict, open_store};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Page slug
    pub slug: String,
}

/// Validate a stored page document
pub async fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let page = load_strict(&store, &args.slug).await?;
    let tree = page
        .document
        .into_tree()
        .map_err(|e| anyhow!("{} is malformed: {}", page.slug, e))?;

    let unknown: Vec<String> = tree
        .iter_preorder()
        .filter(|node| !node.kind().is_known())
        .map(|node| format!("{} ({})", node.id, node.type_name))
        .collect();

    println!("{} {} is valid ({} nodes)", "✓".green(), page.slug, tree.len());
    for entry in &unknown {
        println!("  {} unknown block kind: {}", "⚠️".yellow(), entry);
    }

    Ok(())
}
