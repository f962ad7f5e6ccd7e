use super::{load_strict, open_store};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_compiler_html::RenderMode;
use pagecraft_editor::{EditSession, Mutation};
use pagecraft_pages::save_session;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Page slug
    pub slug: String,

    /// JSON array of mutations to apply, in order
    pub mutations: PathBuf,

    /// Apply and report without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Apply a mutation file to a page as one undoable step and save it
pub async fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let source = fs::read_to_string(&args.mutations)
        .with_context(|| format!("Cannot read {}", args.mutations.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid mutation file {}", args.mutations.display()))?;

    let page = load_strict(&store, &args.slug).await?;
    let mut session = EditSession::from_document(&page.slug, page.document, config.history_options())?;

    session.begin_batch(args.mutations.display().to_string());
    for (i, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        session
            .apply(mutation)
            .map_err(|e| anyhow!("Mutation #{} ({}) failed: {}", i + 1, name, e))?;
        println!("  {} {}", "✓".green(), name);
    }
    session.end_batch();

    if args.dry_run {
        println!("{}", session.render(RenderMode::Publish));
        println!("{}", "(dry run, nothing saved)".dimmed());
        return Ok(());
    }

    save_session(&store, &session).await?;
    println!(
        "{} Saved {} ({} nodes)",
        "✅".green(),
        session.slug(),
        session.store().len()
    );
    Ok(())
}
