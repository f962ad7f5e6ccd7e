use super::open_store;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_compiler_html::{compile_to_html, CompileOptions, RenderMode};
use pagecraft_pages::load_or;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page slug
    pub slug: String,

    /// Include hidden blocks (editor preview)
    #[arg(long)]
    pub edit: bool,

    /// Indent the markup (overrides config)
    #[arg(long)]
    pub pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let page = load_or(&store, &args.slug, &config.default_slug).await?;
    let tree = page.document.into_tree()?;

    let options = CompileOptions {
        mode: if args.edit { RenderMode::Edit } else { RenderMode::Publish },
        pretty: args.pretty || config.render.pretty,
        ..CompileOptions::default()
    };
    let html = compile_to_html(&tree, &options);

    match args.output {
        Some(path) => {
            fs::write(&path, html)?;
            eprintln!("{} {} → {}", "✓".green(), page.slug, path.display());
        }
        None => println!("{}", html),
    }

    Ok(())
}
