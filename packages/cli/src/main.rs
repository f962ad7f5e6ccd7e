mod commands;
mod config;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, create, edit, init, list, publish, render, CheckArgs, CreateArgs, EditArgs, InitArgs,
    PublishArgs, RenderArgs,
};
use tracing::Level;

/// Pagecraft CLI - build, edit and publish block-based pages
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagecraft project
    Init(InitArgs),

    /// Create a page with the default layout
    Create(CreateArgs),

    /// List stored pages
    List,

    /// Render a page to HTML
    Render(RenderArgs),

    /// Validate a stored page document
    Check(CheckArgs),

    /// Regenerate a page's published markup
    Publish(PublishArgs),

    /// Apply a mutation file to a page
    Edit(EditArgs),
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match command {
        Command::Init(args) => init(args, &cwd).await,
        Command::Create(args) => create(args, &cwd).await,
        Command::List => list(&cwd).await,
        Command::Render(args) => render(args, &cwd).await,
        Command::Check(args) => check(args, &cwd).await,
        Command::Publish(args) => publish(args, &cwd).await,
        Command::Edit(args) => edit(args, &cwd).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command).await {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
