//! commitsmith - CLI entry point.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commitsmith::cli::App;
use commitsmith::config::{Config, check_git_installed};
use commitsmith::i18n::Language;
use commitsmith::{ChatClient, SystemGit};

/// Compose Conventional Commits messages with AI assistance.
#[derive(Parser, Debug)]
#[command(name = "commitsmith")]
#[command(about = "Compose Conventional Commits messages from staged changes with AI assistance")]
#[command(version)]
struct Cli {
    /// Language for prompts and messages (en or es). Asked interactively when unset
    #[arg(short, long)]
    lang: Option<Language>,

    /// Show debug logs on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "commitsmith=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Check prerequisites
    check_git_installed().context("git is required")?;

    let git = SystemGit::discover(Path::new("."))
        .context("Run commitsmith from within a git repository")?;

    // Step 2: Load configuration, flags take precedence
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(lang) = cli.lang {
        config.language = Some(lang);
    }
    tracing::debug!(?config, "Loaded configuration");

    // Step 3: Run the menu
    let client = ChatClient::new(config.ai.clone());
    App::new(&git, &client, &config)
        .run()
        .await
        .context("Interactive session failed")?;

    Ok(())
}
