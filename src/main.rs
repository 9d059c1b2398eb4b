mod daemon;

use clap::Parser;
use daemon::config::Config;
use daemon::deploy::ShellRunner;
use daemon::repo_config::Registry;
use daemon::server::{self, AppState};
use daemon::{git_ops, logging};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs deploy commands when a configured repository gets a push webhook.
#[derive(Parser)]
struct Cli {
    /// Path to config JSON (or TOML)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
    /// Check that every configured path is a checkout of its URL, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    logging::init();

    let config = Config::load_config(&args.config)?;
    let registry = Arc::new(Registry::new(&config.repositories));
    info!("Loaded {} repositories from {}", registry.len(), args.config.display());
    if registry.is_empty() {
        warn!("No repositories configured, every push will be rejected");
    }

    if args.check {
        git_ops::verify_repositories(&registry)?;
        return Ok(());
    }
    git_ops::check_repositories(&registry);

    let state = AppState {
        registry,
        runner: Arc::new(ShellRunner),
    };
    server::serve(config.port, state).await?;
    Ok(())
}
