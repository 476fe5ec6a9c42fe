mod cli;
mod config;
mod error;
mod extract;
mod migrate;
mod model;
mod providers;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" | "info" | "warn" | "error" | "trace" => verbosity.to_lowercase(),
        _ => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("notion_jira={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbosity, &cli.log_format);

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Extract {
            database_id,
            output,
        } => cli::handle_extract(&config, database_id, &output).await,
        Command::Migrate { input, dry_run } => {
            cli::handle_migrate(&config, &input, dry_run).await
        }
    }
}
