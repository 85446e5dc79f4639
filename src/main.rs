use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use fitpal::{config::Config, db, logging};

mod cli;
mod commands;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    let config_path = Config::default_path()?;
    let config = Config::load(&config_path)?;

    if let Err(e) = logging::init(config.log_filter()) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    match cli.cmd {
        Commands::Config(cmd) => commands::config::handle(cmd, &config_path).await?,
        Commands::Train { exercise } => {
            let pool = open_db(&config).await?;
            commands::train::handle(&exercise, &config, pool).await?
        }
        Commands::History => {
            let pool = open_db(&config).await?;
            commands::history::handle(pool, fmt).await?
        }
        Commands::Auth(cmd) => {
            let pool = open_db(&config).await?;
            commands::auth::handle(cmd, pool, fmt).await?
        }
    }

    Ok(())
}

async fn open_db(config: &Config) -> Result<db::DB> {
    let path = config.database();
    db::open(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))
}
