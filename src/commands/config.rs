use std::path::Path;

use crate::cli::ConfigCmd;
use anyhow::Result;
use colored::Colorize;
use fitpal::{
    config::{Config, KNOWN_KEYS},
    error::ConfigError,
};

pub async fn handle(cmd: ConfigCmd, config_path: &Path) -> Result<()> {
    let mut cfg = Config::load(config_path)?;

    match cmd {
        ConfigCmd::List => {
            if cfg.map.is_empty() {
                println!("{}", "(no config set)".dimmed());
            } else {
                println!("{}", "Config:".cyan().bold());
                for (k, v) in &cfg.map {
                    println!("  {} = {}", k.green(), v);
                }
            }
            println!(
                "{} {}",
                "file:".dimmed(),
                config_path.display().to_string().dimmed()
            );
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => println!("{} key `{}` not found", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => match cfg.set(&key, &val) {
            Ok(()) => {
                cfg.save(config_path)?;
                println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
            }
            Err(e @ (ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. })) => {
                println!("{} {}", "error:".red().bold(), e);
                println!("  known keys: {}", KNOWN_KEYS.join(", ").dimmed());
            }
            Err(e) => return Err(e.into()),
        },

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
