use std::sync::Arc;

use anyhow::{Context, Result, bail};
use fitpal::auth::LocalIdentityProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

pub mod auth;
pub mod config;
pub mod history;
pub mod train;

/// Resolve the remembered sign-in without blocking the caller.
/// Consumers see `Pending` until this lands.
pub fn restore_in_background(provider: &Arc<LocalIdentityProvider>) {
    let provider = Arc::clone(provider);
    tokio::spawn(async move {
        if let Err(e) = provider.restore().await {
            error!(error = %e, "could not restore sign-in");
        }
    });
}

/// Use `given` or read one line from stdin.
pub async fn password_or_stdin(given: Option<String>) -> Result<String> {
    if let Some(p) = given {
        return Ok(p);
    }

    eprint!("password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}
