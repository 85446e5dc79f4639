use anyhow::Result;
use colored::Colorize;
use fitpal::{
    auth::{IdentityProvider, LocalIdentityProvider},
    db::DB,
    error::AuthError,
};

use crate::{OutputFmt, cli::AuthCmd, commands::password_or_stdin};

pub async fn handle(cmd: AuthCmd, pool: DB, fmt: OutputFmt) -> Result<()> {
    let provider = LocalIdentityProvider::new(pool);

    match cmd {
        AuthCmd::Signup { email, password } => {
            let password = password_or_stdin(password).await?;
            match provider.sign_up(&email, &password).await {
                Ok(who) => println!(
                    "{} account created, signed in as {}",
                    "ok:".green().bold(),
                    who.email.as_deref().unwrap_or(&who.uid).bold()
                ),
                Err(e) => report(e)?,
            }
        }

        AuthCmd::Login { email, password } => {
            let password = password_or_stdin(password).await?;
            match provider.sign_in(&email, &password).await {
                Ok(who) => println!(
                    "{} signed in as {}",
                    "ok:".green().bold(),
                    who.email.as_deref().unwrap_or(&who.uid).bold()
                ),
                Err(e) => report(e)?,
            }
        }

        AuthCmd::Logout => {
            provider.sign_out().await?;
            println!("{} signed out", "ok:".green().bold());
        }

        AuthCmd::Whoami => {
            let who = provider.restore().await?;
            if fmt == OutputFmt::Json {
                println!("{}", serde_json::to_string_pretty(&who)?);
                return Ok(());
            }
            match who {
                Some(who) => println!(
                    "{} {} ({})",
                    "signed in:".cyan().bold(),
                    who.email.as_deref().unwrap_or("-").bold(),
                    who.uid.dimmed()
                ),
                None => println!("{} not signed in", "info:".blue().bold()),
            }
        }

        AuthCmd::ResetPassword { email } => match provider.send_password_reset(&email).await {
            Ok(ticket) => {
                println!(
                    "{} password reset issued for {}",
                    "ok:".green().bold(),
                    ticket.email.bold()
                );
                println!(
                    "  run `fitpal auth confirm-reset {}` to choose a new password",
                    ticket.token.yellow()
                );
            }
            Err(e) => report(e)?,
        },

        AuthCmd::ConfirmReset { token, password } => {
            let password = password_or_stdin(password).await?;
            match provider.confirm_password_reset(&token, &password).await {
                Ok(()) => println!("{} password updated", "ok:".green().bold()),
                Err(e) => report(e)?,
            }
        }
    }

    Ok(())
}

/// User mistakes are printed; database failures abort the command.
fn report(e: AuthError) -> Result<()> {
    match e {
        AuthError::Database(_) => Err(e.into()),
        e => {
            println!("{} {}", "error:".red().bold(), e);
            Ok(())
        }
    }
}
