use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use fitpal::{
    auth::{IdentityProvider, LocalIdentityProvider},
    db::DB,
    history::{HISTORY_LIMIT, HistoryReader, HistoryView},
    store::SqliteReportStore,
};

use crate::{OutputFmt, commands::restore_in_background};

pub async fn handle(pool: DB, fmt: OutputFmt) -> Result<()> {
    let provider = Arc::new(LocalIdentityProvider::new(pool.clone()));
    let store = SqliteReportStore::new(pool);

    let signal = provider.subscribe();
    restore_in_background(&provider);

    let view = HistoryReader::new(signal, &store).load().await;

    if fmt == OutputFmt::Json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        HistoryView::Unauthenticated => println!(
            "{} sign in to see your workout history (`fitpal auth login <email>`)",
            "warning:".yellow().bold()
        ),
        HistoryView::Empty => println!("{} no workouts recorded yet", "info:".blue().bold()),
        HistoryView::Failed(msg) => {
            println!("{} could not load history: {}", "error:".red().bold(), msg)
        }
        HistoryView::Entries(entries) => {
            println!("{}", "Recent Workout History".cyan().bold());
            println!(
                "{}\n",
                format!("Your last {} workout sessions", HISTORY_LIMIT).dimmed()
            );

            let width = entries.iter().map(|e| e.exercise.len()).max().unwrap_or(0);
            for entry in &entries {
                println!(
                    "{} {:<width$}  {} reps",
                    "▌".green(),
                    entry.exercise.bold(),
                    entry.reps.to_string().yellow(),
                    width = width
                );
                println!(
                    "  {:<width$}  {} min · {:.1} kcal",
                    entry.date.dimmed(),
                    entry.minutes,
                    entry.calories,
                    width = width
                );
            }
        }
    }

    Ok(())
}
