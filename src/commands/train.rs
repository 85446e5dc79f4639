use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use fitpal::{
    auth::{CurrentIdentity, LocalIdentityProvider},
    config::Config,
    db::DB,
    error::{PersistError, SessionError},
    models::Phase,
    persister::ReportPersister,
    session::{ReportDelivery, SessionController},
    store::{ReportStore, SqliteReportStore},
    trainer::{HttpTrainer, Trainer},
    types::ExerciseKind,
    utils,
};
use itertools::Itertools;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::restore_in_background;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Report,
    Feed,
    Status,
    Help,
    Quit,
}

impl Action {
    fn parse(input: &str) -> Option<Self> {
        Some(match input.to_ascii_lowercase().as_str() {
            "start" | "s" => Self::Start,
            "stop" | "end" | "e" => Self::Stop,
            "report" | "r" => Self::Report,
            "feed" | "f" => Self::Feed,
            "status" | "" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "q" | "back" | "exit" => Self::Quit,
            _ => return None,
        })
    }
}

/// Actions the page offers in `phase`.
fn offered(phase: Phase) -> &'static [&'static str] {
    match phase {
        Phase::Idle => &["start"],
        Phase::Active => &["stop", "feed"],
        Phase::Ended => &["report"],
    }
}

pub async fn handle(exercise: &str, config: &Config, pool: DB) -> Result<()> {
    let exercise = match exercise.parse::<ExerciseKind>() {
        Ok(kind) => kind,
        Err(e) => {
            println!("{} {}", "error:".red().bold(), e);
            if let Some(s) = e.suggestion {
                println!("  did you mean `{}`?", s.route_slug().green());
            }
            return Ok(());
        }
    };

    let provider = Arc::new(LocalIdentityProvider::new(pool.clone()));
    restore_in_background(&provider);

    let trainer = HttpTrainer::new(config.trainer_url(), config.timeout())?;
    // The provider re-reads the sign-in on every save, so `auth logout` in
    // another terminal takes effect here.
    let persister = ReportPersister::new(provider, SqliteReportStore::new(pool));
    let mut page = SessionController::new(exercise, trainer, persister);
    let teardown = page.teardown_handle();

    println!("{}", format!("{} Trainer", exercise.label()).cyan().bold());
    println!(
        "{}",
        "Position yourself in front of the camera and follow the instructions.".dimmed()
    );
    print_actions(page.phase());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut started_at: Option<DateTime<Local>> = None;

    loop {
        eprint!("{} ", format!("{}>", exercise).bold());

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let Some(action) = Action::parse(line.trim()) else {
            println!("{} unknown action `{}`", "warning:".yellow().bold(), line.trim());
            print_actions(page.phase());
            continue;
        };

        let outcome = match action {
            Action::Quit => break,
            Action::Help => {
                print_actions(page.phase());
                continue;
            }
            Action::Status => {
                print_status(&page, started_at);
                continue;
            }
            Action::Feed => {
                match page.video_feed() {
                    Some(url) => println!("{} {}", "live feed:".cyan().bold(), url),
                    None => println!(
                        "{} video feed will appear once the workout starts",
                        "info:".blue().bold()
                    ),
                }
                continue;
            }
            Action::Start | Action::Stop | Action::Report => {
                tokio::select! {
                    out = perform(&mut page, action) => out,
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        };

        match outcome {
            Ok(delivery) => {
                println!("{} {}", "ok:".green().bold(), page.state().status_message);
                match action {
                    Action::Start => {
                        started_at = Some(Local::now());
                        if let Some(url) = page.video_feed() {
                            println!("{} {}", "live feed:".cyan().bold(), url);
                        }
                    }
                    Action::Stop => {
                        if let Some(t) = started_at.take() {
                            println!(
                                "{} {}",
                                "elapsed:".dimmed(),
                                utils::format_duration(Local::now() - t)
                            );
                        }
                    }
                    _ => {}
                }
                if let Some(delivery) = delivery {
                    print_report(&delivery);
                }
                print_actions(page.phase());
            }
            Err(SessionError::WrongPhase { action, .. }) => {
                println!(
                    "{} `{}` is not available right now",
                    "warning:".yellow().bold(),
                    action
                );
                print_actions(page.phase());
            }
            Err(SessionError::Remote(e)) => {
                println!("{} {}", "error:".red().bold(), page.state().status_message);
                println!("  {}", e.to_string().dimmed());
            }
            Err(SessionError::Stale) => break,
        }
    }

    // Leaving the page discards the session; late responses are ignored.
    teardown.teardown();
    Ok(())
}

async fn perform<T: Trainer, S: ReportStore, A: CurrentIdentity>(
    page: &mut SessionController<T, S, A>,
    action: Action,
) -> Result<Option<ReportDelivery>, SessionError> {
    match action {
        Action::Start => page.start().await.map(|_| None),
        Action::Stop => page.stop().await.map(|_| None),
        _ => page.generate_report().await.map(Some),
    }
}

fn print_actions(phase: Phase) {
    let actions = offered(phase)
        .iter()
        .chain(["status", "help", "quit"].iter())
        .map(|a| a.green())
        .join(", ");
    println!("{} {}", "actions:".dimmed(), actions);
}

fn print_status<T: Trainer, S: ReportStore, A: CurrentIdentity>(
    page: &SessionController<T, S, A>,
    started_at: Option<DateTime<Local>>,
) {
    let state = page.state();
    let phase = match state.phase {
        Phase::Idle => "idle".normal(),
        Phase::Active => "running".green(),
        Phase::Ended => "ended".yellow(),
    };
    println!("{} {}", "phase:".cyan().bold(), phase);

    if !state.status_message.is_empty() {
        println!("{} {}", "status:".cyan().bold(), state.status_message);
    }
    if let (Phase::Active, Some(t)) = (state.phase, started_at) {
        println!(
            "{} {}",
            "elapsed:".cyan().bold(),
            utils::format_duration(Local::now() - t)
        );
    }
    if let Some(url) = page.video_feed() {
        println!("{} {}", "live feed:".cyan().bold(), url);
    }
    if let Some(report) = &state.report {
        println!(
            "{} {} reps, {:.0} s, {:.1} kcal",
            "last report:".cyan().bold(),
            report.reps(),
            report.duration_seconds(),
            report.calories()
        );
    }
}

fn print_report(delivery: &ReportDelivery) {
    let report = &delivery.report;

    println!("\n{}", "Workout Summary".cyan().bold());
    println!(
        "  ✅ You completed {} {}!",
        report.reps().to_string().bold(),
        report.exercise().label().to_lowercase()
    );
    println!("  ⏱️  Duration: {} seconds", report.duration_seconds());
    println!("  🔥 Estimated Calories Burned: {} kcal\n", report.calories());

    match &delivery.saved {
        Ok(saved) => println!(
            "{} report saved to your history ({})",
            "ok:".green().bold(),
            saved.id.dimmed()
        ),
        Err(PersistError::Unauthenticated) => println!(
            "{} you are not signed in, this report was not saved (`fitpal auth login <email>`)",
            "warning:".yellow().bold()
        ),
        Err(e) => println!("{} {}", "error:".red().bold(), e),
    }
}
