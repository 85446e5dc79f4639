use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::{auth::AuthSignal, models::PersistedReport, store::ReportStore, utils};

/// How many reports the history page shows.
pub const HISTORY_LIMIT: u32 = 5;

/// One row of the history page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub exercise: String,
    pub date: String,
    pub reps: u32,
    pub minutes: i64,
    pub calories: f64,
}

impl HistoryEntry {
    pub fn from_report(report: &PersistedReport) -> Self {
        Self {
            id: report.id.clone(),
            exercise: report.exercise.label().to_string(),
            date: format_date(report.created_at),
            reps: report.reps,
            minutes: utils::whole_minutes(report.duration_seconds),
            calories: report.calories,
        }
    }
}

/// What the history page settles into for one activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum HistoryView {
    /// Nobody signed in; no read was made.
    Unauthenticated,
    Empty,
    Entries(Vec<HistoryEntry>),
    /// The read failed. Not retried.
    Failed(String),
}

/// Loads the signed-in user's most recent reports.
pub struct HistoryReader<'a, S> {
    auth: AuthSignal,
    store: &'a S,
}

impl<'a, S: ReportStore> HistoryReader<'a, S> {
    pub fn new(auth: AuthSignal, store: &'a S) -> Self {
        Self { auth, store }
    }

    /// Wait for the identity to resolve, then make exactly one read.
    /// Every call is a fresh read.
    pub async fn load(&mut self) -> HistoryView {
        let Some(identity) = self.auth.resolved().await else {
            info!("history requested while signed out");
            return HistoryView::Unauthenticated;
        };

        match self.store.recent(&identity.uid, HISTORY_LIMIT).await {
            Ok(reports) if reports.is_empty() => HistoryView::Empty,
            Ok(reports) => {
                HistoryView::Entries(reports.iter().map(HistoryEntry::from_report).collect())
            }
            Err(e) => {
                error!(error = %e, uid = %identity.uid, "failed to load history");
                HistoryView::Failed(e.to_string())
            }
        }
    }
}

/// "March 22, 2025" in local time.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExerciseKind;
    use chrono::TimeZone;

    #[test]
    fn entry_rounds_duration_and_labels_exercise() {
        let report = PersistedReport {
            id: "r1".into(),
            user_id: "u1".into(),
            exercise: ExerciseKind::BicepCurl,
            reps: 25,
            duration_seconds: 20.0,
            calories: 7.0,
            created_at: Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap(),
            saved_at: Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 1).unwrap(),
        };

        let entry = HistoryEntry::from_report(&report);
        assert_eq!(entry.exercise, "Bicep Curls");
        assert_eq!(entry.minutes, 1);
        assert_eq!(entry.reps, 25);
        assert!(entry.date.contains("2025"));
        assert!(entry.date.starts_with("March"));
    }
}
