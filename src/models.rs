use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ExerciseKind;

/// Where a session is in its Idle → Active → Ended lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Active,
    Ended,
}

/// State of one mounted exercise page.
/// Discarded with its controller; never shared between exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub exercise: ExerciseKind,
    pub phase: Phase,
    pub status_message: String,
    pub report: Option<WorkoutReport>,
}

impl SessionState {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self {
            exercise,
            phase: Phase::Idle,
            status_message: String::new(),
            report: None,
        }
    }
}

/// Summary produced by the trainer at the end of a session.
///
/// Fields are private so a report cannot change after it is built; a new
/// generation produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutReport {
    exercise: ExerciseKind,
    reps: u32,
    duration_seconds: f64,
    calories: f64,
    created_at: DateTime<Utc>,
}

impl WorkoutReport {
    pub fn new(
        exercise: ExerciseKind,
        reps: u32,
        duration_seconds: f64,
        calories: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            exercise,
            reps,
            duration_seconds,
            calories,
            created_at,
        }
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The record handed to the store for a single write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReportRecord {
    pub exercise: ExerciseKind,
    pub reps: u32,
    pub duration_seconds: f64,
    pub calories: f64,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

impl NewReportRecord {
    pub fn from_report(report: &WorkoutReport, user_id: impl Into<String>) -> Self {
        Self {
            exercise: report.exercise(),
            reps: report.reps(),
            duration_seconds: report.duration_seconds(),
            calories: report.calories(),
            created_at: report.created_at(),
            user_id: user_id.into(),
        }
    }
}

/// A report as held by the store, owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedReport {
    pub id: String,
    pub user_id: String,
    pub exercise: ExerciseKind,
    pub reps: u32,
    pub duration_seconds: f64,
    pub calories: f64,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

/// Handle to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}

/// Value published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not reported yet.
    Pending,
    Resolved(Option<Identity>),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Resolved(Some(id)) => Some(id),
            _ => None,
        }
    }
}
