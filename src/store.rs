use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{NewReportRecord, PersistedReport},
    types::ExerciseKind,
};

/// Per-user report collection.
pub trait ReportStore: Send + Sync {
    /// Append one record. Exactly one write per call.
    fn append(
        &self,
        record: NewReportRecord,
    ) -> impl Future<Output = Result<PersistedReport, StoreError>> + Send;

    /// Most recent reports owned by `user_id`, newest first, at most `limit`.
    fn recent(
        &self,
        user_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<PersistedReport>, StoreError>> + Send;
}

#[derive(Clone)]
pub struct SqliteReportStore {
    pool: SqlitePool,
}

type ReportRow = (String, String, ExerciseKind, i64, f64, f64, i64, i64);

impl SqliteReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReportStore for SqliteReportStore {
    async fn append(&self, record: NewReportRecord) -> Result<PersistedReport, StoreError> {
        let id = Uuid::new_v4().to_string();
        let saved_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO workouts
            (id, user_id, exercise, reps, duration_seconds, calories, created_at, saved_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&record.user_id)
        .bind(record.exercise)
        .bind(i64::from(record.reps))
        .bind(record.duration_seconds)
        .bind(record.calories)
        .bind(record.created_at.timestamp_millis())
        .bind(saved_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!(%id, user_id = %record.user_id, "report stored");

        Ok(PersistedReport {
            id,
            user_id: record.user_id,
            exercise: record.exercise,
            reps: record.reps,
            duration_seconds: record.duration_seconds,
            calories: record.calories,
            created_at: record.created_at,
            saved_at,
        })
    }

    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<PersistedReport>, StoreError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT id, user_id, exercise, reps, duration_seconds, calories, created_at, saved_at
            FROM workouts
            WHERE user_id = ?
            ORDER BY created_at DESC, saved_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_report).collect()
    }
}

fn row_to_report(row: ReportRow) -> Result<PersistedReport, StoreError> {
    let (id, user_id, exercise, reps, duration_seconds, calories, created_at, saved_at) = row;

    let corrupt = |reason: String| StoreError::CorruptRow {
        id: id.clone(),
        reason,
    };

    let reps = u32::try_from(reps).map_err(|_| corrupt(format!("reps out of range: {reps}")))?;
    let created_at = millis_to_utc(created_at)
        .ok_or_else(|| corrupt(format!("bad created_at: {created_at}")))?;
    let saved_at =
        millis_to_utc(saved_at).ok_or_else(|| corrupt(format!("bad saved_at: {saved_at}")))?;

    Ok(PersistedReport {
        id,
        user_id,
        exercise,
        reps,
        duration_seconds,
        calories,
        created_at,
        saved_at,
    })
}

fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
