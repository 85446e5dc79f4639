#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use chrono::Utc;
use fitpal::{
    auth::{AuthSignal, IdentityPublisher},
    error::{StoreError, TrainerError},
    models::{AuthState, Identity, NewReportRecord, PersistedReport},
    session::Teardown,
    store::ReportStore,
    trainer::{ReportResponse, Trainer, TrainerMessage},
    types::ExerciseKind,
};

/// Scripted trainer. Each call pops the next response for that route; an
/// empty script behaves like a 500.
#[derive(Clone, Default)]
pub struct FakeTrainer {
    inner: Arc<FakeTrainerInner>,
}

#[derive(Default)]
struct FakeTrainerInner {
    start: Mutex<VecDeque<Result<String, u16>>>,
    end: Mutex<VecDeque<Result<String, u16>>>,
    report: Mutex<VecDeque<Result<ReportResponse, u16>>>,
    calls: Mutex<Vec<String>>,
    /// Tear the session down while the next call is in flight.
    interrupt: Mutex<Option<Teardown>>,
}

impl FakeTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_ok(self, message: &str) -> Self {
        self.inner.start.lock().unwrap().push_back(Ok(message.into()));
        self
    }

    pub fn start_fails(self) -> Self {
        self.inner.start.lock().unwrap().push_back(Err(500));
        self
    }

    pub fn end_ok(self, message: &str) -> Self {
        self.inner.end.lock().unwrap().push_back(Ok(message.into()));
        self
    }

    pub fn end_fails(self) -> Self {
        self.inner.end.lock().unwrap().push_back(Err(503));
        self
    }

    pub fn report_ok(self, reps: u32, duration: f64, calories: f64) -> Self {
        self.inner.report.lock().unwrap().push_back(Ok(ReportResponse {
            message: format!("{reps} reps counted"),
            reps,
            duration,
            calories,
        }));
        self
    }

    pub fn report_raw(self, response: ReportResponse) -> Self {
        self.inner.report.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn report_fails(self) -> Self {
        self.inner.report.lock().unwrap().push_back(Err(500));
        self
    }

    pub fn interrupt_next_call(&self, teardown: Teardown) {
        *self.inner.interrupt.lock().unwrap() = Some(teardown);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    fn record(&self, route: String) {
        self.inner.calls.lock().unwrap().push(route);
        if let Some(t) = self.inner.interrupt.lock().unwrap().take() {
            t.teardown();
        }
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T, u16>>>, url: String) -> Result<T, TrainerError> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(v)) => Ok(v),
            Some(Err(status)) => Err(TrainerError::Status { url, status }),
            None => Err(TrainerError::Status { url, status: 500 }),
        }
    }
}

impl Trainer for FakeTrainer {
    async fn start(&self, exercise: ExerciseKind) -> Result<TrainerMessage, TrainerError> {
        let route = format!("start-{}", exercise.route_slug());
        self.record(route.clone());
        Self::pop(&self.inner.start, route).map(|message| TrainerMessage { message })
    }

    async fn end(&self, exercise: ExerciseKind) -> Result<TrainerMessage, TrainerError> {
        let route = format!("end-{}", exercise.route_slug());
        self.record(route.clone());
        Self::pop(&self.inner.end, route).map(|message| TrainerMessage { message })
    }

    async fn generate_report(&self, exercise: ExerciseKind) -> Result<ReportResponse, TrainerError> {
        let route = format!("generate-{}-report", exercise.route_slug());
        self.record(route.clone());
        Self::pop(&self.inner.report, route)
    }

    fn video_feed_url(&self, exercise: ExerciseKind) -> String {
        format!("http://trainer.test/video_feed/{}", exercise.as_str())
    }
}

/// In-memory store that counts every read and write.
#[derive(Clone, Default)]
pub struct RecordingStore {
    rows: Arc<Mutex<Vec<PersistedReport>>>,
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<PersistedReport> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Insert a row directly, bypassing the write counter.
    pub fn seed(&self, report: PersistedReport) {
        self.rows.lock().unwrap().push(report);
    }
}

impl ReportStore for RecordingStore {
    async fn append(&self, record: NewReportRecord) -> Result<PersistedReport, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        let saved = PersistedReport {
            id: format!("r{}", rows.len() + 1),
            user_id: record.user_id,
            exercise: record.exercise,
            reps: record.reps,
            duration_seconds: record.duration_seconds,
            calories: record.calories,
            created_at: record.created_at,
            saved_at: Utc::now(),
        };
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<PersistedReport>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut mine: Vec<PersistedReport> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine.truncate(limit as usize);
        Ok(mine)
    }
}

pub fn signed_in(uid: &str) -> (IdentityPublisher, AuthSignal) {
    let publisher = IdentityPublisher::new(AuthState::Resolved(Some(Identity::new(uid))));
    let signal = publisher.subscribe();
    (publisher, signal)
}

pub fn signed_out() -> (IdentityPublisher, AuthSignal) {
    let publisher = IdentityPublisher::new(AuthState::Resolved(None));
    let signal = publisher.subscribe();
    (publisher, signal)
}
