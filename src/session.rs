use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    auth::{AuthSignal, CurrentIdentity},
    error::{PersistError, SessionError},
    models::{PersistedReport, Phase, SessionState, WorkoutReport},
    persister::ReportPersister,
    store::ReportStore,
    trainer::Trainer,
    types::ExerciseKind,
};

pub const REPORT_FAILED: &str = "Failed to generate report.";

/// Handle that discards a session from outside the task driving it.
///
/// After `teardown` every pending response for the session is dropped on
/// arrival and every further action returns `SessionError::Stale`.
#[derive(Debug, Clone)]
pub struct Teardown {
    epoch: Arc<AtomicU64>,
}

impl Teardown {
    pub fn teardown(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

/// What a successful report generation produced.
#[derive(Debug)]
pub struct ReportDelivery {
    pub report: WorkoutReport,
    /// Outcome of the single persist attempt for this report.
    pub saved: Result<PersistedReport, PersistError>,
}

/// Drives one exercise through Idle → Active → Ended.
///
/// Phase only ever moves forward, and only when the remote call for the
/// current phase succeeds. A failed call leaves the phase alone and puts a
/// fixed message in `status_message` so the action can be retried.
pub struct SessionController<T, S, A = AuthSignal> {
    state: SessionState,
    trainer: T,
    persister: ReportPersister<S, A>,
    epoch: Arc<AtomicU64>,
    mounted: u64,
}

impl<T: Trainer, S: ReportStore, A: CurrentIdentity> SessionController<T, S, A> {
    pub fn new(
        exercise: ExerciseKind,
        trainer: T,
        persister: ReportPersister<S, A>,
    ) -> Self {
        Self {
            state: SessionState::new(exercise),
            trainer,
            persister,
            epoch: Arc::new(AtomicU64::new(0)),
            mounted: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn teardown_handle(&self) -> Teardown {
        Teardown {
            epoch: Arc::clone(&self.epoch),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) != self.mounted
    }

    /// The live stream location, only while a workout is running.
    pub fn video_feed(&self) -> Option<String> {
        (self.state.phase == Phase::Active).then(|| self.trainer.video_feed_url(self.state.exercise))
    }

    pub async fn start(&mut self) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Idle, "start")?;
        let exercise = self.state.exercise;

        let result = self.trainer.start(exercise).await;
        self.ensure_live()?;

        match result {
            Ok(resp) => {
                self.state.phase = Phase::Active;
                self.state.status_message = resp.message;
                self.state.report = None;
                info!(%exercise, "workout started");
                Ok(())
            }
            Err(e) => {
                warn!(%exercise, error = %e, "start failed");
                self.state.status_message =
                    format!("Failed to start {} trainer.", exercise.singular());
                Err(e.into())
            }
        }
    }

    pub async fn stop(&mut self) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Active, "stop")?;
        let exercise = self.state.exercise;

        let result = self.trainer.end(exercise).await;
        self.ensure_live()?;

        match result {
            Ok(resp) => {
                self.state.phase = Phase::Ended;
                self.state.status_message = resp.message;
                info!(%exercise, "workout ended");
                Ok(())
            }
            Err(e) => {
                warn!(%exercise, error = %e, "stop failed");
                self.state.status_message =
                    format!("Failed to end {} workout.", exercise.singular());
                Err(e.into())
            }
        }
    }

    /// Fetch the summary, attach it, and hand it to the persister once.
    ///
    /// May be called any number of times while Ended; each success replaces
    /// the attached report and makes its own persist attempt.
    pub async fn generate_report(&mut self) -> Result<ReportDelivery, SessionError> {
        self.ensure_phase(Phase::Ended, "generate_report")?;
        let exercise = self.state.exercise;

        let result = self
            .trainer
            .generate_report(exercise)
            .await
            .and_then(|resp| resp.validate().map(|_| resp));
        self.ensure_live()?;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%exercise, error = %e, "report generation failed");
                self.state.status_message = REPORT_FAILED.to_string();
                return Err(e.into());
            }
        };

        let report = WorkoutReport::new(
            exercise,
            resp.reps,
            resp.duration,
            resp.calories,
            Utc::now(),
        );
        self.state.report = Some(report.clone());
        self.state.status_message = resp.message;
        info!(%exercise, reps = report.reps(), "report generated");

        let saved = self.persister.persist(&report).await;
        Ok(ReportDelivery { report, saved })
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.is_torn_down() {
            info!(exercise = %self.state.exercise, "dropping response for discarded session");
            return Err(SessionError::Stale);
        }
        Ok(())
    }

    fn ensure_phase(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.state.phase != expected {
            return Err(SessionError::WrongPhase {
                action,
                phase: self.state.phase,
            });
        }
        Ok(())
    }
}
