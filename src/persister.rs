use tracing::{error, info, warn};

use crate::{
    auth::{AuthSignal, CurrentIdentity},
    error::PersistError,
    models::{NewReportRecord, PersistedReport, WorkoutReport},
    store::ReportStore,
};

/// Writes finished reports into the signed-in user's collection.
///
/// `auth` is asked for the identity at write time. A bare `AuthSignal` gives
/// the last published value; a `LocalIdentityProvider` re-reads the database
/// so sign-ins changed by another process are honoured.
pub struct ReportPersister<S, A = AuthSignal> {
    auth: A,
    store: S,
}

impl<S: ReportStore, A: CurrentIdentity> ReportPersister<S, A> {
    pub fn new(auth: A, store: S) -> Self {
        Self { auth, store }
    }

    /// Save `report` for whoever is signed in right now.
    ///
    /// Without an identity nothing is written. At most one store write is
    /// issued; a failed write is returned as-is and never retried.
    pub async fn persist(&self, report: &WorkoutReport) -> Result<PersistedReport, PersistError> {
        let Some(identity) = self.auth.current_identity().await else {
            warn!(exercise = %report.exercise(), "no user signed in, report not saved");
            return Err(PersistError::Unauthenticated);
        };

        let record = NewReportRecord::from_report(report, identity.uid);
        match self.store.append(record).await {
            Ok(saved) => {
                info!(id = %saved.id, user_id = %saved.user_id, "report saved");
                Ok(saved)
            }
            Err(e) => {
                error!(error = %e, "failed to save report");
                Err(PersistError::Store(e))
            }
        }
    }
}
