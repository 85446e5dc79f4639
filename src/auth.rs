use std::{future::Future, sync::Arc};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    models::{AuthState, Identity},
};

const MIN_PASSWORD_LEN: usize = 6;

/// How long a reset token stays redeemable.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Read side of the identity feed.
///
/// Each consumer holds its own `AuthSignal`; dropping it ends the
/// subscription. Every published value replaces the previous one, so
/// `current()` never returns an identity older than the last delivered
/// transition.
#[derive(Debug, Clone)]
pub struct AuthSignal {
    rx: watch::Receiver<AuthState>,
}

impl AuthSignal {
    /// The signed-in identity, or `None` when signed out or not yet known.
    pub fn current(&self) -> Option<Identity> {
        self.rx.borrow().identity().cloned()
    }

    /// Wait for the next transition. `None` once the provider is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the provider has reported at least once and return what it
    /// said. A provider that goes away before reporting counts as signed out.
    pub async fn resolved(&mut self) -> Option<Identity> {
        match self
            .rx
            .wait_for(|state| !matches!(state, AuthState::Pending))
            .await
        {
            Ok(state) => state.identity().cloned(),
            Err(_) => None,
        }
    }
}

/// Write side of the identity feed. Only the identity provider holds one.
#[derive(Debug)]
pub struct IdentityPublisher {
    tx: watch::Sender<AuthState>,
}

impl IdentityPublisher {
    pub fn new(initial: AuthState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn publish(&self, state: AuthState) {
        debug!(?state, "identity transition");
        self.tx.send_replace(state);
    }

    /// Publish `state` unless it is already the current value.
    pub fn publish_if_changed(&self, state: AuthState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            debug!(?state, "identity transition");
            *current = state;
            true
        })
    }

    pub fn subscribe(&self) -> AuthSignal {
        AuthSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Answers "who is signed in right now" at the moment of a write.
pub trait CurrentIdentity: Send + Sync {
    fn current_identity(&self) -> impl Future<Output = Option<Identity>> + Send;
}

impl CurrentIdentity for AuthSignal {
    async fn current_identity(&self) -> Option<Identity> {
        self.current()
    }
}

impl<A: CurrentIdentity> CurrentIdentity for Arc<A> {
    async fn current_identity(&self) -> Option<Identity> {
        self.as_ref().current_identity().await
    }
}

/// Proof that a reset was requested. Stands in for the email a hosted
/// provider would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub email: String,
    pub token: String,
}

/// Source of sign-in state. Consumers observe it through `subscribe`.
pub trait IdentityProvider: Send + Sync {
    fn subscribe(&self) -> AuthSignal;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn send_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<ResetTicket, AuthError>> + Send;
}

/// Identity provider backed by the local database.
///
/// Starts out `Pending`; `restore` resolves it from the remembered sign-in.
pub struct LocalIdentityProvider {
    pool: SqlitePool,
    publisher: IdentityPublisher,
}

impl LocalIdentityProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            publisher: IdentityPublisher::new(AuthState::Pending),
        }
    }

    /// Publish whoever was signed in when the last run exited.
    /// If the lookup fails, consumers are told nobody is signed in.
    pub async fn restore(&self) -> Result<Option<Identity>, AuthError> {
        match self.signed_in().await {
            Ok(identity) => {
                self.publisher.publish(AuthState::Resolved(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                self.publisher.publish(AuthState::Resolved(None));
                Err(e)
            }
        }
    }

    /// Re-read the remembered sign-in and publish it if it moved.
    ///
    /// Another process sharing the database may have signed in or out since
    /// the last transition this provider published.
    pub async fn refresh(&self) -> Result<Option<Identity>, AuthError> {
        let identity = self.signed_in().await?;
        if self
            .publisher
            .publish_if_changed(AuthState::Resolved(identity.clone()))
        {
            info!(signed_in = identity.is_some(), "sign-in changed elsewhere");
        }
        Ok(identity)
    }

    async fn signed_in(&self) -> Result<Option<Identity>, AuthError> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT a.uid, a.email
            FROM auth_session s
            JOIN accounts a ON a.uid = s.uid
            WHERE s.id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(uid, email)| Identity {
            uid,
            email: Some(email),
        }))
    }

    /// Consume a reset token and set a new password.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        check_password(new_password)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT uid, created_at >= datetime('now', ?)
             FROM password_resets
             WHERE token = ? AND used = 0",
        )
        .bind(format!("-{RESET_TOKEN_TTL_MINUTES} minutes"))
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let (uid, fresh) = row.ok_or(AuthError::InvalidResetToken)?;
        if fresh == 0 {
            return Err(AuthError::ExpiredResetToken);
        }

        sqlx::query("UPDATE accounts SET password_hash = ? WHERE uid = ?")
            .bind(hash_password(new_password)?)
            .bind(&uid)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_resets SET used = 1 WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(%uid, "password reset");
        Ok(())
    }

    async fn remember(&self, identity: &Identity) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO auth_session (id, uid) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET uid = excluded.uid",
        )
        .bind(&identity.uid)
        .execute(&self.pool)
        .await?;

        self.publisher
            .publish(AuthState::Resolved(Some(identity.clone())));
        Ok(())
    }
}

impl CurrentIdentity for LocalIdentityProvider {
    /// Reads the database rather than the last published value. A failed read
    /// counts as signed out.
    async fn current_identity(&self) -> Option<Identity> {
        match self.refresh().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "could not check sign-in, treating as signed out");
                None
            }
        }
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn subscribe(&self) -> AuthSignal {
        self.publisher.subscribe()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        check_password(password)?;

        let taken: Option<String> = sqlx::query_scalar("SELECT uid FROM accounts WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        let uid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO accounts (uid, email, password_hash, created_at)
             VALUES (?, ?, ?, datetime('now'))",
        )
        .bind(&uid)
        .bind(&email)
        .bind(hash_password(password)?)
        .execute(&self.pool)
        .await?;

        let identity = Identity {
            uid,
            email: Some(email),
        };
        self.remember(&identity).await?;
        info!(uid = %identity.uid, "account created");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT uid, password_hash FROM accounts WHERE email = ?")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;

        let (uid, stored) = row.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &stored)?;

        let identity = Identity {
            uid,
            email: Some(email),
        };
        self.remember(&identity).await?;
        info!(uid = %identity.uid, "signed in");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        self.publisher.publish(AuthState::Resolved(None));
        info!("signed out");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<ResetTicket, AuthError> {
        let email = normalize_email(email);

        let uid: Option<String> = sqlx::query_scalar("SELECT uid FROM accounts WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        let uid = uid.ok_or_else(|| AuthError::UnknownAccount(email.clone()))?;

        let token = Uuid::new_v4().simple().to_string();
        sqlx::query(
            "INSERT INTO password_resets (token, uid, created_at, used)
             VALUES (?, ?, datetime('now'), 0)",
        )
        .bind(&token)
        .bind(&uid)
        .execute(&self.pool)
        .await?;

        info!(%uid, "password reset requested");
        Ok(ResetTicket { email, token })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Argon2id digest in PHC string form; the salt travels inside it.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
