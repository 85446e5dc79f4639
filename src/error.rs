use std::path::PathBuf;

use crate::models::Phase;

/// Failures talking to the remote trainer.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("trainer unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    /// The trainer answered with a non-success status.
    #[error("trainer returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    /// The body could not be decoded into the expected shape.
    #[error("malformed trainer response: {0}")]
    Malformed(String),
}

/// Failures reading or writing the report collection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored row could not be mapped back into a report.
    #[error("corrupt report row `{id}`: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// Why a report was not written.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Nobody is signed in; the store was not contacted.
    #[error("no signed-in user, report not saved")]
    Unauthenticated,
    #[error("failed to save report: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a session action that did not advance the machine.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The action is not offered in the current phase; no call was made.
    #[error("`{action}` is not available while the session is {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },
    /// The remote call failed; the phase is unchanged.
    #[error(transparent)]
    Remote(#[from] TrainerError),
    /// The session was torn down before the call completed.
    #[error("session was discarded")]
    Stale,
}

/// Failures from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("an account for `{0}` already exists")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no account for `{0}`")]
    UnknownAccount(String),
    #[error("reset token is invalid or already used")]
    InvalidResetToken,
    #[error("reset token has expired, request a new one")]
    ExpiredResetToken,
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    /// A stored digest could not be produced or parsed.
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures loading or saving the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
}
