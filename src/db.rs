use std::path::Path;

use anyhow::Result;
use sqlx::{
    Executor, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub type DB = SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    uid           TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- At most one remembered sign-in.
CREATE TABLE IF NOT EXISTS auth_session (
    id  INTEGER PRIMARY KEY CHECK (id = 1),
    uid TEXT NOT NULL REFERENCES accounts(uid) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS password_resets (
    token      TEXT PRIMARY KEY,
    uid        TEXT NOT NULL REFERENCES accounts(uid) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    used       INTEGER NOT NULL DEFAULT 0
);

-- Timestamps are unix milliseconds (UTC).
CREATE TABLE IF NOT EXISTS workouts (
    id               TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL,
    exercise         TEXT NOT NULL,
    reps             INTEGER NOT NULL CHECK (reps >= 0),
    duration_seconds REAL NOT NULL CHECK (duration_seconds >= 0),
    calories         REAL NOT NULL CHECK (calories >= 0),
    created_at       INTEGER NOT NULL,
    saved_at         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS workouts_user_recent
    ON workouts (user_id, created_at DESC);
"#;

/// Open (creating if needed) the database at `path` and make sure the schema exists.
pub async fn open(path: &Path) -> Result<DB> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    pool.execute(SCHEMA).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fitpal.db");

        let pool = open(&path).await.unwrap();
        pool.close().await;
        let pool = open(&path).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN
             ('accounts', 'auth_session', 'password_resets', 'workouts')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 4);
    }
}
