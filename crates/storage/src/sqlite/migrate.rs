use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (users, journeys, lesson archive, and indexes).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    profile TEXT NOT NULL,
                    preferences TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Scalar journey columns are a queryable mirror of the document;
        // the document is the source of truth at load time.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS journeys (
                    user_id TEXT PRIMARY KEY,
                    current_day INTEGER NOT NULL CHECK (current_day >= 1),
                    total_days INTEGER NOT NULL CHECK (total_days >= 1),
                    streak INTEGER NOT NULL CHECK (streak >= 0),
                    total_score INTEGER NOT NULL CHECK (total_score >= 0),
                    last_lesson_date TEXT,
                    document TEXT NOT NULL,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS lesson_archive (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    day INTEGER NOT NULL CHECK (day >= 1),
                    lesson TEXT NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    archived_at TEXT NOT NULL,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_lesson_archive_user_day
                    ON lesson_archive (user_id, day);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
