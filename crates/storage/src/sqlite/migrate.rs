use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: content tables (tutorials with embedded quiz
/// columns, challenges, projects), the three per-content progress tables,
/// and the consolidated study plan progress table.
#[allow(clippy::too_many_lines)]
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
                CREATE TABLE IF NOT EXISTS tutorials (
                    slug TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                    sort_order INTEGER NOT NULL CHECK (sort_order >= 0),
                    category_slug TEXT NOT NULL,
                    quiz_slug TEXT,
                    quiz_title TEXT,
                    is_published INTEGER NOT NULL DEFAULT 0,
                    is_premium INTEGER NOT NULL DEFAULT 0,
                    required_plan TEXT NOT NULL DEFAULT 'FREE'
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS challenges (
                    slug TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    difficulty TEXT NOT NULL CHECK (difficulty IN ('EASY', 'MEDIUM', 'HARD')),
                    is_published INTEGER NOT NULL DEFAULT 0,
                    is_premium INTEGER NOT NULL DEFAULT 0,
                    required_plan TEXT NOT NULL DEFAULT 'FREE'
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS projects (
                    slug TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
                    sort_order INTEGER NOT NULL CHECK (sort_order >= 0),
                    estimated_hours REAL,
                    is_published INTEGER NOT NULL DEFAULT 0,
                    is_premium INTEGER NOT NULL DEFAULT 0,
                    required_plan TEXT NOT NULL DEFAULT 'FREE'
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS tutorial_progress (
                    user_id TEXT NOT NULL,
                    tutorial_slug TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('NOT_STARTED', 'IN_PROGRESS', 'COMPLETED')),
                    quiz_passed INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (user_id, tutorial_slug)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS challenge_progress (
                    user_id TEXT NOT NULL,
                    challenge_slug TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('NOT_STARTED', 'IN_PROGRESS', 'COMPLETED')),
                    PRIMARY KEY (user_id, challenge_slug)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS project_progress (
                    user_id TEXT NOT NULL,
                    project_slug TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('NOT_STARTED', 'IN_PROGRESS', 'COMPLETED')),
                    PRIMARY KEY (user_id, project_slug)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // The composite key is the storage-level uniqueness that makes two
        // concurrent syncs for the same learner converge to one row.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS study_plan_progress (
                    user_id TEXT NOT NULL,
                    study_plan_id TEXT NOT NULL,
                    current_phase_id TEXT,
                    current_step_id TEXT,
                    completed_steps TEXT NOT NULL,
                    total_progress INTEGER NOT NULL CHECK (total_progress BETWEEN 0 AND 100),
                    hours_spent REAL NOT NULL CHECK (hours_spent >= 0),
                    started_at TEXT NOT NULL,
                    last_activity_at TEXT NOT NULL,
                    estimated_completion_date TEXT,
                    PRIMARY KEY (user_id, study_plan_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_tutorials_category_order
                    ON tutorials (category_slug, sort_order);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_projects_category_order
                    ON projects (category, sort_order);
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
