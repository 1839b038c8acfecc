//! Write helpers for the tables this engine only ever reads in production.
//!
//! The content catalog and the per-content progress stores are owned by
//! other services; these upserts exist for the seed binary and the
//! integration tests.

use curriculum_core::model::{
    Challenge, ChallengeProgressEntry, Project, ProjectProgressEntry, Tutorial,
    TutorialProgressEntry, UserId,
};

use super::SqliteRepository;
use crate::repository::StorageError;

impl SqliteRepository {
    /// Insert or update a tutorial row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn upsert_tutorial(
        &self,
        tutorial: &Tutorial,
        published: bool,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO tutorials (
                slug, title, description, difficulty, sort_order, category_slug,
                quiz_slug, quiz_title, is_published, is_premium, required_plan
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                difficulty = excluded.difficulty,
                sort_order = excluded.sort_order,
                category_slug = excluded.category_slug,
                quiz_slug = excluded.quiz_slug,
                quiz_title = excluded.quiz_title,
                is_published = excluded.is_published,
                is_premium = excluded.is_premium,
                required_plan = excluded.required_plan
            ",
        )
        .bind(&tutorial.slug)
        .bind(&tutorial.title)
        .bind(&tutorial.description)
        .bind(i64::from(tutorial.difficulty))
        .bind(i64::from(tutorial.order))
        .bind(&tutorial.category_slug)
        .bind(tutorial.quiz.as_ref().map(|q| q.slug.clone()))
        .bind(tutorial.quiz.as_ref().map(|q| q.title.clone()))
        .bind(published)
        .bind(tutorial.is_premium)
        .bind(tutorial.required_plan.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Insert or update a challenge row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn upsert_challenge(
        &self,
        challenge: &Challenge,
        published: bool,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenges (
                slug, title, description, difficulty, is_published, is_premium, required_plan
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                difficulty = excluded.difficulty,
                is_published = excluded.is_published,
                is_premium = excluded.is_premium,
                required_plan = excluded.required_plan
            ",
        )
        .bind(&challenge.slug)
        .bind(&challenge.title)
        .bind(&challenge.description)
        .bind(challenge.difficulty.as_str())
        .bind(published)
        .bind(challenge.is_premium)
        .bind(challenge.required_plan.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Insert or update a project row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn upsert_project(
        &self,
        project: &Project,
        published: bool,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO projects (
                slug, title, description, category, difficulty, sort_order,
                estimated_hours, is_published, is_premium, required_plan
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                category = excluded.category,
                difficulty = excluded.difficulty,
                sort_order = excluded.sort_order,
                estimated_hours = excluded.estimated_hours,
                is_published = excluded.is_published,
                is_premium = excluded.is_premium,
                required_plan = excluded.required_plan
            ",
        )
        .bind(&project.slug)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.category)
        .bind(i64::from(project.difficulty))
        .bind(i64::from(project.order))
        .bind(project.estimated_hours)
        .bind(published)
        .bind(project.is_premium)
        .bind(project.required_plan.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Record a tutorial progress signal for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn set_tutorial_progress(
        &self,
        user: &UserId,
        entry: &TutorialProgressEntry,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO tutorial_progress (user_id, tutorial_slug, status, quiz_passed)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, tutorial_slug) DO UPDATE SET
                status = excluded.status,
                quiz_passed = excluded.quiz_passed
            ",
        )
        .bind(user.as_str())
        .bind(&entry.tutorial_slug)
        .bind(entry.status.as_str())
        .bind(entry.quiz_passed)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Record a challenge progress signal for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn set_challenge_progress(
        &self,
        user: &UserId,
        entry: &ChallengeProgressEntry,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenge_progress (user_id, challenge_slug, status)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, challenge_slug) DO UPDATE SET
                status = excluded.status
            ",
        )
        .bind(user.as_str())
        .bind(&entry.challenge_slug)
        .bind(entry.status.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Record a project progress signal for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn set_project_progress(
        &self,
        user: &UserId,
        entry: &ProjectProgressEntry,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO project_progress (user_id, project_slug, status)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, project_slug) DO UPDATE SET
                status = excluded.status
            ",
        )
        .bind(user.as_str())
        .bind(&entry.project_slug)
        .bind(entry.status.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
