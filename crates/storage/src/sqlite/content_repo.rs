use curriculum_core::model::{Challenge, Project, Tutorial};

use super::{SqliteRepository, mapping};
use crate::repository::{ContentRepository, StorageError};

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                slug, title, description, difficulty, sort_order, category_slug,
                quiz_slug, quiz_title, is_premium, required_plan
            FROM tutorials
            WHERE is_published = 1
            ORDER BY category_slug ASC, sort_order ASC, slug ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut tutorials = Vec::with_capacity(rows.len());
        for row in rows {
            tutorials.push(mapping::map_tutorial_row(&row)?);
        }
        Ok(tutorials)
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT slug, title, description, difficulty, is_premium, required_plan
            FROM challenges
            WHERE is_published = 1
            ORDER BY slug ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut challenges = Vec::with_capacity(rows.len());
        for row in rows {
            challenges.push(mapping::map_challenge_row(&row)?);
        }
        Ok(challenges)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                slug, title, description, category, difficulty, sort_order,
                estimated_hours, is_premium, required_plan
            FROM projects
            WHERE is_published = 1
            ORDER BY category ASC, sort_order ASC, slug ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(mapping::map_project_row(&row)?);
        }
        Ok(projects)
    }
}
