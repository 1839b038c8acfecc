use curriculum_core::model::{
    ChallengeProgressEntry, ProgressRecord, ProjectProgressEntry, StudyPlanId,
    TutorialProgressEntry, UserId,
};

use super::{SqliteRepository, mapping};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn tutorial_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<TutorialProgressEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT tutorial_slug, status, quiz_passed
            FROM tutorial_progress
            WHERE user_id = ?1
            ORDER BY tutorial_slug ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(mapping::map_tutorial_progress_row(&row)?);
        }
        Ok(entries)
    }

    async fn challenge_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ChallengeProgressEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT challenge_slug, status
            FROM challenge_progress
            WHERE user_id = ?1
            ORDER BY challenge_slug ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(mapping::map_challenge_progress_row(&row)?);
        }
        Ok(entries)
    }

    async fn project_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ProjectProgressEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT project_slug, status
            FROM project_progress
            WHERE user_id = ?1
            ORDER BY project_slug ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(mapping::map_project_progress_row(&row)?);
        }
        Ok(entries)
    }

    async fn get_progress(
        &self,
        user: &UserId,
        plan: &StudyPlanId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, study_plan_id, current_phase_id, current_step_id,
                completed_steps, total_progress, hours_spent, started_at,
                last_activity_at, estimated_completion_date
            FROM study_plan_progress
            WHERE user_id = ?1 AND study_plan_id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(plan.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| mapping::map_progress_record_row(&r)).transpose()
    }

    async fn upsert_progress(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StorageError> {
        let completed = mapping::encode_completed_steps(&record.completed_steps)?;

        sqlx::query(
            r"
            INSERT INTO study_plan_progress (
                user_id, study_plan_id, current_phase_id, current_step_id,
                completed_steps, total_progress, hours_spent, started_at,
                last_activity_at, estimated_completion_date
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(user_id, study_plan_id) DO UPDATE SET
                -- started_at and hours_spent keep their original values;
                -- they belong to the time-tracking collaborator
                current_phase_id = excluded.current_phase_id,
                current_step_id = excluded.current_step_id,
                completed_steps = excluded.completed_steps,
                total_progress = excluded.total_progress,
                last_activity_at = excluded.last_activity_at,
                estimated_completion_date = excluded.estimated_completion_date
            ",
        )
        .bind(record.user_id.as_str())
        .bind(record.study_plan_id.as_str())
        .bind(record.current_phase_id.as_ref().map(|p| p.as_str().to_owned()))
        .bind(record.current_step_id.as_ref().map(|s| s.as_str().to_owned()))
        .bind(completed)
        .bind(i64::from(record.total_progress_percentage))
        .bind(record.hours_spent)
        .bind(record.started_at)
        .bind(record.last_activity_at)
        .bind(record.estimated_completion_date)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        self.get_progress(&record.user_id, &record.study_plan_id)
            .await?
            .ok_or(StorageError::NotFound)
    }
}
