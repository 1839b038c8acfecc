use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::collections::BTreeSet;

use curriculum_core::model::{
    Challenge, ChallengeDifficulty, ChallengeProgressEntry, CompletionStatus, PhaseId, PlanTier,
    ProgressRecord, Project, ProjectProgressEntry, Quiz, StepId, StudyPlanId, Tutorial,
    TutorialProgressEntry, UserId,
};

use crate::repository::StorageError;

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StorageError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| StorageError::Serialization(format!("column {column}: {e}")))
}

fn parse_plan_tier(raw: &str) -> Result<PlanTier, StorageError> {
    PlanTier::parse(raw)
        .ok_or_else(|| StorageError::Serialization(format!("unknown required_plan: {raw}")))
}

fn parse_status(raw: &str) -> Result<CompletionStatus, StorageError> {
    CompletionStatus::parse(raw)
        .ok_or_else(|| StorageError::Serialization(format!("unknown status: {raw}")))
}

fn difficulty_u8(raw: i64) -> Result<u8, StorageError> {
    u8::try_from(raw).map_err(|_| StorageError::Serialization("difficulty out of range".into()))
}

fn order_u32(raw: i64) -> Result<u32, StorageError> {
    u32::try_from(raw).map_err(|_| StorageError::Serialization("sort_order out of range".into()))
}

pub fn map_tutorial_row(row: &SqliteRow) -> Result<Tutorial, StorageError> {
    let slug: String = get(row, "slug")?;
    let quiz_slug: Option<String> = get(row, "quiz_slug")?;
    let quiz_title: Option<String> = get(row, "quiz_title")?;
    let quiz = match (quiz_slug, quiz_title) {
        (Some(q_slug), Some(q_title)) => Some(Quiz {
            slug: q_slug,
            title: q_title,
            tutorial_slug: slug.clone(),
        }),
        (None, None) => None,
        _ => {
            return Err(StorageError::Serialization(format!(
                "tutorial {slug}: quiz_slug and quiz_title must be set together"
            )));
        }
    };

    let required_plan: String = get(row, "required_plan")?;
    Ok(Tutorial {
        title: get(row, "title")?,
        description: get(row, "description")?,
        difficulty: difficulty_u8(get(row, "difficulty")?)?,
        order: order_u32(get(row, "sort_order")?)?,
        category_slug: get(row, "category_slug")?,
        quiz,
        is_premium: get::<bool>(row, "is_premium")?,
        required_plan: parse_plan_tier(&required_plan)?,
        slug,
    })
}

pub fn map_challenge_row(row: &SqliteRow) -> Result<Challenge, StorageError> {
    let difficulty: String = get(row, "difficulty")?;
    let required_plan: String = get(row, "required_plan")?;
    Ok(Challenge {
        slug: get(row, "slug")?,
        title: get(row, "title")?,
        description: get(row, "description")?,
        difficulty: ChallengeDifficulty::parse(&difficulty).ok_or_else(|| {
            StorageError::Serialization(format!("unknown challenge difficulty: {difficulty}"))
        })?,
        is_premium: get::<bool>(row, "is_premium")?,
        required_plan: parse_plan_tier(&required_plan)?,
    })
}

pub fn map_project_row(row: &SqliteRow) -> Result<Project, StorageError> {
    let required_plan: String = get(row, "required_plan")?;
    Ok(Project {
        slug: get(row, "slug")?,
        title: get(row, "title")?,
        description: get(row, "description")?,
        category: get(row, "category")?,
        difficulty: difficulty_u8(get(row, "difficulty")?)?,
        order: order_u32(get(row, "sort_order")?)?,
        estimated_hours: get(row, "estimated_hours")?,
        is_premium: get::<bool>(row, "is_premium")?,
        required_plan: parse_plan_tier(&required_plan)?,
    })
}

pub fn map_tutorial_progress_row(row: &SqliteRow) -> Result<TutorialProgressEntry, StorageError> {
    let status: String = get(row, "status")?;
    Ok(TutorialProgressEntry {
        tutorial_slug: get(row, "tutorial_slug")?,
        status: parse_status(&status)?,
        quiz_passed: get::<bool>(row, "quiz_passed")?,
    })
}

pub fn map_challenge_progress_row(row: &SqliteRow) -> Result<ChallengeProgressEntry, StorageError> {
    let status: String = get(row, "status")?;
    Ok(ChallengeProgressEntry {
        challenge_slug: get(row, "challenge_slug")?,
        status: parse_status(&status)?,
    })
}

pub fn map_project_progress_row(row: &SqliteRow) -> Result<ProjectProgressEntry, StorageError> {
    let status: String = get(row, "status")?;
    Ok(ProjectProgressEntry {
        project_slug: get(row, "project_slug")?,
        status: parse_status(&status)?,
    })
}

/// Encodes the completed-step set as a JSON array for the TEXT column.
/// `BTreeSet` iteration keeps the encoding deterministic.
pub fn encode_completed_steps(steps: &BTreeSet<StepId>) -> Result<String, StorageError> {
    serde_json::to_string(steps).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub fn decode_completed_steps(raw: &str) -> Result<BTreeSet<StepId>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub fn map_progress_record_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let user_id: String = get(row, "user_id")?;
    let study_plan_id: String = get(row, "study_plan_id")?;
    let current_phase_id: Option<String> = get(row, "current_phase_id")?;
    let current_step_id: Option<String> = get(row, "current_step_id")?;
    let completed: String = get(row, "completed_steps")?;
    let total_progress: i64 = get(row, "total_progress")?;

    Ok(ProgressRecord {
        user_id: UserId::new(user_id),
        study_plan_id: StudyPlanId::new(study_plan_id),
        current_phase_id: current_phase_id.map(PhaseId::new),
        current_step_id: current_step_id.map(StepId::new),
        completed_steps: decode_completed_steps(&completed)?,
        total_progress_percentage: u8::try_from(total_progress)
            .map_err(|_| StorageError::Serialization("total_progress out of range".into()))?,
        hours_spent: get(row, "hours_spent")?,
        started_at: get::<DateTime<Utc>>(row, "started_at")?,
        last_activity_at: get::<DateTime<Utc>>(row, "last_activity_at")?,
        estimated_completion_date: get::<Option<DateTime<Utc>>>(row, "estimated_completion_date")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_steps_round_trip() {
        let mut steps = BTreeSet::new();
        steps.insert(StepId::new("tutorial-html-intro"));
        steps.insert(StepId::new("quiz-html-intro-quiz"));

        let encoded = encode_completed_steps(&steps).unwrap();
        assert_eq!(decode_completed_steps(&encoded).unwrap(), steps);
    }

    #[test]
    fn completed_steps_encoding_is_deterministic() {
        let mut a = BTreeSet::new();
        a.insert(StepId::new("b"));
        a.insert(StepId::new("a"));
        let mut b = BTreeSet::new();
        b.insert(StepId::new("a"));
        b.insert(StepId::new("b"));

        assert_eq!(
            encode_completed_steps(&a).unwrap(),
            encode_completed_steps(&b).unwrap()
        );
    }

    #[test]
    fn bad_completed_steps_json_is_a_serialization_error() {
        let err = decode_completed_steps("{not json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
