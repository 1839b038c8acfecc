use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::{PhaseId, StepId, StudyPlanId, UserId};

/// Completion status tracked by the per-content-type progress stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionStatus {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionStatus::Completed)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::NotStarted => "NOT_STARTED",
            CompletionStatus::InProgress => "IN_PROGRESS",
            CompletionStatus::Completed => "COMPLETED",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(CompletionStatus::NotStarted),
            "IN_PROGRESS" => Some(CompletionStatus::InProgress),
            "COMPLETED" => Some(CompletionStatus::Completed),
            _ => None,
        }
    }
}

/// One learner's progress against a tutorial. `quiz_passed` is an
/// independent completion signal: either it or a `Completed` status marks
/// the tutorial step done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialProgressEntry {
    pub tutorial_slug: String,
    pub status: CompletionStatus,
    pub quiz_passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgressEntry {
    pub challenge_slug: String,
    pub status: CompletionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProgressEntry {
    pub project_slug: String,
    pub status: CompletionStatus,
}

/// Consolidated progress for one (user, plan) pair.
///
/// Created on first sync, updated on every subsequent sync, never deleted by
/// this engine. `completed_steps` is a real set: membership is the only
/// question ever asked of it, and `BTreeSet` keeps its serialized form
/// deterministic so repeated syncs stay byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub study_plan_id: StudyPlanId,
    /// `None` only when the plan has no steps at all.
    pub current_phase_id: Option<PhaseId>,
    pub current_step_id: Option<StepId>,
    pub completed_steps: BTreeSet<StepId>,
    /// Always `round(100 * |completed_steps| / total step count)`.
    pub total_progress_percentage: u8,
    /// Maintained by a separate time-tracking collaborator; preserved as-is
    /// across syncs.
    pub hours_spent: f64,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// `None` once the plan is complete.
    pub estimated_completion_date: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// The explicit terminal signal; the current-step pointer stays pinned
    /// to the last step rather than moving to a sentinel.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_progress_percentage == 100
    }
}

/// Percentage of completed steps, rounded to the nearest whole point.
/// An empty plan reports zero.
#[must_use]
pub fn progress_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * completed as f64 / total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            CompletionStatus::NotStarted,
            CompletionStatus::InProgress,
            CompletionStatus::Completed,
        ] {
            assert_eq!(CompletionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CompletionStatus::parse("DONE"), None);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 3), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(3, 3), 100);
    }

    #[test]
    fn percentage_is_bounded() {
        // completed should never exceed total, but the math must not overflow
        // the 0..=100 range even if it does.
        assert_eq!(progress_percentage(5, 3), 100);
    }
}
