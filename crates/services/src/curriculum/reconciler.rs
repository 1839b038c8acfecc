use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use curriculum_core::Clock;
use curriculum_core::model::{
    ChallengeProgressEntry, CompletionStatus, HOURS_PER_WEEK, PhaseId, ProgressRecord,
    ProjectProgressEntry, Step, StepId, StepKind, StudyPlan, TutorialProgressEntry, UserId,
    progress_percentage,
};
use storage::repository::ProgressRepository;
use tracing::debug;

use crate::error::SyncError;

/// Merges the three per-content-type completion views into one consolidated
/// record and persists it.
///
/// The computation is a pure function of the latest progress snapshot, so
/// re-running it with unchanged inputs produces an identical record apart
/// from `last_activity_at`; a lost concurrent update is corrected by the
/// next sync.
#[derive(Clone)]
pub struct ProgressReconciler {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressReconciler {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Reconcile and persist one learner's progress against a plan.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Progress` if any progress view cannot be read and
    /// `SyncError::Persist` if the final upsert fails. Either way the
    /// previously stored record is left untouched.
    pub async fn sync(&self, user: &UserId, plan: &StudyPlan) -> Result<ProgressRecord, SyncError> {
        let (tutorial_entries, challenge_entries, project_entries) = tokio::try_join!(
            self.progress.tutorial_progress(user),
            self.progress.challenge_progress(user),
            self.progress.project_progress(user),
        )
        .map_err(SyncError::Progress)?;

        let completed = completed_steps(plan, &tutorial_entries, &challenge_entries, &project_entries);
        let (current_phase_id, current_step_id) = current_position(plan, &completed);

        let total = plan.total_step_count();
        let percentage = progress_percentage(completed.len(), total);
        let now = self.clock.now();

        let existing = self
            .progress
            .get_progress(user, &plan.id)
            .await
            .map_err(SyncError::Progress)?;

        let record = ProgressRecord {
            user_id: user.clone(),
            study_plan_id: plan.id.clone(),
            current_phase_id,
            current_step_id,
            estimated_completion_date: estimated_completion(plan, &completed, now),
            total_progress_percentage: percentage,
            completed_steps: completed,
            // Preserved by the storage upsert as well; set here so the
            // returned record is right even for a fresh row.
            hours_spent: existing.as_ref().map_or(0.0, |r| r.hours_spent),
            started_at: existing.as_ref().map_or(now, |r| r.started_at),
            last_activity_at: now,
        };

        let stored = self
            .progress
            .upsert_progress(&record)
            .await
            .map_err(SyncError::Persist)?;

        debug!(
            user = %user,
            plan = %plan.id,
            completed = stored.completed_steps.len(),
            total,
            percentage = stored.total_progress_percentage,
            "progress reconciled"
        );

        Ok(stored)
    }
}

/// Evaluates every step in the plan against the three views. Stale progress
/// rows referencing content no longer in the plan simply never match a step
/// and are dropped.
fn completed_steps(
    plan: &StudyPlan,
    tutorials: &[TutorialProgressEntry],
    challenges: &[ChallengeProgressEntry],
    projects: &[ProjectProgressEntry],
) -> BTreeSet<StepId> {
    let tutorial_by_slug: HashMap<&str, &TutorialProgressEntry> = tutorials
        .iter()
        .map(|e| (e.tutorial_slug.as_str(), e))
        .collect();
    let challenge_by_slug: HashMap<&str, CompletionStatus> = challenges
        .iter()
        .map(|e| (e.challenge_slug.as_str(), e.status))
        .collect();
    let project_by_slug: HashMap<&str, CompletionStatus> = projects
        .iter()
        .map(|e| (e.project_slug.as_str(), e.status))
        .collect();

    let step_by_id: HashMap<&StepId, &Step> = plan.iter_steps().map(|s| (&s.id, s)).collect();

    let mut completed = BTreeSet::new();
    for step in plan.iter_steps() {
        let done = match step.kind {
            // Either signal alone suffices: a passed quiz marks the
            // tutorial complete even if its status lags behind.
            StepKind::Tutorial => tutorial_by_slug
                .get(step.resource_slug.as_str())
                .is_some_and(|e| e.status.is_completed() || e.quiz_passed),
            // A quiz step's sole prerequisite is its parent tutorial; the
            // quiz-passed flag lives on that tutorial's progress row.
            StepKind::Quiz => step
                .prerequisites
                .first()
                .and_then(|id| step_by_id.get(id))
                .and_then(|parent| tutorial_by_slug.get(parent.resource_slug.as_str()))
                .is_some_and(|e| e.quiz_passed),
            StepKind::Challenge => challenge_by_slug
                .get(step.resource_slug.as_str())
                .is_some_and(CompletionStatus::is_completed),
            StepKind::Project => project_by_slug
                .get(step.resource_slug.as_str())
                .is_some_and(CompletionStatus::is_completed),
        };
        if done {
            completed.insert(step.id.clone());
        }
    }

    let stale = tutorials.len() + challenges.len() + projects.len();
    let matched = completed.len();
    if stale > matched {
        debug!(
            entries = stale,
            matched, "progress entries without a matching plan step were dropped"
        );
    }

    completed
}

/// Scans phases in order for the first incomplete step whose prerequisites
/// are all complete. When everything is done the pointer stays pinned at the
/// last phase's last step; `ProgressRecord::is_complete` is the terminal
/// signal.
fn current_position(
    plan: &StudyPlan,
    completed: &BTreeSet<StepId>,
) -> (Option<PhaseId>, Option<StepId>) {
    for phase in &plan.phases {
        for step in &phase.steps {
            let unlocked = step.prerequisites.iter().all(|p| completed.contains(p));
            if !completed.contains(&step.id) && unlocked {
                return (Some(phase.id.clone()), Some(step.id.clone()));
            }
        }
    }

    plan.phases
        .iter()
        .rev()
        .find_map(|phase| {
            phase
                .steps
                .last()
                .map(|step| (Some(phase.id.clone()), Some(step.id.clone())))
        })
        .unwrap_or((None, None))
}

/// Remaining effort at the standard weekly pace, anchored at `now`.
/// `None` once nothing is left.
fn estimated_completion(
    plan: &StudyPlan,
    completed: &BTreeSet<StepId>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let remaining_hours: f64 = plan
        .iter_steps()
        .filter(|s| !completed.contains(&s.id))
        .map(|s| s.estimated_hours)
        .sum();
    if remaining_hours <= 0.0 {
        return None;
    }
    let weeks = (remaining_hours / HOURS_PER_WEEK).ceil();
    let days = (weeks * 7.0).min(f64::from(i32::MAX)) as i64;
    Some(now + Duration::days(days))
}
