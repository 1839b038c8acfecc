use std::sync::Arc;

use curriculum_core::Clock;
use curriculum_core::model::{PhaseSpec, ProgressRecord, StudyPlan, UserId};
use storage::repository::{ContentRepository, ProgressRepository};

use super::aggregator::ContentAggregator;
use super::assembler::{StudyPlanAssembler, default_phase_specs};
use super::reconciler::ProgressReconciler;
use super::tagger::SkillTagger;
use crate::error::{PlanError, SyncError};

/// Entry point for the curriculum engine: assembles the study plan and
/// reconciles learner progress against it.
///
/// Stateless per request; both operations are pure functions of the current
/// repository contents apart from the single progress upsert.
#[derive(Clone)]
pub struct StudyPlanService {
    clock: Clock,
    aggregator: ContentAggregator,
    reconciler: ProgressReconciler,
    tagger: Arc<dyn SkillTagger>,
    specs: Vec<PhaseSpec>,
}

impl StudyPlanService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn ContentRepository>,
        progress: Arc<dyn ProgressRepository>,
        tagger: Arc<dyn SkillTagger>,
    ) -> Self {
        Self {
            aggregator: ContentAggregator::new(content),
            reconciler: ProgressReconciler::new(clock, progress),
            clock,
            tagger,
            specs: default_phase_specs(),
        }
    }

    /// Replace the built-in phase taxonomy (mostly for tests).
    #[must_use]
    pub fn with_phase_specs(mut self, specs: Vec<PhaseSpec>) -> Self {
        self.specs = specs;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Assemble the study plan from the current published content.
    ///
    /// Pure read; safe to cache briefly since content changes infrequently.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Aggregation` if any content fetch fails — a
    /// partial curriculum is never returned.
    pub async fn get_study_plan(&self) -> Result<StudyPlan, PlanError> {
        let content = self.aggregator.fetch_all().await?;
        Ok(StudyPlanAssembler::assemble(
            &self.specs,
            &content,
            self.tagger.as_ref(),
        ))
    }

    /// Reconcile and persist one learner's progress — the only mutating
    /// entry point.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if a progress view read or the final upsert
    /// fails; the stored record is untouched on failure.
    pub async fn sync_progress(
        &self,
        user: &UserId,
        plan: &StudyPlan,
    ) -> Result<ProgressRecord, SyncError> {
        self.reconciler.sync(user, plan).await
    }
}
