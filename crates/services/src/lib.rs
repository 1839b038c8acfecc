#![forbid(unsafe_code)]

pub mod curriculum;
pub mod error;

pub use curriculum_core::Clock;

pub use error::{PlanError, SyncError};

pub use curriculum::{
    ContentAggregator, ContentSet, KeywordSkillTagger, PhaseBuilder, ProgressReconciler,
    SkillTagger, StudyPlanAssembler, StudyPlanService, default_phase_specs,
};
