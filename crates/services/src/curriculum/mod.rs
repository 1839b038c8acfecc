mod aggregator;
mod assembler;
mod phase;
mod reconciler;
mod service;
mod tagger;

// Public API of the curriculum subsystem.
pub use crate::error::{PlanError, SyncError};
pub use aggregator::{ContentAggregator, ContentSet};
pub use assembler::{StudyPlanAssembler, default_phase_specs};
pub use phase::PhaseBuilder;
pub use reconciler::ProgressReconciler;
pub use service::StudyPlanService;
pub use tagger::{KeywordSkillTagger, SkillTagger};
