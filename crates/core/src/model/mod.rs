mod content;
mod ids;
mod phase;
mod plan;
mod progress;
mod step;

pub use ids::{PhaseId, StepId, StudyPlanId, UserId};

pub use content::{Challenge, ChallengeDifficulty, PlanTier, Project, Quiz, Tutorial};
pub use phase::{MatchRule, Phase, PhaseSpec};
pub use plan::{HOURS_PER_WEEK, StudyPlan, weeks_for_hours};
pub use progress::{
    ChallengeProgressEntry, CompletionStatus, ProgressRecord, ProjectProgressEntry,
    TutorialProgressEntry, progress_percentage,
};
pub use step::{DifficultyTier, Step, StepKind, estimate_hours};
