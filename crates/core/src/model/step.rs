use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::content::{ChallengeDifficulty, PlanTier};
use crate::model::ids::StepId;

/// Kind of content a step points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Tutorial,
    Challenge,
    Quiz,
    Project,
}

impl StepKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Tutorial => "tutorial",
            StepKind::Challenge => "challenge",
            StepKind::Quiz => "quiz",
            StepKind::Project => "project",
        }
    }

    /// Base effort in hours before the difficulty multiplier.
    #[must_use]
    pub fn base_hours(&self) -> f64 {
        match self {
            StepKind::Tutorial => 3.0,
            StepKind::Challenge => 2.0,
            StepKind::Quiz => 0.5,
            StepKind::Project => 8.0,
        }
    }
}

/// Three-level difficulty tier surfaced to learners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    /// Maps the 1–5 numeric scale: ≤2 beginner, ≤4 intermediate, else advanced.
    #[must_use]
    pub fn from_numeric(difficulty: u8) -> Self {
        match difficulty {
            0..=2 => DifficultyTier::Beginner,
            3..=4 => DifficultyTier::Intermediate,
            _ => DifficultyTier::Advanced,
        }
    }

    /// Challenge difficulties map 1:1 onto the equivalent tier.
    #[must_use]
    pub fn from_challenge(difficulty: ChallengeDifficulty) -> Self {
        match difficulty {
            ChallengeDifficulty::Easy => DifficultyTier::Beginner,
            ChallengeDifficulty::Medium => DifficultyTier::Intermediate,
            ChallengeDifficulty::Hard => DifficultyTier::Advanced,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Advanced => "advanced",
        }
    }
}

/// Estimated effort for a step: base hours for the kind times the numeric
/// difficulty multiplier. Quizzes are a fixed half hour regardless.
#[must_use]
pub fn estimate_hours(kind: StepKind, difficulty_multiplier: f64) -> f64 {
    match kind {
        StepKind::Quiz => StepKind::Quiz.base_hours(),
        _ => kind.base_hours() * difficulty_multiplier,
    }
}

/// One unit of curriculum content placed into a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub kind: StepKind,
    /// Slug of the underlying content item; `id` is derived from this.
    pub resource_slug: String,
    pub estimated_hours: f64,
    pub difficulty: DifficultyTier,
    pub category: String,
    /// Within a phase's step list this is always empty or a single id — the
    /// previous link in the phase's linear chain.
    pub prerequisites: Vec<StepId>,
    pub skills: BTreeSet<String>,
    /// 1-based position within the phase (steps and projects share a counter).
    pub order: u32,
    pub is_premium: bool,
    pub required_plan: PlanTier,
}
