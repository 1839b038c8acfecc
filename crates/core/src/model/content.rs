use serde::{Deserialize, Serialize};

/// Subscription tier required to access a piece of content.
///
/// Passed through to steps unchanged; this engine does not enforce gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl PlanTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "FREE",
            PlanTier::Premium => "PREMIUM",
            PlanTier::Pro => "PRO",
        }
    }

    /// Parses the storage encoding produced by [`as_str`](Self::as_str).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FREE" => Some(PlanTier::Free),
            "PREMIUM" => Some(PlanTier::Premium),
            "PRO" => Some(PlanTier::Pro),
            _ => None,
        }
    }
}

/// Difficulty scale used by coding challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeDifficulty {
    Easy,
    Medium,
    Hard,
}

impl ChallengeDifficulty {
    /// Effort multiplier on the 3-point challenge scale.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        match self {
            ChallengeDifficulty::Easy => 1.0,
            ChallengeDifficulty::Medium => 2.0,
            ChallengeDifficulty::Hard => 3.0,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeDifficulty::Easy => "EASY",
            ChallengeDifficulty::Medium => "MEDIUM",
            ChallengeDifficulty::Hard => "HARD",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EASY" => Some(ChallengeDifficulty::Easy),
            "MEDIUM" => Some(ChallengeDifficulty::Medium),
            "HARD" => Some(ChallengeDifficulty::Hard),
            _ => None,
        }
    }
}

/// A quiz attached to a tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub slug: String,
    pub title: String,
    pub tutorial_slug: String,
}

/// A published tutorial, with its quiz (if any) already joined on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Numeric difficulty, 1 (easiest) through 5.
    pub difficulty: u8,
    /// Author-declared position within the tutorial's category.
    pub order: u32,
    pub category_slug: String,
    pub quiz: Option<Quiz>,
    pub is_premium: bool,
    pub required_plan: PlanTier,
}

/// A published coding challenge. Challenges carry no category; phases pick
/// them up by keyword only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: ChallengeDifficulty,
    pub is_premium: bool,
    pub required_plan: PlanTier,
}

/// A published project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Numeric difficulty, 1 (easiest) through 5.
    pub difficulty: u8,
    /// Author-declared position within the project's category.
    pub order: u32,
    /// Author override; when absent the effort policy estimate applies.
    pub estimated_hours: Option<f64>,
    pub is_premium: bool,
    pub required_plan: PlanTier,
}
