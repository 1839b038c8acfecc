use serde::{Deserialize, Serialize};

use crate::model::ids::PhaseId;
use crate::model::step::Step;

/// Content-matching policy for a phase, evaluated in a fixed priority order:
/// category equality is authoritative, keywords are the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchRule {
    /// Exact match on the content item's category slug.
    Category(String),
    /// Any keyword hit on the item's title + description, case-insensitive.
    ///
    /// A multi-word keyword ("object-oriented") requires every constituent
    /// word to appear somewhere in the text, not necessarily adjacent; a
    /// single word is a plain substring match.
    Keywords(Vec<String>),
}

impl MatchRule {
    /// Evaluates the rule against an item's category (if it has one) and its
    /// searchable text.
    #[must_use]
    pub fn is_match(&self, category: Option<&str>, text: &str) -> bool {
        match self {
            MatchRule::Category(slug) => category == Some(slug.as_str()),
            MatchRule::Keywords(keywords) => {
                let haystack = text.to_lowercase();
                keywords.iter().any(|kw| keyword_hits(kw, &haystack))
            }
        }
    }
}

/// True when every constituent word of `keyword` appears in `haystack`.
/// `haystack` must already be lowercased.
fn keyword_hits(keyword: &str, haystack: &str) -> bool {
    let mut words = keyword
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if words.is_empty() {
        return false;
    }
    words.drain(..).all(|w| haystack.contains(&w))
}

/// Static definition of a curriculum phase: identity, presentation tokens,
/// and the content-matching inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub id: PhaseId,
    pub title: String,
    pub description: String,
    pub color_token: String,
    pub icon_token: String,
    pub estimated_weeks: u32,
    pub category_slug: String,
    pub keywords: Vec<String>,
}

impl PhaseSpec {
    /// The authoritative rule: exact category match.
    #[must_use]
    pub fn category_rule(&self) -> MatchRule {
        MatchRule::Category(self.category_slug.clone())
    }

    /// The fallback rule: keyword heuristics over title + description.
    #[must_use]
    pub fn keyword_rule(&self) -> MatchRule {
        MatchRule::Keywords(self.keywords.clone())
    }
}

/// A built phase: ordered steps forming a linear prerequisite chain, plus an
/// independent project list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub title: String,
    pub description: String,
    pub color_token: String,
    pub icon_token: String,
    pub estimated_weeks: u32,
    pub steps: Vec<Step>,
    /// Kept separate from `steps`; projects hang off the chain but do not
    /// extend it.
    pub projects: Vec<Step>,
}

impl Phase {
    /// Steps plus projects.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len() + self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.projects.is_empty()
    }

    /// Total estimated hours across steps and projects.
    #[must_use]
    pub fn estimated_hours(&self) -> f64 {
        self.steps
            .iter()
            .chain(&self.projects)
            .map(|s| s.estimated_hours)
            .sum()
    }
}
