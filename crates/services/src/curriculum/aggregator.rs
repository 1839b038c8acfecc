use std::collections::HashSet;
use std::sync::Arc;

use curriculum_core::model::{Challenge, Project, Tutorial};
use storage::repository::ContentRepository;

use crate::error::PlanError;

/// Snapshot of all published content, deduplicated per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSet {
    pub tutorials: Vec<Tutorial>,
    pub challenges: Vec<Challenge>,
    pub projects: Vec<Project>,
}

impl ContentSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty() && self.challenges.is_empty() && self.projects.is_empty()
    }
}

/// Fetches the three content listings concurrently and joins them.
#[derive(Clone)]
pub struct ContentAggregator {
    content: Arc<dyn ContentRepository>,
}

impl ContentAggregator {
    #[must_use]
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Fan out the three independent reads, fan in before returning.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Aggregation` if any single fetch fails; a partial
    /// catalog is never returned.
    pub async fn fetch_all(&self) -> Result<ContentSet, PlanError> {
        let (tutorials, challenges, projects) = tokio::try_join!(
            self.content.list_tutorials(),
            self.content.list_challenges(),
            self.content.list_projects(),
        )
        .map_err(PlanError::Aggregation)?;

        Ok(ContentSet {
            tutorials: dedup_by_slug(tutorials, |t| &t.slug),
            challenges: dedup_by_slug(challenges, |c| &c.slug),
            projects: dedup_by_slug(projects, |p| &p.slug),
        })
    }
}

/// Keeps the first occurrence of each slug, preserving order.
fn dedup_by_slug<T>(items: Vec<T>, slug: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(slug(&item).to_owned()) {
            out.push(item);
        }
    }
    out
}
