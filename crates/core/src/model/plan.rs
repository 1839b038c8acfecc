use serde::{Deserialize, Serialize};

use crate::model::ids::{StepId, StudyPlanId};
use crate::model::phase::Phase;
use crate::model::step::Step;

/// Hours of study assumed per week when converting effort to weeks.
pub const HOURS_PER_WEEK: f64 = 8.0;

/// An assembled curriculum: ordered phases, each with an ordered step chain.
///
/// Treated as an immutable snapshot — phase order comes from the static
/// phase-spec table, and step ids are stable as long as content slugs are,
/// which is what makes progress reconciliation well-defined across rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: StudyPlanId,
    pub title: String,
    pub description: String,
    pub total_hours: f64,
    pub total_weeks: u32,
    pub phases: Vec<Phase>,
}

impl StudyPlan {
    /// Builds a plan from ordered phases, computing the effort totals.
    #[must_use]
    pub fn new(
        id: StudyPlanId,
        title: impl Into<String>,
        description: impl Into<String>,
        phases: Vec<Phase>,
    ) -> Self {
        let total_hours: f64 = phases.iter().map(Phase::estimated_hours).sum();
        let total_weeks = weeks_for_hours(total_hours);
        Self {
            id,
            title: title.into(),
            description: description.into(),
            total_hours,
            total_weeks,
            phases,
        }
    }

    /// Count of steps plus projects across every phase.
    #[must_use]
    pub fn total_step_count(&self) -> usize {
        self.phases.iter().map(Phase::step_count).sum()
    }

    /// Iterates every step and project in plan order.
    pub fn iter_steps(&self) -> impl Iterator<Item = &Step> {
        self.phases
            .iter()
            .flat_map(|p| p.steps.iter().chain(&p.projects))
    }

    /// Looks a step up by id anywhere in the plan.
    #[must_use]
    pub fn find_step(&self, id: &StepId) -> Option<&Step> {
        self.iter_steps().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn contains_step(&self, id: &StepId) -> bool {
        self.find_step(id).is_some()
    }
}

/// Converts total effort to whole weeks at [`HOURS_PER_WEEK`].
#[must_use]
pub fn weeks_for_hours(hours: f64) -> u32 {
    if hours <= 0.0 {
        return 0;
    }
    let weeks = (hours / HOURS_PER_WEEK).ceil();
    if weeks >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        weeks as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::PhaseId;
    use crate::model::step::{DifficultyTier, StepKind};
    use std::collections::BTreeSet;

    fn build_step(slug: &str, hours: f64) -> Step {
        Step {
            id: StepId::for_resource(StepKind::Tutorial, slug),
            title: slug.to_owned(),
            description: String::new(),
            kind: StepKind::Tutorial,
            resource_slug: slug.to_owned(),
            estimated_hours: hours,
            difficulty: DifficultyTier::Beginner,
            category: "html".to_owned(),
            prerequisites: Vec::new(),
            skills: BTreeSet::new(),
            order: 1,
            is_premium: false,
            required_plan: crate::model::PlanTier::Free,
        }
    }

    fn build_phase(id: &str, steps: Vec<Step>, projects: Vec<Step>) -> Phase {
        Phase {
            id: PhaseId::new(id),
            title: id.to_owned(),
            description: String::new(),
            color_token: "emerald".to_owned(),
            icon_token: "code".to_owned(),
            estimated_weeks: 2,
            steps,
            projects,
        }
    }

    #[test]
    fn totals_cover_steps_and_projects() {
        let plan = StudyPlan::new(
            StudyPlanId::new("p"),
            "Plan",
            "",
            vec![
                build_phase("a", vec![build_step("one", 3.0)], vec![build_step("pr", 8.0)]),
                build_phase("b", vec![build_step("two", 6.0)], Vec::new()),
            ],
        );

        assert_eq!(plan.total_step_count(), 3);
        assert_eq!(plan.total_hours, 17.0);
        assert_eq!(plan.total_weeks, 3); // ceil(17 / 8)
    }

    #[test]
    fn weeks_round_up() {
        assert_eq!(weeks_for_hours(0.0), 0);
        assert_eq!(weeks_for_hours(8.0), 1);
        assert_eq!(weeks_for_hours(8.1), 2);
    }

    #[test]
    fn find_step_searches_projects_too() {
        let project = build_step("capstone", 8.0);
        let plan = StudyPlan::new(
            StudyPlanId::new("p"),
            "Plan",
            "",
            vec![build_phase("a", Vec::new(), vec![project.clone()])],
        );
        assert_eq!(plan.find_step(&project.id), Some(&project));
        assert!(!plan.contains_step(&StepId::new("tutorial-missing")));
    }
}
