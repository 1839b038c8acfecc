use curriculum_core::model::{
    Challenge, DifficultyTier, Phase, PhaseSpec, Project, Step, StepId, StepKind, Tutorial,
    estimate_hours,
};
use tracing::debug;

use super::aggregator::ContentSet;
use super::tagger::SkillTagger;

/// Keyword-matched challenges per phase, to avoid overloading it.
const MAX_CHALLENGES_PER_PHASE: usize = 3;
/// Projects per phase.
const MAX_PROJECTS_PER_PHASE: usize = 2;

/// Builds one phase from a spec and the aggregated content snapshot.
///
/// Selection policy: tutorials by exact category (authoritative — no keyword
/// fallback once a category matches), challenges by keyword only, projects
/// by category with keyword fallback. Steps are linked into a single linear
/// prerequisite chain; projects hang off the chain without extending it.
pub struct PhaseBuilder<'a> {
    content: &'a ContentSet,
    tagger: &'a dyn SkillTagger,
}

impl<'a> PhaseBuilder<'a> {
    #[must_use]
    pub fn new(content: &'a ContentSet, tagger: &'a dyn SkillTagger) -> Self {
        Self { content, tagger }
    }

    /// Builds the phase. A spec that matches no content still yields an
    /// empty phase; thin phases are expected while content is authored.
    #[must_use]
    pub fn build(&self, spec: &PhaseSpec) -> Phase {
        let tutorials = self.select_tutorials(spec);
        let challenges = self.select_challenges(spec);
        let projects = self.select_projects(spec);

        let mut steps: Vec<Step> = Vec::new();
        let mut order = 1_u32;
        let mut prev: Option<StepId> = None;

        for tutorial in tutorials {
            let step = self.tutorial_step(tutorial, order, prev.as_ref());
            order += 1;
            prev = Some(step.id.clone());
            steps.push(step);

            if let Some(quiz_step) = self.quiz_step(tutorial, spec, order) {
                order += 1;
                prev = Some(quiz_step.id.clone());
                steps.push(quiz_step);
            }
        }

        for challenge in challenges {
            let step = self.challenge_step(challenge, spec, order, prev.as_ref());
            order += 1;
            prev = Some(step.id.clone());
            steps.push(step);
        }

        // Projects attach to whatever the chain ends at; they do not chain
        // to each other.
        let last_step = prev;
        let mut project_steps: Vec<Step> = Vec::new();
        for project in projects {
            let step = self.project_step(project, order, last_step.as_ref());
            order += 1;
            project_steps.push(step);
        }

        if steps.is_empty() && project_steps.is_empty() {
            debug!(phase = %spec.id, category = %spec.category_slug, "phase matched no content");
        }

        Phase {
            id: spec.id.clone(),
            title: spec.title.clone(),
            description: spec.description.clone(),
            color_token: spec.color_token.clone(),
            icon_token: spec.icon_token.clone(),
            estimated_weeks: spec.estimated_weeks,
            steps,
            projects: project_steps,
        }
    }

    fn select_tutorials(&self, spec: &PhaseSpec) -> Vec<&'a Tutorial> {
        let rule = spec.category_rule();
        let mut matched: Vec<&Tutorial> = self
            .content
            .tutorials
            .iter()
            .filter(|t| rule.is_match(Some(&t.category_slug), ""))
            .collect();
        matched.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.slug.cmp(&b.slug)));
        matched
    }

    fn select_challenges(&self, spec: &PhaseSpec) -> Vec<&'a Challenge> {
        let rule = spec.keyword_rule();
        self.content
            .challenges
            .iter()
            .filter(|c| rule.is_match(None, &format!("{} {}", c.title, c.description)))
            .take(MAX_CHALLENGES_PER_PHASE)
            .collect()
    }

    fn select_projects(&self, spec: &PhaseSpec) -> Vec<&'a Project> {
        let category = spec.category_rule();
        let mut matched: Vec<&Project> = self
            .content
            .projects
            .iter()
            .filter(|p| category.is_match(Some(&p.category), ""))
            .collect();

        // Keyword fallback only when no categorical match exists, so an item
        // can never be picked up twice by the same phase.
        if matched.is_empty() {
            let keywords = spec.keyword_rule();
            matched = self
                .content
                .projects
                .iter()
                .filter(|p| keywords.is_match(None, &format!("{} {}", p.title, p.description)))
                .collect();
        }

        matched.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.slug.cmp(&b.slug)));
        matched.truncate(MAX_PROJECTS_PER_PHASE);
        matched
    }

    fn tutorial_step(&self, tutorial: &Tutorial, order: u32, prev: Option<&StepId>) -> Step {
        Step {
            id: StepId::for_resource(StepKind::Tutorial, &tutorial.slug),
            title: tutorial.title.clone(),
            description: tutorial.description.clone(),
            kind: StepKind::Tutorial,
            resource_slug: tutorial.slug.clone(),
            estimated_hours: estimate_hours(StepKind::Tutorial, f64::from(tutorial.difficulty)),
            difficulty: DifficultyTier::from_numeric(tutorial.difficulty),
            category: tutorial.category_slug.clone(),
            prerequisites: prev.cloned().into_iter().collect(),
            skills: self.tagger.extract(
                &tutorial.title,
                &tutorial.description,
                &tutorial.category_slug,
            ),
            order,
            is_premium: tutorial.is_premium,
            required_plan: tutorial.required_plan,
        }
    }

    /// A tutorial's quiz becomes its own step, gated on the tutorial and
    /// continuing the chain.
    fn quiz_step(&self, tutorial: &Tutorial, spec: &PhaseSpec, order: u32) -> Option<Step> {
        let quiz = tutorial.quiz.as_ref()?;
        let tutorial_id = StepId::for_resource(StepKind::Tutorial, &tutorial.slug);
        Some(Step {
            id: StepId::for_resource(StepKind::Quiz, &quiz.slug),
            title: quiz.title.clone(),
            description: format!("Test your knowledge of {}", tutorial.title),
            kind: StepKind::Quiz,
            resource_slug: quiz.slug.clone(),
            estimated_hours: estimate_hours(StepKind::Quiz, 1.0),
            difficulty: DifficultyTier::from_numeric(tutorial.difficulty),
            category: spec.category_slug.clone(),
            prerequisites: vec![tutorial_id],
            skills: self.tagger.extract(
                &quiz.title,
                &tutorial.description,
                &tutorial.category_slug,
            ),
            order,
            is_premium: tutorial.is_premium,
            required_plan: tutorial.required_plan,
        })
    }

    fn challenge_step(
        &self,
        challenge: &Challenge,
        spec: &PhaseSpec,
        order: u32,
        prev: Option<&StepId>,
    ) -> Step {
        Step {
            id: StepId::for_resource(StepKind::Challenge, &challenge.slug),
            title: challenge.title.clone(),
            description: challenge.description.clone(),
            kind: StepKind::Challenge,
            resource_slug: challenge.slug.clone(),
            estimated_hours: estimate_hours(StepKind::Challenge, challenge.difficulty.multiplier()),
            difficulty: DifficultyTier::from_challenge(challenge.difficulty),
            category: spec.category_slug.clone(),
            prerequisites: prev.cloned().into_iter().collect(),
            skills: self.tagger.extract(
                &challenge.title,
                &challenge.description,
                &spec.category_slug,
            ),
            order,
            is_premium: challenge.is_premium,
            required_plan: challenge.required_plan,
        }
    }

    fn project_step(&self, project: &Project, order: u32, last_step: Option<&StepId>) -> Step {
        let estimated_hours = project
            .estimated_hours
            .unwrap_or_else(|| estimate_hours(StepKind::Project, f64::from(project.difficulty)));
        Step {
            id: StepId::for_resource(StepKind::Project, &project.slug),
            title: project.title.clone(),
            description: project.description.clone(),
            kind: StepKind::Project,
            resource_slug: project.slug.clone(),
            estimated_hours,
            difficulty: DifficultyTier::from_numeric(project.difficulty),
            category: project.category.clone(),
            prerequisites: last_step.cloned().into_iter().collect(),
            skills: self
                .tagger
                .extract(&project.title, &project.description, &project.category),
            order,
            is_premium: project.is_premium,
            required_plan: project.required_plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum_core::model::{ChallengeDifficulty, PhaseId, PlanTier, Quiz};
    use std::collections::BTreeSet;

    struct NullTagger;

    impl SkillTagger for NullTagger {
        fn extract(&self, _: &str, _: &str, _: &str) -> BTreeSet<String> {
            BTreeSet::new()
        }
    }

    fn build_spec(category: &str, keywords: &[&str]) -> PhaseSpec {
        PhaseSpec {
            id: PhaseId::new(format!("{category}-phase")),
            title: format!("{category} phase"),
            description: String::new(),
            color_token: "emerald".to_owned(),
            icon_token: "code".to_owned(),
            estimated_weeks: 2,
            category_slug: category.to_owned(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    fn build_tutorial(slug: &str, category: &str, order: u32, difficulty: u8) -> Tutorial {
        Tutorial {
            slug: slug.to_owned(),
            title: format!("Tutorial {slug}"),
            description: String::new(),
            difficulty,
            order,
            category_slug: category.to_owned(),
            quiz: None,
            is_premium: false,
            required_plan: PlanTier::Free,
        }
    }

    fn build_challenge(slug: &str, title: &str, difficulty: ChallengeDifficulty) -> Challenge {
        Challenge {
            slug: slug.to_owned(),
            title: title.to_owned(),
            description: String::new(),
            difficulty,
            is_premium: false,
            required_plan: PlanTier::Free,
        }
    }

    fn build_project(slug: &str, category: &str, order: u32) -> Project {
        Project {
            slug: slug.to_owned(),
            title: format!("Project {slug}"),
            description: String::new(),
            category: category.to_owned(),
            difficulty: 2,
            order,
            estimated_hours: None,
            is_premium: false,
            required_plan: PlanTier::Free,
        }
    }

    #[test]
    fn tutorials_chain_in_declared_order() {
        let content = ContentSet {
            tutorials: vec![
                build_tutorial("second", "html", 2, 1),
                build_tutorial("first", "html", 1, 1),
            ],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("html", &[]));

        assert_eq!(phase.steps.len(), 2);
        assert_eq!(phase.steps[0].id.as_str(), "tutorial-first");
        assert_eq!(phase.steps[1].id.as_str(), "tutorial-second");
        assert!(phase.steps[0].prerequisites.is_empty());
        assert_eq!(phase.steps[1].prerequisites, vec![phase.steps[0].id.clone()]);
        assert_eq!(phase.steps[0].order, 1);
        assert_eq!(phase.steps[1].order, 2);
    }

    #[test]
    fn quiz_follows_its_tutorial_and_continues_the_chain() {
        let mut tutorial = build_tutorial("css-flexbox", "css", 1, 3);
        tutorial.quiz = Some(Quiz {
            slug: "css-flexbox-quiz".to_owned(),
            title: "Flexbox Quiz".to_owned(),
            tutorial_slug: "css-flexbox".to_owned(),
        });
        let content = ContentSet {
            tutorials: vec![tutorial, build_tutorial("css-grid", "css", 2, 1)],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &[]));

        assert_eq!(phase.steps.len(), 3);
        assert_eq!(phase.steps[0].kind, StepKind::Tutorial);
        assert_eq!(phase.steps[1].kind, StepKind::Quiz);
        assert_eq!(phase.steps[1].prerequisites, vec![phase.steps[0].id.clone()]);
        // The next tutorial chains off the quiz, not the tutorial.
        assert_eq!(phase.steps[2].prerequisites, vec![phase.steps[1].id.clone()]);
    }

    #[test]
    fn tutorial_effort_and_tier_follow_difficulty() {
        let mut tutorial = build_tutorial("t", "css", 1, 3);
        tutorial.quiz = Some(Quiz {
            slug: "t-quiz".to_owned(),
            title: "Quiz".to_owned(),
            tutorial_slug: "t".to_owned(),
        });
        let content = ContentSet {
            tutorials: vec![tutorial],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &[]));

        assert_eq!(phase.steps[0].estimated_hours, 9.0);
        assert_eq!(phase.steps[0].difficulty, DifficultyTier::Intermediate);
        assert_eq!(phase.steps[1].estimated_hours, 0.5);
    }

    #[test]
    fn challenges_match_by_keyword_and_cap_at_three() {
        let content = ContentSet {
            challenges: vec![
                build_challenge("c1", "Flexbox warmup", ChallengeDifficulty::Easy),
                build_challenge("c2", "Flexbox gallery", ChallengeDifficulty::Medium),
                build_challenge("c3", "Flexbox nav", ChallengeDifficulty::Easy),
                build_challenge("c4", "Flexbox footer", ChallengeDifficulty::Hard),
                build_challenge("c5", "Sorting numbers", ChallengeDifficulty::Easy),
            ],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &["flexbox"]));

        assert_eq!(phase.steps.len(), 3);
        assert!(phase.steps.iter().all(|s| s.kind == StepKind::Challenge));
        // Natural order wins, so c4 is the one cut.
        assert_eq!(phase.steps[2].resource_slug, "c3");
    }

    #[test]
    fn multi_word_keyword_needs_every_word() {
        let content = ContentSet {
            challenges: vec![
                build_challenge("c1", "Design an object model", ChallengeDifficulty::Easy),
                build_challenge(
                    "c2",
                    "Objects oriented around classes",
                    ChallengeDifficulty::Easy,
                ),
            ],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger)
            .build(&build_spec("oop", &["object-oriented"]));

        assert_eq!(phase.steps.len(), 1);
        assert_eq!(phase.steps[0].resource_slug, "c2");
    }

    #[test]
    fn projects_prefer_category_and_skip_keyword_pass() {
        let mut keyword_bait = build_project("bait", "other", 1);
        keyword_bait.title = "A css masterpiece".to_owned();
        let content = ContentSet {
            projects: vec![build_project("site", "css", 1), keyword_bait],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &["css"]));

        // Category matched, so the keyword pass never ran.
        assert_eq!(phase.projects.len(), 1);
        assert_eq!(phase.projects[0].resource_slug, "site");
    }

    #[test]
    fn projects_fall_back_to_keywords_and_cap_at_two() {
        let mut p1 = build_project("p1", "other", 1);
        p1.title = "responsive gallery".to_owned();
        let mut p2 = build_project("p2", "other", 2);
        p2.title = "responsive shop".to_owned();
        let mut p3 = build_project("p3", "other", 3);
        p3.title = "responsive blog".to_owned();
        let content = ContentSet {
            projects: vec![p3, p1, p2],
            ..ContentSet::default()
        };
        let phase =
            PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &["responsive"]));

        assert_eq!(phase.projects.len(), 2);
        assert_eq!(phase.projects[0].resource_slug, "p1");
        assert_eq!(phase.projects[1].resource_slug, "p2");
    }

    #[test]
    fn projects_attach_to_last_step_without_chaining() {
        let content = ContentSet {
            tutorials: vec![build_tutorial("t1", "css", 1, 1)],
            projects: vec![build_project("p1", "css", 1), build_project("p2", "css", 2)],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &[]));

        let last_step_id = phase.steps.last().unwrap().id.clone();
        assert_eq!(phase.projects[0].prerequisites, vec![last_step_id.clone()]);
        assert_eq!(phase.projects[1].prerequisites, vec![last_step_id]);
    }

    #[test]
    fn project_author_hours_override_the_estimate() {
        let mut project = build_project("p1", "css", 1);
        project.estimated_hours = Some(12.0);
        let content = ContentSet {
            projects: vec![project],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &[]));

        assert_eq!(phase.projects[0].estimated_hours, 12.0);
    }

    #[test]
    fn unmatched_spec_yields_an_empty_phase() {
        let content = ContentSet::default();
        let spec = build_spec("css", &["flexbox"]);
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&spec);

        assert!(phase.is_empty());
        assert_eq!(phase.id, spec.id);
    }

    #[test]
    fn projects_without_steps_have_no_prerequisites() {
        let content = ContentSet {
            projects: vec![build_project("p1", "css", 1)],
            ..ContentSet::default()
        };
        let phase = PhaseBuilder::new(&content, &NullTagger).build(&build_spec("css", &[]));

        assert!(phase.steps.is_empty());
        assert!(phase.projects[0].prerequisites.is_empty());
    }
}
