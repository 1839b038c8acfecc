use curriculum_core::model::{PhaseId, PhaseSpec, StudyPlan, StudyPlanId};

use super::aggregator::ContentSet;
use super::phase::PhaseBuilder;
use super::tagger::SkillTagger;

/// The fixed, ordered curriculum taxonomy. Phase order comes from this
/// table, never from content, so the assembled plan is reproducible given
/// the same catalog.
#[must_use]
pub fn default_phase_specs() -> Vec<PhaseSpec> {
    fn spec(
        id: &str,
        title: &str,
        description: &str,
        color: &str,
        icon: &str,
        weeks: u32,
        category: &str,
        keywords: &[&str],
    ) -> PhaseSpec {
        PhaseSpec {
            id: PhaseId::new(id),
            title: title.to_owned(),
            description: description.to_owned(),
            color_token: color.to_owned(),
            icon_token: icon.to_owned(),
            estimated_weeks: weeks,
            category_slug: category.to_owned(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    vec![
        spec(
            "web-foundations",
            "Web Foundations",
            "Structure pages with semantic, accessible HTML",
            "emerald",
            "code",
            2,
            "html",
            &["html", "semantic", "markup", "accessibility"],
        ),
        spec(
            "css-foundations",
            "CSS Foundations",
            "Style and lay out pages with modern CSS",
            "sky",
            "paintbrush",
            3,
            "css",
            &["css", "flexbox", "grid", "responsive"],
        ),
        spec(
            "javascript-basics",
            "JavaScript Basics",
            "Variables, functions, and control flow",
            "amber",
            "braces",
            4,
            "javascript",
            &["javascript", "variable", "function", "array"],
        ),
        spec(
            "dom-and-events",
            "DOM & Events",
            "Make pages interactive in the browser",
            "violet",
            "mouse-pointer",
            3,
            "dom",
            &["dom", "event", "browser", "interactive"],
        ),
        spec(
            "object-oriented-js",
            "Object-Oriented JavaScript",
            "Classes, prototypes, and program structure",
            "rose",
            "boxes",
            3,
            "oop",
            &["object-oriented", "class", "prototype", "inheritance"],
        ),
        spec(
            "async-javascript",
            "Asynchronous JavaScript",
            "Promises, async/await, and talking to APIs",
            "cyan",
            "timer",
            3,
            "async",
            &["async", "promise", "fetch", "api"],
        ),
        spec(
            "backend-basics",
            "Backend Basics",
            "Servers, routing, and REST with Node.js",
            "orange",
            "server",
            4,
            "node",
            &["node", "server", "express", "rest"],
        ),
        spec(
            "databases",
            "Databases",
            "Model and query persistent data",
            "lime",
            "database",
            3,
            "databases",
            &["sql", "database", "schema", "query"],
        ),
    ]
}

/// Runs the phase builder over an ordered spec list and produces the plan.
pub struct StudyPlanAssembler;

impl StudyPlanAssembler {
    /// Builds the complete plan: one phase per spec, in spec order.
    ///
    /// The result is an immutable snapshot; step ids only change if the
    /// underlying content slugs do.
    #[must_use]
    pub fn assemble(
        specs: &[PhaseSpec],
        content: &ContentSet,
        tagger: &dyn SkillTagger,
    ) -> StudyPlan {
        let builder = PhaseBuilder::new(content, tagger);
        let phases = specs.iter().map(|spec| builder.build(spec)).collect();
        StudyPlan::new(
            StudyPlanId::new("web-developer-path"),
            "Web Developer Path",
            "A guided path from first HTML tag to full-stack fundamentals",
            phases,
        )
    }
}
