use std::collections::BTreeSet;

/// Maps a content item's text fields to a set of skill labels.
///
/// Treated as a pure external function by the phase builder; implementations
/// must be deterministic for plan assembly to be stable across calls.
pub trait SkillTagger: Send + Sync {
    fn extract(&self, title: &str, description: &str, category: &str) -> BTreeSet<String>;
}

/// Vocabulary-driven tagger: a skill label is attached when its trigger word
/// appears in the title or description. The category is always included as a
/// skill of its own.
pub struct KeywordSkillTagger {
    vocabulary: Vec<(&'static str, &'static str)>,
}

impl KeywordSkillTagger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vocabulary: vec![
                ("html", "HTML"),
                ("semantic", "Semantic Markup"),
                ("accessibility", "Accessibility"),
                ("css", "CSS"),
                ("flexbox", "CSS Layout"),
                ("grid", "CSS Layout"),
                ("responsive", "Responsive Design"),
                ("javascript", "JavaScript"),
                ("function", "JavaScript"),
                ("array", "Data Structures"),
                ("dom", "DOM"),
                ("event", "Event Handling"),
                ("class", "Object-Oriented Programming"),
                ("inheritance", "Object-Oriented Programming"),
                ("async", "Async Programming"),
                ("promise", "Async Programming"),
                ("fetch", "HTTP APIs"),
                ("api", "HTTP APIs"),
                ("node", "Node.js"),
                ("server", "Backend Development"),
                ("express", "Backend Development"),
                ("sql", "SQL"),
                ("database", "Databases"),
                ("test", "Testing"),
                ("git", "Version Control"),
            ],
        }
    }
}

impl Default for KeywordSkillTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillTagger for KeywordSkillTagger {
    fn extract(&self, title: &str, description: &str, category: &str) -> BTreeSet<String> {
        let text = format!("{title} {description}").to_lowercase();
        let mut skills: BTreeSet<String> = self
            .vocabulary
            .iter()
            .filter(|(trigger, _)| text.contains(trigger))
            .map(|(_, skill)| (*skill).to_owned())
            .collect();
        if !category.is_empty() {
            skills.insert(category.to_owned());
        }
        skills
    }
}
