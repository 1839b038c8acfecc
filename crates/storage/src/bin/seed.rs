//! Seeds a demo content catalog (and optionally demo progress) into SQLite.

use std::fmt;

use curriculum_core::model::{
    Challenge, ChallengeDifficulty, CompletionStatus, PlanTier, Project, Quiz, Tutorial,
    TutorialProgressEntry, UserId,
};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: Option<UserId>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("CURRICULUM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user = std::env::var("CURRICULUM_SEED_USER").ok().map(UserId::new);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    user = Some(UserId::new(require_value(&mut args, "--user")?));
                }
                other => return Err(ArgsError::UnknownArg(other.to_owned())),
            }
        }

        Ok(Self { db_url, user })
    }
}

fn tutorial(
    slug: &str,
    title: &str,
    description: &str,
    difficulty: u8,
    order: u32,
    category: &str,
    quiz_title: Option<&str>,
) -> Tutorial {
    Tutorial {
        slug: slug.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        difficulty,
        order,
        category_slug: category.to_owned(),
        quiz: quiz_title.map(|t| Quiz {
            slug: format!("{slug}-quiz"),
            title: t.to_owned(),
            tutorial_slug: slug.to_owned(),
        }),
        is_premium: false,
        required_plan: PlanTier::Free,
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse()?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let tutorials = [
        tutorial(
            "html-basics",
            "HTML Basics",
            "Elements, attributes, and document structure",
            1,
            1,
            "html",
            Some("HTML Basics Quiz"),
        ),
        tutorial(
            "semantic-html",
            "Semantic HTML",
            "Landmarks, headings, and accessible markup",
            2,
            2,
            "html",
            None,
        ),
        tutorial(
            "css-selectors",
            "CSS Selectors",
            "Targeting elements with selectors and specificity",
            2,
            1,
            "css",
            Some("CSS Selectors Quiz"),
        ),
        tutorial(
            "css-flexbox",
            "Flexbox Layout",
            "One-dimensional layout with flexbox",
            3,
            2,
            "css",
            None,
        ),
        tutorial(
            "js-variables",
            "JavaScript Variables",
            "let, const, and primitive types",
            1,
            1,
            "javascript",
            Some("Variables Quiz"),
        ),
    ];
    for t in &tutorials {
        repo.upsert_tutorial(t, true).await?;
    }

    let challenges = [
        Challenge {
            slug: "build-a-nav".to_owned(),
            title: "Build a Navigation Bar".to_owned(),
            description: "Semantic HTML markup for a site navigation".to_owned(),
            difficulty: ChallengeDifficulty::Easy,
            is_premium: false,
            required_plan: PlanTier::Free,
        },
        Challenge {
            slug: "responsive-card".to_owned(),
            title: "Responsive Card Grid".to_owned(),
            description: "A responsive grid of cards using flexbox".to_owned(),
            difficulty: ChallengeDifficulty::Medium,
            is_premium: false,
            required_plan: PlanTier::Free,
        },
    ];
    for c in &challenges {
        repo.upsert_challenge(c, true).await?;
    }

    let projects = [Project {
        slug: "personal-portfolio".to_owned(),
        title: "Personal Portfolio".to_owned(),
        description: "A multi-page portfolio site".to_owned(),
        category: "html".to_owned(),
        difficulty: 2,
        order: 1,
        estimated_hours: None,
        is_premium: false,
        required_plan: PlanTier::Free,
    }];
    for p in &projects {
        repo.upsert_project(p, true).await?;
    }

    if let Some(user) = &args.user {
        repo.set_tutorial_progress(
            user,
            &TutorialProgressEntry {
                tutorial_slug: "html-basics".to_owned(),
                status: CompletionStatus::Completed,
                quiz_passed: true,
            },
        )
        .await?;
        println!("Seeded demo progress for {user}");
    }

    println!(
        "Seeded {} tutorials, {} challenges, {} projects into {}",
        tutorials.len(),
        challenges.len(),
        projects.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
