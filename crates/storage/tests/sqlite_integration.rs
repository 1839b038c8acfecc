use std::collections::BTreeSet;

use curriculum_core::model::{
    Challenge, ChallengeDifficulty, CompletionStatus, PlanTier, ProgressRecord, Project, Quiz,
    StepId, StudyPlanId, Tutorial, TutorialProgressEntry, UserId,
};
use curriculum_core::time::fixed_now;
use storage::repository::{ContentRepository, ProgressRepository};
use storage::sqlite::SqliteRepository;

fn build_tutorial(slug: &str, order: u32, with_quiz: bool) -> Tutorial {
    Tutorial {
        slug: slug.to_owned(),
        title: format!("Tutorial {slug}"),
        description: "Learn the basics".to_owned(),
        difficulty: 2,
        order,
        category_slug: "html".to_owned(),
        quiz: with_quiz.then(|| Quiz {
            slug: format!("{slug}-quiz"),
            title: format!("Quiz for {slug}"),
            tutorial_slug: slug.to_owned(),
        }),
        is_premium: false,
        required_plan: PlanTier::Free,
    }
}

fn build_record(user: &str, completed: &[&str]) -> ProgressRecord {
    ProgressRecord {
        user_id: UserId::new(user),
        study_plan_id: StudyPlanId::new("web-developer-path"),
        current_phase_id: None,
        current_step_id: None,
        completed_steps: completed
            .iter()
            .map(|s| StepId::new(*s))
            .collect::<BTreeSet<_>>(),
        total_progress_percentage: 0,
        hours_spent: 0.0,
        started_at: fixed_now(),
        last_activity_at: fixed_now(),
        estimated_completion_date: None,
    }
}

#[tokio::test]
async fn sqlite_lists_only_published_content() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_published?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_tutorial(&build_tutorial("html-intro", 1, true), true)
        .await
        .unwrap();
    repo.upsert_tutorial(&build_tutorial("html-draft", 2, false), false)
        .await
        .unwrap();
    repo.upsert_challenge(
        &Challenge {
            slug: "html-structure".to_owned(),
            title: "Structure a page".to_owned(),
            description: "Build a semantic layout".to_owned(),
            difficulty: ChallengeDifficulty::Easy,
            is_premium: false,
            required_plan: PlanTier::Free,
        },
        true,
    )
    .await
    .unwrap();
    repo.upsert_project(
        &Project {
            slug: "portfolio".to_owned(),
            title: "Portfolio site".to_owned(),
            description: "Ship a portfolio".to_owned(),
            category: "html".to_owned(),
            difficulty: 3,
            order: 1,
            estimated_hours: None,
            is_premium: true,
            required_plan: PlanTier::Premium,
        },
        true,
    )
    .await
    .unwrap();

    let tutorials = repo.list_tutorials().await.unwrap();
    assert_eq!(tutorials.len(), 1);
    assert_eq!(tutorials[0].slug, "html-intro");
    let quiz = tutorials[0].quiz.as_ref().expect("quiz joined on");
    assert_eq!(quiz.slug, "html-intro-quiz");
    assert_eq!(quiz.tutorial_slug, "html-intro");

    assert_eq!(repo.list_challenges().await.unwrap().len(), 1);
    let projects = repo.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].required_plan, PlanTier::Premium);
    assert!(projects[0].is_premium);
}

#[tokio::test]
async fn sqlite_round_trips_per_content_progress() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("learner-1");
    repo.set_tutorial_progress(
        &user,
        &TutorialProgressEntry {
            tutorial_slug: "html-intro".to_owned(),
            status: CompletionStatus::InProgress,
            quiz_passed: true,
        },
    )
    .await
    .unwrap();

    let entries = repo.tutorial_progress(&user).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, CompletionStatus::InProgress);
    assert!(entries[0].quiz_passed);

    // Another learner sees nothing.
    let other = repo.tutorial_progress(&UserId::new("learner-2")).await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn sqlite_upsert_keeps_one_row_and_preserves_started_at() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = build_record("learner-1", &[]);
    let stored = repo.upsert_progress(&first).await.unwrap();
    assert_eq!(stored.started_at, first.started_at);

    let mut second = build_record("learner-1", &["tutorial-html-intro", "quiz-html-intro-quiz"]);
    second.total_progress_percentage = 50;
    second.hours_spent = 99.0;
    second.started_at = fixed_now() + chrono::Duration::days(30);
    second.last_activity_at = fixed_now() + chrono::Duration::hours(1);
    let updated = repo.upsert_progress(&second).await.unwrap();

    // One row, original started_at and hours_spent, fresh everything else.
    assert_eq!(updated.started_at, first.started_at);
    assert_eq!(updated.hours_spent, 0.0);
    assert_eq!(updated.total_progress_percentage, 50);
    assert_eq!(updated.completed_steps.len(), 2);
    assert_eq!(updated.last_activity_at, second.last_activity_at);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_plan_progress")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn concurrent_upserts_converge_to_one_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_concurrent?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let a = build_record("learner-1", &["tutorial-html-intro"]);
    let b = build_record("learner-1", &["tutorial-html-intro"]);

    let repo_a = repo.clone();
    let repo_b = repo.clone();
    let (ra, rb) = tokio::join!(
        async move { repo_a.upsert_progress(&a).await },
        async move { repo_b.upsert_progress(&b).await },
    );
    ra.unwrap();
    rb.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_plan_progress")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
