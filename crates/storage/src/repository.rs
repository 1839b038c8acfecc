use async_trait::async_trait;
use curriculum_core::model::{
    Challenge, ChallengeProgressEntry, ProgressRecord, Project, ProjectProgressEntry,
    StudyPlanId, Tutorial, TutorialProgressEntry, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only source of published learning content.
///
/// Every listing returns published items only, each kind independently; the
/// aggregator fans the three reads out concurrently.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List published tutorials, each with its quiz (if any) joined on.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be read.
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, StorageError>;

    /// List published challenges.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be read.
    async fn list_challenges(&self) -> Result<Vec<Challenge>, StorageError>;

    /// List published projects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be read.
    async fn list_projects(&self) -> Result<Vec<Project>, StorageError>;
}

/// Per-content-type progress views plus the consolidated record's write
/// surface. The three views evolve independently; only `upsert_progress`
/// mutates anything this engine owns.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Tutorial completion signals for one learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the view cannot be read.
    async fn tutorial_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<TutorialProgressEntry>, StorageError>;

    /// Challenge completion signals for one learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the view cannot be read.
    async fn challenge_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ChallengeProgressEntry>, StorageError>;

    /// Project completion signals for one learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the view cannot be read.
    async fn project_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ProjectProgressEntry>, StorageError>;

    /// Fetch the consolidated record for a (user, plan) pair, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failure; a missing record is `Ok(None)`.
    async fn get_progress(
        &self,
        user: &UserId,
        plan: &StudyPlanId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Insert or update the consolidated record, atomically, keyed by
    /// (user, plan). On update, `started_at` and `hours_spent` keep their
    /// stored values regardless of what the incoming record carries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be committed; on failure
    /// the previously stored record is untouched.
    async fn upsert_progress(&self, record: &ProgressRecord)
    -> Result<ProgressRecord, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tutorials: Arc<Mutex<Vec<Tutorial>>>,
    challenges: Arc<Mutex<Vec<Challenge>>>,
    projects: Arc<Mutex<Vec<Project>>>,
    tutorial_entries: Arc<Mutex<HashMap<UserId, Vec<TutorialProgressEntry>>>>,
    challenge_entries: Arc<Mutex<HashMap<UserId, Vec<ChallengeProgressEntry>>>>,
    project_entries: Arc<Mutex<HashMap<UserId, Vec<ProjectProgressEntry>>>>,
    records: Arc<Mutex<HashMap<(UserId, StudyPlanId), ProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a published tutorial.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_tutorial(&self, tutorial: Tutorial) {
        self.tutorials.lock().expect("lock poisoned").push(tutorial);
    }

    /// Seed a published challenge.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_challenge(&self, challenge: Challenge) {
        self.challenges
            .lock()
            .expect("lock poisoned")
            .push(challenge);
    }

    /// Seed a published project.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_project(&self, project: Project) {
        self.projects.lock().expect("lock poisoned").push(project);
    }

    /// Record a tutorial progress signal for a learner, replacing any
    /// earlier entry for the same slug.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_tutorial_progress(&self, user: &UserId, entry: TutorialProgressEntry) {
        let mut guard = self.tutorial_entries.lock().expect("lock poisoned");
        let entries = guard.entry(user.clone()).or_default();
        entries.retain(|e| e.tutorial_slug != entry.tutorial_slug);
        entries.push(entry);
    }

    /// Record a challenge progress signal for a learner.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_challenge_progress(&self, user: &UserId, entry: ChallengeProgressEntry) {
        let mut guard = self.challenge_entries.lock().expect("lock poisoned");
        let entries = guard.entry(user.clone()).or_default();
        entries.retain(|e| e.challenge_slug != entry.challenge_slug);
        entries.push(entry);
    }

    /// Record a project progress signal for a learner.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_project_progress(&self, user: &UserId, entry: ProjectProgressEntry) {
        let mut guard = self.project_entries.lock().expect("lock poisoned");
        let entries = guard.entry(user.clone()).or_default();
        entries.retain(|e| e.project_slug != entry.project_slug);
        entries.push(entry);
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, StorageError> {
        let guard = self
            .tutorials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, StorageError> {
        let guard = self
            .challenges
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let guard = self
            .projects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn tutorial_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<TutorialProgressEntry>, StorageError> {
        let guard = self
            .tutorial_entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn challenge_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ChallengeProgressEntry>, StorageError> {
        let guard = self
            .challenge_entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn project_progress(
        &self,
        user: &UserId,
    ) -> Result<Vec<ProjectProgressEntry>, StorageError> {
        let guard = self
            .project_entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn get_progress(
        &self,
        user: &UserId,
        plan: &StudyPlanId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(user.clone(), plan.clone())).cloned())
    }

    async fn upsert_progress(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = (record.user_id.clone(), record.study_plan_id.clone());
        let stored = match guard.get(&key) {
            // Existing row keeps its started_at and hours_spent.
            Some(existing) => ProgressRecord {
                started_at: existing.started_at,
                hours_spent: existing.hours_spent,
                ..record.clone()
            },
            None => record.clone(),
        };
        guard.insert(key, stored.clone());
        Ok(stored)
    }
}

/// Aggregates content and progress repositories behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let content: Arc<dyn ContentRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { content, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use curriculum_core::model::{CompletionStatus, PlanTier};
    use std::collections::BTreeSet;

    fn build_tutorial(slug: &str) -> Tutorial {
        Tutorial {
            slug: slug.to_owned(),
            title: format!("Tutorial {slug}"),
            description: String::new(),
            difficulty: 2,
            order: 1,
            category_slug: "html".to_owned(),
            quiz: None,
            is_premium: false,
            required_plan: PlanTier::Free,
        }
    }

    fn build_record(user: &str) -> ProgressRecord {
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ProgressRecord {
            user_id: UserId::new(user),
            study_plan_id: StudyPlanId::new("web-developer-path"),
            current_phase_id: None,
            current_step_id: None,
            completed_steps: BTreeSet::new(),
            total_progress_percentage: 0,
            hours_spent: 0.0,
            started_at: at,
            last_activity_at: at,
            estimated_completion_date: None,
        }
    }

    #[tokio::test]
    async fn seeded_content_is_listed() {
        let repo = InMemoryRepository::new();
        repo.seed_tutorial(build_tutorial("html-intro"));
        repo.seed_tutorial(build_tutorial("html-forms"));

        let tutorials = repo.list_tutorials().await.unwrap();
        assert_eq!(tutorials.len(), 2);
        assert!(repo.list_challenges().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn progress_entries_replace_by_slug() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        repo.set_tutorial_progress(
            &user,
            TutorialProgressEntry {
                tutorial_slug: "html-intro".to_owned(),
                status: CompletionStatus::InProgress,
                quiz_passed: false,
            },
        );
        repo.set_tutorial_progress(
            &user,
            TutorialProgressEntry {
                tutorial_slug: "html-intro".to_owned(),
                status: CompletionStatus::Completed,
                quiz_passed: true,
            },
        );

        let entries = repo.tutorial_progress(&user).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].quiz_passed);
    }

    #[tokio::test]
    async fn upsert_preserves_started_at_and_hours() {
        let repo = InMemoryRepository::new();
        let first = build_record("u1");
        repo.upsert_progress(&first).await.unwrap();

        let mut second = build_record("u1");
        second.started_at = first.started_at + chrono::Duration::days(7);
        second.hours_spent = 12.5;
        second.total_progress_percentage = 40;
        let stored = repo.upsert_progress(&second).await.unwrap();

        assert_eq!(stored.started_at, first.started_at);
        assert_eq!(stored.hours_spent, 0.0);
        assert_eq!(stored.total_progress_percentage, 40);
    }

    #[tokio::test]
    async fn records_are_keyed_by_user_and_plan() {
        let repo = InMemoryRepository::new();
        repo.upsert_progress(&build_record("u1")).await.unwrap();
        repo.upsert_progress(&build_record("u2")).await.unwrap();

        let plan = StudyPlanId::new("web-developer-path");
        assert!(
            repo.get_progress(&UserId::new("u1"), &plan)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.get_progress(&UserId::new("u3"), &plan)
                .await
                .unwrap()
                .is_none()
        );
    }
}
