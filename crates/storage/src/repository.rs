use async_trait::async_trait;
use chrono::{DateTime, Utc};
use journey_core::model::{LearningJourney, Lesson, User, UserId};
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

/// Archived copy of one generated lesson, kept per user and day.
///
/// The journey only caches the latest lesson; the archive preserves every
/// generated payload so past days remain inspectable.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedLesson {
    pub id: i64,
    pub user_id: UserId,
    pub day: u32,
    pub lesson: Lesson,
    pub completed: bool,
    pub archived_at: DateTime<Utc>,
}

/// Repository contract for the user aggregate.
///
/// `upsert_user` persists the whole aggregate (profile, preferences, and
/// journey) atomically; per-request mutations that only touch the journey
/// should go through `JourneyRepository` instead.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update the full user aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_user(&self, id: UserId) -> Result<User, StorageError>;
}

/// Aggregate-granularity load/save of a user's journey.
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    /// Load the journey owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown users.
    async fn load_journey(&self, user_id: UserId) -> Result<LearningJourney, StorageError>;

    /// Atomically replace the journey owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown users, or other storage
    /// errors when the write fails.
    async fn save_journey(
        &self,
        user_id: UserId,
        journey: &LearningJourney,
    ) -> Result<(), StorageError>;
}

/// Append-only archive of generated lessons.
#[async_trait]
pub trait LessonArchiveRepository: Send + Sync {
    /// Store a generated lesson and return its row ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn append_lesson(
        &self,
        user_id: UserId,
        lesson: &Lesson,
        archived_at: DateTime<Utc>,
    ) -> Result<i64, StorageError>;

    /// Mark the archived lesson for a given day as completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no lesson was archived for that day.
    async fn mark_completed(&self, user_id: UserId, day: u32) -> Result<(), StorageError>;

    /// All archived lessons for a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list_lessons(&self, user_id: UserId) -> Result<Vec<ArchivedLesson>, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    lessons: Arc<Mutex<Vec<ArchivedLesson>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<User, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl JourneyRepository for InMemoryRepository {
    async fn load_journey(&self, user_id: UserId) -> Result<LearningJourney, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(&user_id)
            .map(|u| u.journey.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn save_journey(
        &self,
        user_id: UserId,
        journey: &LearningJourney,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let user = guard.get_mut(&user_id).ok_or(StorageError::NotFound)?;
        user.journey = journey.clone();
        Ok(())
    }
}

#[async_trait]
impl LessonArchiveRepository for InMemoryRepository {
    async fn append_lesson(
        &self,
        user_id: UserId,
        lesson: &Lesson,
        archived_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len()).map_err(|_| StorageError::Conflict)? + 1;
        guard.push(ArchivedLesson {
            id,
            user_id,
            day: lesson.day,
            lesson: lesson.clone(),
            completed: false,
            archived_at,
        });
        Ok(id)
    }

    async fn mark_completed(&self, user_id: UserId, day: u32) -> Result<(), StorageError> {
        let mut guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let entry = guard
            .iter_mut()
            .rev()
            .find(|l| l.user_id == user_id && l.day == day)
            .ok_or(StorageError::NotFound)?;
        entry.completed = true;
        Ok(())
    }

    async fn list_lessons(&self, user_id: UserId) -> Result<Vec<ArchivedLesson>, StorageError> {
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }
}

//
// ─── AGGREGATED STORAGE ────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub journeys: Arc<dyn JourneyRepository>,
    pub lesson_archive: Arc<dyn LessonArchiveRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let journeys: Arc<dyn JourneyRepository> = Arc::new(repo.clone());
        let lesson_archive: Arc<dyn LessonArchiveRepository> = Arc::new(repo);
        Self {
            users,
            journeys,
            lesson_archive,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::model::{Language, Mcq, Profile};
    use journey_core::time::fixed_now;

    fn build_user() -> User {
        User::new(UserId::generate(), "ada@example.com", Profile::new("Ada"))
    }

    fn build_lesson(day: u32) -> Lesson {
        Lesson {
            title: format!("Day {day}"),
            content: "content".into(),
            image_ref: None,
            mcqs: vec![Mcq::new("Q?", vec!["A".into(), "B".into()], "A", "").unwrap()],
            practical_exercise: String::new(),
            key_takeaways: vec![],
            day,
            total_days: 90,
            duration_minutes: Lesson::DEFAULT_DURATION_MINUTES,
            language: Language::En,
            generated_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn user_round_trips() {
        let repo = InMemoryRepository::new();
        let user = build_user();
        repo.upsert_user(&user).await.unwrap();

        let fetched = repo.get_user(user.id).await.unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn journey_save_requires_existing_user() {
        let repo = InMemoryRepository::new();
        let user = build_user();

        let err = repo
            .save_journey(user.id, &user.journey)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        repo.upsert_user(&user).await.unwrap();

        let mut journey = user.journey.clone();
        journey.cache_lesson(build_lesson(1), fixed_now());
        repo.save_journey(user.id, &journey).await.unwrap();

        let loaded = repo.load_journey(user.id).await.unwrap();
        assert_eq!(loaded, journey);
    }

    #[tokio::test]
    async fn lesson_archive_tracks_completion() {
        let repo = InMemoryRepository::new();
        let user = build_user();

        repo.append_lesson(user.id, &build_lesson(1), fixed_now())
            .await
            .unwrap();
        repo.append_lesson(user.id, &build_lesson(2), fixed_now())
            .await
            .unwrap();

        repo.mark_completed(user.id, 1).await.unwrap();
        let err = repo.mark_completed(user.id, 9).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        let lessons = repo.list_lessons(user.id).await.unwrap();
        assert_eq!(lessons.len(), 2);
        assert!(lessons[0].completed);
        assert!(!lessons[1].completed);
    }
}
