use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerRecord, Question, QuestionContent, QuestionId, Subject, SubjectId, SubjectName, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Listing order shared by every backend: Unicode-lowercased name, then id.
pub(crate) fn sort_by_name(subjects: &mut [Subject]) {
    subjects.sort_by_cached_key(|s| (s.name().to_lowercase(), s.id()));
}

/// A locally known user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Repository contract for subjects, always scoped to one owner.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Insert a new subject and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn insert_subject(
        &self,
        owner: UserId,
        name: &SubjectName,
        created_at: DateTime<Utc>,
    ) -> Result<Subject, StorageError>;

    /// Fetch one subject owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure. Missing rows are `Ok(None)`.
    async fn get_subject(
        &self,
        owner: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError>;

    /// All subjects of `owner`, sorted by name (case-insensitive), then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_subjects(&self, owner: UserId) -> Result<Vec<Subject>, StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a batch of questions atomically; either all rows land or none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist for
    /// `owner`, or other storage errors.
    async fn insert_questions(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        questions: &[QuestionContent],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError>;

    /// Questions of a subject in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn questions_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError>;
}

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Append one answer record and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn append_answer(&self, answer: &AnswerRecord) -> Result<i64, StorageError>;

    /// Answers given by `owner` to any question of the subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn answers_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<AnswerRecord>, StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a profile by e-mail, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn find_or_create_user(
        &self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    subjects: Vec<Subject>,
    questions: Vec<Question>,
    answers: Vec<(i64, AnswerRecord)>,
    users: HashMap<String, UserProfile>,
    next_subject_id: u64,
    next_question_id: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn insert_subject(
        &self,
        owner: UserId,
        name: &SubjectName,
        created_at: DateTime<Utc>,
    ) -> Result<Subject, StorageError> {
        let mut guard = self.lock()?;
        guard.next_subject_id += 1;
        let subject = Subject::new(
            SubjectId::new(guard.next_subject_id),
            name.clone(),
            owner,
            created_at,
        );
        guard.subjects.push(subject.clone());
        Ok(subject)
    }

    async fn get_subject(
        &self,
        owner: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .subjects
            .iter()
            .find(|s| s.id() == id && s.owner() == owner)
            .cloned())
    }

    async fn list_subjects(&self, owner: UserId) -> Result<Vec<Subject>, StorageError> {
        let guard = self.lock()?;
        let mut subjects: Vec<Subject> = guard
            .subjects
            .iter()
            .filter(|s| s.owner() == owner)
            .cloned()
            .collect();
        sort_by_name(&mut subjects);
        Ok(subjects)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_questions(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        questions: &[QuestionContent],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let mut guard = self.lock()?;
        if !guard
            .subjects
            .iter()
            .any(|s| s.id() == subject_id && s.owner() == owner)
        {
            return Err(StorageError::NotFound);
        }

        let mut ids = Vec::with_capacity(questions.len());
        for content in questions {
            guard.next_question_id += 1;
            let id = QuestionId::new(guard.next_question_id);
            guard.questions.push(Question::new(
                id,
                subject_id,
                owner,
                content.clone(),
                created_at,
            ));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn questions_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .iter()
            .filter(|q| q.subject_id() == subject_id && q.owner() == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn append_answer(&self, answer: &AnswerRecord) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.iter().any(|q| q.id() == answer.question_id) {
            return Err(StorageError::NotFound);
        }
        let id = i64::try_from(guard.answers.len())
            .map_err(|_| StorageError::Serialization("answer id overflow".into()))?
            + 1;
        guard.answers.push((id, answer.clone()));
        Ok(id)
    }

    async fn answers_for_subject(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<AnswerRecord>, StorageError> {
        let guard = self.lock()?;
        let in_subject = |question_id: QuestionId| {
            guard
                .questions
                .iter()
                .any(|q| q.id() == question_id && q.subject_id() == subject_id)
        };
        Ok(guard
            .answers
            .iter()
            .filter(|(_, a)| a.owner == owner && in_subject(a.question_id))
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_or_create_user(
        &self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError> {
        let mut guard = self.lock()?;
        let profile = guard
            .users
            .entry(email.to_owned())
            .or_insert_with(|| UserProfile {
                id: UserId::generate(),
                email: email.to_owned(),
                created_at,
            });
        Ok(profile.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            subjects: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            answers: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }
}
