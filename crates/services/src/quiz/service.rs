use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{AnswerRecord, Question, Session, SubjectId};
use storage::repository::{AnswerRepository, QuestionRepository, SubjectRepository};

use super::run::{AnswerOutcome, QuizRun};
use crate::Clock;
use crate::error::QuizError;
use crate::generation::{MAX_QUESTION_COUNT, QuestionGenerator};

/// Loads runs, records answers and feeds generated questions into a run.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
    generator: QuestionGenerator,
    shuffle: bool,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        subjects: Arc<dyn SubjectRepository>,
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
        generator: QuestionGenerator,
    ) -> Self {
        Self {
            clock,
            subjects,
            questions,
            answers,
            generator,
            shuffle: false,
        }
    }

    /// Present questions in random order instead of creation order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn generation_enabled(&self) -> bool {
        self.generator.enabled()
    }

    /// Start a run over the subject's stored questions.
    ///
    /// A failed question fetch is logged and yields an empty run.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SubjectNotFound` if the subject does not exist for
    /// this user, or `QuizError::Storage` if the subject lookup fails.
    pub async fn open(&self, session: &Session, subject_id: SubjectId) -> Result<QuizRun, QuizError> {
        let subject = self
            .subjects
            .get_subject(session.user_id(), subject_id)
            .await?
            .ok_or(QuizError::SubjectNotFound)?;

        let questions = self.fetch_questions(session, subject_id).await;
        tracing::debug!(%subject_id, count = questions.len(), "opened quiz run");
        Ok(QuizRun::new(subject, questions))
    }

    /// Record `option` for the current question.
    ///
    /// The answer is persisted before the run changes; on failure the run is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the run guard errors (`Completed`, `AlreadyAnswered`,
    /// `UnknownOption`, `NoQuestions`), `SubjectNotFound` for a run owned by
    /// someone else, or `Storage`.
    pub async fn select_answer(
        &self,
        session: &Session,
        run: &mut QuizRun,
        option: &str,
    ) -> Result<AnswerOutcome, QuizError> {
        ensure_owner(session, run)?;
        let record = {
            let question = run.check_answer(option)?;
            AnswerRecord::grade(question, option, session.user_id(), self.clock.now())
        };

        self.answers
            .append_answer(&record)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to record answer"))?;

        Ok(run.commit_answer(&record))
    }

    /// Generate `count` questions for the run's subject, persist them, and
    /// restart the run over the full refreshed set.
    ///
    /// Returns the number of questions added.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCount` outside `1..=50`, `RunInProgress` when answers
    /// were given in an unfinished run, `Generation` when the model reply is
    /// unusable, or `Storage` when the batch cannot be stored. Nothing is
    /// persisted and the run is untouched on any error. Once the batch is
    /// stored, a failed re-fetch is logged and the run restarts over the
    /// previous questions plus the new batch.
    pub async fn generate(
        &self,
        session: &Session,
        run: &mut QuizRun,
        count: usize,
    ) -> Result<usize, QuizError> {
        if !(1..=MAX_QUESTION_COUNT).contains(&count) {
            return Err(QuizError::InvalidCount {
                requested: count,
                max: MAX_QUESTION_COUNT,
            });
        }
        ensure_owner(session, run)?;
        if !run.can_generate() {
            return Err(QuizError::RunInProgress);
        }

        let subject_id = run.subject().id();
        let contents = self
            .generator
            .generate(run.subject().name(), count)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, %subject_id, "generation rejected"))?;

        let created_at = self.clock.now();
        let ids = self
            .questions
            .insert_questions(session.user_id(), subject_id, &contents, created_at)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to store questions"))?;

        let refreshed = match self
            .questions
            .questions_for_subject(session.user_id(), subject_id)
            .await
        {
            Ok(questions) => questions,
            Err(err) => {
                tracing::error!(error = %err, %subject_id, "failed to reload questions after insert");
                let mut questions = run.questions().to_vec();
                questions.extend(ids.into_iter().zip(&contents).map(|(id, content)| {
                    Question::new(id, subject_id, session.user_id(), content.clone(), created_at)
                }));
                questions
            }
        };
        run.restart(self.ordered(refreshed));
        tracing::info!(%subject_id, added = contents.len(), "generated questions");
        Ok(contents.len())
    }

    /// Every answer the user has recorded for the subject, oldest first.
    ///
    /// Failures are logged and yield an empty history.
    pub async fn answer_history(&self, session: &Session, subject_id: SubjectId) -> Vec<AnswerRecord> {
        match self
            .answers
            .answers_for_subject(session.user_id(), subject_id)
            .await
        {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(error = %err, %subject_id, "failed to load answer history");
                Vec::new()
            }
        }
    }

    async fn fetch_questions(&self, session: &Session, subject_id: SubjectId) -> Vec<Question> {
        match self
            .questions
            .questions_for_subject(session.user_id(), subject_id)
            .await
        {
            Ok(questions) => self.ordered(questions),
            Err(err) => {
                tracing::error!(error = %err, %subject_id, "failed to load questions");
                Vec::new()
            }
        }
    }

    fn ordered(&self, mut questions: Vec<Question>) -> Vec<Question> {
        if self.shuffle {
            questions.as_mut_slice().shuffle(&mut rng());
        }
        questions
    }
}

fn ensure_owner(session: &Session, run: &QuizRun) -> Result<(), QuizError> {
    if run.subject().owner() == session.user_id() {
        Ok(())
    } else {
        Err(QuizError::SubjectNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use quiz_core::model::{QuestionId, UserId};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, StorageError};

    use crate::error::GenerationError;
    use crate::generation::CompletionClient;
    use crate::quiz::QuizPhase;

    struct Canned(String);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.clone())
        }
    }

    fn reply(count: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|n| {
                format!(
                    r#"{{"question_text":"Q{n}","options":["w","x","y","z"],"correct_answer":"x","explanation":"E{n}"}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    struct Fixture {
        repo: InMemoryRepository,
        session: Session,
        subject_id: SubjectId,
    }

    async fn fixture() -> Fixture {
        let repo = InMemoryRepository::new();
        let session = Session::new(UserId::generate(), "ada@example.com", fixed_now());
        let subject = repo
            .insert_subject(
                session.user_id(),
                &quiz_core::model::SubjectName::new("Algebra").unwrap(),
                fixed_now(),
            )
            .await
            .unwrap();
        Fixture {
            repo,
            session,
            subject_id: subject.id(),
        }
    }

    fn service(repo: &InMemoryRepository, generator: QuestionGenerator) -> QuizService {
        QuizService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            generator,
        )
    }

    fn canned(text: String) -> QuestionGenerator {
        QuestionGenerator::new(Arc::new(Canned(text)))
    }

    /// Answer repository that refuses every write.
    struct RejectingAnswers;

    #[async_trait]
    impl AnswerRepository for RejectingAnswers {
        async fn append_answer(&self, _answer: &AnswerRecord) -> Result<i64, StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }

        async fn answers_for_subject(
            &self,
            _owner: UserId,
            _subject_id: SubjectId,
        ) -> Result<Vec<AnswerRecord>, StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }
    }

    /// Question repository whose reads start failing once a batch is stored.
    struct FlakyReads {
        inner: InMemoryRepository,
        stored: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl QuestionRepository for FlakyReads {
        async fn insert_questions(
            &self,
            owner: UserId,
            subject_id: SubjectId,
            questions: &[quiz_core::model::QuestionContent],
            created_at: chrono::DateTime<chrono::Utc>,
        ) -> Result<Vec<QuestionId>, StorageError> {
            let ids = self
                .inner
                .insert_questions(owner, subject_id, questions, created_at)
                .await?;
            self.stored
                .store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(ids)
        }

        async fn questions_for_subject(
            &self,
            owner: UserId,
            subject_id: SubjectId,
        ) -> Result<Vec<Question>, StorageError> {
            if self.stored.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StorageError::Connection("reload failed".into()));
            }
            self.inner.questions_for_subject(owner, subject_id).await
        }
    }

    #[tokio::test]
    async fn failed_reload_after_insert_still_restarts_run() {
        let f = fixture().await;
        let quiz = QuizService::new(
            fixed_clock(),
            Arc::new(f.repo.clone()),
            Arc::new(FlakyReads {
                inner: f.repo.clone(),
                stored: std::sync::atomic::AtomicBool::new(false),
            }),
            Arc::new(f.repo.clone()),
            canned(reply(3)),
        );
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        assert_eq!(run.phase(), QuizPhase::NoQuestions);

        let added = quiz.generate(&f.session, &mut run, 3).await.unwrap();
        assert_eq!(added, 3);
        assert_eq!(run.phase(), QuizPhase::InProgress);

        let stored: Vec<QuestionId> = f
            .repo
            .questions_for_subject(f.session.user_id(), f.subject_id)
            .await
            .unwrap()
            .iter()
            .map(Question::id)
            .collect();
        let in_run: Vec<QuestionId> = run.questions().iter().map(Question::id).collect();
        assert_eq!(in_run, stored);
        assert_eq!(run.questions()[0].question_text(), "Q0");

        quiz.select_answer(&f.session, &mut run, "x").await.unwrap();
        assert_eq!(run.score(), 1);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let f = fixture().await;
        let quiz = service(&f.repo, QuestionGenerator::disabled());
        let err = quiz
            .open(&f.session, SubjectId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::SubjectNotFound));
    }

    #[tokio::test]
    async fn generate_restarts_run_with_new_questions() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(5)));
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        assert_eq!(run.phase(), QuizPhase::NoQuestions);

        let added = quiz.generate(&f.session, &mut run, 5).await.unwrap();
        assert_eq!(added, 5);
        assert_eq!(run.phase(), QuizPhase::InProgress);
        assert_eq!(run.questions().len(), 5);
        assert_eq!(run.current_index(), 0);
    }

    #[tokio::test]
    async fn count_outside_range_is_rejected() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(5)));
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        for count in [0, 51] {
            assert!(matches!(
                quiz.generate(&f.session, &mut run, count).await,
                Err(QuizError::InvalidCount { .. })
            ));
        }
    }

    #[tokio::test]
    async fn generation_mid_run_is_blocked() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(2)));
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        quiz.generate(&f.session, &mut run, 2).await.unwrap();
        quiz.select_answer(&f.session, &mut run, "x").await.unwrap();

        let err = quiz.generate(&f.session, &mut run, 2).await.unwrap_err();
        assert!(matches!(err, QuizError::RunInProgress));
        assert_eq!(run.questions().len(), 2);
        assert_eq!(run.score(), 1);
    }

    #[tokio::test]
    async fn regeneration_after_completion_keeps_old_questions() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(1)));
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        quiz.generate(&f.session, &mut run, 1).await.unwrap();
        quiz.select_answer(&f.session, &mut run, "x").await.unwrap();
        assert_eq!(run.advance().unwrap(), QuizPhase::Completed);

        quiz.generate(&f.session, &mut run, 1).await.unwrap();
        assert_eq!(run.phase(), QuizPhase::InProgress);
        assert_eq!(run.questions().len(), 2);
        assert_eq!(run.score(), 0);
    }

    #[tokio::test]
    async fn failed_persistence_leaves_run_untouched() {
        let f = fixture().await;
        let content = quiz_core::model::QuestionContent::new(
            "Q".into(),
            vec!["w".into(), "x".into(), "y".into(), "z".into()],
            "x".into(),
            String::new(),
        )
        .unwrap();
        f.repo
            .insert_questions(f.session.user_id(), f.subject_id, &[content], fixed_now())
            .await
            .unwrap();

        let quiz = QuizService::new(
            fixed_clock(),
            Arc::new(f.repo.clone()),
            Arc::new(f.repo.clone()),
            Arc::new(RejectingAnswers),
            QuestionGenerator::disabled(),
        );
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        let err = quiz
            .select_answer(&f.session, &mut run, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::Storage(_)));
        assert!(run.selected_answer().is_none());
        assert_eq!(run.score(), 0);
        assert!(quiz.answer_history(&f.session, f.subject_id).await.is_empty());
    }

    #[tokio::test]
    async fn other_users_cannot_drive_a_run() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(1)));
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        quiz.generate(&f.session, &mut run, 1).await.unwrap();

        let stranger = Session::new(UserId::generate(), "eve@example.com", fixed_now());
        let err = quiz
            .select_answer(&stranger, &mut run, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::SubjectNotFound));
        assert!(quiz.open(&stranger, f.subject_id).await.is_err());
    }

    #[tokio::test]
    async fn shuffle_keeps_the_same_questions() {
        let f = fixture().await;
        let quiz = service(&f.repo, canned(reply(10))).with_shuffle(true);
        let mut run = quiz.open(&f.session, f.subject_id).await.unwrap();
        quiz.generate(&f.session, &mut run, 10).await.unwrap();

        let mut ids: Vec<QuestionId> = run.questions().iter().map(Question::id).collect();
        ids.sort();
        let stored: Vec<QuestionId> = f
            .repo
            .questions_for_subject(f.session.user_id(), f.subject_id)
            .await
            .unwrap()
            .iter()
            .map(Question::id)
            .collect();
        assert_eq!(ids, stored);
    }
}
