use quiz_core::model::{AnswerTally, Session, SubjectId};
use services::{QuizError, QuizPhase, QuizRun, QuizService};

use crate::views::ViewError;

/// How an option button should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    /// Selectable.
    Idle,
    /// Picked and right.
    Correct,
    /// Picked and wrong.
    Wrong,
    /// Not picked, but the right answer.
    Revealed,
    /// Not picked and irrelevant.
    Muted,
}

impl OptionState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Idle => "quiz-option",
            Self::Correct => "quiz-option quiz-option--correct",
            Self::Wrong => "quiz-option quiz-option--wrong",
            Self::Revealed => "quiz-option quiz-option--revealed",
            Self::Muted => "quiz-option quiz-option--muted",
        }
    }

    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::Correct | Self::Revealed => Some("✓"),
            Self::Wrong => Some("✗"),
            Self::Idle | Self::Muted => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub state: OptionState,
}

impl From<QuizError> for ViewError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::SubjectNotFound => Self::NotFound,
            other => Self::Message(other.user_message()),
        }
    }
}

/// View model over one quiz run.
#[derive(Clone)]
pub struct QuizVm {
    run: QuizRun,
    lifetime: Option<AnswerTally>,
}

impl QuizVm {
    #[must_use]
    pub fn new(run: QuizRun) -> Self {
        Self {
            run,
            lifetime: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.run.phase()
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.run.subject().id()
    }

    #[must_use]
    pub fn subject_name(&self) -> &str {
        self.run.subject().name()
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        let progress = self.run.progress();
        format!("Question {} of {}", progress.position, progress.total)
    }

    #[must_use]
    pub fn score_label(&self) -> String {
        let progress = self.run.progress();
        format!("Score: {} / {}", progress.score, progress.answered)
    }

    #[must_use]
    pub fn question_text(&self) -> Option<&str> {
        self.run.current_question().map(|q| q.question_text())
    }

    #[must_use]
    pub fn options(&self) -> Vec<OptionVm> {
        let Some(question) = self.run.current_question() else {
            return Vec::new();
        };
        let selected = self.run.selected_answer();
        question
            .options()
            .iter()
            .map(|option| {
                let state = match selected {
                    None => OptionState::Idle,
                    Some(picked) if picked == option.as_str() => {
                        if question.is_correct(option) {
                            OptionState::Correct
                        } else {
                            OptionState::Wrong
                        }
                    }
                    Some(_) if question.is_correct(option) => OptionState::Revealed,
                    Some(_) => OptionState::Muted,
                };
                OptionVm {
                    label: option.clone(),
                    state,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn can_select(&self) -> bool {
        self.run.phase() == QuizPhase::InProgress && !self.run.show_explanation()
    }

    /// Explanation of the current question once it has been answered.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        if !self.run.show_explanation() || self.run.phase() != QuizPhase::InProgress {
            return None;
        }
        self.run.current_question().map(|q| q.explanation())
    }

    #[must_use]
    pub fn next_label(&self) -> Option<&'static str> {
        if self.run.phase() != QuizPhase::InProgress || !self.run.show_explanation() {
            return None;
        }
        Some(if self.run.is_last() {
            "Finish"
        } else {
            "Next Question"
        })
    }

    #[must_use]
    pub fn can_generate(&self) -> bool {
        self.run.can_generate()
    }

    #[must_use]
    pub fn completion_label(&self) -> String {
        format!(
            "You scored {} out of {}",
            self.run.score(),
            self.run.questions().len()
        )
    }

    #[must_use]
    pub fn lifetime_label(&self) -> Option<String> {
        let tally = self.lifetime?;
        let percent = tally.accuracy_percent()?;
        Some(format!(
            "Lifetime accuracy: {percent}% over {} answers",
            tally.total
        ))
    }

    /// # Errors
    ///
    /// Returns `ViewError` with a user-facing message when the answer is
    /// rejected or cannot be saved.
    pub async fn select(
        &mut self,
        quiz: &QuizService,
        session: &Session,
        option: &str,
    ) -> Result<(), ViewError> {
        quiz.select_answer(session, &mut self.run, option).await?;
        Ok(())
    }

    /// Move on; loads lifetime stats when the run completes.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` when the run refuses to advance.
    pub async fn advance(&mut self, quiz: &QuizService, session: &Session) -> Result<(), ViewError> {
        if self.run.advance()? == QuizPhase::Completed {
            let history = quiz.answer_history(session, self.subject_id()).await;
            self.lifetime = Some(AnswerTally::from_records(&history));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ViewError` with the generation failure message.
    pub async fn generate(
        &mut self,
        quiz: &QuizService,
        session: &Session,
        count: usize,
    ) -> Result<usize, ViewError> {
        let added = quiz.generate(session, &mut self.run, count).await?;
        self.lifetime = None;
        Ok(added)
    }
}

/// # Errors
///
/// Returns `ViewError::NotFound` for unknown subjects.
pub async fn open_quiz(
    quiz: &QuizService,
    session: &Session,
    subject_id: SubjectId,
) -> Result<QuizVm, ViewError> {
    let run = quiz.open(session, subject_id).await?;
    Ok(QuizVm::new(run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quiz_core::model::UserId;
    use quiz_core::time::fixed_now;
    use services::{AppServices, Clock, CompletionClient, GenerationError, QuestionGenerator};

    struct TwoQuestions;

    #[async_trait::async_trait]
    impl CompletionClient for TwoQuestions {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(r#"[
                {"question_text":"2+2?","options":["3","4","5","6"],"correct_answer":"4","explanation":"Sum."},
                {"question_text":"3*3?","options":["6","8","9","12"],"correct_answer":"9","explanation":"Product."}
            ]"#
            .into())
        }
    }

    async fn setup() -> (AppServices, Session, SubjectId) {
        let services = AppServices::in_memory(
            Clock::fixed(fixed_now()),
            QuestionGenerator::new(Arc::new(TwoQuestions)),
        );
        let session = Session::new(UserId::generate(), "ada@example.com", fixed_now());
        let subject = services
            .catalog()
            .create_subject(&session, "Arithmetic")
            .await
            .unwrap();
        (services, session, subject.id())
    }

    #[tokio::test]
    async fn option_states_follow_the_answer() {
        let (services, session, subject_id) = setup().await;
        let quiz = services.quiz();
        let mut vm = open_quiz(&quiz, &session, subject_id).await.unwrap();
        assert_eq!(vm.phase(), QuizPhase::NoQuestions);

        vm.generate(&quiz, &session, 2).await.unwrap();
        assert_eq!(vm.progress_label(), "Question 1 of 2");
        assert!(vm.options().iter().all(|o| o.state == OptionState::Idle));
        assert!(vm.explanation().is_none());

        vm.select(&quiz, &session, "5").await.unwrap();
        let states: Vec<OptionState> = vm.options().iter().map(|o| o.state).collect();
        assert_eq!(
            states,
            vec![
                OptionState::Muted,
                OptionState::Revealed,
                OptionState::Wrong,
                OptionState::Muted
            ]
        );
        assert_eq!(vm.explanation(), Some("Sum."));
        assert_eq!(vm.next_label(), Some("Next Question"));
        assert!(!vm.can_select());
    }

    #[tokio::test]
    async fn completing_loads_lifetime_accuracy() {
        let (services, session, subject_id) = setup().await;
        let quiz = services.quiz();
        let mut vm = open_quiz(&quiz, &session, subject_id).await.unwrap();
        vm.generate(&quiz, &session, 2).await.unwrap();

        vm.select(&quiz, &session, "4").await.unwrap();
        vm.advance(&quiz, &session).await.unwrap();
        vm.select(&quiz, &session, "8").await.unwrap();
        assert_eq!(vm.next_label(), Some("Finish"));
        vm.advance(&quiz, &session).await.unwrap();

        assert_eq!(vm.phase(), QuizPhase::Completed);
        assert_eq!(vm.completion_label(), "You scored 1 out of 2");
        assert_eq!(
            vm.lifetime_label().as_deref(),
            Some("Lifetime accuracy: 50% over 2 answers")
        );
        assert!(vm.can_generate());
    }

    #[tokio::test]
    async fn rejected_actions_map_to_messages() {
        let (services, session, subject_id) = setup().await;
        let quiz = services.quiz();
        let mut vm = open_quiz(&quiz, &session, subject_id).await.unwrap();
        vm.generate(&quiz, &session, 2).await.unwrap();

        let err = vm.advance(&quiz, &session).await.unwrap_err();
        assert!(matches!(err, ViewError::Message(_)));

        vm.select(&quiz, &session, "4").await.unwrap();
        let err = vm.generate(&quiz, &session, 5).await.unwrap_err();
        assert_eq!(
            err,
            ViewError::Message("Finish the current run before generating more questions.".into())
        );

        let missing = open_quiz(&quiz, &session, SubjectId::new(404)).await;
        assert!(matches!(missing, Err(ViewError::NotFound)));
    }
}
