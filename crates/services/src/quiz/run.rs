use quiz_core::model::{AnswerRecord, Question, Subject};

use crate::error::QuizError;

/// Where a run stands. Loading is a UI concern and has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NoQuestions,
    InProgress,
    Completed,
}

/// Result of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: String,
    pub is_correct: bool,
    pub score: u32,
}

/// Aggregated view of run progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub score: u32,
}

/// One ephemeral pass through a subject's questions.
///
/// Each question may be answered once; `advance` requires an answer and
/// moves to the next question or completes the run. Never persisted.
#[derive(Debug, Clone)]
pub struct QuizRun {
    subject: Subject,
    questions: Vec<Question>,
    current: usize,
    selected: Option<String>,
    score: u32,
    answered: usize,
    completed: bool,
}

impl QuizRun {
    #[must_use]
    pub fn new(subject: Subject, questions: Vec<Question>) -> Self {
        Self {
            subject,
            questions,
            current: 0,
            selected: None,
            score: 0,
            answered: 0,
            completed: false,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.questions.is_empty() {
            QuizPhase::NoQuestions
        } else if self.completed {
            QuizPhase::Completed
        } else {
            QuizPhase::InProgress
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// True once the current question has been answered.
    #[must_use]
    pub fn show_explanation(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn progress(&self) -> RunProgress {
        RunProgress {
            position: (self.current + 1).min(self.questions.len()),
            total: self.questions.len(),
            answered: self.answered,
            score: self.score,
        }
    }

    /// Generation may replace the questions unless answers were already
    /// given in a run that has not finished.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        match self.phase() {
            QuizPhase::NoQuestions | QuizPhase::Completed => true,
            QuizPhase::InProgress => self.answered == 0,
        }
    }

    /// Guard for `select_answer`: returns the current question if `option`
    /// may be recorded for it.
    ///
    /// # Errors
    ///
    /// Returns `NoQuestions`, `Completed`, `AlreadyAnswered` or
    /// `UnknownOption`.
    pub fn check_answer(&self, option: &str) -> Result<&Question, QuizError> {
        match self.phase() {
            QuizPhase::NoQuestions => return Err(QuizError::NoQuestions),
            QuizPhase::Completed => return Err(QuizError::Completed),
            QuizPhase::InProgress => {}
        }
        if self.selected.is_some() {
            return Err(QuizError::AlreadyAnswered);
        }
        let question = self.current_question().ok_or(QuizError::NoQuestions)?;
        if !question.has_option(option) {
            return Err(QuizError::UnknownOption(option.to_owned()));
        }
        Ok(question)
    }

    /// Apply an already persisted answer to the run.
    pub(crate) fn commit_answer(&mut self, record: &AnswerRecord) -> AnswerOutcome {
        self.selected = Some(record.selected_answer.clone());
        self.answered += 1;
        if record.is_correct {
            self.score += 1;
        }
        AnswerOutcome {
            selected: record.selected_answer.clone(),
            is_correct: record.is_correct,
            score: self.score,
        }
    }

    /// Move past the answered question.
    ///
    /// # Errors
    ///
    /// Returns `NoQuestions`, `Completed`, or `NotAnswered` when the current
    /// question has no selection yet. The run is unchanged on error.
    pub fn advance(&mut self) -> Result<QuizPhase, QuizError> {
        match self.phase() {
            QuizPhase::NoQuestions => return Err(QuizError::NoQuestions),
            QuizPhase::Completed => return Err(QuizError::Completed),
            QuizPhase::InProgress => {}
        }
        if self.selected.is_none() {
            return Err(QuizError::NotAnswered);
        }

        if self.is_last() {
            self.completed = true;
        } else {
            self.current += 1;
            self.selected = None;
        }
        Ok(self.phase())
    }

    /// Start over with a fresh question list.
    pub(crate) fn restart(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current = 0;
        self.selected = None;
        self.score = 0;
        self.answered = 0;
        self.completed = false;
    }
}
