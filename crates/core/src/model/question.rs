use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, SubjectId, UserId};

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("question text cannot be empty")]
    EmptyQuestionText,

    #[error("expected {OPTION_COUNT} options, found {found}")]
    WrongOptionCount { found: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("option `{0}` appears more than once")]
    DuplicateOption(String),

    #[error("correct answer `{0}` is not one of the options")]
    CorrectAnswerNotAnOption(String),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Loosely-typed question record as it arrives from the model.
///
/// Every field is optional so that a reply with a missing key still parses
/// and the gap is reported by [`QuestionDraft::validate`] with a precise
/// error instead of a generic JSON failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Check the record against the MCQ shape and normalize whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(self) -> Result<QuestionContent, QuestionError> {
        let question_text = self
            .question_text
            .ok_or(QuestionError::MissingField("question_text"))?;
        let options = self.options.ok_or(QuestionError::MissingField("options"))?;
        let correct_answer = self
            .correct_answer
            .ok_or(QuestionError::MissingField("correct_answer"))?;
        let explanation = self
            .explanation
            .ok_or(QuestionError::MissingField("explanation"))?;

        QuestionContent::new(question_text, options, correct_answer, explanation)
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Validated body of a multiple-choice question, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContent {
    question_text: String,
    options: [String; OPTION_COUNT],
    correct_answer: String,
    explanation: String,
}

impl QuestionContent {
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, the option list is not
    /// exactly four distinct non-empty strings, or the correct answer is not
    /// one of them.
    pub fn new(
        question_text: String,
        options: Vec<String>,
        correct_answer: String,
        explanation: String,
    ) -> Result<Self, QuestionError> {
        let question_text = question_text.trim().to_owned();
        if question_text.is_empty() {
            return Err(QuestionError::EmptyQuestionText);
        }

        let found = options.len();
        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_owned()).collect();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::WrongOptionCount { found })?;

        for (index, option) in options.iter().enumerate() {
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if options[..index].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }

        let correct_answer = correct_answer.trim().to_owned();
        if !options.contains(&correct_answer) {
            return Err(QuestionError::CorrectAnswerNotAnOption(correct_answer));
        }

        Ok(Self {
            question_text,
            options,
            correct_answer,
            explanation: explanation.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A persisted MCQ belonging to a subject. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    subject_id: SubjectId,
    owner: UserId,
    content: QuestionContent,
    created_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        subject_id: SubjectId,
        owner: UserId,
        content: QuestionContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject_id,
            owner,
            content,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn content(&self) -> &QuestionContent {
        &self.content
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        self.content.question_text()
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        self.content.options()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.content.correct_answer()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        self.content.explanation()
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options().iter().any(|o| o == option)
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer() == option
    }
}
