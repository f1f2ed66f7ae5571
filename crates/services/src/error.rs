//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, SubjectError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

const GENERIC_MUTATION_MESSAGE: &str = "Something went wrong while saving. Please try again.";

/// Errors emitted by the session gate and auth providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid e-mail or password")]
    InvalidCredentials,
    #[error("`{0}` is not a valid e-mail address")]
    InvalidEmail(String),
    #[error("remote auth is not configured")]
    Disabled,
    #[error("auth server returned an unexpected response")]
    UnexpectedResponse,
    #[error("auth request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Short text suitable for the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid e-mail or password.".into(),
            Self::InvalidEmail(_) => "Please enter a valid e-mail address.".into(),
            Self::Disabled => "Sign-in is not available right now.".into(),
            Self::UnexpectedResponse | Self::HttpStatus(_) | Self::Http(_) => {
                "Could not reach the sign-in service. Please try again.".into()
            }
            Self::Storage(_) => GENERIC_MUTATION_MESSAGE.into(),
        }
    }
}

/// Errors emitted by `CatalogService` mutations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    InvalidName(#[from] SubjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidName(SubjectError::EmptyName) => "Subject name cannot be empty.".into(),
            Self::InvalidName(err) => err.to_string(),
            Self::Storage(_) => GENERIC_MUTATION_MESSAGE.into(),
        }
    }
}

/// Errors emitted while asking a model for questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("AI generation is not configured")]
    Disabled,
    #[error("model response contained no text candidate")]
    NoCandidate,
    #[error("model response does not contain a JSON array")]
    MalformedResponse,
    #[error("model response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question {index} is invalid: {source}")]
    Validation {
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error("expected {expected} questions, model returned {found}")]
    CountMismatch { expected: usize, found: usize },
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Disabled => {
                "AI generation is not configured. Set GEMINI_API_KEY and restart.".into()
            }
            Self::HttpStatus(_) | Self::Http(_) => {
                "Failed to reach the AI service. Please try again.".into()
            }
            Self::NoCandidate | Self::MalformedResponse | Self::Parse(_) => {
                "Failed to generate questions. Please try again.".into()
            }
            Self::Validation { .. } | Self::CountMismatch { .. } => {
                format!("Failed to generate questions: {self}.")
            }
        }
    }
}

/// Errors emitted by `QuizService` and `QuizRun`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("subject not found")]
    SubjectNotFound,
    #[error("no questions available for this subject")]
    NoQuestions,
    #[error("quiz run already completed")]
    Completed,
    #[error("current question was already answered")]
    AlreadyAnswered,
    #[error("current question has not been answered yet")]
    NotAnswered,
    #[error("`{0}` is not an option of the current question")]
    UnknownOption(String),
    #[error("cannot generate questions while a run is in progress")]
    RunInProgress,
    #[error("question count must be between 1 and {max}, got {requested}")]
    InvalidCount { requested: usize, max: usize },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation(err) => err.user_message(),
            Self::Storage(_) => GENERIC_MUTATION_MESSAGE.into(),
            Self::RunInProgress => "Finish the current run before generating more questions.".into(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
