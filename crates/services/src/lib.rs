#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod catalog_service;
pub mod error;
pub mod generation;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use auth::{
    Access, AuthProvider, Credentials, LocalAuthProvider, RemoteAuthConfig, RemoteAuthProvider,
    SessionGate,
};
pub use catalog_service::CatalogService;
pub use error::{AppServicesError, AuthError, CatalogError, GenerationError, QuizError};
pub use generation::{
    AiProvider, ChatCompletionsClient, CompletionClient, GeminiClient, GenerationConfig,
    MAX_QUESTION_COUNT, QUESTION_COUNT_CHOICES, QuestionGenerator,
};
pub use quiz::{AnswerOutcome, QuizPhase, QuizRun, QuizService, RunProgress};
