mod run;
mod service;

pub use crate::error::QuizError;
pub use run::{AnswerOutcome, QuizPhase, QuizRun, RunProgress};
pub use service::QuizService;
