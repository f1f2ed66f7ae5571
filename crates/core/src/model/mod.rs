mod answer;
mod ids;
mod question;
mod session;
mod subject;

pub use answer::{AnswerRecord, AnswerTally};
pub use ids::{ParseIdError, QuestionId, SubjectId, UserId};
pub use question::{OPTION_COUNT, Question, QuestionContent, QuestionDraft, QuestionError};
pub use session::Session;
pub use subject::{MAX_SUBJECT_NAME_CHARS, Subject, SubjectError, SubjectName};
