mod quiz_vm;
mod subject_vm;

pub use quiz_vm::{OptionState, OptionVm, QuizVm, open_quiz};
pub use subject_vm::{SubjectCardVm, map_subject_cards};
