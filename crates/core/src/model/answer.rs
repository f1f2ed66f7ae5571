use chrono::{DateTime, Utc};

use crate::model::ids::{QuestionId, UserId};
use crate::model::question::Question;

/// One recorded answer to one question within a run. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected_answer: String,
    pub is_correct: bool,
    pub owner: UserId,
    pub answered_at: DateTime<Utc>,
}

impl AnswerRecord {
    /// Grade `selected` against the question's correct answer.
    #[must_use]
    pub fn grade(
        question: &Question,
        selected: impl Into<String>,
        owner: UserId,
        answered_at: DateTime<Utc>,
    ) -> Self {
        let selected_answer = selected.into();
        let is_correct = question.is_correct(&selected_answer);
        Self {
            question_id: question.id(),
            selected_answer,
            is_correct,
            owner,
            answered_at,
        }
    }
}

/// Correct/total tally over a set of answer records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerTally {
    pub correct: u32,
    pub total: u32,
}

impl AnswerTally {
    #[must_use]
    pub fn from_records(records: &[AnswerRecord]) -> Self {
        records.iter().fold(Self::default(), |mut tally, record| {
            tally.total = tally.total.saturating_add(1);
            if record.is_correct {
                tally.correct = tally.correct.saturating_add(1);
            }
            tally
        })
    }

    /// Whole-number accuracy percentage, `None` when nothing was answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct.saturating_mul(100) / self.total)
    }
}
