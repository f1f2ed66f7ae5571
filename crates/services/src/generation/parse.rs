use quiz_core::model::{QuestionContent, QuestionDraft};

use crate::error::GenerationError;

/// Slice the JSON array out of a model reply.
///
/// Models often wrap the array in prose or a fenced block, so everything
/// outside the first `[` and the last `]` is dropped.
///
/// # Errors
///
/// Returns `GenerationError::MalformedResponse` if either bracket is missing.
pub fn extract_json_array(text: &str) -> Result<&str, GenerationError> {
    let trimmed = text.trim();
    let start = trimmed.find('[').ok_or(GenerationError::MalformedResponse)?;
    let end = trimmed.rfind(']').ok_or(GenerationError::MalformedResponse)?;
    if end < start {
        return Err(GenerationError::MalformedResponse);
    }
    Ok(&trimmed[start..=end])
}

/// Parse and validate a model reply into exactly `expected` questions.
///
/// # Errors
///
/// Returns `MalformedResponse`, `Parse`, `Validation` (with the zero-based
/// index of the first bad record) or `CountMismatch`.
pub fn parse_questions(
    text: &str,
    expected: usize,
) -> Result<Vec<QuestionContent>, GenerationError> {
    let json = extract_json_array(text)?;
    let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;

    let questions = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| GenerationError::Validation { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if questions.len() != expected {
        return Err(GenerationError::CountMismatch {
            expected,
            found: questions.len(),
        });
    }
    Ok(questions)
}
