/// Instruction asking for exactly `count` four-option MCQs about `topic`.
#[must_use]
pub fn build_prompt(topic: &str, count: usize) -> String {
    format!(
        r#"Generate multiple choice questions about {topic}.
Format the response as a JSON array with the following structure:
[
  {{
    "question_text": "the question",
    "options": ["option1", "option2", "option3", "option4"],
    "correct_answer": "the correct option, copied exactly from options",
    "explanation": "detailed explanation of the correct answer"
  }}
]
Every question must have exactly 4 distinct options.
Please generate exactly {count} questions and reply with the JSON array only."#
    )
}
