//! AI question generation: prompt, model call, and validation of the reply.

mod client;
mod config;
mod parse;
mod prompt;

use std::sync::Arc;

use quiz_core::model::QuestionContent;

use crate::error::GenerationError;

pub use client::{ChatCompletionsClient, CompletionClient, GeminiClient, client_for};
pub use config::{AiProvider, GenerationConfig, UnknownProvider};
pub use parse::{extract_json_array, parse_questions};
pub use prompt::build_prompt;

/// Largest batch a single generation may request.
pub const MAX_QUESTION_COUNT: usize = 50;

/// Batch sizes offered in the quiz view.
pub const QUESTION_COUNT_CHOICES: [usize; 4] = [5, 10, 15, 20];

/// Turns a topic into validated questions via a `CompletionClient`.
///
/// Without a client every call fails with `GenerationError::Disabled`.
#[derive(Clone)]
pub struct QuestionGenerator {
    client: Option<Arc<dyn CompletionClient>>,
}

impl QuestionGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        match GenerationConfig::from_env() {
            Some(config) => {
                tracing::info!(provider = ?config.provider, model = %config.model, "AI generation enabled");
                Self::new(client_for(config))
            }
            None => {
                tracing::warn!("no AI API key set; question generation disabled");
                Self::disabled()
            }
        }
    }

    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { client: None }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Ask for exactly `count` questions about `topic`. No retries.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when disabled, when the call fails, or when
    /// the reply does not hold exactly `count` valid questions.
    pub async fn generate(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<QuestionContent>, GenerationError> {
        let client = self.client.as_ref().ok_or(GenerationError::Disabled)?;
        let prompt = build_prompt(topic, count);
        let text = client.complete(&prompt).await?;
        tracing::debug!(topic, count, reply_len = text.len(), "model replied");
        parse_questions(&text, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoCount {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for EchoCount {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(r#"[{"question_text":"Q","options":["a","b","c","d"],"correct_answer":"a","explanation":"E"}]"#.into())
        }
    }

    #[tokio::test]
    async fn disabled_generator_fails_fast() {
        let err = QuestionGenerator::disabled()
            .generate("Algebra", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
    }

    #[tokio::test]
    async fn topic_reaches_the_model() {
        let client = Arc::new(EchoCount {
            prompts: Mutex::new(Vec::new()),
        });
        let generator = QuestionGenerator::new(client.clone());
        let questions = generator.generate("Chemistry", 1).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert!(client.prompts.lock().unwrap()[0].contains("Chemistry"));
    }
}
