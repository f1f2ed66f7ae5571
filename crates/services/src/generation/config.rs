use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Which completion API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    Gemini,
    ChatCompletions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown AI provider `{}`", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for AiProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "chat" | "chat-completions" => Ok(Self::ChatCompletions),
            other => Err(UnknownProvider(other.to_owned())),
        }
    }
}

#[derive(Clone)]
pub struct GenerationConfig {
    pub provider: AiProvider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenerationConfig {
    /// Reads `QUIZ_AI_PROVIDER`, `QUIZ_AI_API_KEY` (falling back to
    /// `GEMINI_API_KEY`), `QUIZ_AI_MODEL` and `QUIZ_AI_BASE_URL`.
    ///
    /// Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("QUIZ_AI_API_KEY").or_else(|| non_empty("GEMINI_API_KEY"))?;
        let provider = match non_empty("QUIZ_AI_PROVIDER") {
            Some(raw) => match raw.parse::<AiProvider>() {
                Ok(provider) => provider,
                Err(err) => {
                    tracing::warn!(error = %err, "falling back to gemini");
                    AiProvider::Gemini
                }
            },
            None => AiProvider::Gemini,
        };
        let (default_base, default_model) = match provider {
            AiProvider::Gemini => (DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL),
            AiProvider::ChatCompletions => (DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL),
        };

        Some(Self {
            provider,
            base_url: non_empty("QUIZ_AI_BASE_URL").unwrap_or_else(|| default_base.into()),
            api_key: api_key.trim().to_owned(),
            model: non_empty("QUIZ_AI_MODEL").unwrap_or_else(|| default_model.into()),
        })
    }
}
