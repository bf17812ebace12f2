pub mod gemini;
pub mod mock;

use async_trait::async_trait;

use crate::error::RemoteCallError;
use crate::prompts::Prompt;

/// Token usage from a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// What the model returned for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// A remote text-generation service. One call, one completion.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Model identifier, for logs and run records.
    fn model_id(&self) -> &str;

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, RemoteCallError>;
}
