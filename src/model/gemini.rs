use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, TextModel, TokenUsage};
use crate::config::ModelConfig;
use crate::error::{ConfigurationError, RemoteCallError};
use crate::prompts::{Prompt, Role};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini via the `generateContent` REST endpoint.
pub struct GeminiModel {
    client: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ConfigurationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigurationError::Client)?;

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// System message goes to `systemInstruction`, user message to `contents`.
    fn build_request(prompt: &Prompt) -> ApiRequest<'_> {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in prompt.messages() {
            let part = vec![Part {
                text: &message.content,
            }];
            match message.role {
                Role::System => {
                    system_instruction = Some(Content {
                        role: None,
                        parts: part,
                    })
                }
                Role::User => contents.push(Content {
                    role: Some("user"),
                    parts: part,
                }),
            }
        }

        ApiRequest {
            system_instruction,
            contents,
        }
    }

    fn parse_response(resp: ApiResponse) -> Result<Completion, RemoteCallError> {
        let usage = resp.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        let Some(candidate) = resp.candidates.into_iter().next() else {
            let reason = resp
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({r})"))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(RemoteCallError::Malformed(reason));
        };

        let Some(content) = candidate.content else {
            let reason = candidate
                .finish_reason
                .map(|r| format!("candidate has no content (finish reason {r})"))
                .unwrap_or_else(|| "candidate has no content".to_string());
            return Err(RemoteCallError::Malformed(reason));
        };

        let text = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(Completion { text, usage })
    }

    /// Pull `error.message` out of an error body, or fall back to the raw text.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, RemoteCallError> {
        let body = Self::build_request(prompt);

        debug!(model = %self.model, "POST generateContent");
        let resp = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(RemoteCallError::Api {
                status: status.as_u16(),
                message: Self::error_message(&text),
            });
        }

        let api_resp: ApiResponse = resp.json().await?;
        Self::parse_response(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}
