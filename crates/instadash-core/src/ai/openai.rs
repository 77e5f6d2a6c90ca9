use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::prompt::PromptPair;

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2000;

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("OpenAI API error {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("OpenAI API returned no completion")]
    Empty,
}

impl CompletionError {
    /// The upstream rejected our key (missing, revoked or not allowed).
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            CompletionError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// Minimal chat-completions client for OpenAI-compatible APIs.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// `None` when the config carries no credential.
    pub fn from_config(config: &ServerConfig) -> Option<Self> {
        config
            .openai_api_key
            .as_deref()
            .map(|key| Self::new(key, &config.openai_base_url, &config.openai_model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the pair as the whole conversation and return the first choice verbatim.
    pub async fn complete(&self, pair: &PromptPair) -> Result<String, CompletionError> {
        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: &pair.system_prompt,
                },
                OpenAIMessage {
                    role: "user",
                    content: &pair.user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAIErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(CompletionError::Status { status, message });
        }

        let openai_response: OpenAIResponse = response.json().await?;
        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::Empty)
    }
}
