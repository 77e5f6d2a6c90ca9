//! Dashboard generation: one capability, two strategies.
//!
//! Which strategy runs is decided once at startup by [`select_generator`]:
//! with an upstream credential the live completion API is used, without one
//! a deterministic demo document is produced. Callers only see
//! [`DashboardGenerator`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::ai::{CompletionError, OpenAIClient};
use crate::config::ServerConfig;
use crate::html::escape_html;
use crate::prompt::{PromptPair, SystemPrompt};
use crate::sanitize::{RegexSanitizer, Sanitizer};

/// Characters of the instruction echoed back by the demo document.
pub const DEMO_INSTRUCTION_CHARS: usize = 300;

const DEMO_SECTION_STYLE: &str =
    "margin: 16px 0; padding: 16px; border: 1px solid #e5e7eb; border-radius: 8px;";
const DEMO_PRE_STYLE: &str =
    "background: #f3f4f6; padding: 16px; border-radius: 8px; overflow: auto;";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The upstream credential is missing or was refused.
    #[error("Failed to generate dashboard: {0}")]
    Credential(String),
    #[error("Failed to generate dashboard: {0}")]
    Failed(String),
}

impl GenerateError {
    pub fn is_credential(&self) -> bool {
        matches!(self, GenerateError::Credential(_))
    }
}

impl From<CompletionError> for GenerateError {
    fn from(err: CompletionError) -> Self {
        if err.is_credential() {
            GenerateError::Credential(err.to_string())
        } else {
            GenerateError::Failed(err.to_string())
        }
    }
}

impl From<anyhow::Error> for GenerateError {
    fn from(err: anyhow::Error) -> Self {
        GenerateError::Failed(err.to_string())
    }
}

#[async_trait]
pub trait DashboardGenerator: Send + Sync {
    /// Turn an instruction plus data into a sanitized HTML fragment.
    async fn generate(
        &self,
        instruction: &str,
        json_data: &Map<String, Value>,
    ) -> Result<String, GenerateError>;

    /// Short label for logs.
    fn mode(&self) -> &'static str;
}

/// Pick the strategy for the lifetime of the process.
pub fn select_generator(config: &ServerConfig) -> Arc<dyn DashboardGenerator> {
    match OpenAIClient::from_config(config) {
        Some(client) => {
            let system_prompt = SystemPrompt::new(&config.system_prompt_path);
            tracing::info!(
                model = client.model(),
                system_prompt = %system_prompt.path().display(),
                "Using live completion API"
            );
            Arc::new(LiveGenerator::new(client, system_prompt))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, serving demo dashboards");
            Arc::new(DemoGenerator::new())
        }
    }
}

/// Canned, fully deterministic document used when no credential is configured.
pub struct DemoGenerator {
    sanitizer: Box<dyn Sanitizer>,
}

impl DemoGenerator {
    pub fn new() -> Self {
        Self {
            sanitizer: Box::new(RegexSanitizer::new()),
        }
    }
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DashboardGenerator for DemoGenerator {
    async fn generate(
        &self,
        instruction: &str,
        json_data: &Map<String, Value>,
    ) -> Result<String, GenerateError> {
        let html = demo_document(instruction, json_data)?;
        Ok(self.sanitizer.sanitize(&html))
    }

    fn mode(&self) -> &'static str {
        "demo"
    }
}

fn demo_document(
    instruction: &str,
    json_data: &Map<String, Value>,
) -> Result<String, GenerateError> {
    let excerpt: String = instruction.chars().take(DEMO_INSTRUCTION_CHARS).collect();
    let pretty = serde_json::to_string_pretty(json_data)
        .map_err(|e| GenerateError::Failed(e.to_string()))?;

    Ok(format!(
        r#"<div style="font-family: system-ui, sans-serif; padding: 24px; color: #1f2937;">
  <h1 style="margin-top: 0;">Demo Dashboard</h1>
  <p style="color: #6b7280;">
    No AI credential is configured, so this is a static summary of your data.
  </p>
  <section style="{section}">
    <h2 style="font-size: 1rem; margin: 0 0 8px;">Instruction</h2>
    <p style="margin: 0;">{instruction}</p>
  </section>
  <section style="{section}">
    <h2 style="font-size: 1rem; margin: 0 0 8px;">Data overview</h2>
    <p style="margin: 0;">Keys in root object: {keys}</p>
  </section>
  <pre style="{pre}">{data}</pre>
</div>"#,
        section = DEMO_SECTION_STYLE,
        pre = DEMO_PRE_STYLE,
        instruction = escape_html(&excerpt),
        keys = json_data.len(),
        data = escape_html(&pretty),
    ))
}

/// Calls the completion API with the cached system prompt.
pub struct LiveGenerator {
    client: OpenAIClient,
    system_prompt: SystemPrompt,
    sanitizer: Box<dyn Sanitizer>,
}

impl LiveGenerator {
    pub fn new(client: OpenAIClient, system_prompt: SystemPrompt) -> Self {
        Self {
            client,
            system_prompt,
            sanitizer: Box::new(RegexSanitizer::new()),
        }
    }
}

#[async_trait]
impl DashboardGenerator for LiveGenerator {
    async fn generate(
        &self,
        instruction: &str,
        json_data: &Map<String, Value>,
    ) -> Result<String, GenerateError> {
        let pair = PromptPair::assemble(&self.system_prompt, instruction, json_data).await?;
        let html = self.client.complete(&pair).await?;
        Ok(self.sanitizer.sanitize(&html))
    }

    fn mode(&self) -> &'static str {
        "live"
    }
}
