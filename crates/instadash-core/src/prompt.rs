use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

/// The system prompt, read from disk on first use and kept for the life of
/// the process. The file is static, so nothing ever invalidates it.
pub struct SystemPrompt {
    path: PathBuf,
    text: OnceCell<String>,
}

impl SystemPrompt {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the prompt file once. A failed read is not cached.
    pub async fn get(&self) -> Result<&str> {
        let text = self
            .text
            .get_or_try_init(|| async {
                tracing::debug!(path = %self.path.display(), "Loading system prompt");
                tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|e| anyhow!("Failed to read system prompt {:?}: {}", self.path, e))
            })
            .await?;
        Ok(text.as_str())
    }
}

/// The two messages sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_message: String,
}

impl PromptPair {
    pub async fn assemble(
        system_prompt: &SystemPrompt,
        instruction: &str,
        json_data: &Map<String, Value>,
    ) -> Result<Self> {
        Ok(Self {
            system_prompt: system_prompt.get().await?.to_string(),
            user_message: build_user_message(instruction, json_data)?,
        })
    }
}

/// `instruction`, a blank line, then the pretty-printed data.
pub fn build_user_message(instruction: &str, json_data: &Map<String, Value>) -> Result<String> {
    let pretty = serde_json::to_string_pretty(json_data)?;
    Ok(format!("{}\n\nJSON Data:\n{}", instruction, pretty))
}
