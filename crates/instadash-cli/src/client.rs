use instadash_core::{GenerationRequest, GENERATE_PATH, HEALTH_PATH};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// Shown when the server fails without saying why.
pub const FALLBACK_ERROR: &str = "Failed to generate dashboard";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx status; carries the server's `error` message.
    #[error("{0}")]
    Server(String),
    /// Network failure or a body that isn't JSON.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Strip one trailing slash from the base URL and append the generation path.
pub fn endpoint_url(base_url: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}{}", base, GENERATE_PATH)
}

/// Talks to the backend. The endpoint is resolved once, at construction.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    endpoint: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let endpoint = endpoint_url(base_url);
        tracing::info!(base_url, endpoint = %endpoint, "Resolved dashboard API");
        Self {
            client: Client::new(),
            base_url: base_url.strip_suffix('/').unwrap_or(base_url).to_string(),
            endpoint,
        }
    }

    /// POST the request once and return the generated HTML. No retries, no timeout.
    pub async fn send(&self, request: &GenerationRequest) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body: ResponseBody = response.json().await?;

        if !status.is_success() {
            return Err(ClientError::Server(
                body.error.unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            ));
        }

        Ok(body.html.unwrap_or_default())
    }

    /// GET /health
    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Health check failed");
            return Err(ClientError::Server(message.to_string()));
        }
        Ok(body)
    }
}
