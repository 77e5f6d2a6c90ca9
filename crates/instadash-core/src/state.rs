//! Wire types shared by the server and the client
//!
//! These structures describe the JSON bodies exchanged over
//! `POST /api/generate-dashboard` and don't depend on any HTTP framework.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the generation endpoint, appended to the API base URL.
pub const GENERATE_PATH: &str = "/api/generate-dashboard";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Body sent by the client: the user's instruction plus the parsed JSON data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(rename = "jsonData")]
    pub json_data: Value,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, json_data: Value) -> Self {
        Self {
            prompt: prompt.into(),
            json_data,
        }
    }
}

/// Successful generation: `{ "success": true, "html": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub html: String,
}

impl GenerationResponse {
    pub fn ok(html: String) -> Self {
        Self { success: true, html }
    }
}

/// Error payload returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
