use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use instadash_core::{DashboardGenerator, ErrorBody, GenerateError, GenerationResponse};
use serde_json::{Map, Value};

/// Returned instead of the real cause when the upstream credential is at fault.
pub const CREDENTIAL_ERROR_MESSAGE: &str = "Dashboard generator is not configured properly";

/// Shared state for the HTTP handlers. Read-only after startup.
pub struct AppState {
    pub generator: Arc<dyn DashboardGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn DashboardGenerator>) -> Self {
        Self { generator }
    }
}

pub type SharedState = Arc<AppState>;

/// Shape problems in the request body. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Missing required fields: prompt and jsonData are required")]
    MissingFields,
    #[error("Prompt must be a non-empty string")]
    InvalidPrompt,
    #[error("jsonData must be a valid JSON object")]
    InvalidJsonData,
}

/// null, false, 0 and "" all count as absent.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Check the body and borrow the instruction and data out of it.
pub fn validate_payload(body: &Value) -> Result<(&str, &Map<String, Value>), PayloadError> {
    let prompt = body.get("prompt");
    let json_data = body.get("jsonData");

    if is_blank(prompt) || is_blank(json_data) {
        return Err(PayloadError::MissingFields);
    }

    let prompt = match prompt.and_then(Value::as_str) {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(PayloadError::InvalidPrompt),
    };

    let json_data = json_data
        .and_then(Value::as_object)
        .ok_or(PayloadError::InvalidJsonData)?;

    Ok((prompt, json_data))
}

#[derive(Debug)]
pub enum ApiError {
    Payload(PayloadError),
    Body(JsonRejection),
    Generation(GenerateError),
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        ApiError::Payload(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        match err {
            // A body not declared as JSON carries no fields at all.
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::Payload(PayloadError::MissingFields)
            }
            other => ApiError::Body(other),
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        ApiError::Generation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Payload(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Generation(err) if err.is_credential() => {
                tracing::error!(error = %err, "Upstream credential problem");
                (StatusCode::INTERNAL_SERVER_ERROR, CREDENTIAL_ERROR_MESSAGE.to_string())
            }
            ApiError::Generation(err) => {
                tracing::error!(error = %err, "Dashboard generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// POST /api/generate-dashboard
pub async fn generate_dashboard(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let Json(body) = body?;
    let (prompt, json_data) = validate_payload(&body).inspect_err(|err| {
        tracing::debug!(reason = %err, "Rejected generation request");
    })?;

    tracing::info!(
        mode = state.generator.mode(),
        keys = json_data.len(),
        prompt_chars = prompt.chars().count(),
        "Generating dashboard"
    );
    let html = state.generator.generate(prompt, json_data).await?;

    Ok(Json(GenerationResponse::ok(html)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let body = json!({"prompt": "summarize", "jsonData": {"total": 100}});
        let (prompt, data) = validate_payload(&body).unwrap();
        assert_eq!(prompt, "summarize");
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_missing_or_falsy_fields() {
        for body in [
            json!({"jsonData": {"a": 1}}),
            json!({"prompt": "x"}),
            json!({"prompt": "", "jsonData": {"a": 1}}),
            json!({"prompt": "x", "jsonData": null}),
            json!({"prompt": "x", "jsonData": false}),
            json!({"prompt": "x", "jsonData": 0}),
            json!({"prompt": null, "jsonData": {}}),
            json!([1, 2]),
            json!("text"),
        ] {
            assert_eq!(validate_payload(&body), Err(PayloadError::MissingFields), "{body}");
        }
    }

    #[test]
    fn test_prompt_must_be_non_empty_string() {
        for body in [
            json!({"prompt": "   ", "jsonData": {"a": 1}}),
            json!({"prompt": 42, "jsonData": {"a": 1}}),
            json!({"prompt": ["x"], "jsonData": {"a": 1}}),
            json!({"prompt": true, "jsonData": {"a": 1}}),
        ] {
            assert_eq!(validate_payload(&body), Err(PayloadError::InvalidPrompt), "{body}");
        }
    }

    #[test]
    fn test_json_data_must_be_object() {
        for body in [
            json!({"prompt": "x", "jsonData": "not an object"}),
            json!({"prompt": "x", "jsonData": [1, 2, 3]}),
            json!({"prompt": "x", "jsonData": 12}),
            json!({"prompt": "x", "jsonData": true}),
        ] {
            assert_eq!(validate_payload(&body), Err(PayloadError::InvalidJsonData), "{body}");
        }
    }

    #[test]
    fn test_empty_object_is_accepted() {
        let body = json!({"prompt": "x", "jsonData": {}});
        assert!(validate_payload(&body).is_ok());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PayloadError::InvalidJsonData.to_string(),
            "jsonData must be a valid JSON object"
        );
        assert!(PayloadError::MissingFields
            .to_string()
            .starts_with("Missing required fields"));
    }
}
