use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use instadash_core::{ErrorBody, GENERATE_PATH, HEALTH_PATH};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handler::{generate_dashboard, SharedState};

/// Largest JSON body accepted by the API.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health).fallback(not_found))
        .route(GENERATE_PATH, post(generate_dashboard).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "message": "Server is running" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Route not found")))
}

/// Last-resort handler: a panicking request still gets a JSON error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };
    tracing::error!(panic = %message, "Request handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{AppState, CREDENTIAL_ERROR_MESSAGE};
    use async_trait::async_trait;
    use instadash_core::{DashboardGenerator, DemoGenerator, GenerateError};
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behavior {
        Echo,
        Fail,
        BadCredential,
        Panic,
    }

    struct StubGenerator {
        calls: AtomicUsize,
        behavior: Behavior,
    }

    #[async_trait]
    impl DashboardGenerator for StubGenerator {
        async fn generate(
            &self,
            instruction: &str,
            json_data: &Map<String, Value>,
        ) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Echo => Ok(format!(
                    "<p>{} ({} keys)</p>",
                    instruction,
                    json_data.len()
                )),
                Behavior::Fail => Err(GenerateError::Failed("upstream exploded".to_string())),
                Behavior::BadCredential => Err(GenerateError::Credential(
                    "OpenAI API error 401 Unauthorized: Incorrect API key provided".to_string(),
                )),
                Behavior::Panic => panic!("generator bug"),
            }
        }

        fn mode(&self) -> &'static str {
            "stub"
        }
    }

    async fn spawn(generator: Arc<dyn DashboardGenerator>) -> String {
        let app = router(Arc::new(AppState::new(generator)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn stub(behavior: Behavior) -> Arc<StubGenerator> {
        Arc::new(StubGenerator {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    async fn post_json(base: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", base, GENERATE_PATH))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_demo_mode_scenario() {
        let base = spawn(Arc::new(DemoGenerator::new())).await;
        let (status, body) = post_json(
            &base,
            json!({"prompt": "summarize", "jsonData": {"total": 100}}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert!(body["html"]
            .as_str()
            .unwrap()
            .contains("Keys in root object: 1"));
    }

    #[tokio::test]
    async fn test_valid_request_is_forwarded() {
        let generator = stub(Behavior::Echo);
        let base = spawn(generator.clone()).await;
        let (status, body) =
            post_json(&base, json!({"prompt": "chart", "jsonData": {"a": 1, "b": 2}})).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"success": true, "html": "<p>chart (2 keys)</p>"}));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_shapes_never_reach_generator() {
        let generator = stub(Behavior::Echo);
        let base = spawn(generator.clone()).await;

        let (status, body) =
            post_json(&base, json!({"prompt": "x", "jsonData": "not an object"})).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "jsonData must be a valid JSON object"}));

        let (status, body) = post_json(&base, json!({"jsonData": {"total": 100}})).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("Missing required fields"));

        let (status, body) = post_json(&base, json!({"prompt": 7, "jsonData": {"a": 1}})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Prompt must be a non-empty string");

        let (status, _) = post_json(&base, json!({"prompt": "x", "jsonData": [1, 2]})).await;
        assert_eq!(status, 400);

        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_500() {
        let base = spawn(stub(Behavior::Fail)).await;
        let (status, body) = post_json(&base, json!({"prompt": "x", "jsonData": {"a": 1}})).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to generate dashboard: upstream exploded");
    }

    #[tokio::test]
    async fn test_credential_errors_are_masked() {
        let base = spawn(stub(Behavior::BadCredential)).await;
        let (status, body) = post_json(&base, json!({"prompt": "x", "jsonData": {"a": 1}})).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], CREDENTIAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_panic_becomes_json_500() {
        let base = spawn(stub(Behavior::Panic)).await;
        let (status, body) = post_json(&base, json!({"prompt": "x", "jsonData": {"a": 1}})).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "generator bug");
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_with_json_error() {
        let base = spawn(stub(Behavior::Echo)).await;
        let response = reqwest::Client::new()
            .post(format!("{}{}", base, GENERATE_PATH))
            .header("Content-Type", "application/json")
            .body("{invalid")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_body_without_json_content_type_is_missing_fields() {
        let generator = stub(Behavior::Echo);
        let base = spawn(generator.clone()).await;
        let response = reqwest::Client::new()
            .post(format!("{}{}", base, GENERATE_PATH))
            .header("Content-Type", "text/plain")
            .body(r#"{"prompt": "x", "jsonData": {"a": 1}}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({"error": "Missing required fields: prompt and jsonData are required"})
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn(stub(Behavior::Echo)).await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok", "message": "Server is running"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let base = spawn(stub(Behavior::Echo)).await;
        for url in [format!("{}/nope", base), format!("{}{}", base, GENERATE_PATH)] {
            let response = reqwest::get(url).await.unwrap();
            assert_eq!(response.status().as_u16(), 404);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body, json!({"error": "Route not found"}));
        }
    }
}
