//! Test utilities for foresight-core
//!
//! Provides a mock narrative server speaking both the Ollama and the
//! OpenAI-compatible protocols, for development and integration tests.

use axum::{
    extract::Json,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock narrative server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Narrative returned by the generate and chat endpoints
    pub const DEFAULT_RESPONSE: &'static str =
        "Your spending is climbing steadily. Trimming a few discretionary purchases would keep next month on budget.";

    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat));
        Self::serve(app).await
    }

    /// Start a server that is reachable but fails every generation request
    pub async fn failing() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_failure))
            .route("/v1/chat/completions", post(handle_failure));
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
        }],
    })
}

async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    Json(GenerateResponse {
        model: request.model,
        response: MockOllamaServer::DEFAULT_RESPONSE.to_string(),
        done: true,
    })
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "data": [{ "id": "llama3.2" }] }))
}

async fn handle_chat(Json(_request): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "choices": [{
            "message": { "role": "assistant", "content": MockOllamaServer::DEFAULT_RESPONSE }
        }]
    }))
}

async fn handle_failure() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    #[allow(dead_code)]
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
