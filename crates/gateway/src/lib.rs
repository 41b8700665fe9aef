//! HTTP API gateway for homehub.
//!
//! Exposes the household assistant over two routes:
//!
//! - `POST /api/chat`: `{"message": "..."}` in, `{"response": "..."}` out
//! - `GET /health`: liveness and version
//!
//! Built on Axum. Each chat request runs one full exchange on the shared
//! [`Orchestrator`]; exchanges share nothing else.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use homehub_agent::Orchestrator;
use homehub_config::GatewayConfig;
use homehub_core::ExchangeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reply shown to the user when the exchange fails past the empty-message check.
pub const UNAVAILABLE_REPLY: &str = "The assistant is unavailable right now.";

/// Shared application state for the gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server. Returns after Ctrl-C.
pub async fn start(config: &GatewayConfig, orchestrator: Arc<Orchestrator>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(GatewayState { orchestrator });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gateway");
        })
        .await
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An exchange failure rendered for the HTTP caller.
struct ChatError(ExchangeError);

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ExchangeError::EmptyUtterance => (StatusCode::BAD_REQUEST, self.0.to_string()),
            other => {
                error!(error = %other, "Exchange failed");
                (StatusCode::BAD_GATEWAY, UNAVAILABLE_REPLY.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

async fn chat_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    // A body without a usable `message` string is treated as no message.
    let Json(payload) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Unreadable chat request");
        ChatError(ExchangeError::EmptyUtterance)
    })?;
    info!(message_len = payload.message.len(), "Chat message received");

    let reply = state
        .orchestrator
        .run(&payload.message)
        .await
        .map_err(ChatError)?;

    info!(rounds = reply.rounds, "Chat reply sent");
    Ok(Json(ChatResponse { response: reply.text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use homehub_core::error::ProviderError;
    use homehub_core::provider::{CompletionOutcome, CompletionRequest, Provider};
    use homehub_core::tool::ToolRegistry;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct OneShotProvider {
        outcome: Mutex<Option<Result<CompletionOutcome, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl OneShotProvider {
        fn new(outcome: Result<CompletionOutcome, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Provider for OneShotProvider {
        fn name(&self) -> &str {
            "one-shot"
        }

        async fn complete(
            &self,
            _request: CompletionRequest<'_>,
        ) -> Result<CompletionOutcome, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".into())))
        }
    }

    fn app(provider: Arc<OneShotProvider>) -> Router {
        let orchestrator = Orchestrator::new(provider, ToolRegistry::empty());
        build_router(GatewayState {
            orchestrator: Arc::new(orchestrator),
        })
    }

    fn chat(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let provider = OneShotProvider::new(Ok(CompletionOutcome::Final {
            text: String::new(),
        }));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(provider).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn chat_returns_final_text() {
        let provider = OneShotProvider::new(Ok(CompletionOutcome::Final {
            text: "Tacos on Tuesday.".into(),
        }));
        let response = app(provider.clone())
            .oneshot(chat(json!({"message": "What's for dinner Tuesday?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"response": "Tacos on Tuesday."}));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_completion() {
        let provider = OneShotProvider::new(Ok(CompletionOutcome::Final {
            text: "unused".into(),
        }));
        let response = app(provider.clone())
            .oneshot(chat(json!({"message": "   \n"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No message"}));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_message_field_counts_as_blank() {
        let provider = OneShotProvider::new(Ok(CompletionOutcome::Final {
            text: "unused".into(),
        }));
        let response = app(provider).oneshot(chat(json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreadable_bodies_get_structured_no_message() {
        let bodies = [
            ("application/json", r#"{"message": null}"#.to_string()),
            ("application/json", r#"{"message": 5}"#.to_string()),
            ("application/json", "{not json".to_string()),
            ("text/plain", "what's for dinner?".to_string()),
        ];

        for (content_type, body) in bodies {
            let provider = OneShotProvider::new(Ok(CompletionOutcome::Final {
                text: "unused".into(),
            }));
            let req = Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", content_type)
                .body(Body::from(body.clone()))
                .unwrap();

            let response = app(provider.clone()).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json_body(response).await, json!({"error": "No message"}));
            assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn provider_failure_is_bad_gateway_without_details() {
        let provider = OneShotProvider::new(Err(ProviderError::AuthenticationFailed(
            "invalid x-api-key sk-ant-123".into(),
        )));
        let response = app(provider)
            .oneshot(chat(json!({"message": "Add a reminder"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], UNAVAILABLE_REPLY);
        assert!(!body.to_string().contains("sk-ant"));
    }
}
