//! HTTP API gateway for agentrouter.
//!
//! Exposes the request pipeline over REST:
//!
//! - `GET  /health` — liveness and catalog summary
//! - `POST /run`    — route, dispatch and answer one prompt
//! - `/v1/*`        — routing inspection and agent configuration
//!   (see [`api_v1`])
//!
//! Built on Axum.

pub mod api_v1;
pub mod error;

use agentrouter_agent::Orchestrator;
use agentrouter_core::agent::{AgentRequest, AgentResult};
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use error::{ApiError, ErrorResponse};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    pub start_time: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Utc::now(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with every route and layer.
///
/// CORS is permissive: the API carries no credentials.
pub fn build_router(state: SharedState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/run", post(run_handler))
        .nest("/v1", api_v1::v1_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the pipeline from `config` (embedding the catalog and preloading
/// agent configs) before binding, so a misconfigured provider fails fast.
pub async fn start(config: agentrouter_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = Arc::new(agentrouter_agent::bootstrap(&config).await?);
    let state = Arc::new(GatewayState::new(orchestrator));
    let app = build_router(state, config.gateway.max_body_bytes);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub intents: usize,
    pub embedding_model: String,
    pub uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let router = state.orchestrator.router();
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        intents: router.catalog().len(),
        embedding_model: router.model(),
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
    })
}

async fn run_handler(
    State(state): State<SharedState>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<AgentResult>, ApiError> {
    info!(
        prompt_len = request.user_prompt.len(),
        user_id = request.user_id.as_deref().unwrap_or("-"),
        "Run request received"
    );
    let result = state.orchestrator.handle(&request).await?;
    Ok(Json(result))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use agentrouter_core::embedding::{Embedder, Embedding};
    use agentrouter_core::error::EmbeddingError;
    use agentrouter_providers::HashingEmbedder;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.intents, 4);
        assert_eq!(health.embedding_model, "hashing/fnv-hashing-v1");
    }

    #[tokio::test]
    async fn run_planning_prompt() {
        let req = post_json(
            "/run",
            json!({"user_prompt": "Can you help me plan a two week rollout with milestones?"}),
        );
        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["trace"]["intent"], "task_planning");
        assert_eq!(body["trace"]["agent_name"], "TaskPlannerAgent");
        assert_eq!(body["trace"]["guardrails_passed"], true);
        assert_eq!(body["trace"]["intent_confidence"], 0.316);
        assert!(body["action_items"][0]["milestones"].is_array());
        assert_eq!(body["trace"]["all_scores"].as_object().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn run_card_number_is_deflected() {
        let req = post_json(
            "/run",
            json!({"user_prompt": "My card number is 4111111111111111, please refund me", "context": null}),
        );
        let response = app().await.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["trace"]["guardrails_passed"], false);
        assert_eq!(body["action_items"], json!([]));
        assert_eq!(body["required_connection_config"], json!({}));
    }

    #[tokio::test]
    async fn run_bulk_paste_with_digits_is_400() {
        let prompt = format!("invoice 7 {}", "lorem ".repeat(200));
        let response = app()
            .await
            .oneshot(post_json("/run", json!({"user_prompt": prompt})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.error, agentrouter_agent::TRANSPORT_PII_MESSAGE);
        assert!(!body.retryable);
    }

    #[tokio::test]
    async fn run_missing_prompt_is_client_error() {
        let response = app()
            .await
            .oneshot(post_json("/run", json!({"context": {}})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    struct Flaky {
        inner: HashingEmbedder,
        down: AtomicBool,
        bad_key: bool,
    }

    impl Flaky {
        fn new(bad_key: bool) -> Arc<Self> {
            Arc::new(Self {
                inner: HashingEmbedder::new("m", 64),
                down: AtomicBool::new(false),
                bad_key,
            })
        }
    }

    #[async_trait]
    impl Embedder for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }
        fn model(&self) -> &str {
            "flaky-v1"
        }
        async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(if self.bad_key {
                    EmbeddingError::AuthenticationFailed("Invalid API key".into())
                } else {
                    EmbeddingError::Network("connection refused".into())
                });
            }
            self.inner.embed(text).await
        }
    }

    #[tokio::test]
    async fn provider_outage_is_503_retryable() {
        let flaky = Flaky::new(false);
        let state = state_with(flaky.clone()).await;
        flaky.down.store(true, Ordering::SeqCst);

        let response = build_router(state, 1024)
            .oneshot(post_json("/run", json!({"user_prompt": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(body.retryable);
    }

    #[tokio::test]
    async fn non_transient_provider_failure_is_still_503_retryable() {
        let flaky = Flaky::new(true);
        let state = state_with(flaky.clone()).await;
        flaky.down.store(true, Ordering::SeqCst);

        let response = build_router(state, 1024)
            .oneshot(post_json("/run", json!({"user_prompt": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(body.retryable);
        assert!(body.error.contains("Authentication failed"));
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let state = test_state().await;
        let response = build_router(state, 64)
            .oneshot(post_json("/run", json!({"user_prompt": "x".repeat(200)})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
