//! HTTP API v1 — routing inspection and agent configuration.
//!
//! Endpoints:
//!
//! - `POST /v1/route`               — Score a prompt against the catalog
//! - `GET  /v1/intents`             — List the catalog with dispatch targets
//! - `GET  /v1/agents`              — List agents and their stored configs
//! - `GET  /v1/agents/{name}/config` — Fetch one agent's stored config
//! - `PUT  /v1/agents/{name}/config` — Replace it and reload the agent

use agentrouter_core::agent::{AgentKind, AgentRecord, ScoreVector};
use agentrouter_core::intent::IntentId;
use agentrouter_guardrails::GuardrailPolicy;
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::SharedState;
use crate::error::ApiError;

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router() -> Router<SharedState> {
    Router::new()
        .route("/route", post(route_handler))
        .route("/intents", get(list_intents_handler))
        .route("/agents", get(list_agents_handler))
        .route(
            "/agents/{name}/config",
            get(get_agent_config_handler).put(put_agent_config_handler),
        )
}

// ── Routing ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub intent: IntentId,
    pub confidence: f32,
    pub scores: ScoreVector,
    /// The agent the intent would be dispatched to.
    pub agent: AgentKind,
}

/// `POST /v1/route` — Route a prompt without running any agent.
async fn route_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let orchestrator = &state.orchestrator;
    let decision = orchestrator.route_only(&payload.prompt).await?;
    let agent = orchestrator.dispatcher().lookup(&decision.intent);
    Ok(Json(RouteResponse {
        intent: decision.intent,
        confidence: decision.confidence,
        scores: decision.scores,
        agent,
    }))
}

// ── Intents ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct IntentInfo {
    pub id: IntentId,
    pub description: String,
    pub agent: AgentKind,
    /// False when the intent reaches its agent only through the fallback.
    pub mapped: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntentListResponse {
    pub intents: Vec<IntentInfo>,
    pub fallback_agent: AgentKind,
}

/// `GET /v1/intents` — The catalog in routing order.
async fn list_intents_handler(State(state): State<SharedState>) -> Json<IntentListResponse> {
    let orchestrator = &state.orchestrator;
    let dispatcher = orchestrator.dispatcher();
    let intents = orchestrator
        .router()
        .catalog()
        .all()
        .iter()
        .map(|intent| IntentInfo {
            id: intent.id.clone(),
            description: intent.description.clone(),
            agent: dispatcher.lookup(&intent.id),
            mapped: dispatcher.is_mapped(&intent.id),
        })
        .collect();
    Json(IntentListResponse {
        intents,
        fallback_agent: dispatcher.fallback(),
    })
}

// ── Agents ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_name: String,
    /// Whether a record exists in the store.
    pub configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AgentRecord>,
}

/// `GET /v1/agents` — Every agent kind with its stored record, if any.
async fn list_agents_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AgentInfo>>, ApiError> {
    let records = state.orchestrator.store().list().await.map_err(ApiError::from_store)?;
    let agents = AgentKind::ALL
        .into_iter()
        .map(|kind| {
            let config = records.iter().find(|r| r.agent_name == kind.name()).cloned();
            AgentInfo {
                agent_name: kind.name().to_string(),
                configured: config.is_some(),
                config,
            }
        })
        .collect();
    Ok(Json(agents))
}

fn known_agent(name: &str) -> Result<AgentKind, ApiError> {
    AgentKind::from_name(name).ok_or_else(|| ApiError::not_found(format!("unknown agent '{name}'")))
}

/// `GET /v1/agents/{name}/config`
async fn get_agent_config_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<AgentRecord>, ApiError> {
    let kind = known_agent(&name)?;
    state
        .orchestrator
        .store()
        .load_agent_config(kind.name())
        .await
        .map_err(ApiError::from_store)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no stored config for '{name}'")))
}

#[derive(Debug, Deserialize)]
pub struct AgentConfigUpdate {
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub guardrails: Map<String, Value>,
}

/// `PUT /v1/agents/{name}/config` — Replace the stored record, then reload.
///
/// Guardrail parameters are validated before anything is written.
async fn put_agent_config_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(update): Json<AgentConfigUpdate>,
) -> Result<Json<AgentRecord>, ApiError> {
    let kind = known_agent(&name)?;
    GuardrailPolicy::from_rules(update.guardrails.clone())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mut record = AgentRecord::new(kind.name(), update.instructions);
    record.guardrails = update.guardrails;

    let orchestrator = &state.orchestrator;
    orchestrator
        .store()
        .upsert_agent_config(record.clone())
        .await
        .map_err(ApiError::from_store)?;
    if let Some(reloaded) = orchestrator.reload_agent(kind.name()).await {
        reloaded?;
    }

    info!(agent = kind.name(), "Agent config updated");
    Ok(Json(record))
}
