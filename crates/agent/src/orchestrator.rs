//! The request pipeline: route, dispatch, gate, run, annotate.

use agentrouter_config::AppConfig;
use agentrouter_core::agent::{AgentKind, AgentRequest, AgentResult, RoutingAnnotation};
use agentrouter_core::error::Error;
use agentrouter_core::intent::IntentId;
use agentrouter_core::store::AgentConfigStore;
use agentrouter_router::{IntentRouter, RoutingDecision};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentProfile};
use crate::dispatcher::Dispatcher;
use crate::token::{count_tokens, truncate_to_tokens};

/// Message of the transport-level rejection.
pub const TRANSPORT_PII_MESSAGE: &str = "Request contains potential PII. Redact and retry.";

/// Per-request behaviour switches.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Refresh the dispatched agent's configuration before each request.
    pub reload_on_request: bool,
    /// Decimal places kept in `intent_confidence`.
    pub confidence_precision: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            reload_on_request: true,
            confidence_precision: 3,
        }
    }
}

/// Owns the router, the dispatch table and one instance of every agent.
pub struct Orchestrator {
    router: Arc<IntentRouter>,
    dispatcher: Dispatcher,
    agents: HashMap<AgentKind, Arc<Agent>>,
    store: Arc<dyn AgentConfigStore>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        router: Arc<IntentRouter>,
        dispatcher: Dispatcher,
        store: Arc<dyn AgentConfigStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        dispatcher.check_against(router.catalog());
        let agents = AgentKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::new(Agent::new(kind, store.clone()))))
            .collect();
        Self {
            router,
            dispatcher,
            agents,
            store,
            settings,
        }
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<dyn AgentConfigStore> {
        &self.store
    }

    pub fn agent(&self, kind: AgentKind) -> Option<&Arc<Agent>> {
        self.agents.get(&kind)
    }

    /// Load every agent's configuration concurrently.
    ///
    /// Failures are logged and leave that agent on its default profile.
    pub async fn preload(&self) {
        let loads = self.agents.values().map(|agent| async move {
            if let Err(e) = agent.load().await {
                warn!(agent = agent.name(), error = %e, "Agent config preload failed");
            }
        });
        futures::future::join_all(loads).await;
        info!(agents = self.agents.len(), "Agent configs preloaded");
    }

    /// Route without dispatching; for inspection endpoints.
    pub async fn route_only(&self, prompt: &str) -> Result<RoutingDecision, Error> {
        self.router.route(prompt).await
    }

    /// Reload one agent by name. Returns `None` for unknown names.
    pub async fn reload_agent(&self, agent_name: &str) -> Option<Result<Arc<AgentProfile>, Error>> {
        let kind = AgentKind::from_name(agent_name)?;
        let agent = self.agents.get(&kind)?;
        Some(agent.load().await)
    }

    /// Process one request end to end.
    ///
    /// Errors are provider or store failures and the transport-level
    /// rejection. A guardrail rejection is a successful deflection result.
    pub async fn handle(&self, request: &AgentRequest) -> Result<AgentResult, Error> {
        let started = Instant::now();
        let prompt = request.user_prompt.as_str();

        let decision = self.router.route(prompt).await?;
        let kind = self.dispatcher.dispatch(&decision.intent);
        let agent = self
            .agents
            .get(&kind)
            .ok_or_else(|| Error::Internal(format!("no agent instance for {kind}")))?;

        let profile = if self.settings.reload_on_request {
            match agent.load().await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(agent = agent.name(), error = %e, "Agent config reload failed, using cached snapshot");
                    agent.profile()
                }
            }
        } else {
            agent.profile()
        };

        if profile.policy.transport_check(prompt) {
            return Err(Error::Rejected(TRANSPORT_PII_MESSAGE.into()));
        }

        let verdict = profile.policy.evaluate(prompt);
        let mut result = if verdict.allowed {
            agent.run(prompt, &request.context, &profile.policy)
        } else {
            info!(agent = agent.name(), rule = ?verdict.rule, "Guardrail rejected prompt before dispatch");
            AgentResult::deflection(agent.name(), verdict.reason.unwrap_or_default(), started)
        };

        if let Some(limit) = profile.policy.max_response_tokens()
            && count_tokens(&result.assistant_response) > limit
        {
            debug!(agent = agent.name(), limit, "Truncating response");
            result.assistant_response = truncate_to_tokens(&result.assistant_response, limit);
        }

        Ok(result.with_routing(self.annotation(decision)))
    }

    fn annotation(&self, decision: RoutingDecision) -> RoutingAnnotation {
        RoutingAnnotation {
            intent: decision.intent,
            intent_confidence: round_to(decision.confidence, self.settings.confidence_precision),
            all_scores: decision.scores,
        }
    }

    /// Intents this orchestrator can route to, with the agent each reaches.
    pub fn intent_table(&self) -> Vec<(IntentId, AgentKind)> {
        self.router
            .catalog()
            .ids()
            .map(|id| (id.clone(), self.dispatcher.lookup(id)))
            .collect()
    }
}

fn round_to(value: f32, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (f64::from(value) * factor).round() / factor
}

/// Build a ready-to-serve orchestrator from configuration.
///
/// Constructs the embedder and store, seeds default agent records when
/// configured, embeds the catalog, and preloads every agent.
pub async fn bootstrap(config: &AppConfig) -> Result<Orchestrator, Error> {
    let catalog = config.catalog()?;
    let embedder = agentrouter_providers::build_from_config(&config.embedding)
        .map_err(|e| Error::config(format!("embedding provider: {e}")))?;
    let store = agentrouter_store::build_from_config(&config.store);

    if config.store.seed_defaults {
        agentrouter_store::seed_defaults(store.as_ref()).await?;
    }

    let router = IntentRouter::new(catalog, embedder).await?;
    let dispatcher = Dispatcher::new(
        config
            .dispatch_table()
            .into_iter()
            .map(|(intent, kind)| (IntentId::from(intent), kind)),
    );
    let settings = OrchestratorSettings {
        reload_on_request: config.routing.reload_on_request,
        confidence_precision: config.routing.confidence_precision,
    };

    let orchestrator = Orchestrator::new(Arc::new(router), dispatcher, store, settings);
    orchestrator.preload().await;
    Ok(orchestrator)
}
