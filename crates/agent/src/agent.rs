//! A responder agent and its cached configuration snapshot.

use agentrouter_core::agent::{AgentKind, AgentResult, Trace};
use agentrouter_core::error::Error;
use agentrouter_core::store::AgentConfigStore;
use agentrouter_guardrails::GuardrailPolicy;
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info};

use crate::variants;

/// Instructions and guardrails loaded from the store.
///
/// Immutable; a reload swaps in a whole new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub instructions: String,
    pub policy: GuardrailPolicy,
    /// False until a stored record has been found.
    pub from_store: bool,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            instructions: String::new(),
            policy: GuardrailPolicy::safe_default(),
            from_store: false,
        }
    }
}

/// Generated content before the trace is attached.
pub(crate) struct Reply {
    pub response: String,
    pub action_items: Vec<Value>,
    pub required_connection_config: Map<String, Value>,
}

impl Reply {
    pub(crate) fn new(response: impl Into<String>, action_items: Vec<Value>) -> Self {
        Self {
            response: response.into(),
            action_items,
            required_connection_config: Map::new(),
        }
    }
}

/// One responder agent.
///
/// Holds its configuration as an `Arc` snapshot behind a lock so concurrent
/// requests read a consistent policy while a reload is in flight.
pub struct Agent {
    kind: AgentKind,
    store: Arc<dyn AgentConfigStore>,
    profile: RwLock<Arc<AgentProfile>>,
}

impl Agent {
    /// Create an agent with the safe default profile. Call [`Agent::load`]
    /// to pick up stored configuration.
    pub fn new(kind: AgentKind, store: Arc<dyn AgentConfigStore>) -> Self {
        Self {
            kind,
            store,
            profile: RwLock::new(Arc::new(AgentProfile::default())),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The current snapshot.
    pub fn profile(&self) -> Arc<AgentProfile> {
        self.profile
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Fetch this agent's record and install it as the new snapshot.
    ///
    /// Idempotent. A missing record installs the safe default profile. On
    /// error the previous snapshot stays in place.
    pub async fn load(&self) -> Result<Arc<AgentProfile>, Error> {
        let record = self.store.load_agent_config(self.name()).await?;
        let policy = GuardrailPolicy::from_record(record.as_ref())?;
        let profile = Arc::new(match record {
            Some(r) => AgentProfile {
                instructions: r.instructions,
                policy,
                from_store: true,
            },
            None => AgentProfile::default(),
        });

        *self.profile.write().unwrap_or_else(|e| e.into_inner()) = profile.clone();
        debug!(
            agent = self.name(),
            from_store = profile.from_store,
            "Agent config reloaded"
        );
        Ok(profile)
    }

    /// Produce a result for `prompt`.
    ///
    /// The agent's own cached policy is checked first, then the caller's
    /// `policy`. Either one can reject; a caller's policy never loosens the
    /// cached one. A rejected prompt yields the deflection result and nothing
    /// is generated.
    pub fn run(
        &self,
        prompt: &str,
        context: &Map<String, Value>,
        policy: &GuardrailPolicy,
    ) -> AgentResult {
        let started = Instant::now();

        let cached = self.profile();
        let mut verdict = cached.policy.evaluate(prompt);
        if verdict.allowed {
            verdict = policy.evaluate(prompt);
        }
        if !verdict.allowed {
            let reason = verdict.reason.unwrap_or_default();
            info!(agent = self.name(), rule = ?verdict.rule, "Guardrail rejected prompt");
            return AgentResult::deflection(self.name(), reason, started);
        }

        let reply = match self.kind {
            AgentKind::GeneralQa => variants::general::respond(prompt, context),
            AgentKind::TaskPlanner => variants::planner::respond(prompt, context),
            AgentKind::DataQuery => variants::data_query::respond(prompt, context),
            AgentKind::Integration => variants::integration::respond(prompt, context),
        };

        AgentResult {
            assistant_response: reply.response,
            action_items: reply.action_items,
            required_connection_config: reply.required_connection_config,
            trace: Trace::new(self.name(), started, true),
        }
    }
}
