//! Responder agents and the request pipeline.
//!
//! A request flows through four stages:
//!
//! 1. **Route** the prompt to an intent ([`agentrouter_router::IntentRouter`])
//! 2. **Dispatch** the intent to an agent ([`Dispatcher`])
//! 3. **Gate** the prompt against the agent's guardrail policy
//! 4. **Run** the agent and annotate its trace with the routing decision
//!
//! A guardrail rejection at stage 3 is terminal: the agent never runs and
//! the caller gets a deflection result with `guardrails_passed = false`.

pub mod agent;
pub mod dispatcher;
pub mod orchestrator;
pub mod token;
mod variants;

pub use agent::{Agent, AgentProfile};
pub use dispatcher::Dispatcher;
pub use orchestrator::{Orchestrator, OrchestratorSettings, TRANSPORT_PII_MESSAGE, bootstrap};
