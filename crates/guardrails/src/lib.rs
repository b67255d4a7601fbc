//! Guardrail policies — per-agent rules checked before any generation runs.
//!
//! A policy is an open mapping of rule name → parameters, stored alongside
//! each agent's instructions. Recognized rules are parsed and validated;
//! unknown keys are preserved untouched so newer rule sets round-trip through
//! older deployments.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────┐
//! │ AgentRecord  │───▶│ Guardrail    │───▶│ PolicyVerdict │
//! │ .guardrails  │    │ Policy       │    │ allow / deny  │
//! └──────────────┘    └──────────────┘    └───────────────┘
//! ```
//!
//! Absence of a stored record yields [`GuardrailPolicy::safe_default`], which
//! has every protective rule enabled. There is no allow-all fallback.

mod policy;
mod rules;

pub use policy::{GuardrailPolicy, PolicyVerdict};
pub use rules::{contains_card_like_number, transport_pii_suspected};

/// Rule keys understood by this crate.
pub mod keys {
    pub const FORBID_PERSONAL_DATA: &str = "forbid_personal_data";
    pub const MAX_RESPONSE_TOKENS: &str = "max_response_tokens";
}

/// Errors from parsing guardrail parameters.
#[derive(Debug, thiserror::Error)]
pub enum GuardrailError {
    #[error("invalid value for guardrail '{rule}': {reason}")]
    InvalidParameter { rule: String, reason: String },
}

impl From<GuardrailError> for agentrouter_core::Error {
    fn from(e: GuardrailError) -> Self {
        agentrouter_core::Error::config(e.to_string())
    }
}
