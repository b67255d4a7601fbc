//! Policy model and evaluation.

use crate::rules::contains_card_like_number;
use crate::{GuardrailError, keys};
use agentrouter_core::agent::AgentRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// The outcome of checking a prompt against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub allowed: bool,
    /// Human-readable explanation, present when denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Which rule fired, present when denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl PolicyVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            rule: None,
        }
    }

    pub fn deny(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            rule: Some(rule.into()),
        }
    }
}

/// A parsed, immutable guardrail policy.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailPolicy {
    rules: Map<String, Value>,
    forbid_personal_data: bool,
    max_response_tokens: Option<usize>,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self::safe_default()
    }
}

impl GuardrailPolicy {
    /// The policy used when an agent has no stored configuration.
    pub fn safe_default() -> Self {
        Self {
            rules: Map::new(),
            forbid_personal_data: true,
            max_response_tokens: None,
        }
    }

    /// Parse a rule mapping. Missing recognized keys take their safe default.
    pub fn from_rules(rules: Map<String, Value>) -> Result<Self, GuardrailError> {
        let forbid_personal_data = match rules.get(keys::FORBID_PERSONAL_DATA) {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(GuardrailError::InvalidParameter {
                    rule: keys::FORBID_PERSONAL_DATA.into(),
                    reason: format!("expected a boolean, got {other}"),
                });
            }
        };

        let max_response_tokens = match rules.get(keys::MAX_RESPONSE_TOKENS) {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_u64() {
                Some(n) if n > 0 => Some(n as usize),
                _ => {
                    return Err(GuardrailError::InvalidParameter {
                        rule: keys::MAX_RESPONSE_TOKENS.into(),
                        reason: format!("expected a positive integer, got {v}"),
                    });
                }
            },
        };

        let unknown: Vec<&str> = rules
            .keys()
            .map(String::as_str)
            .filter(|k| *k != keys::FORBID_PERSONAL_DATA && *k != keys::MAX_RESPONSE_TOKENS)
            .collect();
        if !unknown.is_empty() {
            debug!(?unknown, "Ignoring unrecognized guardrail rules");
        }

        Ok(Self {
            rules,
            forbid_personal_data,
            max_response_tokens,
        })
    }

    /// Policy for a stored record, or the safe default when there is none.
    pub fn from_record(record: Option<&AgentRecord>) -> Result<Self, GuardrailError> {
        match record {
            Some(r) => Self::from_rules(r.guardrails.clone()),
            None => Ok(Self::safe_default()),
        }
    }

    pub fn forbid_personal_data(&self) -> bool {
        self.forbid_personal_data
    }

    pub fn max_response_tokens(&self) -> Option<usize> {
        self.max_response_tokens
    }

    /// The raw mapping, unknown keys included.
    pub fn rules(&self) -> &Map<String, Value> {
        &self.rules
    }

    /// Check `prompt` against every enabled rule. First denial wins.
    pub fn evaluate(&self, prompt: &str) -> PolicyVerdict {
        if self.forbid_personal_data && contains_card_like_number(prompt) {
            return PolicyVerdict::deny(
                keys::FORBID_PERSONAL_DATA,
                "prompt contains a 12-16 digit number resembling personal financial data",
            );
        }
        PolicyVerdict::allow()
    }

    /// Whether the coarse transport check applies under this policy.
    pub fn transport_check(&self, prompt: &str) -> bool {
        self.forbid_personal_data && crate::rules::transport_pii_suspected(prompt)
    }
}
