//! Agent kinds, stored agent configuration, and the request/result shapes.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

use crate::intent::{self, IntentId};

/// Answer returned in place of generation when a guardrail rejects a prompt.
pub const DEFLECTION_MESSAGE: &str =
    "I cannot process requests containing raw personal financial data. Please redact.";

/// The closed set of responder agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Short factual answers and clarifications
    GeneralQa,
    /// Step-by-step plans with milestones
    TaskPlanner,
    /// Clarifies data questions and proposes query templates
    DataQuery,
    /// Recommends integrations and the credentials they need
    Integration,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::GeneralQa,
        AgentKind::TaskPlanner,
        AgentKind::DataQuery,
        AgentKind::Integration,
    ];

    /// The name the agent's configuration is stored under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GeneralQa => "GeneralQAAgent",
            Self::TaskPlanner => "TaskPlannerAgent",
            Self::DataQuery => "DataQueryAgent",
            Self::Integration => "IntegrationAgent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// The intent this agent serves in the default dispatch table.
    pub fn default_intent(&self) -> &'static str {
        match self {
            Self::GeneralQa => intent::GENERAL_QUERY,
            Self::TaskPlanner => intent::TASK_PLANNING,
            Self::DataQuery => intent::DATA_QUERY,
            Self::Integration => intent::INTEGRATION,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for AgentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AgentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown agent '{name}'")))
    }
}

/// An agent's stored configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Lookup key
    pub agent_name: String,

    /// Free-text instructions for the agent
    #[serde(default)]
    pub instructions: String,

    /// Guardrail rules: rule name → parameters
    #[serde(default)]
    pub guardrails: serde_json::Map<String, serde_json::Value>,

    /// Any other fields in the stored document, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AgentRecord {
    pub fn new(agent_name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            instructions: instructions.into(),
            guardrails: serde_json::Map::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_guardrail(mut self, rule: impl Into<String>, value: serde_json::Value) -> Self {
        self.guardrails.insert(rule.into(), value);
        self
    }
}

/// An incoming request as seen by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub user_prompt: String,

    /// Free-form caller context; `null` is treated as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<serde_json::Map<String, serde_json::Value>, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl AgentRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            context: serde_json::Map::new(),
            user_id: None,
        }
    }
}

/// Similarity of a prompt to every catalog intent, in catalog order.
///
/// Serializes as a JSON object `{intent: score}` that keeps catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVector(Vec<(IntentId, f32)>);

impl ScoreVector {
    pub fn new(scores: Vec<(IntentId, f32)>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.0.iter().find(|(i, _)| i.as_str() == id).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntentId, f32)> {
        self.0.iter().map(|(i, s)| (i, *s))
    }

    /// Highest score; the earliest entry wins ties.
    pub fn best(&self) -> Option<(&IntentId, f32)> {
        let mut best: Option<(&IntentId, f32)> = None;
        for (id, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((id, score)),
            }
        }
        best
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, score) in &self.0 {
            map.serialize_entry(id.as_str(), score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVisitor;

        impl<'de> Visitor<'de> for ScoreVisitor {
            type Value = ScoreVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of intent id to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, score)) = access.next_entry::<String, f32>()? {
                    scores.push((IntentId::from(id), score));
                }
                Ok(ScoreVector(scores))
            }
        }

        deserializer.deserialize_map(ScoreVisitor)
    }
}

/// Routing metadata merged into a trace by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingAnnotation {
    pub intent: IntentId,
    pub intent_confidence: f64,
    pub all_scores: ScoreVector,
}

/// How a single request was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub request_id: String,
    pub agent_name: String,
    pub processing_time_ms: u64,
    pub guardrails_passed: bool,

    /// Why the guardrail gate rejected the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrail_reason: Option<String>,

    #[serde(flatten)]
    pub routing: Option<RoutingAnnotation>,
}

impl Trace {
    /// A fresh trace with a new request id; elapsed time measured from `started`.
    pub fn new(agent_name: impl Into<String>, started: Instant, guardrails_passed: bool) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            agent_name: agent_name.into(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            guardrails_passed,
            guardrail_reason: None,
            routing: None,
        }
    }
}

/// The structured answer produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub assistant_response: String,
    pub action_items: Vec<serde_json::Value>,
    pub required_connection_config: serde_json::Map<String, serde_json::Value>,
    pub trace: Trace,
}

impl AgentResult {
    /// The fixed result returned when a guardrail rejects the prompt.
    pub fn deflection(agent_name: &str, reason: impl Into<String>, started: Instant) -> Self {
        let mut trace = Trace::new(agent_name, started, false);
        trace.guardrail_reason = Some(reason.into());
        Self {
            assistant_response: DEFLECTION_MESSAGE.to_string(),
            action_items: Vec::new(),
            required_connection_config: serde_json::Map::new(),
            trace,
        }
    }

    /// Attach routing metadata, consuming the result.
    pub fn with_routing(mut self, routing: RoutingAnnotation) -> Self {
        self.trace.routing = Some(routing);
        self
    }
}
