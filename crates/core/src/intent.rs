//! Intent catalog — the closed set of request categories the router knows.
//!
//! The catalog is assembled once at startup through [`CatalogBuilder`] and is
//! immutable afterwards. Declaration order matters: it is the tie-break order
//! for routing.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::Error;

/// Identifier of a general question-answering request.
pub const GENERAL_QUERY: &str = "general_query";
/// Identifier of a planning / roadmap request.
pub const TASK_PLANNING: &str = "task_planning";
/// Identifier of a database / analytics request.
pub const DATA_QUERY: &str = "data_query";
/// Identifier of a third-party integration request.
pub const INTEGRATION: &str = "integration";

/// Unique identifier of an intent (e.g. `task_planning`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(String);

impl IntentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for IntentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IntentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for IntentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An intent and the canonical description used to embed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub description: String,
}

/// Immutable, ordered set of intents.
#[derive(Debug, Clone, Serialize)]
pub struct IntentCatalog {
    intents: Vec<Intent>,
}

impl IntentCatalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The four-intent catalog the service ships with.
    pub fn default_catalog() -> Self {
        Self {
            intents: default_intents()
                .into_iter()
                .map(|(id, description)| Intent {
                    id: id.into(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    /// All intents in declaration order.
    pub fn all(&self) -> &[Intent] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Always false for a built catalog; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &IntentId> {
        self.intents.iter().map(|i| &i.id)
    }
}

/// Startup-only registration of intents.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    intents: Vec<Intent>,
}

impl CatalogBuilder {
    /// Register an intent. Identifiers must be unique and non-blank.
    pub fn register(
        &mut self,
        id: impl Into<IntentId>,
        description: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        let id = id.into();
        if id.as_str().trim().is_empty() {
            return Err(Error::config("intent id must not be blank"));
        }
        if self.intents.iter().any(|i| i.id == id) {
            return Err(Error::config(format!("duplicate intent id '{id}'")));
        }
        self.intents.push(Intent {
            id,
            description: description.into(),
        });
        Ok(self)
    }

    /// Finish the catalog. An empty catalog is a fatal configuration error.
    pub fn build(self) -> Result<IntentCatalog, Error> {
        if self.intents.is_empty() {
            return Err(Error::config("intent catalog must contain at least one intent"));
        }
        Ok(IntentCatalog {
            intents: self.intents,
        })
    }
}

/// `(id, description)` pairs of the default catalog, in routing order.
pub fn default_intents() -> [(&'static str, &'static str); 4] {
    [
        (
            GENERAL_QUERY,
            "Answer factual questions, clarifications and explanations",
        ),
        (
            TASK_PLANNING,
            "Create step-by-step plans, roadmaps and milestones",
        ),
        (
            DATA_QUERY,
            "Help with databases, SQL, analytics and data queries",
        ),
        (
            INTEGRATION,
            "Integrate services like Jira, Slack, Gmail and webhooks",
        ),
    ]
}
