//! Intent → agent dispatch table.

use agentrouter_core::agent::AgentKind;
use agentrouter_core::intent::{IntentCatalog, IntentId};
use std::collections::HashMap;
use tracing::warn;

/// Maps intents to agent kinds, with a fallback for unmapped intents.
///
/// The dispatcher never looks at prompt content.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: HashMap<IntentId, AgentKind>,
    fallback: AgentKind,
}

impl Default for Dispatcher {
    /// Each agent serves its own intent; unmapped intents go to general QA.
    fn default() -> Self {
        Self::new(
            AgentKind::ALL
                .into_iter()
                .map(|kind| (IntentId::from(kind.default_intent()), kind)),
        )
    }
}

impl Dispatcher {
    pub fn new(table: impl IntoIterator<Item = (IntentId, AgentKind)>) -> Self {
        Self {
            table: table.into_iter().collect(),
            fallback: AgentKind::GeneralQa,
        }
    }

    pub fn with_fallback(mut self, fallback: AgentKind) -> Self {
        self.fallback = fallback;
        self
    }

    /// Log table entries that do not line up with `catalog`.
    ///
    /// Both directions are recoverable: unknown keys are never hit, and
    /// unmapped intents fall back at dispatch time.
    pub fn check_against(&self, catalog: &IntentCatalog) {
        for intent in self.table.keys() {
            if !catalog.contains(intent.as_str()) {
                warn!(intent = %intent, "Dispatch entry names an intent missing from the catalog");
            }
        }
        for intent in catalog.ids() {
            if !self.table.contains_key(intent) {
                warn!(
                    intent = %intent,
                    fallback = self.fallback.name(),
                    "Catalog intent has no dispatch entry"
                );
            }
        }
    }

    /// The agent for `intent`, or the fallback when it is unmapped.
    pub fn dispatch(&self, intent: &IntentId) -> AgentKind {
        match self.table.get(intent) {
            Some(kind) => *kind,
            None => {
                warn!(
                    intent = %intent,
                    fallback = self.fallback.name(),
                    "No agent mapped for intent, using fallback"
                );
                self.fallback
            }
        }
    }

    /// Like [`Dispatcher::dispatch`] but without the fallback warning.
    pub fn lookup(&self, intent: &IntentId) -> AgentKind {
        self.table.get(intent).copied().unwrap_or(self.fallback)
    }

    /// Whether `intent` has its own table entry.
    pub fn is_mapped(&self, intent: &IntentId) -> bool {
        self.table.contains_key(intent)
    }

    pub fn fallback(&self) -> AgentKind {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
