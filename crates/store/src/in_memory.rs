//! In-memory store — useful for testing and ephemeral deployments.

use async_trait::async_trait;
use agentrouter_core::agent::AgentRecord;
use agentrouter_core::error::StoreError;
use agentrouter_core::store::AgentConfigStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps agent records in a map keyed by agent name.
pub struct InMemoryStore {
    records: Arc<RwLock<BTreeMap<String, AgentRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// A store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = AgentRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.agent_name.clone(), r))
            .collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentConfigStore for InMemoryStore {
    fn name(&self) -> &str { "memory" }

    async fn load_agent_config(&self, agent_name: &str) -> Result<Option<AgentRecord>, StoreError> {
        Ok(self.records.read().await.get(agent_name).cloned())
    }

    async fn upsert_agent_config(&self, record: AgentRecord) -> Result<(), StoreError> {
        if record.agent_name.trim().is_empty() {
            return Err(StoreError::InvalidRecord("agent_name must not be blank".into()));
        }
        self.records
            .write()
            .await
            .insert(record.agent_name.clone(), record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AgentRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_record_is_none() {
        let store = InMemoryStore::new();
        assert!(store.load_agent_config("GeneralQAAgent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_whole_record() {
        let store = InMemoryStore::new();
        store
            .upsert_agent_config(
                AgentRecord::new("DataQueryAgent", "v1")
                    .with_guardrail("max_response_tokens", json!(400)),
            )
            .await
            .unwrap();
        store
            .upsert_agent_config(AgentRecord::new("DataQueryAgent", "v2"))
            .await
            .unwrap();

        let record = store.load_agent_config("DataQueryAgent").await.unwrap().unwrap();
        assert_eq!(record.instructions, "v2");
        assert!(record.guardrails.is_empty());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_name_rejected() {
        let store = InMemoryStore::new();
        assert!(store.upsert_agent_config(AgentRecord::new(" ", "x")).await.is_err());
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = InMemoryStore::with_records([
            AgentRecord::new("TaskPlannerAgent", ""),
            AgentRecord::new("DataQueryAgent", ""),
        ]);
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.agent_name)
            .collect();
        assert_eq!(names, vec!["DataQueryAgent", "TaskPlannerAgent"]);
    }
}
