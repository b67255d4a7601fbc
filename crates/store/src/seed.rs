//! Built-in agent records used to seed an empty store.

use agentrouter_core::agent::{AgentKind, AgentRecord};
use agentrouter_core::error::StoreError;
use agentrouter_core::store::AgentConfigStore;
use serde_json::json;
use tracing::info;

/// One record per agent kind, with personal-data filtering on.
pub fn default_records() -> Vec<AgentRecord> {
    AgentKind::ALL
        .into_iter()
        .map(|kind| {
            let (instructions, max_tokens) = match kind {
                AgentKind::GeneralQa => ("Answer general user questions, be concise.", 400),
                AgentKind::TaskPlanner => ("Produce step-by-step plans and milestones.", 600),
                AgentKind::DataQuery => {
                    ("Propose DB query templates and clarify dataset schema.", 400)
                }
                AgentKind::Integration => {
                    ("Suggest integrations and required config fields.", 400)
                }
            };
            AgentRecord::new(kind.name(), instructions)
                .with_guardrail("forbid_personal_data", json!(true))
                .with_guardrail("max_response_tokens", json!(max_tokens))
        })
        .collect()
}

/// Upsert every default record into `store`. Returns how many were written.
pub async fn seed_defaults(store: &dyn AgentConfigStore) -> Result<usize, StoreError> {
    let records = default_records();
    let count = records.len();
    for record in records {
        store.upsert_agent_config(record).await?;
    }
    info!(store = store.name(), count, "Seeded agent configs");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    #[test]
    fn one_record_per_agent() {
        let records = default_records();
        assert_eq!(records.len(), AgentKind::ALL.len());
        let planner = records
            .iter()
            .find(|r| r.agent_name == "TaskPlannerAgent")
            .unwrap();
        assert_eq!(planner.guardrails["max_response_tokens"], json!(600));
        assert!(records.iter().all(|r| r.guardrails["forbid_personal_data"] == json!(true)));
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let store = InMemoryStore::new();
        seed_defaults(&store).await.unwrap();
        seed_defaults(&store).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 4);
    }
}
