//! Agent configuration store — the key-value lookup by agent name.
//!
//! Storage is an external collaborator; the router only needs two calls:
//! load a record by name, and (administratively) replace one.
//!
//! Implementations: in-memory (for testing), JSON-lines file.

use async_trait::async_trait;
use crate::agent::AgentRecord;
use crate::error::StoreError;

/// The core AgentConfigStore trait.
#[async_trait]
pub trait AgentConfigStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Load the record stored under `agent_name`, if any.
    async fn load_agent_config(
        &self,
        agent_name: &str,
    ) -> std::result::Result<Option<AgentRecord>, StoreError>;

    /// Insert or fully replace the record keyed by `record.agent_name`.
    async fn upsert_agent_config(&self, record: AgentRecord) -> std::result::Result<(), StoreError>;

    /// All stored records, ordered by agent name.
    async fn list(&self) -> std::result::Result<Vec<AgentRecord>, StoreError>;
}
