//! File-based store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `AgentRecord`. Records are loaded into memory
//! on creation and the whole file is rewritten on every upsert.
//!
//! Storage location: `~/.agentrouter/agent_configs.jsonl` by default.

use async_trait::async_trait;
use agentrouter_core::agent::AgentRecord;
use agentrouter_core::error::StoreError;
use agentrouter_core::store::AgentConfigStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed agent configuration store using JSONL.
///
/// Reads are served from memory; writes are durable before they return.
pub struct FileStore {
    path: PathBuf,
    records: Arc<RwLock<BTreeMap<String, AgentRecord>>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// If the file exists, records are loaded from it. If it does not, the
    /// store starts empty and the file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "File config store loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load records from a JSONL file; later lines win for duplicate names.
    fn load_from_disk(path: &Path) -> BTreeMap<String, AgentRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<AgentRecord>(line) {
                Ok(record) => Some((record.agent_name.clone(), record)),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted agent config line");
                    None
                }
            })
            .collect()
    }

    /// Rewrite the file from `records` via a temp file and rename.
    async fn flush(&self, records: &BTreeMap<String, AgentRecord>) -> Result<(), StoreError> {
        let mut content = String::new();
        for record in records.values() {
            let line = serde_json::to_string(record).map_err(|e| {
                StoreError::Storage(format!("Failed to serialize agent config: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write store file: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to replace store file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl AgentConfigStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load_agent_config(&self, agent_name: &str) -> Result<Option<AgentRecord>, StoreError> {
        Ok(self.records.read().await.get(agent_name).cloned())
    }

    async fn upsert_agent_config(&self, record: AgentRecord) -> Result<(), StoreError> {
        if record.agent_name.trim().is_empty() {
            return Err(StoreError::InvalidRecord("agent_name must not be blank".into()));
        }
        // Hold the write lock through the flush so concurrent upserts serialize.
        let mut records = self.records.write().await;
        let previous = records.insert(record.agent_name.clone(), record.clone());
        if let Err(e) = self.flush(&records).await {
            match previous {
                Some(old) => records.insert(old.agent_name.clone(), old),
                None => records.remove(&record.agent_name),
            };
            return Err(e);
        }
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
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.jsonl");

        let store = FileStore::new(path.clone());
        store
            .upsert_agent_config(
                AgentRecord::new("IntegrationAgent", "Suggest integrations")
                    .with_guardrail("forbid_personal_data", json!(true)),
            )
            .await
            .unwrap();

        let reopened = FileStore::new(path);
        let record = reopened
            .load_agent_config("IntegrationAgent")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.instructions, "Suggest integrations");
        assert_eq!(record.guardrails["forbid_personal_data"], json!(true));
    }

    #[tokio::test]
    async fn upsert_is_idempotent_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.jsonl");
        let store = FileStore::new(path.clone());

        let record = AgentRecord::new("GeneralQAAgent", "Be concise.");
        store.upsert_agent_config(record.clone()).await.unwrap();
        store.upsert_agent_config(record).await.unwrap();

        let lines = std::fs::read_to_string(&path).unwrap();
        assert_eq!(lines.lines().count(), 1);
    }

    #[tokio::test]
    async fn corrupted_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.jsonl");
        std::fs::write(
            &path,
            "{\"agent_name\":\"DataQueryAgent\",\"instructions\":\"ok\"}\nnot json\n\n",
        )
        .unwrap();

        let store = FileStore::new(path);
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(store.load_agent_config("DataQueryAgent").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_upserts_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.jsonl");
        let store = Arc::new(FileStore::new(path.clone()));

        let writes = ["GeneralQAAgent", "TaskPlannerAgent", "DataQueryAgent", "IntegrationAgent"]
            .into_iter()
            .map(|name| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.upsert_agent_config(AgentRecord::new(name, "x")).await
                })
            })
            .collect::<Vec<_>>();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        assert_eq!(FileStore::new(path.clone()).list().await.unwrap().len(), 4);
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn failed_flush_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so the rename fails.
        let path = dir.path().join("configs.jsonl");
        std::fs::create_dir(&path).unwrap();
        let store = FileStore::new(path);

        let err = store
            .upsert_agent_config(AgentRecord::new("GeneralQAAgent", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.load_agent_config("GeneralQAAgent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("configs.jsonl"));
        assert!(store.list().await.unwrap().is_empty());

        store
            .upsert_agent_config(AgentRecord::new("TaskPlannerAgent", ""))
            .await
            .unwrap();
        assert!(store.path().exists());
    }
}
