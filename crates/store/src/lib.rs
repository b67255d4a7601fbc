//! Agent configuration store implementations for agentrouter.

pub mod file_backend;
pub mod in_memory;
pub mod seed;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use seed::{default_records, seed_defaults};

use std::path::PathBuf;
use std::sync::Arc;
use agentrouter_config::StoreConfig;
use agentrouter_core::store::AgentConfigStore;

/// Build the store described by `config`.
///
/// Unknown backends fall back to memory; `AppConfig::validate` rejects them
/// before this point.
pub fn build_from_config(config: &StoreConfig) -> Arc<dyn AgentConfigStore> {
    match config.backend.as_str() {
        "file" => {
            let path = config
                .path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(agentrouter_config::AppConfig::default_store_path);
            Arc::new(FileStore::new(path))
        }
        _ => Arc::new(InMemoryStore::new()),
    }
}
