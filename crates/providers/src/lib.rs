//! Embedding provider implementations for agentrouter.

pub mod cached;
pub mod factory;
pub mod hashing;
#[cfg(feature = "local")]
pub mod local;
pub mod openai_compat;

pub use cached::{CacheStats, CachedEmbedder};
pub use factory::build_from_config;
pub use hashing::HashingEmbedder;
#[cfg(feature = "local")]
pub use local::SentenceEmbedder;
pub use openai_compat::OpenAiCompatEmbedder;
