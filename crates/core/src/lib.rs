//! # agentrouter core
//!
//! Domain types, traits, and error definitions for the agentrouter intent
//! router. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (embedding provider, configuration store) is a
//! trait here. Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod embedding;
pub mod intent;
pub mod agent;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{EmbeddingError, Error, Result, StoreError};
pub use embedding::{Embedder, Embedding, dot, l2_normalize};
pub use intent::{CatalogBuilder, Intent, IntentCatalog, IntentId};
pub use agent::{
    AgentKind, AgentRecord, AgentRequest, AgentResult, DEFLECTION_MESSAGE, RoutingAnnotation,
    ScoreVector, Trace,
};
pub use store::AgentConfigStore;
