//! Configuration loading, validation, and management for agentrouter.
//!
//! Loads configuration from `~/.agentrouter/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agentrouter_core::agent::AgentKind;
use agentrouter_core::intent::{self, IntentCatalog};

/// The root configuration structure.
///
/// Maps directly to `~/.agentrouter/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Routing behaviour
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Agent configuration store
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Intent catalog, in routing (tie-break) order
    #[serde(default = "default_intents")]
    pub intents: Vec<IntentConfig>,

    /// Dispatch table: intent id → agent name
    #[serde(default = "default_dispatch")]
    pub dispatch: BTreeMap<String, String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hashing" (lexical, offline), "local" (sentence-transformer, needs the
    /// `local` feature), "openai", or any OpenAI-compatible provider name
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector length for the hashing provider
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Prompt → vector cache entries (0 disables the cache)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Longer input is truncated before embedding
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

/// Model used by the "local" provider when none is configured.
pub const DEFAULT_LOCAL_MODEL: &str = "all-MiniLM-L6-v2";

fn default_embedding_provider() -> String {
    "hashing".into()
}
fn default_embedding_model() -> String {
    "fnv-hashing-v1".into()
}
fn default_dimensions() -> usize {
    512
}
fn default_cache_capacity() -> usize {
    1024
}
fn default_max_input_chars() -> usize {
    8192
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            api_url: None,
            api_key: None,
            cache_capacity: default_cache_capacity(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl EmbeddingConfig {
    /// The model the selected provider should load.
    ///
    /// The "local" provider has its own default: the hashing model label
    /// means nothing to it.
    pub fn resolved_model(&self) -> &str {
        if self.provider == "local" && self.model == default_embedding_model() {
            DEFAULT_LOCAL_MODEL
        } else {
            &self.model
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("cache_capacity", &self.cache_capacity)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Refresh the selected agent's configuration before every request
    #[serde(default = "default_true")]
    pub reload_on_request: bool,

    /// Decimal places kept in the reported `intent_confidence`
    #[serde(default = "default_confidence_precision")]
    pub confidence_precision: u32,
}

fn default_true() -> bool {
    true
}
fn default_confidence_precision() -> u32 {
    3
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            reload_on_request: true,
            confidence_precision: default_confidence_precision(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "file"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// JSON-lines file for the "file" backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Upsert the built-in agent records at startup
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

fn default_store_backend() -> String {
    "memory".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
            seed_defaults: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentConfig {
    pub id: String,
    pub description: String,
}

fn default_intents() -> Vec<IntentConfig> {
    intent::default_intents()
        .into_iter()
        .map(|(id, description)| IntentConfig {
            id: id.into(),
            description: description.into(),
        })
        .collect()
}

fn default_dispatch() -> BTreeMap<String, String> {
    AgentKind::ALL
        .into_iter()
        .map(|kind| (kind.default_intent().to_string(), kind.name().to_string()))
        .collect()
}

impl AppConfig {
    /// Load configuration from the default path (~/.agentrouter/config.toml).
    ///
    /// Environment variables override file values:
    /// - `AGENTROUTER_EMBEDDING_PROVIDER`
    /// - `AGENTROUTER_EMBEDDING_MODEL`, then `SENTENCE_TRANSFORMER_MODEL`
    ///   (the latter only when the provider is "local")
    /// - `AGENTROUTER_API_KEY`, then `OPENAI_API_KEY` (only if unset in file)
    /// - `AGENTROUTER_STORE_PATH` (switches the store to the file backend)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load `path`, apply environment overrides, and validate the result.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = var("AGENTROUTER_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        let sentence_model = if self.embedding.provider == "local" {
            var("SENTENCE_TRANSFORMER_MODEL")
        } else {
            None
        };
        if let Some(model) = var("AGENTROUTER_EMBEDDING_MODEL").or(sentence_model) {
            self.embedding.model = model;
        }

        if self.embedding.api_key.is_none() {
            self.embedding.api_key =
                var("AGENTROUTER_API_KEY").or_else(|| var("OPENAI_API_KEY"));
        }

        if let Some(path) = var("AGENTROUTER_STORE_PATH") {
            self.store.backend = "file".into();
            self.store.path = Some(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".agentrouter")
    }

    /// Path of the file store when none is configured.
    pub fn default_store_path() -> PathBuf {
        Self::config_dir().join("agent_configs.jsonl")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intents.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one intent must be configured".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for intent in &self.intents {
            if intent.id.trim().is_empty() {
                return Err(ConfigError::ValidationError("intent id must not be blank".into()));
            }
            if !seen.insert(intent.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate intent id '{}'",
                    intent.id
                )));
            }
        }

        for (intent, agent) in &self.dispatch {
            if AgentKind::from_name(agent).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "dispatch entry '{intent}' names unknown agent '{agent}'"
                )));
            }
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be > 0".into(),
            ));
        }

        if self.embedding.max_input_chars == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.max_input_chars must be > 0".into(),
            ));
        }

        if self.routing.confidence_precision > 6 {
            return Err(ConfigError::ValidationError(
                "routing.confidence_precision must be between 0 and 6".into(),
            ));
        }

        if !matches!(self.store.backend.as_str(), "memory" | "file") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}'",
                self.store.backend
            )));
        }

        Ok(())
    }

    /// Build the immutable intent catalog from the configured intents.
    pub fn catalog(&self) -> Result<IntentCatalog, agentrouter_core::Error> {
        let mut builder = IntentCatalog::builder();
        for intent in &self.intents {
            builder.register(intent.id.as_str(), intent.description.as_str())?;
        }
        builder.build()
    }

    /// The dispatch table with agent names resolved to kinds.
    ///
    /// Entries naming unknown agents are skipped; `validate` rejects them.
    pub fn dispatch_table(&self) -> Vec<(String, AgentKind)> {
        self.dispatch
            .iter()
            .filter_map(|(intent, agent)| {
                AgentKind::from_name(agent).map(|kind| (intent.clone(), kind))
            })
            .collect()
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            routing: RoutingConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            intents: default_intents(),
            dispatch: default_dispatch(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
