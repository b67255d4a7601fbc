//! Provider factory — builds the configured embedder.
//!
//! Handles provider selection, base URL defaults, and optional caching.

use std::sync::Arc;
use agentrouter_config::EmbeddingConfig;
use agentrouter_core::embedding::Embedder;
use agentrouter_core::error::EmbeddingError;
use tracing::info;

use crate::cached::CachedEmbedder;
use crate::hashing::HashingEmbedder;
use crate::openai_compat::OpenAiCompatEmbedder;

/// Build the embedder described by `config`.
///
/// `"hashing"` selects the lexical embedder and `"local"` the
/// sentence-transformer one; any other name is treated as an
/// OpenAI-compatible endpoint. A non-zero `cache_capacity` wraps the result
/// in a [`CachedEmbedder`].
pub fn build_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let base: Arc<dyn Embedder> = match config.provider.as_str() {
        "hashing" => Arc::new(
            HashingEmbedder::new(&config.model, config.dimensions)
                .with_max_input_chars(config.max_input_chars),
        ),
        "local" => build_local(config)?,
        name => {
            let base_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| default_base_url(name));
            let api_key = config.api_key.clone().unwrap_or_default();
            Arc::new(
                OpenAiCompatEmbedder::new(name, base_url, api_key, &config.model)?
                    .with_max_input_chars(config.max_input_chars),
            )
        }
    };

    info!(
        provider = %base.name(),
        model = %base.model(),
        cache_capacity = config.cache_capacity,
        "Embedding provider configured"
    );

    if config.cache_capacity == 0 {
        return Ok(base);
    }
    Ok(Arc::new(CachedEmbedder::new(base, config.cache_capacity)))
}

#[cfg(feature = "local")]
fn build_local(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let embedder = crate::local::SentenceEmbedder::load(config.resolved_model())?
        .with_max_input_chars(config.max_input_chars);
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local"))]
fn build_local(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    Err(EmbeddingError::NotConfigured(format!(
        "provider \"local\" (model {}) requires building with the `local` feature",
        config.resolved_model()
    )))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let embedder = build_from_config(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.name(), "hashing");
        assert_eq!(embedder.model(), "fnv-hashing-v1");
    }

    #[tokio::test]
    async fn hashing_dimensions_follow_config() {
        let config = EmbeddingConfig {
            dimensions: 64,
            cache_capacity: 0,
            ..EmbeddingConfig::default()
        };
        let embedder = build_from_config(&config).unwrap();
        assert_eq!(embedder.embed("rollout plan").await.unwrap().len(), 64);
    }

    #[cfg(not(feature = "local"))]
    #[test]
    fn local_provider_needs_feature() {
        let config = EmbeddingConfig {
            provider: "local".into(),
            ..EmbeddingConfig::default()
        };
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, EmbeddingError::NotConfigured(ref m) if m.contains("all-MiniLM-L6-v2")));
    }

    #[test]
    fn remote_provider_selected_by_name() {
        let config = EmbeddingConfig {
            provider: "openai".into(),
            model: "text-embedding-3-small".into(),
            api_key: Some("sk-test".into()),
            ..EmbeddingConfig::default()
        };
        let embedder = build_from_config(&config).unwrap();
        assert_eq!(embedder.name(), "openai");
        assert_eq!(embedder.model(), "text-embedding-3-small");
    }
}
