//! OpenAI-compatible embedding provider.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any endpoint
//! exposing `POST /embeddings` in the OpenAI format.
//!
//! Vectors returned by the endpoint are re-normalized on arrival so the
//! router can rely on unit length regardless of the upstream model.

use async_trait::async_trait;
use agentrouter_core::embedding::{Embedder, Embedding, l2_normalize};
use agentrouter_core::error::EmbeddingError;
use serde::Deserialize;
use tracing::debug;

/// Sent in place of empty input, which most endpoints reject.
const EMPTY_INPUT_PLACEHOLDER: &str = "(empty)";

/// An OpenAI-compatible embedding client.
pub struct OpenAiCompatEmbedder {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    max_input_chars: usize,
    client: reqwest::Client,
}

impl OpenAiCompatEmbedder {
    /// Create a new OpenAI-compatible embedder.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| EmbeddingError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_input_chars: 8192,
            client,
        })
    }

    /// Create an OpenAI embedder (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, EmbeddingError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Truncate input longer than `max_chars` characters before sending.
    pub fn with_max_input_chars(mut self, max_chars: usize) -> Self {
        self.max_input_chars = max_chars.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Apply the empty/long input rules of the embedder contract.
    fn prepare(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT_PLACEHOLDER.to_string();
        }
        text.chars().take(self.max_input_chars).collect()
    }

    async fn request(&self, inputs: Vec<String>) -> Result<Vec<Embedding>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);
        let expected = inputs.len();

        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
            "encoding_format": "float",
        });

        debug!(
            provider = %self.name,
            model = %self.model,
            count = expected,
            "Sending embedding request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout(e.to_string())
                } else {
                    EmbeddingError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(EmbeddingError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(EmbeddingError::AuthenticationFailed(
                "Invalid API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: EmbeddingApiResponse =
            response.json().await.map_err(|e| EmbeddingError::InvalidResponse(format!(
                "Failed to parse embedding response: {e}"
            )))?;

        into_unit_vectors(api_resp, expected)
    }
}

/// Order the returned vectors by `index`, check the count, and normalize.
fn into_unit_vectors(
    mut api_resp: EmbeddingApiResponse,
    expected: usize,
) -> Result<Vec<Embedding>, EmbeddingError> {
    if api_resp.data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            api_resp.data.len()
        )));
    }
    api_resp.data.sort_by_key(|d| d.index);

    let mut out = Vec::with_capacity(expected);
    let mut dimensions = None;
    for item in api_resp.data {
        let mut vector = item.embedding;
        match dimensions {
            None => dimensions = Some(vector.len()),
            Some(d) if d != vector.len() => {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: d,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
        }
        if !l2_normalize(&mut vector) {
            return Err(EmbeddingError::InvalidResponse("zero-norm embedding".into()));
        }
        out.push(vector);
    }
    Ok(out)
}

#[async_trait]
impl Embedder for OpenAiCompatEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut vectors = self.request(vec![self.prepare(text)]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding returned".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs = texts.iter().map(|t| self.prepare(t)).collect();
        self.request(inputs).await
    }
}

// --- API types ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingApiData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
