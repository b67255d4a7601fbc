//! Local sentence-transformer embedder — runs a BERT-family encoder on your
//! own hardware.
//!
//! Uses [Candle](https://github.com/huggingface/candle) to run models such as
//! `all-MiniLM-L6-v2` with no API key. Weights and tokenizer are fetched from
//! the HuggingFace Hub on first use (and cached there), or read from a local
//! directory holding `config.json`, `tokenizer.json` and `model.safetensors`.
//!
//! Token embeddings are mean-pooled and L2-normalized, matching the
//! sentence-transformers pooling for these models.

use async_trait::async_trait;
use agentrouter_core::embedding::{Embedder, Embedding, l2_normalize};
use agentrouter_core::error::EmbeddingError;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::api::sync::Api;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

/// Hub organisation assumed for bare model names.
const DEFAULT_ORG: &str = "sentence-transformers";

/// Longest token sequence fed to the encoder.
const MAX_SEQUENCE_TOKENS: usize = 256;

/// Expand a bare model name (`all-MiniLM-L6-v2`) to its Hub repo id.
fn resolve_model_id(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{DEFAULT_ORG}/{name}")
    }
}

/// The three files a BERT checkpoint needs.
struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        }
    }

    fn from_hub(repo_id: &str) -> Result<Self, EmbeddingError> {
        let api = Api::new().map_err(|e| {
            EmbeddingError::Network(format!("Failed to initialize HuggingFace Hub API: {e}"))
        })?;
        let repo = api.model(repo_id.to_string());
        let fetch = |file: &str| {
            repo.get(file).map_err(|e| {
                EmbeddingError::Network(format!("Failed to download '{file}' from '{repo_id}': {e}"))
            })
        };
        Ok(Self {
            config: fetch("config.json")?,
            tokenizer: fetch("tokenizer.json")?,
            weights: fetch("model.safetensors")?,
        })
    }
}

/// Loaded encoder state.
struct SentenceModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl SentenceModel {
    fn load(files: &ModelFiles) -> Result<Self, EmbeddingError> {
        let device = Device::Cpu;

        let raw = std::fs::read_to_string(&files.config)
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to read model config: {e}")))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to parse model config: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to load tokenizer: {e}")))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to configure tokenizer: {e}")))?;

        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DTYPE, &device) }
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to map model weights: {e}")))?;
        let model = BertModel::load(vb, &config)
            .map_err(|e| EmbeddingError::NotConfigured(format!("Failed to load model weights: {e}")))?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Encode one text into a unit vector.
    fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Tokenization failed: {e}")))?;

        let mut vector = self
            .forward(encoding.get_ids())
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Inference failed: {e}")))?;
        if !l2_normalize(&mut vector) {
            return Err(EmbeddingError::InvalidResponse("zero-norm embedding".into()));
        }
        Ok(vector)
    }

    fn forward(&self, ids: &[u32]) -> candle_core::Result<Vec<f32>> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        mean_pool(&hidden)
    }
}

/// Average `(1, tokens, hidden)` token states into one `hidden`-long vector.
fn mean_pool(hidden: &Tensor) -> candle_core::Result<Vec<f32>> {
    hidden.mean(1)?.squeeze(0)?.to_vec1::<f32>()
}

/// Embedder backed by a local sentence-transformer checkpoint.
pub struct SentenceEmbedder {
    model_id: String,
    max_input_chars: usize,
    state: Arc<SentenceModel>,
}

impl SentenceEmbedder {
    /// Load `model` eagerly.
    ///
    /// `model` can be:
    /// - A Hub repo id: `"sentence-transformers/all-MiniLM-L6-v2"`
    /// - A bare sentence-transformers name: `"all-MiniLM-L6-v2"`
    /// - A local directory with `config.json`, `tokenizer.json` and
    ///   `model.safetensors`
    ///
    /// Blocks while downloading and mapping the weights.
    pub fn load(model: &str) -> Result<Self, EmbeddingError> {
        let dir = Path::new(model);
        let (model_id, files) = if dir.is_dir() {
            info!(path = %dir.display(), "Loading local sentence model");
            (model.to_string(), ModelFiles::in_dir(dir))
        } else {
            let repo_id = resolve_model_id(model);
            info!(repo = %repo_id, "Downloading/loading sentence model");
            let files = ModelFiles::from_hub(&repo_id)?;
            (repo_id, files)
        };

        let state = SentenceModel::load(&files)?;
        info!(model = %model_id, "Sentence model loaded");
        Ok(Self {
            model_id,
            max_input_chars: 8192,
            state: Arc::new(state),
        })
    }

    /// Truncate input longer than `max_chars` characters before tokenizing.
    pub fn with_max_input_chars(mut self, max_chars: usize) -> Self {
        self.max_input_chars = max_chars.max(1);
        self
    }
}

#[async_trait]
impl Embedder for SentenceEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let text: String = text.chars().take(self.max_input_chars).collect();
        let state = self.state.clone();

        // Candle inference is CPU-bound.
        tokio::task::spawn_blocking(move || state.encode(&text))
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Embedding task failed: {e}")))?
    }
}
