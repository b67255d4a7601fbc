//! Local feature-hashing embedder.
//!
//! Deterministic, offline, and dependency-free: text is split into lowercase
//! alphanumeric tokens, function words are dropped, a trailing plural `s` is
//! stripped, and every remaining token increments one of `dimensions` buckets
//! chosen by a seeded FNV-1a hash. The bucket counts are L2-normalized.
//!
//! Bucket values are non-negative, so similarities between two hashing
//! embeddings always fall in [0, 1].

use async_trait::async_trait;
use agentrouter_core::embedding::{Embedder, Embedding, l2_normalize};
use agentrouter_core::error::EmbeddingError;

/// Stand-in feature for input with no content words.
const EMPTY_FEATURE: &str = "<empty>";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x1000_0000_01b3;
const BUCKET_SEED: u64 = 0x9e37_79b1_85eb_ca87;

/// Function and request-filler words that carry no routing signal.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "with", "to", "of", "for", "in", "on", "at", "by",
    "from", "as", "is", "are", "was", "be", "it", "its", "this", "that", "these", "those", "i",
    "me", "my", "we", "our", "you", "your", "can", "could", "would", "should", "will", "please",
    "help", "like", "do", "does", "how", "what", "some", "any", "into", "about", "up", "so",
];

/// Feature-hashing embedder.
pub struct HashingEmbedder {
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing `dimensions`-long vectors.
    ///
    /// `dimensions` of zero is bumped to one so the output length is never 0.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions: dimensions.max(1),
            max_input_chars: 8192,
        }
    }

    /// Truncate input longer than `max_chars` characters before hashing.
    pub fn with_max_input_chars(mut self, max_chars: usize) -> Self {
        self.max_input_chars = max_chars.max(1);
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The features a text contributes, in order of appearance.
    pub fn features(&self, text: &str) -> Vec<String> {
        let truncated: String = text.chars().take(self.max_input_chars).collect();
        let features: Vec<String> = truncated
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
            .map(stem)
            .collect();

        if features.is_empty() {
            vec![EMPTY_FEATURE.to_string()]
        } else {
            features
        }
    }

    fn bucket(&self, feature: &str) -> usize {
        (fnv1a_64_with_seed(feature.as_bytes(), BUCKET_SEED) % self.dimensions as u64) as usize
    }

    /// Synchronous embedding; the async trait method delegates here.
    pub fn embed_sync(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        for feature in self.features(text) {
            vector[self.bucket(&feature)] += 1.0;
        }
        // At least one bucket is non-zero, so normalization cannot fail.
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}

/// Strip a plural `s` ("milestones" → "milestone", but not "class").
fn stem(token: &str) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

fn fnv1a_64_with_seed(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = FNV_OFFSET_BASIS ^ seed;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
