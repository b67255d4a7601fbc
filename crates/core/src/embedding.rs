//! Embedder trait — the abstraction over text embedding backends.
//!
//! An Embedder maps text to a fixed-length, L2-normalized vector so that
//! cosine similarity reduces to a dot product.
//!
//! Contract every implementation must satisfy:
//! - output length is constant for a given instance,
//! - output is unit-normalized,
//! - identical input yields identical output (no hidden randomness),
//! - empty or very long input degrades gracefully instead of erroring.
//!
//! Implementations: local feature hashing, OpenAI-compatible endpoints, and a
//! caching wrapper.

use async_trait::async_trait;
use crate::error::EmbeddingError;

/// A unit-normalized embedding vector.
pub type Embedding = Vec<f32>;

/// The core Embedder trait.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable provider name (e.g., "hashing", "openai").
    fn name(&self) -> &str;

    /// The model identifier. Vectors from different models are not comparable.
    fn model(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingError>;

    /// Embed several texts, preserving order.
    ///
    /// Default implementation calls `embed()` sequentially.
    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Embedding>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Dot product of two equal-length vectors, accumulated in f64.
///
/// Returns 0.0 for mismatched or empty inputs; callers that must not mix
/// vector spaces check lengths before calling.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    sum as f32
}

/// Scale a vector to unit length in place.
///
/// Returns `false` (leaving the vector untouched) when its norm is zero.
pub fn l2_normalize(v: &mut [f32]) -> bool {
    let norm = v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt();
    if norm < 1e-12 {
        return false;
    }
    for x in v.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_of_unit_vectors_is_cosine() {
        let mut a = vec![1.0, 1.0];
        let mut b = vec![1.0, 0.0];
        assert!(l2_normalize(&mut a));
        assert!(l2_normalize(&mut b));
        assert!((dot(&a, &b) - 0.7071).abs() < 0.001);
    }

    #[test]
    fn dot_mismatched_lengths() {
        assert_eq!(dot(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(dot(&[], &[]), 0.0);
    }

    #[test]
    fn normalize_zero_vector_is_rejected() {
        let mut v = vec![0.0, 0.0, 0.0];
        assert!(!l2_normalize(&mut v));
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn normalized_vector_has_unit_norm() {
        let mut v = vec![3.0, 4.0];
        assert!(l2_normalize(&mut v));
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
    }

    struct Fixed;

    #[async_trait]
    impl Embedder for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn model(&self) -> &str {
            "fixed-v1"
        }
        async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let texts = vec!["a".to_string(), "abc".to_string()];
        let out = Fixed.embed_batch(&texts).await.unwrap();
        assert_eq!(out[0][0], 1.0);
        assert_eq!(out[1][0], 3.0);
    }
}
