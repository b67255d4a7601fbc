//! Caching wrapper for any embedder.
//!
//! Embeddings are pure functions of their input, so identical prompts can
//! reuse the stored vector. The cache is bounded and evicts the least
//! recently used entry. Failed lookups are never cached.

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use agentrouter_core::embedding::{Embedder, Embedding};
use agentrouter_core::error::EmbeddingError;

/// Bounded prompt → embedding cache in front of another embedder.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    entries: Mutex<LruCache<String, Embedding>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner()).len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    fn lookup(&self, text: &str) -> Option<Embedding> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(text).cloned()
    }

    fn insert(&self, text: &str, vector: &Embedding) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(text.to_string(), vector.clone());
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if let Some(hit) = self.lookup(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // The lock is not held across the await; concurrent misses for the
        // same text may both call the inner embedder, which is harmless.
        let vector = self.inner.embed(text).await?;
        self.insert(text, &vector);
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Embedder for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn model(&self) -> &str {
            "counting-v1"
        }
        async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EmbeddingError::Network("down".into()));
            }
            Ok(vec![text.len() as f32])
        }
    }

    fn counting(fail: bool) -> Arc<Counting> {
        Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn repeated_text_hits_cache() {
        let inner = counting(false);
        let cache = CachedEmbedder::new(inner.clone(), 8);
        cache.embed("plan").await.unwrap();
        cache.embed("plan").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let inner = counting(false);
        let cache = CachedEmbedder::new(inner.clone(), 2);
        cache.embed("a").await.unwrap();
        cache.embed("bb").await.unwrap();
        cache.embed("ccc").await.unwrap();
        assert_eq!(cache.stats().entries, 2);

        cache.embed("a").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn recently_used_entries_survive_eviction() {
        let inner = counting(false);
        let cache = CachedEmbedder::new(inner.clone(), 2);
        cache.embed("a").await.unwrap();
        cache.embed("bb").await.unwrap();
        cache.embed("a").await.unwrap();
        cache.embed("ccc").await.unwrap();

        cache.embed("a").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
        cache.embed("bb").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn zero_capacity_holds_one_entry() {
        let cache = CachedEmbedder::new(counting(false), 0);
        cache.embed("a").await.unwrap();
        cache.embed("bb").await.unwrap();
        assert_eq!(cache.stats().entries, 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let inner = counting(true);
        let cache = CachedEmbedder::new(inner.clone(), 8);
        assert!(cache.embed("x").await.is_err());
        assert!(cache.embed("x").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn delegates_identity() {
        let cache = CachedEmbedder::new(counting(false), 1);
        assert_eq!(cache.name(), "counting");
        assert_eq!(cache.model(), "counting-v1");
    }
}
