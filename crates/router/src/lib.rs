//! Intent router — nearest-reference classification over embeddings.
//!
//! Every catalog intent gets a reference embedding at construction time. A
//! prompt is embedded with the same provider and scored against each
//! reference by dot product (cosine similarity for unit vectors); the best
//! score wins, with ties going to the earliest-registered intent.
//!
//! The router always answers with a catalog member. Confidence thresholds, if
//! any, are the caller's business.

use agentrouter_core::embedding::{Embedder, Embedding, dot};
use agentrouter_core::error::{EmbeddingError, Error};
use agentrouter_core::intent::{IntentCatalog, IntentId};
use agentrouter_core::agent::ScoreVector;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// The outcome of routing one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub intent: IntentId,
    /// Score of the chosen intent.
    pub confidence: f32,
    /// Every intent's score, in catalog order.
    pub scores: ScoreVector,
}

/// Immutable after construction; share it behind an `Arc`.
pub struct IntentRouter {
    catalog: IntentCatalog,
    embedder: Arc<dyn Embedder>,
    references: Vec<Embedding>,
    dimensions: usize,
}

impl std::fmt::Debug for IntentRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRouter")
            .field("intents", &self.catalog.len())
            .field("provider", &self.embedder.name())
            .field("model", &self.embedder.model())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl IntentRouter {
    /// Embed every catalog description and build the router.
    ///
    /// Any provider failure here is a fatal configuration error: the service
    /// must not start without its reference set.
    pub async fn new(catalog: IntentCatalog, embedder: Arc<dyn Embedder>) -> Result<Self, Error> {
        if catalog.is_empty() {
            return Err(Error::config("intent catalog is empty"));
        }

        let descriptions: Vec<String> =
            catalog.all().iter().map(|i| i.description.clone()).collect();
        let references = embedder.embed_batch(&descriptions).await.map_err(|e| {
            Error::config(format!("embedding provider unavailable at startup: {e}"))
        })?;

        if references.len() != catalog.len() {
            return Err(Error::config(format!(
                "embedding provider returned {} reference vectors for {} intents",
                references.len(),
                catalog.len()
            )));
        }

        let dimensions = references[0].len();
        if dimensions == 0 {
            return Err(Error::config("embedding provider returned empty vectors"));
        }
        if let Some(bad) = references.iter().find(|r| r.len() != dimensions) {
            return Err(Error::config(format!(
                "reference embeddings disagree on dimensions: {dimensions} vs {}",
                bad.len()
            )));
        }

        info!(
            intents = catalog.len(),
            provider = embedder.name(),
            model = embedder.model(),
            dimensions,
            "Intent router initialized"
        );

        Ok(Self {
            catalog,
            embedder,
            references,
            dimensions,
        })
    }

    /// Classify `prompt` against the catalog.
    pub async fn route(&self, prompt: &str) -> Result<RoutingDecision, Error> {
        let query = self.embedder.embed(prompt).await?;
        if query.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            }
            .into());
        }

        let scores = ScoreVector::new(
            self.catalog
                .ids()
                .zip(&self.references)
                .map(|(id, reference)| (id.clone(), dot(&query, reference).clamp(-1.0, 1.0)))
                .collect(),
        );

        let (intent, confidence) = scores
            .best()
            .map(|(id, score)| (id.clone(), score))
            .ok_or_else(|| Error::Internal("score vector is empty".into()))?;

        debug!(intent = %intent, confidence, "Prompt routed");

        Ok(RoutingDecision {
            intent,
            confidence,
            scores,
        })
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    /// Name of the embedding provider and model, e.g. `hashing/fnv-hashing-v1`.
    pub fn model(&self) -> String {
        format!("{}/{}", self.embedder.name(), self.embedder.model())
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentrouter_core::intent::{DATA_QUERY, GENERAL_QUERY, INTEGRATION, TASK_PLANNING};
    use agentrouter_providers::HashingEmbedder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn default_router() -> IntentRouter {
        IntentRouter::new(
            IntentCatalog::default_catalog(),
            Arc::new(HashingEmbedder::new("fnv-hashing-v1", 512)),
        )
        .await
        .unwrap()
    }

    /// Maps text to a fixed vector by exact match, otherwise a fallback.
    struct Scripted {
        table: Vec<(&'static str, Embedding)>,
        fallback: Embedding,
        fail_queries: AtomicBool,
    }

    #[async_trait]
    impl Embedder for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "v1"
        }
        async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            if self.fail_queries.load(Ordering::SeqCst) {
                return Err(EmbeddingError::Network("connection reset".into()));
            }
            Ok(self
                .table
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| self.fallback.clone()))
        }
    }

    fn catalog(entries: &[(&str, &str)]) -> IntentCatalog {
        let mut builder = IntentCatalog::builder();
        for (id, desc) in entries {
            builder.register(*id, *desc).unwrap();
        }
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn routes_scenario_prompts() {
        let router = default_router().await;
        let cases = [
            ("Can you help me plan a two week rollout with milestones?", TASK_PLANNING),
            ("Connect our Slack and Jira with a webhook", INTEGRATION),
            ("Show analytics from the data warehouse", DATA_QUERY),
            ("Answer my questions about taxes", GENERAL_QUERY),
        ];
        for (prompt, expected) in cases {
            let decision = router.route(prompt).await.unwrap();
            assert_eq!(decision.intent.as_str(), expected, "prompt: {prompt}");
            assert!(decision.confidence > 0.0);
        }
    }

    #[tokio::test]
    async fn deterministic_and_well_formed() {
        let router = default_router().await;
        let prompt = "Set up a Jira integration for the analytics team";
        let first = router.route(prompt).await.unwrap();
        let second = router.route(prompt).await.unwrap();
        assert_eq!(first, second);

        assert_eq!(first.scores.len(), router.catalog().len());
        assert!(router.catalog().contains(first.intent.as_str()));
        for (_, score) in first.scores.iter() {
            assert!((-1.0..=1.0).contains(&score));
        }
        assert_eq!(first.scores.get(first.intent.as_str()), Some(first.confidence));
    }

    #[tokio::test]
    async fn no_overlap_falls_to_first_intent() {
        let router = default_router().await;
        let decision = router.route("What is the capital of France?").await.unwrap();
        assert_eq!(decision.intent.as_str(), GENERAL_QUERY);
        assert_eq!(decision.confidence, 0.0);
    }

    #[tokio::test]
    async fn identical_descriptions_tie_to_earliest() {
        let router = IntentRouter::new(
            catalog(&[("first", "same words here"), ("second", "same words here")]),
            Arc::new(HashingEmbedder::new("m", 64)),
        )
        .await
        .unwrap();
        let decision = router.route("same words").await.unwrap();
        assert_eq!(decision.intent.as_str(), "first");
        assert_eq!(decision.scores.get("first"), decision.scores.get("second"));
    }

    #[tokio::test]
    async fn negative_scores_still_pick_a_member() {
        let embedder = Scripted {
            table: vec![("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])],
            fallback: vec![-0.6, -0.8],
            fail_queries: AtomicBool::new(false),
        };
        let router = IntentRouter::new(catalog(&[("x", "a"), ("y", "b")]), Arc::new(embedder))
            .await
            .unwrap();
        let decision = router.route("anything").await.unwrap();
        assert_eq!(decision.intent.as_str(), "x");
        assert!(decision.confidence < 0.0);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let embedder = Arc::new(Scripted {
            table: vec![],
            fallback: vec![1.0],
            fail_queries: AtomicBool::new(false),
        });
        let router = IntentRouter::new(catalog(&[("x", "a")]), embedder.clone())
            .await
            .unwrap();
        embedder.fail_queries.store(true, Ordering::SeqCst);
        let err = router.route("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(EmbeddingError::Network(_))));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn startup_failure_is_config_error() {
        let embedder = Scripted {
            table: vec![],
            fallback: vec![1.0],
            fail_queries: AtomicBool::new(true),
        };
        let err = IntentRouter::new(catalog(&[("x", "a")]), Arc::new(embedder))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let embedder = Scripted {
            table: vec![("a", vec![1.0, 0.0])],
            fallback: vec![1.0, 0.0, 0.0],
            fail_queries: AtomicBool::new(false),
        };
        let router = IntentRouter::new(catalog(&[("x", "a")]), Arc::new(embedder))
            .await
            .unwrap();
        let err = router.route("query").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Embedding(EmbeddingError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
