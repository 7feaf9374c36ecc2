use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::SimilarityConfig;
use crate::normalize::Normalizer;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("No embedder configured")]
    NoEmbedder,
    #[error("Embedding failed: {0}")]
    Failed(String),
    #[error("Embedding dimensions differ: {0} vs {1}")]
    DimensionMismatch(usize, usize),
}

/// Turns text into a vector. Implementations may be slow or network bound;
/// the engine imposes no timeout of its own.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl<F> Embedder for F
where
    F: Fn(&str) -> Result<Vec<f32>, EmbeddingError> + Send + Sync,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    pub index: usize,
    pub name: String,
    pub score: f64,
}

/// String, embedding and hybrid similarity over normalized names.
///
/// The embedding cache belongs to this instance. It sits behind a mutex so a
/// shared engine can be used from several threads.
pub struct SimilarityEngine {
    normalizer: Normalizer,
    embedder: Option<Arc<dyn Embedder>>,
    hybrid: bool,
    embedding_weight: f64,
    cache_embeddings: bool,
    cache: Mutex<HashMap<String, Arc<[f32]>>>,
}

impl SimilarityEngine {
    #[must_use]
    pub fn new(normalizer: Normalizer, config: &SimilarityConfig) -> Self {
        Self {
            normalizer,
            embedder: None,
            hybrid: config.hybrid,
            embedding_weight: config.embedding_weight.clamp(0.0, 1.0),
            cache_embeddings: config.cache_embeddings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    #[must_use]
    pub fn cached_embeddings(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    #[must_use]
    pub fn string_similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        strsim::normalized_levenshtein(a, b).clamp(0.0, 1.0)
    }

    /// Cosine similarity of the two texts' embeddings, clamped to [0, 1].
    /// Falls back to string similarity when there is no embedder or it fails.
    #[must_use]
    pub fn embedding_similarity(&self, a: &str, b: &str) -> f64 {
        self.try_embedding_similarity(a, b).unwrap_or_else(|e| {
            tracing::warn!("Embedding similarity failed, using string similarity: {}", e);
            self.string_similarity(a, b)
        })
    }

    pub fn try_embedding_similarity(&self, a: &str, b: &str) -> Result<f64, EmbeddingError> {
        let left = self.embedding(a)?;
        let right = self.embedding(b)?;
        if left.len() != right.len() {
            return Err(EmbeddingError::DimensionMismatch(left.len(), right.len()));
        }
        Ok(cosine_similarity(&left, &right).clamp(0.0, 1.0))
    }

    /// Similarity used for clustering. Falls back to string similarity when
    /// embeddings are not requested, not available, or fail.
    #[must_use]
    pub fn similarity(&self, a: &str, b: &str, use_embeddings: bool) -> f64 {
        if a == b {
            return 1.0;
        }

        let string_score = || self.string_similarity(a, b);
        let wants_embeddings = (use_embeddings || self.hybrid) && self.embedder.is_some();
        if !wants_embeddings {
            return string_score();
        }

        match self.try_embedding_similarity(a, b) {
            Ok(embedding_score) if self.hybrid => {
                self.embedding_weight * embedding_score
                    + (1.0 - self.embedding_weight) * string_score()
            }
            Ok(embedding_score) => embedding_score,
            Err(e) => {
                tracing::warn!("Embedding similarity failed, using string similarity: {}", e);
                string_score()
            }
        }
    }

    #[must_use]
    pub fn find_similar<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
        threshold: f64,
        use_embeddings: bool,
    ) -> Vec<SimilarMatch> {
        let query = self.normalizer.normalize(query);

        candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate = candidate.as_ref();
                let normalized = self.normalizer.normalize(candidate);
                let score = if normalized == query {
                    1.0
                } else {
                    self.similarity(&query, &normalized, use_embeddings)
                };
                (normalized == query || score >= threshold).then(|| SimilarMatch {
                    index,
                    name: candidate.to_string(),
                    score,
                })
            })
            .collect()
    }

    fn embedding(&self, text: &str) -> Result<Arc<[f32]>, EmbeddingError> {
        let embedder = self.embedder.as_ref().ok_or(EmbeddingError::NoEmbedder)?;

        if self.cache_embeddings {
            if let Some(hit) = self.cache.lock().get(text) {
                return Ok(Arc::clone(hit));
            }
        }

        // The embedder runs without the cache lock held.
        let vector: Arc<[f32]> = embedder.embed(text)?.into();

        if self.cache_embeddings {
            self.cache
                .lock()
                .entry(text.to_string())
                .or_insert_with(|| Arc::clone(&vector));
        }
        Ok(vector)
    }
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("has_embedder", &self.embedder.is_some())
            .field("hybrid", &self.hybrid)
            .field("embedding_weight", &self.embedding_weight)
            .field("cache_embeddings", &self.cache_embeddings)
            .finish_non_exhaustive()
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(Normalizer::default(), &SimilarityConfig::default())
    }
}

#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let cosine = dot / denominator;
    if cosine.is_nan() {
        0.0
    } else {
        cosine
    }
}
