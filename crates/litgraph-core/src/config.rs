use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Name normalization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Abbreviation -> expansion. Keys match case-insensitively, values are
    /// returned verbatim.
    pub abbreviations: BTreeMap<String, String>,
    /// Keep original casing instead of folding to lower case
    pub preserve_case: bool,
}

/// Similarity engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum similarity for two names to cluster (default: 0.8)
    pub threshold: f64,
    /// Ask the engine for embedding similarity when an embedder is present
    pub use_embeddings: bool,
    /// Blend embedding and string similarity instead of picking one
    pub hybrid: bool,
    /// Weight of the embedding score in hybrid mode
    pub embedding_weight: f64,
    /// Memoize embeddings per input text
    pub cache_embeddings: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            use_embeddings: false,
            hybrid: false,
            embedding_weight: 0.7,
            cache_embeddings: true,
        }
    }
}

/// Confidence recalculation, filtering and review settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Entities below this confidence are dropped (default: 0.3)
    pub confidence_threshold: f64,
    /// Distance from the threshold that counts as borderline (default: 0.1)
    pub review_margin: f64,
    /// Entities seen fewer times than this are flagged (default: 1)
    pub min_occurrences: u32,
    /// Per-section multiplier on the confidence boost. `None` disables
    /// section weighting entirely.
    pub section_weights: Option<HashMap<String, f64>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            review_margin: 0.1,
            min_occurrences: 1,
            section_weights: Some(default_section_weights()),
        }
    }
}

#[must_use]
pub fn default_section_weights() -> HashMap<String, f64> {
    [
        ("abstract", 1.2),
        ("conclusion", 1.2),
        ("results", 1.1),
        ("methods", 1.1),
        ("introduction", 1.0),
    ]
    .into_iter()
    .map(|(section, weight)| (section.to_string(), weight))
    .collect()
}

/// Relationship extraction settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Relationships scoring below this are dropped (default: 0.0)
    pub min_strength: f64,
}

/// Validator settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Warn on entities whose confidence is below this. Off when unset.
    pub low_confidence_warning: Option<f64>,
}

/// Construction-time configuration for every pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub normalization: NormalizationConfig,
    pub similarity: SimilarityConfig,
    pub scoring: ScoringConfig,
    pub extraction: ExtractionConfig,
    pub validation: ValidationConfig,
}

impl CoreConfig {
    pub fn from_toml_str(text: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| crate::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("similarity.threshold", self.similarity.threshold)?;
        check_unit("similarity.embedding_weight", self.similarity.embedding_weight)?;
        check_unit("scoring.confidence_threshold", self.scoring.confidence_threshold)?;
        check_unit("scoring.review_margin", self.scoring.review_margin)?;
        check_unit("extraction.min_strength", self.extraction.min_strength)?;
        if let Some(warn_below) = self.validation.low_confidence_warning {
            check_unit("validation.low_confidence_warning", warn_below)?;
        }

        if let Some(weights) = &self.scoring.section_weights {
            if let Some((section, weight)) = weights
                .iter()
                .find(|(_, w)| !w.is_finite() || **w < 0.0)
            {
                return Err(ConfigError::NegativeSectionWeight {
                    section: section.clone(),
                    weight: *weight,
                });
            }
        }

        if let Some(key) = self
            .normalization
            .abbreviations
            .iter()
            .find(|(k, v)| k.trim().is_empty() || v.trim().is_empty())
            .map(|(k, _)| k)
        {
            return Err(ConfigError::EmptyAbbreviation(key.clone()));
        }

        Ok(())
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("section weight for '{section}' must be a non-negative number, got {weight}")]
    NegativeSectionWeight { section: String, weight: f64 },
    #[error("abbreviation entry '{0}' has an empty key or expansion")]
    EmptyAbbreviation(String),
}
