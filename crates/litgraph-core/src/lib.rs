pub mod confidence;
pub mod config;
pub mod entity;
pub mod error;
pub mod extract;
pub mod graph;
pub mod linking;
pub mod normalize;
pub mod pipeline;
pub mod relationship;
pub mod similarity;
pub mod validate;

pub use confidence::ConfidenceScorer;
pub use config::{
    CoreConfig, ConfigError, ExtractionConfig, NormalizationConfig, ScoringConfig,
    SimilarityConfig, ValidationConfig,
};
pub use entity::{EntityMention, EntitySnapshot};
pub use error::{Error, Result};
pub use extract::{
    deduplicate_relationships, ExtractionPolicy, PatternPolicy, PolicyKind, RelationCandidate,
    RelationPattern, RelationshipExtractor,
};
pub use graph::KnowledgeGraph;
pub use linking::{select_canonical, CanonicalGroup, EntityLinker, LinkingOutput};
pub use normalize::Normalizer;
pub use pipeline::{Pipeline, PipelineOutput, PipelineStats};
pub use relationship::{infer_bidirectional, Relationship, RelationshipType};
pub use similarity::{cosine_similarity, Embedder, EmbeddingError, SimilarMatch, SimilarityEngine};
pub use validate::{EntityValidator, RelationshipValidator, ValidationResult, Validator};
