use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::confidence::ConfidenceScorer;
use crate::config::CoreConfig;
use crate::entity::EntityMention;
use crate::extract::{ExtractionPolicy, PatternPolicy, RelationshipExtractor};
use crate::graph::KnowledgeGraph;
use crate::linking::{EntityLinker, LinkingOutput};
use crate::normalize::Normalizer;
use crate::relationship::Relationship;
use crate::similarity::{Embedder, SimilarityEngine};
use crate::validate::{EntityValidator, RelationshipValidator, ValidationResult, Validator};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub input_mentions: usize,
    pub merged_groups: usize,
    pub kept_entities: usize,
    pub dropped_entities: usize,
    pub flagged_entities: usize,
    pub relationships: usize,
    pub isolated_entities: usize,
    pub invalid_entities: usize,
    pub invalid_relationships: usize,
    pub duration_ms: u64,
}

impl PipelineStats {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.invalid_entities > 0 || self.invalid_relationships > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub linking: LinkingOutput,
    pub entities: Vec<EntityMention>,
    pub relationships: Vec<Relationship>,
    pub entity_reports: Vec<ValidationResult>,
    pub relationship_reports: Vec<ValidationResult>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    #[must_use]
    pub fn graph(&self) -> KnowledgeGraph {
        KnowledgeGraph::build(&self.entities, &self.relationships)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &EntityMention> {
        self.entities.iter().filter(|e| e.needs_review == Some(true))
    }
}

pub struct Pipeline {
    config: CoreConfig,
    linker: EntityLinker,
    scorer: ConfidenceScorer,
    extractor: RelationshipExtractor,
    entity_validator: EntityValidator,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        let linker = Self::build_linker(&config, None);
        let mut entity_validator = EntityValidator::new();
        if let Some(threshold) = config.validation.low_confidence_warning {
            entity_validator = entity_validator.with_low_confidence_warning(threshold);
        }

        Self {
            linker,
            scorer: ConfidenceScorer::new(config.scoring.clone()),
            extractor: RelationshipExtractor::new(Box::new(PatternPolicy::default()))
                .with_min_strength(config.extraction.min_strength),
            entity_validator,
            config,
        }
    }

    fn build_linker(config: &CoreConfig, embedder: Option<Arc<dyn Embedder>>) -> EntityLinker {
        let normalizer = Normalizer::new(&config.normalization);
        let mut engine = SimilarityEngine::new(normalizer, &config.similarity);
        if let Some(embedder) = embedder {
            engine = engine.with_embedder(embedder);
        }
        EntityLinker::new(engine, config.similarity.threshold)
            .with_embeddings(config.similarity.use_embeddings)
    }

    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.linker = Self::build_linker(&self.config, Some(embedder));
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn ExtractionPolicy>) -> Self {
        self.extractor =
            RelationshipExtractor::new(policy).with_min_strength(self.config.extraction.min_strength);
        self
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    #[must_use]
    pub fn linker(&self) -> &EntityLinker {
        &self.linker
    }

    #[must_use]
    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    #[must_use]
    pub fn extractor(&self) -> &RelationshipExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn run(&self, mentions: &[EntityMention]) -> PipelineOutput {
        let start = Instant::now();

        let linking = self.linker.link_entities(mentions);
        let merged_groups = linking.merged_groups().count();
        tracing::info!(
            "Linked {} mentions into {} groups ({} merged)",
            mentions.len(),
            linking.groups.len(),
            merged_groups
        );

        let scored = self.scorer.recalculate_confidence(&linking.linked_entities);
        let flagged = self.scorer.flag_for_review(&scored);
        let entities = self.scorer.filter(&flagged);
        let flagged_entities = entities
            .iter()
            .filter(|e| e.needs_review == Some(true))
            .count();
        tracing::info!(
            "Kept {} of {} entities ({} flagged for review)",
            entities.len(),
            flagged.len(),
            flagged_entities
        );

        let relationships = self.extractor.extract_relationships(&entities);
        tracing::info!("Extracted {} relationships", relationships.len());

        let entity_reports = self.entity_validator.validate_batch(entities.as_slice());
        let relationship_validator = RelationshipValidator::new()
            .with_known_entities(entities.iter().map(|e| e.resolved_name().to_string()));
        let relationship_reports = relationship_validator.validate_batch(relationships.as_slice());

        let isolated_entities = KnowledgeGraph::build(&entities, &relationships)
            .isolated()
            .len();

        let stats = PipelineStats {
            input_mentions: mentions.len(),
            merged_groups,
            kept_entities: entities.len(),
            dropped_entities: flagged.len() - entities.len(),
            flagged_entities,
            relationships: relationships.len(),
            isolated_entities,
            invalid_entities: entity_reports.iter().filter(|r| !r.is_valid()).count(),
            invalid_relationships: relationship_reports.iter().filter(|r| !r.is_valid()).count(),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        if stats.has_errors() {
            tracing::warn!(
                "Validation found {} invalid entities and {} invalid relationships",
                stats.invalid_entities,
                stats.invalid_relationships
            );
        }

        PipelineOutput {
            linking,
            entities,
            relationships,
            entity_reports,
            relationship_reports,
            stats,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::RelationshipType;
    use crate::similarity::EmbeddingError;

    fn config() -> CoreConfig {
        let mut config = CoreConfig::default();
        config
            .normalization
            .abbreviations
            .insert("GNN".into(), "Graph Neural Network".into());
        config
    }

    fn mentions() -> Vec<EntityMention> {
        vec![
            EntityMention::new("GNN", "method")
                .with_confidence(0.95)
                .with_occurrences(8)
                .with_relationship_count(5),
            EntityMention::new("Graph Neural Network", "method")
                .with_confidence(0.92)
                .with_occurrences(5)
                .with_relationship_count(5),
            EntityMention::new("GAT", "method")
                .with_confidence(0.9)
                .with_section("abstract")
                .with_context("GAT uses attention and improves GNN performance"),
            EntityMention::new("Attention", "concept").with_confidence(0.8),
            EntityMention::new("Noise", "concept")
                .with_confidence(0.05)
                .with_relationship_count(0),
        ]
    }

    #[test]
    fn test_end_to_end() {
        let output = Pipeline::new(config()).run(&mentions());

        assert_eq!(output.stats.input_mentions, 5);
        assert_eq!(output.stats.merged_groups, 1);
        assert_eq!(output.stats.dropped_entities, 1);
        assert!(output.entities.iter().all(|e| e.name != "Noise"));

        let improves = output
            .relationships
            .iter()
            .find(|r| r.relation_type() == RelationshipType::Improves)
            .unwrap();
        assert_eq!(improves.source, "GAT");
        assert_eq!(improves.target, "Graph Neural Network");

        assert_eq!(output.entity_reports.len(), output.entities.len());
        assert_eq!(output.relationship_reports.len(), output.relationships.len());
        assert!(!output.stats.has_errors());
    }

    #[test]
    fn test_confidence_bounds_after_run() {
        let output = Pipeline::default().run(&mentions());
        for entity in &output.entities {
            let c = entity.confidence.unwrap();
            assert!((0.0..=1.0).contains(&c));
            assert!(entity.canonical_name.is_some());
            assert!(entity.needs_review.is_some());
        }
    }

    #[test]
    fn test_failing_embedder_does_not_abort() {
        let mut config = config();
        config.similarity.use_embeddings = true;
        let failing = |_: &str| -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Failed("timeout".into()))
        };

        let with_failure = Pipeline::new(config.clone())
            .with_embedder(Arc::new(failing))
            .run(&mentions());
        let without = Pipeline::new(config).run(&mentions());

        assert_eq!(with_failure.linking, without.linking);
    }

    #[test]
    fn test_empty_input() {
        let output = Pipeline::default().run(&[]);
        assert!(output.entities.is_empty());
        assert!(output.relationships.is_empty());
        assert_eq!(output.stats.input_mentions, 0);
    }

    #[test]
    fn test_output_serializes() {
        let output = Pipeline::new(config()).run(&mentions());
        let value = serde_json::to_value(&output).unwrap();
        assert!(value["linking"]["canonical_map"]["GNN"].is_string());
        assert!(value["relationships"].is_array());
        assert!(value["entity_reports"][0]["is_valid"].is_boolean());
    }
}
