use crate::config::ScoringConfig;
use crate::entity::EntityMention;

const FREQUENCY_BOOST_SCALE: f64 = 0.05;
const FREQUENCY_BOOST_MAX: f64 = 0.2;
const RELATIONSHIP_BOOST_SCALE: f64 = 0.02;
const RELATIONSHIP_BOOST_MAX: f64 = 0.2;
const ISOLATION_PENALTY: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    #[must_use]
    pub fn new(mut config: ScoringConfig) -> Self {
        // Sections are matched case-insensitively.
        if let Some(weights) = config.section_weights.take() {
            config.section_weights = Some(
                weights
                    .into_iter()
                    .map(|(section, weight)| (section.trim().to_lowercase(), weight))
                    .collect(),
            );
        }
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[must_use]
    pub fn recalculate_confidence(&self, entities: &[EntityMention]) -> Vec<EntityMention> {
        entities
            .iter()
            .map(|entity| {
                let mut scored = entity.clone();
                scored.confidence = Some(self.score(entity));
                scored
            })
            .collect()
    }

    #[must_use]
    pub fn score(&self, entity: &EntityMention) -> f64 {
        let original = entity.confidence.filter(|c| c.is_finite()).unwrap_or(0.0);

        let frequency_boost = match entity.occurrences {
            Some(n) if n > 1 => (f64::from(n).ln() * FREQUENCY_BOOST_SCALE).min(FREQUENCY_BOOST_MAX),
            _ => 0.0,
        };
        let relationship_boost = match entity.relationship_count {
            Some(n) if n > 0 => {
                (f64::from(n) * RELATIONSHIP_BOOST_SCALE).min(RELATIONSHIP_BOOST_MAX)
            }
            _ => 0.0,
        };
        let isolation_penalty = if entity.relationship_count == Some(0) {
            ISOLATION_PENALTY
        } else {
            0.0
        };

        let boost = frequency_boost + relationship_boost;
        let section_adjustment = boost * (self.section_weight(entity) - 1.0);

        (original + boost - isolation_penalty + section_adjustment).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn section_weight(&self, entity: &EntityMention) -> f64 {
        let (Some(weights), Some(section)) = (&self.config.section_weights, &entity.section) else {
            return 1.0;
        };
        let key = section.trim().to_lowercase();
        weights.get(&key).copied().unwrap_or(1.0)
    }

    #[must_use]
    pub fn filter_by_confidence(
        &self,
        entities: &[EntityMention],
        threshold: f64,
    ) -> Vec<EntityMention> {
        entities
            .iter()
            .filter(|e| e.confidence.filter(|c| !c.is_nan()).unwrap_or(0.0) >= threshold)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn filter(&self, entities: &[EntityMention]) -> Vec<EntityMention> {
        self.filter_by_confidence(entities, self.config.confidence_threshold)
    }

    #[must_use]
    pub fn flag_for_review(&self, entities: &[EntityMention]) -> Vec<EntityMention> {
        entities
            .iter()
            .map(|entity| {
                let mut flagged = entity.clone();
                let reasons = self.review_reasons(entity);
                flagged.needs_review = Some(!reasons.is_empty());
                flagged.review_reason = (!reasons.is_empty()).then(|| reasons.join("; "));
                flagged
            })
            .collect()
    }

    fn review_reasons(&self, entity: &EntityMention) -> Vec<String> {
        let mut reasons = Vec::new();

        if let Some(confidence) = entity.confidence.filter(|c| c.is_finite()) {
            let threshold = self.config.confidence_threshold;
            if (confidence - threshold).abs() <= self.config.review_margin {
                reasons.push(format!(
                    "borderline confidence ({confidence:.2} near threshold {threshold:.2})"
                ));
            }
        }

        if entity.relationship_count == Some(0) {
            reasons.push("isolated node (no relationships)".to_string());
        }

        if let Some(occurrences) = entity.occurrences {
            if occurrences < self.config.min_occurrences {
                reasons.push(format!(
                    "low occurrence ({occurrences} < {})",
                    self.config.min_occurrences
                ));
            }
        }

        reasons
    }
}
