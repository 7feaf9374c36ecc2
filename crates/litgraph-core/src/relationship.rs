use serde::{Deserialize, Serialize};

use crate::entity::EntitySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Uses,
    Improves,
    BasedOn,
    ComparedWith,
    RelatedTo,
}

impl RelationshipType {
    pub const ALL: [Self; 5] = [
        Self::Uses,
        Self::Improves,
        Self::BasedOn,
        Self::ComparedWith,
        Self::RelatedTo,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uses => "uses",
            Self::Improves => "improves",
            Self::BasedOn => "based_on",
            Self::ComparedWith => "compared_with",
            Self::RelatedTo => "related_to",
        }
    }

    /// Base strength by how specific the relation is.
    #[must_use]
    pub fn base_strength(&self) -> f64 {
        match self {
            Self::Uses | Self::Improves | Self::BasedOn => 0.7,
            Self::ComparedWith => 0.6,
            Self::RelatedTo => 0.4,
        }
    }
}

/// Whether a relationship of this type reads the same in both directions.
///
/// This is the only place the property is defined.
#[must_use]
pub fn infer_bidirectional(relation_type: RelationshipType) -> bool {
    matches!(
        relation_type,
        RelationshipType::ComparedWith | RelationshipType::RelatedTo
    )
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "uses" => Ok(Self::Uses),
            "improves" => Ok(Self::Improves),
            "based_on" | "basedon" => Ok(Self::BasedOn),
            "compared_with" | "comparedwith" => Ok(Self::ComparedWith),
            "related_to" | "relatedto" => Ok(Self::RelatedTo),
            _ => Err(crate::Error::InvalidRelationshipType(s.to_string())),
        }
    }
}

const CONTEXT_BONUS_MAX: f64 = 0.2;
const CONTEXT_SATURATION_CHARS: f64 = 500.0;
const FREQUENCY_BONUS_MAX: f64 = 0.2;
const FREQUENCY_BONUS_SCALE: f64 = 0.1;

/// A typed edge between two named entities.
///
/// `bidirectional` is derived from the type on construction and cannot be set
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    relation_type: RelationshipType,
    pub strength: f64,
    bidirectional: bool,
    pub frequency: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_metadata: Option<EntitySnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_metadata: Option<EntitySnapshot>,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation_type: RelationshipType,
    ) -> crate::Result<Self> {
        let source = source.into();
        let target = target.into();
        if source == target {
            return Err(crate::Error::SelfReference(source));
        }

        let mut relationship = Self {
            source,
            target,
            relation_type,
            strength: 0.0,
            bidirectional: infer_bidirectional(relation_type),
            frequency: 1,
            context: None,
            source_metadata: None,
            target_metadata: None,
        };
        relationship.strength = relationship.score_strength();
        Ok(relationship)
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self.strength = self.score_strength();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, source: EntitySnapshot, target: EntitySnapshot) -> Self {
        self.source_metadata = Some(source);
        self.target_metadata = Some(target);
        self
    }

    #[must_use]
    pub fn relation_type(&self) -> RelationshipType {
        self.relation_type
    }

    #[must_use]
    pub fn bidirectional(&self) -> bool {
        self.bidirectional
    }

    #[must_use]
    pub fn key(&self) -> (&str, &str, RelationshipType) {
        (&self.source, &self.target, self.relation_type)
    }

    /// Strength from type specificity, the length of the supporting context
    /// and how often the relationship has been observed, clamped to [0, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score_strength(&self) -> f64 {
        let context_len = self.context.as_deref().map_or(0, |c| c.chars().count());
        let context_bonus =
            CONTEXT_BONUS_MAX * (context_len as f64 / CONTEXT_SATURATION_CHARS).min(1.0);

        let frequency_bonus = if self.frequency > 1 {
            (f64::from(self.frequency).ln() * FREQUENCY_BONUS_SCALE).min(FREQUENCY_BONUS_MAX)
        } else {
            0.0
        };

        (self.relation_type.base_strength() + context_bonus + frequency_bonus).clamp(0.0, 1.0)
    }

    /// Folds another observation of the same (source, target, type) into this
    /// one. Keeps the longer context so the score never drops.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.key(), other.key());

        self.frequency = self.frequency.saturating_add(other.frequency);

        let other_len = other.context.as_deref().map_or(0, str::len);
        let own_len = self.context.as_deref().map_or(0, str::len);
        if other_len > own_len {
            self.context.clone_from(&other.context);
        }
        if self.source_metadata.is_none() {
            self.source_metadata.clone_from(&other.source_metadata);
        }
        if self.target_metadata.is_none() {
            self.target_metadata.clone_from(&other.target_metadata);
        }

        self.strength = self.score_strength().max(self.strength);
    }
}
