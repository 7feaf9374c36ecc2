use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityMention {
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    #[must_use]
    pub fn with_relationship_count(mut self, count: u32) -> Self {
        self.relationship_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn resolved_name(&self) -> &str {
        self.canonical_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn context_text(&self) -> Option<&str> {
        self.context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            entity_type: self.entity_type.clone(),
            confidence: self.confidence,
            section: self.section.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_fields_round_trip() {
        let raw = serde_json::json!({
            "name": "GNN",
            "type": "method",
            "confidence": 0.9,
            "paper_id": "arxiv:1234",
            "spans": [1, 2, 3]
        });

        let mention: EntityMention = serde_json::from_value(raw).unwrap();
        assert_eq!(mention.name, "GNN");
        assert_eq!(mention.extra.get("paper_id").unwrap(), "arxiv:1234");

        let back = serde_json::to_value(&mention).unwrap();
        assert_eq!(back["spans"], serde_json::json!([1, 2, 3]));
        assert!(back.get("occurrences").is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let mention: EntityMention = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(mention.name.is_empty());
        assert!(mention.confidence.is_none());
        assert!(mention.context_text().is_none());
    }

    #[test]
    fn test_blank_context_is_ignored() {
        let mention = EntityMention::new("GAT", "method").with_context("   ");
        assert!(mention.context_text().is_none());
    }
}
