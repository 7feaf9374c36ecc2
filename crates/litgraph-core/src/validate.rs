//! Rule-based integrity checks for entities and relationships.
//!
//! Validators never fail and never modify their input. They accept both the
//! typed records produced by this crate and raw JSON records straight from
//! an upstream producer, where fields may be missing or mistyped.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::entity::EntityMention;
use crate::relationship::{infer_bidirectional, Relationship, RelationshipType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, item: &T) -> ValidationResult;

    fn validate_batch(&self, items: &[T]) -> Vec<ValidationResult> {
        items.iter().map(|item| self.validate(item)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Absent,
    Value(f64),
    NotANumber,
}

impl Number {
    fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Number(n)) => n.as_f64().map_or(Self::NotANumber, Self::Value),
            Some(_) => Self::NotANumber,
        }
    }

    fn from_typed(value: Option<f64>) -> Self {
        match value {
            None => Self::Absent,
            Some(v) if v.is_finite() => Self::Value(v),
            Some(_) => Self::NotANumber,
        }
    }
}

fn text_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |t| t.trim().is_empty())
}

struct EntityFields<'a> {
    name: Option<&'a str>,
    entity_type: Option<&'a str>,
    confidence: Number,
}

#[derive(Debug, Clone, Default)]
pub struct EntityValidator {
    low_confidence_warning: Option<f64>,
}

impl EntityValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_low_confidence_warning(mut self, threshold: f64) -> Self {
        self.low_confidence_warning = Some(threshold);
        self
    }

    fn check(&self, fields: &EntityFields<'_>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if is_blank(fields.name) {
            result.add_error("Entity name is missing or empty");
        }
        if is_blank(fields.entity_type) {
            result.add_error("Entity type is missing");
        }

        match fields.confidence {
            Number::Absent => result.add_suggestion("Add a confidence score"),
            Number::NotANumber => result.add_error("Confidence must be a finite number"),
            Number::Value(c) if !(0.0..=1.0).contains(&c) => {
                result.add_error(format!("Confidence {c} is outside [0, 1]"));
            }
            Number::Value(c) => {
                if let Some(threshold) = self.low_confidence_warning {
                    if c < threshold {
                        result.add_warning(format!(
                            "Low confidence {c:.2} (below {threshold:.2})"
                        ));
                    }
                }
            }
        }

        result
    }
}

impl Validator<Value> for EntityValidator {
    fn validate(&self, item: &Value) -> ValidationResult {
        self.check(&EntityFields {
            name: text_field(item, "name"),
            entity_type: text_field(item, "type"),
            confidence: Number::from_json(item.get("confidence")),
        })
    }
}

impl Validator<EntityMention> for EntityValidator {
    fn validate(&self, item: &EntityMention) -> ValidationResult {
        self.check(&EntityFields {
            name: Some(item.name.as_str()),
            entity_type: Some(item.entity_type.as_str()),
            confidence: Number::from_typed(item.confidence),
        })
    }
}

enum TypeField<'a> {
    Missing,
    Known(RelationshipType),
    Unknown(&'a str),
}

struct RelationshipFields<'a> {
    source: Option<&'a str>,
    target: Option<&'a str>,
    relation_type: TypeField<'a>,
    strength: Number,
    bidirectional: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipValidator {
    known_entities: Option<HashSet<String>>,
}

impl RelationshipValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_known_entities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_entities = Some(names.into_iter().map(Into::into).collect());
        self
    }

    fn check(&self, fields: &RelationshipFields<'_>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if is_blank(fields.source) {
            result.add_error("Relationship source is missing");
        }
        if is_blank(fields.target) {
            result.add_error("Relationship target is missing");
        }

        match fields.relation_type {
            TypeField::Missing => result.add_error("Relationship type is missing"),
            TypeField::Unknown(raw) => {
                result.add_error(format!("Unknown relationship type '{raw}'"));
            }
            TypeField::Known(relation_type) => {
                let expected = infer_bidirectional(relation_type);
                if let Some(flag) = fields.bidirectional {
                    if flag != expected {
                        result.add_warning(format!(
                            "bidirectional is {flag} but {relation_type} relationships are {}",
                            if expected { "bidirectional" } else { "directed" }
                        ));
                    }
                }
            }
        }

        match fields.strength {
            Number::Absent => {}
            Number::NotANumber => result.add_error("Strength must be a finite number"),
            Number::Value(s) if !(0.0..=1.0).contains(&s) => {
                result.add_error(format!("Strength {s} is outside [0, 1]"));
            }
            Number::Value(_) => {}
        }

        if let (Some(source), Some(target)) = (fields.source, fields.target) {
            if !source.trim().is_empty() && source == target {
                result.add_error(format!("Self-loop: source and target are both '{source}'"));
            }
        }

        if let Some(known) = &self.known_entities {
            for (role, name) in [("Source", fields.source), ("Target", fields.target)] {
                if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
                    if !known.contains(name) {
                        result.add_error(format!("{role} '{name}' is not a known entity"));
                    }
                }
            }
        }

        result
    }
}

impl Validator<Value> for RelationshipValidator {
    fn validate(&self, item: &Value) -> ValidationResult {
        let relation_type = match item.get("type") {
            None | Some(Value::Null) => TypeField::Missing,
            Some(Value::String(raw)) => raw
                .parse::<RelationshipType>()
                .map_or(TypeField::Unknown(raw), TypeField::Known),
            Some(_) => TypeField::Unknown("<non-string>"),
        };

        self.check(&RelationshipFields {
            source: text_field(item, "source"),
            target: text_field(item, "target"),
            relation_type,
            strength: Number::from_json(item.get("strength")),
            bidirectional: item.get("bidirectional").and_then(Value::as_bool),
        })
    }
}

impl Validator<Relationship> for RelationshipValidator {
    fn validate(&self, item: &Relationship) -> ValidationResult {
        self.check(&RelationshipFields {
            source: Some(item.source.as_str()),
            target: Some(item.target.as_str()),
            relation_type: TypeField::Known(item.relation_type()),
            strength: Number::from_typed(Some(item.strength)),
            bidirectional: Some(item.bidirectional()),
        })
    }
}
