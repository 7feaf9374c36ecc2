use regex::Regex;

use crate::relationship::RelationshipType;

/// A relation spotted in context text, before its spans are resolved to
/// known entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationCandidate {
    /// Text before the verb. `None` when the subject is elided ("... and
    /// improves X") and should default to the entity being scanned.
    pub subject: Option<String>,
    /// Text after the verb
    pub object: String,
    pub relation_type: RelationshipType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Pattern,
    DependencyParse,
    Model,
}

/// Finds relation candidates in free text. Swap implementations to change
/// how relations are spotted without touching scoring or validation.
pub trait ExtractionPolicy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    fn candidates(&self, context: &str) -> Vec<RelationCandidate>;
}

/// Words that end one clause and start another inside a captured span.
pub(super) const CLAUSE_BOUNDARIES: &[&str] = &[
    "and", "or", "but", "which", "that", "who", "while", "whereas",
];
/// Adverbs that may sit between a subject and its verb.
pub(super) const VERB_ADVERBS: &[&str] = &["also", "then", "thus", "further", "additionally"];

/// Up to four words on either side of a verb phrase.
const SUBJECT_SPAN: &str = r"((?:[\w-]+\s+){0,3}[\w-]+)";
const OBJECT_SPAN: &str = r"([\w-]+(?:\s+[\w-]+){0,3})";
/// What may sit directly before a verb whose subject is left out.
const ELIDED_SUBJECT_LEAD: &str = r"(?:^|[,;(]|\b(?:and|but|which|that|who)\b)";

pub struct RelationPattern {
    pub relation_type: RelationshipType,
    explicit: Regex,
    elided: Regex,
}

impl RelationPattern {
    /// Builds the pattern pair for a list of verb phrases. Spaces inside a
    /// phrase match any run of whitespace.
    pub fn new(relation_type: RelationshipType, verbs: &[&str]) -> Result<Self, regex::Error> {
        let alternation = verbs
            .iter()
            .map(|verb| {
                verb.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        let adverb = format!(r"(?:(?:{})\s+)?", VERB_ADVERBS.join("|"));

        Ok(Self {
            relation_type,
            explicit: Regex::new(&format!(
                r"(?i)\b{SUBJECT_SPAN}\s+{adverb}(?:{alternation})\s+{OBJECT_SPAN}"
            ))?,
            elided: Regex::new(&format!(
                r"(?i){ELIDED_SUBJECT_LEAD}\s*{adverb}(?:{alternation})\s+{OBJECT_SPAN}"
            ))?,
        })
    }

    // Matches do not overlap, so each scan resumes at the first clause
    // boundary inside the previous object. "A uses B and C uses D" then
    // yields both relations.
    fn scan(&self, context: &str, out: &mut Vec<RelationCandidate>) {
        let mut at = 0;
        while let Some(caps) = self.explicit.captures_at(context, at) {
            let (Some(subject), Some(object)) = (caps.get(1), caps.get(2)) else {
                break;
            };
            out.push(RelationCandidate {
                subject: Some(subject.as_str().to_string()),
                object: object.as_str().to_string(),
                relation_type: self.relation_type,
            });
            at = resume_point(object);
        }

        let mut at = 0;
        while let Some(caps) = self.elided.captures_at(context, at) {
            let Some(object) = caps.get(1) else {
                break;
            };
            out.push(RelationCandidate {
                subject: None,
                object: object.as_str().to_string(),
                relation_type: self.relation_type,
            });
            at = resume_point(object);
        }
    }
}

/// Byte offset of the first clause boundary word inside `object`, or its
/// end when there is none.
fn resume_point(object: regex::Match<'_>) -> usize {
    let mut offset = object.start();
    for piece in object.as_str().split_inclusive(char::is_whitespace) {
        let word = piece.trim_end();
        if CLAUSE_BOUNDARIES.iter().any(|b| word.eq_ignore_ascii_case(b)) {
            return offset;
        }
        offset += piece.len();
    }
    object.end()
}

/// Verb-phrase tables for English research prose.
///
/// `RelatedTo` has no patterns; it is reserved for relationships produced
/// elsewhere.
pub struct PatternPolicy {
    patterns: Vec<RelationPattern>,
}

impl PatternPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: RelationPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    #[must_use]
    pub fn with_default_patterns() -> Self {
        let tables: [(RelationshipType, &[&str]); 4] = [
            (
                RelationshipType::Uses,
                &[
                    "uses", "use", "utilizes", "utilises", "employs", "leverages", "applies",
                    "adopts", "relies on",
                ],
            ),
            (
                RelationshipType::Improves,
                &[
                    "improves upon", "improves on", "improves", "outperforms", "enhances",
                    "surpasses", "boosts",
                ],
            ),
            (
                RelationshipType::BasedOn,
                &[
                    "is based on", "are based on", "based on", "builds upon", "builds on",
                    "is built on", "extends", "is derived from", "derives from",
                ],
            ),
            (
                RelationshipType::ComparedWith,
                &[
                    "is compared with", "is compared to", "compared with", "compared to",
                    "in comparison to", "versus", "vs.", "vs",
                ],
            ),
        ];

        let mut policy = Self::new();
        for (relation_type, verbs) in tables {
            match RelationPattern::new(relation_type, verbs) {
                Ok(pattern) => policy.patterns.push(pattern),
                Err(e) => tracing::warn!("Skipping {} patterns: {}", relation_type, e),
            }
        }
        policy
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for PatternPolicy {
    fn default() -> Self {
        Self::with_default_patterns()
    }
}

impl ExtractionPolicy for PatternPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Pattern
    }

    fn candidates(&self, context: &str) -> Vec<RelationCandidate> {
        let mut out = Vec::new();
        for pattern in &self.patterns {
            pattern.scan(context, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn of_type(
        candidates: &[RelationCandidate],
        relation_type: RelationshipType,
    ) -> Vec<&RelationCandidate> {
        candidates
            .iter()
            .filter(|c| c.relation_type == relation_type)
            .collect()
    }

    #[test]
    fn test_default_patterns_cover_four_types() {
        let policy = PatternPolicy::default();
        assert_eq!(policy.pattern_count(), 4);
        assert_eq!(policy.kind(), PolicyKind::Pattern);
    }

    #[test]
    fn test_explicit_and_elided_subjects() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("GAT uses attention and improves GNN performance");

        let uses = of_type(&found, RelationshipType::Uses);
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].subject.as_deref(), Some("GAT"));
        assert!(uses[0].object.starts_with("attention"));

        let improves = of_type(&found, RelationshipType::Improves);
        assert!(improves
            .iter()
            .any(|c| c.subject.is_none() && c.object.starts_with("GNN")));
    }

    #[test]
    fn test_multiword_verbs() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("GraphSAGE is based on   sampling, compared to GCN");

        let based_on = of_type(&found, RelationshipType::BasedOn);
        assert_eq!(based_on.len(), 1);
        assert_eq!(based_on[0].object, "sampling");

        let compared = of_type(&found, RelationshipType::ComparedWith);
        assert_eq!(compared.len(), 1);
        assert!(compared[0].subject.is_none());
        assert_eq!(compared[0].object, "GCN");
    }

    #[test]
    fn test_case_insensitive_verbs() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("BERT OUTPERFORMS ELMo");
        let improves = of_type(&found, RelationshipType::Improves);
        assert_eq!(improves.len(), 1);
        assert_eq!(improves[0].subject.as_deref(), Some("BERT"));
    }

    #[test]
    fn test_no_related_to_candidates() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("A is related to B and associated with C");
        assert!(of_type(&found, RelationshipType::RelatedTo).is_empty());
    }

    #[test]
    fn test_same_type_chained_with_and() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("GAT uses Attention and GCN uses Dropout");

        let uses = of_type(&found, RelationshipType::Uses);
        let subjects: Vec<_> = uses.iter().map(|c| c.subject.as_deref()).collect();
        assert_eq!(subjects, vec![Some("GAT"), Some("and GCN")]);
        assert_eq!(uses[1].object, "Dropout");
    }

    #[test]
    fn test_adverb_before_elided_verb() {
        let policy = PatternPolicy::default();
        let found = policy.candidates("GAT is trained first, then uses Dropout");
        let uses = of_type(&found, RelationshipType::Uses);
        assert!(uses
            .iter()
            .any(|c| c.subject.is_none() && c.object == "Dropout"));
    }

    #[test]
    fn test_resume_point_stops_at_clause_boundary() {
        let re = Regex::new(r"uses (.+)").unwrap();
        let text = "GAT uses Attention and GCN";
        let object = re.captures(text).unwrap().get(1).unwrap();
        assert_eq!(&text[resume_point(object)..], "and GCN");

        let text = "GAT uses Attention heads";
        let object = re.captures(text).unwrap().get(1).unwrap();
        assert_eq!(resume_point(object), text.len());
    }

    #[test]
    fn test_custom_policy() {
        let policy = PatternPolicy::new().with_pattern(
            RelationPattern::new(RelationshipType::Uses, &["is trained with"]).unwrap(),
        );
        let found = policy.candidates("ResNet is trained with SGD");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].object, "SGD");
    }
}
