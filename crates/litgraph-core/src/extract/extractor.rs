use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::policy::{ExtractionPolicy, PatternPolicy, CLAUSE_BOUNDARIES, VERB_ADVERBS};
use crate::entity::EntityMention;
use crate::relationship::{Relationship, RelationshipType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

struct NameIndex {
    names: Vec<(String, usize)>,
}

impl NameIndex {
    fn new(entities: &[EntityMention]) -> Self {
        let mut names: Vec<(String, usize)> = Vec::new();
        for (idx, entity) in entities.iter().enumerate() {
            for name in [Some(entity.name.as_str()), entity.canonical_name.as_deref()]
                .into_iter()
                .flatten()
            {
                let lower = name.trim().to_lowercase();
                if !lower.is_empty() && !names.iter().any(|(n, _)| *n == lower) {
                    names.push((lower, idx));
                }
            }
        }
        Self { names }
    }

    fn resolve(&self, span: &str, side: Side) -> Option<usize> {
        let clause = nearest_clause(span, side);
        if clause.is_empty() {
            return None;
        }

        if let Some((_, idx)) = self.names.iter().find(|(name, _)| *name == clause) {
            return Some(*idx);
        }

        let mut best: Option<(usize, usize, usize)> = None;
        for (name, idx) in &self.names {
            let Some((start, end)) = find_words(&clause, name, side) else {
                continue;
            };
            // Higher is better: distance from the verb first, then name length.
            let closeness = match side {
                Side::Source => end,
                Side::Target => clause.len() - start,
            };
            let better = best.map_or(true, |(c, len, _)| {
                closeness > c || (closeness == c && name.len() > len)
            });
            if better {
                best = Some((closeness, name.len(), *idx));
            }
        }
        best.map(|(_, _, idx)| idx)
    }
}

/// The lower-cased clause of `span` adjacent to the verb: the last clause of
/// a subject, the first clause of an object. Adverbs touching the verb
/// ("GAT also improves") are dropped first.
fn nearest_clause(span: &str, side: Side) -> String {
    let mut words: Vec<String> = span.split_whitespace().map(str::to_lowercase).collect();
    let is_boundary = |w: &String| CLAUSE_BOUNDARIES.contains(&w.as_str());
    let is_adverb = |w: &String| VERB_ADVERBS.contains(&w.as_str());

    let clause = match side {
        Side::Source => {
            while words.last().is_some_and(is_adverb) {
                words.pop();
            }
            let start = words.iter().rposition(is_boundary).map_or(0, |i| i + 1);
            &words[start..]
        }
        Side::Target => {
            let skip = words.iter().take_while(|w| is_adverb(*w)).count();
            let end = words.iter().position(is_boundary).unwrap_or(words.len());
            &words[skip.min(end)..end]
        }
    };
    clause.join(" ")
}

/// Occurrence of `needle` in `haystack` that starts and ends on word
/// boundaries, nearest the verb for the given side.
fn find_words(haystack: &str, needle: &str, side: Side) -> Option<(usize, usize)> {
    let on_boundary = |start: usize, end: usize| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    };

    let mut hits = haystack
        .match_indices(needle)
        .map(|(start, m)| (start, start + m.len()))
        .filter(|&(start, end)| on_boundary(start, end));

    match side {
        Side::Source => hits.last(),
        Side::Target => hits.next(),
    }
}

pub struct RelationshipExtractor {
    policy: Box<dyn ExtractionPolicy>,
    min_strength: f64,
}

impl RelationshipExtractor {
    #[must_use]
    pub fn new(policy: Box<dyn ExtractionPolicy>) -> Self {
        Self {
            policy,
            min_strength: 0.0,
        }
    }

    #[must_use]
    pub fn with_min_strength(mut self, min_strength: f64) -> Self {
        self.min_strength = min_strength;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &dyn ExtractionPolicy {
        self.policy.as_ref()
    }

    #[must_use]
    pub fn extract_relationships(&self, entities: &[EntityMention]) -> Vec<Relationship> {
        let index = NameIndex::new(entities);
        let mut found = Vec::new();

        for (scanned, entity) in entities.iter().enumerate() {
            let Some(context) = entity.context_text() else {
                continue;
            };

            for candidate in self.policy.candidates(context) {
                let source = match &candidate.subject {
                    Some(span) => index.resolve(span, Side::Source),
                    None => Some(scanned),
                };
                let (Some(source), Some(target)) =
                    (source, index.resolve(&candidate.object, Side::Target))
                else {
                    continue;
                };

                let source = &entities[source];
                let target = &entities[target];
                match Relationship::new(
                    source.resolved_name(),
                    target.resolved_name(),
                    candidate.relation_type,
                ) {
                    Ok(rel) => found.push(
                        rel.with_context(context)
                            .with_metadata(source.snapshot(), target.snapshot()),
                    ),
                    Err(e) => tracing::debug!("Skipping candidate in '{}': {}", entity.name, e),
                }
            }
        }

        let mut relationships = deduplicate_relationships(found);
        let before = relationships.len();
        relationships.retain(|r| r.strength >= self.min_strength);
        if relationships.len() < before {
            tracing::debug!(
                "Dropped {} relationships below strength {}",
                before - relationships.len(),
                self.min_strength
            );
        }
        relationships
    }
}

impl Default for RelationshipExtractor {
    fn default() -> Self {
        Self::new(Box::new(PatternPolicy::default()))
    }
}

#[must_use]
pub fn deduplicate_relationships(relationships: Vec<Relationship>) -> Vec<Relationship> {
    let mut merged: Vec<Relationship> = Vec::with_capacity(relationships.len());
    let mut positions: HashMap<(String, String, RelationshipType), usize> = HashMap::new();

    for rel in relationships {
        let key = (rel.source.clone(), rel.target.clone(), rel.relation_type());
        match positions.entry(key) {
            Entry::Occupied(slot) => merged[*slot.get()].merge(&rel),
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(rel);
            }
        }
    }
    merged
}
