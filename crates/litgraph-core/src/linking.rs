use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entity::EntityMention;
use crate::normalize::is_all_upper;
use crate::similarity::SimilarityEngine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGroup {
    pub canonical_name: String,
    pub members: Vec<String>,
}

impl CanonicalGroup {
    #[must_use]
    pub fn singleton(name: String) -> Self {
        Self {
            canonical_name: name.clone(),
            members: vec![name],
        }
    }

    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkingOutput {
    pub canonical_map: BTreeMap<String, String>,
    pub linked_entities: Vec<EntityMention>,
    pub groups: Vec<CanonicalGroup>,
}

impl LinkingOutput {
    pub fn merged_groups(&self) -> impl Iterator<Item = &CanonicalGroup> {
        self.groups.iter().filter(|g| !g.is_singleton())
    }

    #[must_use]
    pub fn canonical_for(&self, name: &str) -> Option<&str> {
        self.canonical_map.get(name).map(String::as_str)
    }
}

#[derive(Debug)]
pub struct EntityLinker {
    engine: SimilarityEngine,
    threshold: f64,
    use_embeddings: bool,
}

impl EntityLinker {
    #[must_use]
    pub fn new(engine: SimilarityEngine, threshold: f64) -> Self {
        Self {
            engine,
            threshold,
            use_embeddings: false,
        }
    }

    #[must_use]
    pub fn with_embeddings(mut self, use_embeddings: bool) -> Self {
        self.use_embeddings = use_embeddings;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    #[must_use]
    pub fn link_entities(&self, mentions: &[EntityMention]) -> LinkingOutput {
        let names: Vec<&str> = mentions.iter().map(|m| m.name.as_str()).collect();
        let mut assigned: HashSet<&str> = HashSet::new();
        let mut groups: Vec<CanonicalGroup> = Vec::new();

        for &name in &names {
            if assigned.contains(name) {
                continue;
            }

            let mut members: Vec<&str> = Vec::new();
            for found in self
                .engine
                .find_similar(name, &names, self.threshold, self.use_embeddings)
            {
                let candidate = names[found.index];
                let available = candidate == name || !assigned.contains(candidate);
                if available && !members.contains(&candidate) {
                    members.push(candidate);
                }
            }

            if members.len() > 1 {
                assigned.extend(members.iter().copied());
                let canonical_name = select_canonical(&members).to_string();
                tracing::debug!(
                    "Linked {} names under '{}': {:?}",
                    members.len(),
                    canonical_name,
                    members
                );
                groups.push(CanonicalGroup {
                    canonical_name,
                    members: members.iter().map(ToString::to_string).collect(),
                });
            } else {
                assigned.insert(name);
                groups.push(CanonicalGroup::singleton(name.to_string()));
            }
        }

        let mut canonical_map = BTreeMap::new();
        for group in &groups {
            for member in &group.members {
                canonical_map.insert(member.clone(), group.canonical_name.clone());
            }
        }

        let linked_entities = mentions
            .iter()
            .map(|mention| {
                let mut linked = mention.clone();
                linked.canonical_name = canonical_map.get(&mention.name).cloned();
                linked
            })
            .collect();

        LinkingOutput {
            canonical_map,
            linked_entities,
            groups,
        }
    }
}

impl Default for EntityLinker {
    fn default() -> Self {
        Self::new(SimilarityEngine::default(), 0.8)
    }
}

#[must_use]
pub fn select_canonical<S: AsRef<str>>(names: &[S]) -> &str {
    let mut best: Option<(&str, (usize, bool))> = None;
    for name in names {
        let name = name.as_ref();
        let rank = (name.chars().count(), !is_all_upper(name));
        match best {
            Some((_, best_rank)) if rank <= best_rank => {}
            _ => best = Some((name, rank)),
        }
    }
    best.map_or("", |(name, _)| name)
}
