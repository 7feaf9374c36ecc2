use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::entity::EntityMention;
use crate::relationship::{Relationship, RelationshipType};

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, RelationshipType>,
    nodes: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    #[must_use]
    pub fn build(entities: &[EntityMention], relationships: &[Relationship]) -> Self {
        let mut kg = Self::default();
        for entity in entities {
            kg.node(entity.resolved_name());
        }
        for rel in relationships {
            let source = kg.node(&rel.source);
            let target = kg.node(&rel.target);
            kg.graph.add_edge(source, target, rel.relation_type());
            if rel.bidirectional() {
                kg.graph.add_edge(target, source, rel.relation_type());
            }
        }
        kg
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    #[must_use]
    pub fn degree(&self, name: &str) -> Option<usize> {
        let idx = *self.nodes.get(name)?;
        let neighbors: HashSet<NodeIndex> = self
            .graph
            .neighbors_undirected(idx)
            .filter(|n| *n != idx)
            .collect();
        Some(neighbors.len())
    }

    #[must_use]
    pub fn degrees(&self) -> BTreeMap<String, usize> {
        self.nodes
            .keys()
            .filter_map(|name| Some((name.clone(), self.degree(name)?)))
            .collect()
    }

    #[must_use]
    pub fn isolated(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    #[must_use]
    pub fn inner(&self) -> &DiGraph<String, RelationshipType> {
        &self.graph
    }
}
