//! Knowledge graph module: CSV loading, relation queries and view sampling.
//!
//! The graph is built once from a `source,target,relation,weight` CSV and is
//! read-only afterwards. Views are shaped for a vis-network style frontend.

mod loader;
mod store;

pub use loader::{parse_weight, read_relations, CsvLoad};
pub use store::{rank_recommendations, KnowledgeGraph};

use serde::{Deserialize, Serialize};

/// A single relation in the knowledge graph (source --relation--> target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub relation: String,
    pub target: String,
    pub weight: i64,
}

impl Relation {
    pub fn new(source: &str, relation: &str, target: &str, weight: i64) -> Self {
        Self {
            source: source.to_string(),
            relation: relation.to_string(),
            target: target.to_string(),
            weight,
        }
    }

    /// The endpoint that is not `entity`.
    pub fn other_end(&self, entity: &str) -> &str {
        if self.source == entity {
            &self.target
        } else {
            &self.source
        }
    }

    /// `"<source> <relation> <target>"`
    pub fn sentence(&self) -> String {
        format!("{} {} {}", self.source, self.relation, self.target)
    }
}

/// Node as rendered for visualization; `id` and `label` are both the entity name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

impl GraphNode {
    pub fn new(name: &str) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
        }
    }
}

/// Edge as rendered for visualization. `label` duplicates `relation` for the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub weight: i64,
    pub relation: String,
}

impl From<Relation> for GraphEdge {
    fn from(rel: Relation) -> Self {
        Self {
            from: rel.source,
            to: rel.target,
            label: rel.relation.clone(),
            weight: rel.weight,
            relation: rel.relation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Weight-ranked neighbor suggestion derived from a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub entity: String,
    pub reason: String,
    pub weight: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_end() {
        let rel = Relation::new("Vue", "evolves_to", "Vue3", 9);
        assert_eq!(rel.other_end("Vue"), "Vue3");
        assert_eq!(rel.other_end("Vue3"), "Vue");
    }

    #[test]
    fn test_edge_from_relation_copies_label() {
        let edge = GraphEdge::from(Relation::new("React", "uses", "JSX", 8));
        assert_eq!(edge.from, "React");
        assert_eq!(edge.to, "JSX");
        assert_eq!(edge.label, "uses");
        assert_eq!(edge.relation, "uses");
        assert_eq!(edge.weight, 8);
    }

    #[test]
    fn test_edge_serializes_with_vis_field_names() {
        let edge = GraphEdge::from(Relation::new("A", "r", "B", 1));
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["from"], "A");
        assert_eq!(json["to"], "B");
    }
}
