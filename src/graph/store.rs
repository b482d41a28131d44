//! In-memory directed graph over entity names.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use regex::RegexBuilder;

use super::{read_relations, GraphEdge, GraphNode, GraphView, Recommendation, Relation};
use crate::error::{KgError, Result};

#[derive(Debug, Clone)]
struct EdgeData {
    relation: String,
    weight: i64,
}

/// Knowledge graph of entities and weighted, labelled relations.
///
/// An ordered (source, target) pair holds at most one edge; adding the pair
/// again overwrites its relation and weight.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, EdgeData>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a knowledge CSV on disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let load = read_relations(file)?;
        if load.skipped > 0 {
            log::warn!("Skipped {} malformed rows in {}", load.skipped, path.display());
        }

        let graph = Self::from_relations(load.relations);
        log::info!(
            "Loaded knowledge graph from {}: {} entities, {} relations",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn from_relations<I: IntoIterator<Item = Relation>>(relations: I) -> Self {
        let mut graph = Self::new();
        for rel in relations {
            graph.add_relation(rel);
        }
        graph
    }

    pub fn add_relation(&mut self, rel: Relation) {
        let source = self.ensure_node(&rel.source);
        let target = self.ensure_node(&rel.target);
        self.graph.update_edge(
            source,
            target,
            EdgeData {
                relation: rel.relation,
                weight: rel.weight,
            },
        );
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All entity names in insertion order.
    pub fn entities(&self) -> Vec<String> {
        self.graph.node_weights().cloned().collect()
    }

    /// In-degree plus out-degree; 0 for an absent entity.
    pub fn degree(&self, entity: &str) -> usize {
        self.index
            .get(entity)
            .map(|&idx| self.degree_of(idx))
            .unwrap_or(0)
    }

    fn degree_of(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    fn directed_relations(&self, idx: NodeIndex, dir: Direction) -> Vec<Relation> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, dir).collect();
        // petgraph walks adjacency lists newest first
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| Relation {
                source: self.graph[e.source()].clone(),
                relation: e.weight().relation.clone(),
                target: self.graph[e.target()].clone(),
                weight: e.weight().weight,
            })
            .collect()
    }

    /// Outgoing relations of `entity`, then incoming ones, each in insertion order.
    pub fn relations(&self, entity: &str) -> Vec<Relation> {
        let Some(&idx) = self.index.get(entity) else {
            return Vec::new();
        };
        let mut out = self.directed_relations(idx, Direction::Outgoing);
        out.extend(self.directed_relations(idx, Direction::Incoming));
        out
    }

    /// Predecessors (with the relation pointing at `entity`) and successors
    /// (with the relation leaving it).
    pub fn neighbors(&self, entity: &str) -> (Vec<Relation>, Vec<Relation>) {
        match self.index.get(entity) {
            Some(&idx) => (
                self.directed_relations(idx, Direction::Incoming),
                self.directed_relations(idx, Direction::Outgoing),
            ),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn all_relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.graph.edge_references().map(|e| Relation {
            source: self.graph[e.source()].clone(),
            relation: e.weight().relation.clone(),
            target: self.graph[e.target()].clone(),
            weight: e.weight().weight,
        })
    }

    /// View restricted to `nodes`; keeps every edge with both endpoints inside.
    fn induced_view(&self, nodes: Vec<String>) -> GraphView {
        let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        let edges = self
            .all_relations()
            .filter(|r| members.contains(r.source.as_str()) && members.contains(r.target.as_str()))
            .map(GraphEdge::from)
            .collect();
        GraphView {
            nodes: nodes.iter().map(|n| GraphNode::new(n)).collect(),
            edges,
        }
    }

    /// Every node and edge.
    pub fn full(&self) -> GraphView {
        GraphView {
            nodes: self.graph.node_weights().map(|n| GraphNode::new(n)).collect(),
            edges: self.all_relations().map(GraphEdge::from).collect(),
        }
    }

    /// The `limit` highest-degree nodes, ordered by degree descending then
    /// label ascending, with the edges among them.
    pub fn top(&self, limit: usize) -> GraphView {
        let mut ranked: Vec<(usize, &String)> = self
            .graph
            .node_indices()
            .map(|idx| (self.degree_of(idx), &self.graph[idx]))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        let nodes = ranked
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect();
        self.induced_view(nodes)
    }

    /// `entity` plus every node on one of its relations.
    pub fn entity_view(&self, entity: &str) -> GraphView {
        let mut nodes = vec![entity.to_string()];
        let mut seen: HashSet<String> = nodes.iter().cloned().collect();
        for rel in self.relations(entity) {
            for name in [rel.source, rel.target] {
                if seen.insert(name.clone()) {
                    nodes.push(name);
                }
            }
        }
        self.induced_view(nodes)
    }

    /// Nodes whose label contains `keyword` (case-insensitive) and every edge
    /// touching one of them, together with the far endpoints.
    pub fn fuzzy_view(&self, keyword: &str) -> Result<GraphView> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(KgError::InvalidInput("keyword must not be empty".to_string()));
        }
        let pattern = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| KgError::InvalidInput(format!("bad keyword {}: {}", keyword, e)))?;

        let matched: HashSet<&str> = self
            .graph
            .node_weights()
            .filter(|n| pattern.is_match(n))
            .map(String::as_str)
            .collect();

        let mut nodes: Vec<String> = self
            .graph
            .node_weights()
            .filter(|n| matched.contains(n.as_str()))
            .cloned()
            .collect();
        let mut seen: HashSet<String> = nodes.iter().cloned().collect();
        let mut edges = Vec::new();

        for rel in self.all_relations() {
            if !matched.contains(rel.source.as_str()) && !matched.contains(rel.target.as_str()) {
                continue;
            }
            for name in [&rel.source, &rel.target] {
                if seen.insert(name.clone()) {
                    nodes.push(name.clone());
                }
            }
            edges.push(GraphEdge::from(rel));
        }

        Ok(GraphView {
            nodes: nodes.iter().map(|n| GraphNode::new(n)).collect(),
            edges,
        })
    }

    /// Entity names that occur verbatim in `text`, in insertion order.
    pub fn match_entities(&self, text: &str) -> Vec<String> {
        self.graph
            .node_weights()
            .filter(|n| !n.is_empty() && text.contains(n.as_str()))
            .cloned()
            .collect()
    }

    /// Relations of `entity` ranked by weight.
    pub fn recommendations(&self, entity: &str, limit: usize) -> Vec<Recommendation> {
        rank_recommendations(entity, &self.relations(entity), limit)
    }
}

/// Sort `relations` by weight descending (stable) and describe the first
/// `limit` from the point of view of `entity`.
pub fn rank_recommendations(entity: &str, relations: &[Relation], limit: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<&Relation> = relations.iter().collect();
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight));
    ranked
        .into_iter()
        .take(limit)
        .map(|rel| Recommendation {
            entity: rel.other_end(entity).to_string(),
            reason: rel.sentence(),
            weight: rel.weight,
        })
        .collect()
}
