//! Annotated forest: the exportable result of a run.
//!
//! Built either from one trial (no occurrence fractions) or from ensemble
//! statistics. Serialization to a concrete file format is left to the caller;
//! the structure only derives `Serialize`.

use std::collections::{BTreeMap, BTreeSet};

use pcsf_graph::{Interactome, PrizeMapping};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::EnsembleStats;
use crate::solver::TrialResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestNode {
    #[serde(skip)]
    pub id: usize,
    pub name: String,
    pub prize: f64,
    pub degree: u32,
    pub terminal: bool,
    /// Fraction of ensemble trials selecting this node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestEdge {
    #[serde(skip)]
    pub edge_index: usize,
    pub source: String,
    pub target: String,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<f64>,
    /// False for edges added by [`AnnotatedForest::augment`]
    pub in_forest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotatedForest {
    /// Number of ensemble trials behind the fractions; absent for a single trial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<usize>,
    pub nodes: Vec<ForestNode>,
    pub edges: Vec<ForestEdge>,
}

impl AnnotatedForest {
    /// Forest of one solver result. Out-of-range indices are dropped.
    pub fn from_trial(result: &TrialResult, interactome: &Interactome, mapping: &PrizeMapping) -> Self {
        let edges: BTreeSet<usize> = result
            .edges
            .iter()
            .copied()
            .filter(|&e| e < interactome.edge_count())
            .collect();
        let mut ids: BTreeSet<usize> = result
            .vertices
            .iter()
            .copied()
            .filter(|&v| v < interactome.node_count())
            .collect();
        for &e in &edges {
            let (a, b) = interactome.edges()[e];
            ids.insert(a);
            ids.insert(b);
        }

        let nodes = ids
            .into_iter()
            .filter_map(|id| node(interactome, mapping, id, None))
            .collect();
        let edges = edges
            .into_iter()
            .filter_map(|e| edge(interactome, e, None, true))
            .collect();

        Self { trials: None, nodes, edges }
    }

    /// Forest of every node and edge selected in at least one trial.
    pub fn from_ensemble(stats: &EnsembleStats, interactome: &Interactome, mapping: &PrizeMapping) -> Self {
        let mut fractions: BTreeMap<usize, f64> = stats
            .nodes
            .iter()
            .map(|n| (n.id, n.occurrence))
            .collect();
        // A node is in the forest at least as often as any selected edge touching it.
        for e in &stats.edges {
            let (a, b) = interactome.edges()[e.index];
            for id in [a, b] {
                let f = fractions.entry(id).or_insert(0.0);
                *f = f.max(e.occurrence);
            }
        }

        let nodes = fractions
            .into_iter()
            .filter_map(|(id, occurrence)| node(interactome, mapping, id, Some(occurrence)))
            .collect();
        let edges = stats
            .edges
            .iter()
            .filter_map(|e| edge(interactome, e.index, Some(e.occurrence), true))
            .collect();

        Self { trials: Some(stats.trials), nodes, edges }
    }

    /// Add every interactome edge joining two forest nodes that the solver
    /// did not select, marked `in_forest = false`.
    pub fn augment(&mut self, interactome: &Interactome) {
        let members: BTreeSet<usize> = self.nodes.iter().map(|n| n.id).collect();
        let present: BTreeSet<usize> = self.edges.iter().map(|e| e.edge_index).collect();
        let occurrence = self.trials.map(|_| 0.0);

        let before = self.edges.len();
        for (index, &(a, b)) in interactome.edges().iter().enumerate() {
            if present.contains(&index) || !members.contains(&a) || !members.contains(&b) {
                continue;
            }
            if let Some(e) = edge(interactome, index, occurrence, false) {
                self.edges.push(e);
            }
        }
        self.edges.sort_by_key(|e| e.edge_index);

        debug!(added = self.edges.len() - before, "Augmented forest");
    }

    pub fn node(&self, name: &str) -> Option<&ForestNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn node(interactome: &Interactome, mapping: &PrizeMapping, id: usize, occurrence: Option<f64>) -> Option<ForestNode> {
    Some(ForestNode {
        id,
        name: interactome.node_name(id)?.to_string(),
        prize: mapping.prizes.get(id).copied().unwrap_or(0.0),
        degree: interactome.degree(id)?,
        terminal: mapping.is_terminal(id),
        occurrence,
    })
}

fn edge(interactome: &Interactome, index: usize, occurrence: Option<f64>, in_forest: bool) -> Option<ForestEdge> {
    let view = interactome.edge_endpoints(index)?;
    Some(ForestEdge {
        edge_index: index,
        source: view.source.to_string(),
        target: view.target.to_string(),
        cost: view.cost,
        occurrence,
        in_forest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::OccurrenceCounter;
    use pcsf_common::DuplicatePrizePolicy;
    use pcsf_graph::{EdgeRecord, PrizeRecord, PrizeTable};
    use pretty_assertions::assert_eq;

    // A - B - C - D, plus A - C
    fn fixture() -> (Interactome, PrizeMapping) {
        let g = Interactome::from_records(vec![
            EdgeRecord::new("A", "B", 0.1),
            EdgeRecord::new("B", "C", 0.2),
            EdgeRecord::new("C", "D", 0.3),
            EdgeRecord::new("A", "C", 0.4),
        ])
        .unwrap();
        let mapping = PrizeTable::new(vec![PrizeRecord::new("A", 2.0), PrizeRecord::new("C", 1.0)])
            .map_onto(&g, DuplicatePrizePolicy::Last);
        (g, mapping)
    }

    #[test]
    fn test_single_trial_has_no_occurrence() {
        let (g, m) = fixture();
        let f = AnnotatedForest::from_trial(&TrialResult::new(vec![0, 1, 2, 42], vec![0, 1, 99]), &g, &m);

        assert_eq!(f.trials, None);
        assert_eq!(f.node_count(), 3);
        assert_eq!(f.edge_count(), 2);
        let a = f.node("A").unwrap();
        assert_eq!((a.prize, a.degree, a.terminal, a.occurrence), (2.0, 2, true, None));
        assert!(!f.node("B").unwrap().terminal);
        assert!(f.edges.iter().all(|e| e.in_forest && e.occurrence.is_none()));
    }

    #[test]
    fn test_edge_endpoints_become_nodes() {
        let (g, m) = fixture();
        let f = AnnotatedForest::from_trial(&TrialResult::new(vec![], vec![2]), &g, &m);
        let names: Vec<&str> = f.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D"]);
    }

    #[test]
    fn test_ensemble_forest_carries_fractions() {
        let (g, m) = fixture();
        let counter = OccurrenceCounter::from_trial(&TrialResult::new(vec![0, 1], vec![0]))
            .merge(OccurrenceCounter::from_trial(&TrialResult::new(vec![0, 2], vec![3])));
        let f = AnnotatedForest::from_ensemble(&counter.resolve(&g), &g, &m);

        assert_eq!(f.trials, Some(2));
        assert_eq!(f.node("A").unwrap().occurrence, Some(1.0));
        assert_eq!(f.node("B").unwrap().occurrence, Some(0.5));
        assert_eq!(f.edges.len(), 2);
        assert_eq!(f.edges[1].source, "A");
        assert_eq!(f.edges[1].target, "C");
        assert_eq!(f.edges[1].occurrence, Some(0.5));
    }

    #[test]
    fn test_edge_endpoint_occurrence_follows_edge() {
        let (g, m) = fixture();
        // Solver reports the A-B edge but lists no vertices.
        let counter = OccurrenceCounter::from_trial(&TrialResult::new(vec![], vec![0]))
            .merge(OccurrenceCounter::from_trial(&TrialResult::new(vec![0], vec![0])));
        let f = AnnotatedForest::from_ensemble(&counter.resolve(&g), &g, &m);

        assert_eq!(f.edges[0].occurrence, Some(1.0));
        assert_eq!(f.node("A").unwrap().occurrence, Some(1.0));
        assert_eq!(f.node("B").unwrap().occurrence, Some(1.0));
        assert!(f.node("C").is_none());
    }

    #[test]
    fn test_augment_adds_only_edges_between_forest_nodes() {
        let (g, m) = fixture();
        let mut f = AnnotatedForest::from_trial(&TrialResult::new(vec![0, 1, 2], vec![0, 1]), &g, &m);
        f.augment(&g);

        // A-C joins two forest nodes; C-D does not.
        assert_eq!(f.edge_count(), 3);
        let added: Vec<&ForestEdge> = f.edges.iter().filter(|e| !e.in_forest).collect();
        assert_eq!(added.len(), 1);
        assert_eq!((added[0].source.as_str(), added[0].target.as_str()), ("A", "C"));
        assert!(f.edges.iter().all(|e| e.target != "D"));
    }

    #[test]
    fn test_serialized_shape() {
        let (g, m) = fixture();
        let f = AnnotatedForest::from_trial(&TrialResult::new(vec![0], vec![]), &g, &m);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["nodes"][0]["name"], "A");
        assert!(json["nodes"][0].get("occurrence").is_none());
        assert!(json["nodes"][0].get("id").is_none());
        assert!(json.get("trials").is_none());
    }
}
