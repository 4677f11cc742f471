//! Occurrence counting across ensemble trials.
//!
//! Counters are keyed by raw solver indices and merged commutatively, so the
//! per-trial counters built on the rayon pool can be reduced in any order.
//! Names are attached only at the end, by [`OccurrenceCounter::resolve`].

use std::collections::{BTreeMap, BTreeSet};

use pcsf_graph::Interactome;
use serde::Serialize;
use tracing::debug;

use crate::solver::TrialResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCounter {
    trials: usize,
    vertices: BTreeMap<usize, usize>,
    edges: BTreeMap<usize, usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter holding a single trial.
    pub fn from_trial(result: &TrialResult) -> Self {
        let mut counter = Self::new();
        counter.record(result);
        counter
    }

    /// Count one trial. Indices repeated inside the trial count once.
    pub fn record(&mut self, result: &TrialResult) {
        self.trials += 1;
        let vertices: BTreeSet<usize> = result.vertices.iter().copied().collect();
        for v in vertices {
            *self.vertices.entry(v).or_default() += 1;
        }
        let edges: BTreeSet<usize> = result.edges.iter().copied().collect();
        for e in edges {
            *self.edges.entry(e).or_default() += 1;
        }
    }

    pub fn merge(mut self, other: OccurrenceCounter) -> OccurrenceCounter {
        self.trials += other.trials;
        for (v, n) in other.vertices {
            *self.vertices.entry(v).or_default() += n;
        }
        for (e, n) in other.edges {
            *self.edges.entry(e).or_default() += n;
        }
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn vertex_fractions(&self) -> BTreeMap<usize, f64> {
        self.fractions(&self.vertices)
    }

    pub fn edge_fractions(&self) -> BTreeMap<usize, f64> {
        self.fractions(&self.edges)
    }

    fn fractions(&self, counts: &BTreeMap<usize, usize>) -> BTreeMap<usize, f64> {
        if self.trials == 0 {
            return BTreeMap::new();
        }
        let total = self.trials as f64;
        counts.iter().map(|(&k, &n)| (k, n as f64 / total)).collect()
    }

    /// Join the counts back onto interactome names. Indices the interactome
    /// does not know (e.g. a solver's dummy node) are dropped.
    pub fn resolve(&self, interactome: &Interactome) -> EnsembleStats {
        let nodes: Vec<NodeOccurrence> = self
            .vertex_fractions()
            .into_iter()
            .filter_map(|(id, occurrence)| {
                interactome.node_name(id).map(|name| NodeOccurrence {
                    id,
                    name: name.to_string(),
                    occurrence,
                })
            })
            .collect();

        let edges: Vec<EdgeOccurrence> = self
            .edge_fractions()
            .into_iter()
            .filter_map(|(index, occurrence)| {
                interactome.edge_endpoints(index).map(|e| EdgeOccurrence {
                    index,
                    source: e.source.to_string(),
                    target: e.target.to_string(),
                    cost: e.cost,
                    occurrence,
                })
            })
            .collect();

        let dropped_nodes = self.vertices.len() - nodes.len();
        let dropped_edges = self.edges.len() - edges.len();
        if dropped_nodes + dropped_edges > 0 {
            debug!(dropped_nodes, dropped_edges, "Dropped indices outside the interactome");
        }

        EnsembleStats { trials: self.trials, nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOccurrence {
    pub id: usize,
    pub name: String,
    pub occurrence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeOccurrence {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub cost: f64,
    pub occurrence: f64,
}

/// Occurrence fractions keyed by entity identity, in ID / edge-index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnsembleStats {
    pub trials: usize,
    pub nodes: Vec<NodeOccurrence>,
    pub edges: Vec<EdgeOccurrence>,
}

impl EnsembleStats {
    pub fn node(&self, name: &str) -> Option<&NodeOccurrence> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
