//! Interactome index: dense integer IDs for protein names, edge list, costs and degrees.
//!
//! Node IDs are assigned in first-occurrence order (source column before
//! target column, records in input order). Edge index `i` always refers to
//! the `i`-th input record; the solver adapter and the aggregator both rely
//! on this ordering.
//!
//! Precondition: input edges are unique as unordered pairs. Duplicates are
//! not removed and would inflate degrees and hub penalties.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use pcsf_common::{ForestError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::tsv;

/// One `nodeA\tnodeB\tcost` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub cost: f64,
}

impl EdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>, cost: f64) -> Self {
        Self { source: source.into(), target: target.into(), cost }
    }
}

/// An edge whose cost lies outside the advisory `[0, 1]` range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousCost {
    pub edge_index: usize,
    pub source: String,
    pub target: String,
    pub cost: f64,
}

/// Borrowed view of one indexed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub cost: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Interactome {
    names: Vec<String>,
    ids: AHashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    costs: Vec<f64>,
    degrees: Vec<u32>,
    suspicious: Vec<SuspiciousCost>,
}

impl Interactome {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Index an ordered sequence of edge records.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let mut graph = Interactome::default();

        for record in records {
            if !record.cost.is_finite() {
                return Err(ForestError::invalid_parameter(
                    "cost",
                    format!(
                        "edge {} - {} has non-finite cost {}",
                        record.source, record.target, record.cost
                    ),
                ));
            }

            let a = graph.intern(&record.source);
            let b = graph.intern(&record.target);
            let edge_index = graph.edges.len();

            if !(0.0..=1.0).contains(&record.cost) {
                warn!(
                    node_a = %record.source,
                    node_b = %record.target,
                    cost = record.cost,
                    "Edge cost outside [0, 1]"
                );
                graph.suspicious.push(SuspiciousCost {
                    edge_index,
                    source: record.source.clone(),
                    target: record.target.clone(),
                    cost: record.cost,
                });
            }

            graph.edges.push((a, b));
            graph.costs.push(record.cost);
        }

        let mut degrees = vec![0u32; graph.names.len()];
        for &(a, b) in &graph.edges {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        graph.degrees = degrees;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            suspicious = graph.suspicious.len(),
            "Interactome indexed"
        );
        Ok(graph)
    }

    /// Parse a headerless 3-column TSV and index it.
    pub fn from_reader<R: Read>(input: R, label: &str) -> Result<Self> {
        Self::from_records(read_edge_records(input, label)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ForestError::io(path, e))?;
        Self::from_reader(file, &path.display().to_string())
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn node_name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Names in ID order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn degrees(&self) -> &[u32] {
        &self.degrees
    }

    pub fn degree(&self, id: usize) -> Option<u32> {
        self.degrees.get(id).copied()
    }

    /// Resolve an edge index back to names and cost.
    pub fn edge_endpoints(&self, index: usize) -> Option<EdgeView<'_>> {
        let &(a, b) = self.edges.get(index)?;
        Some(EdgeView {
            source: &self.names[a],
            target: &self.names[b],
            cost: self.costs[index],
        })
    }

    pub fn suspicious_costs(&self) -> &[SuspiciousCost] {
        &self.suspicious
    }

    /// Node IDs ordered by ascending degree; equal degrees keep ID order.
    pub fn nodes_sorted_by_degree(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.node_count()).collect();
        order.sort_by_key(|&id| (self.degrees[id], id));
        order
    }
}

/// Parse `nodeA\tnodeB\tcost` rows without indexing them.
pub fn read_edge_records<R: Read>(input: R, label: &str) -> Result<Vec<EdgeRecord>> {
    let mut reader = tsv::reader(input);
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.map_err(|e| tsv::read_error(label, e))?;
        let line = tsv::line_of(&row);

        if row.len() != 3 {
            return Err(ForestError::malformed(
                label,
                line,
                format!(
                    "expected 3 tab-separated columns (nodeA, nodeB, cost), found {}",
                    row.len()
                ),
            ));
        }

        let source = &row[0];
        let target = &row[1];
        if source.is_empty() || target.is_empty() {
            return Err(ForestError::malformed(label, line, "empty node name"));
        }
        let cost = tsv::parse_number(label, line, "cost", &row[2])?;

        records.push(EdgeRecord::new(source, target, cost));
    }

    debug!(file = label, rows = records.len(), "Read edge records");
    Ok(records)
}

// ── Knockout ──────────────────────────────────────────────────────────────────

/// Result of removing knocked-out proteins from an edge list.
#[derive(Debug, Clone)]
pub struct Knockout {
    pub records: Vec<EdgeRecord>,
    pub removed_edges: usize,
    /// Requested names that matched no edge
    pub unmatched: Vec<String>,
}

/// Drop every record incident to one of `names`, simulating a knockout experiment.
/// Must run before indexing so the surviving IDs stay dense.
pub fn knock_out(records: Vec<EdgeRecord>, names: &[String]) -> Knockout {
    if names.is_empty() {
        return Knockout { records, removed_edges: 0, unmatched: vec![] };
    }

    let targets: AHashSet<&str> = names.iter().map(String::as_str).collect();
    let mut matched: AHashSet<&str> = AHashSet::new();
    let before = records.len();

    let kept: Vec<EdgeRecord> = records
        .into_iter()
        .filter(|r| {
            let mut hit = false;
            for name in [r.source.as_str(), r.target.as_str()] {
                if let Some(&t) = targets.get(name) {
                    matched.insert(t);
                    hit = true;
                }
            }
            !hit
        })
        .collect();

    let unmatched: Vec<String> = names
        .iter()
        .filter(|n| !matched.contains(n.as_str()))
        .cloned()
        .collect();
    for name in &unmatched {
        warn!(protein = %name, "Knockout target not present in interactome");
    }

    let removed_edges = before - kept.len();
    info!(removed_edges, knocked_out = names.len() - unmatched.len(), "Applied knockout");

    Knockout { records: kept, removed_edges, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(rows: &[(&str, &str, f64)]) -> Vec<EdgeRecord> {
        rows.iter().map(|&(a, b, c)| EdgeRecord::new(a, b, c)).collect()
    }

    #[test]
    fn test_ids_follow_first_occurrence() {
        let g = Interactome::from_records(records(&[
            ("TP53", "MDM2", 0.9),
            ("EGFR", "TP53", 0.5),
            ("MDM2", "KRAS", 0.2),
        ]))
        .unwrap();

        assert_eq!(g.node_count(), 4);
        assert_eq!(g.names(), &["TP53", "MDM2", "EGFR", "KRAS"]);
        assert_eq!(g.edges(), &[(0, 1), (2, 0), (1, 3)]);
        assert_eq!(g.costs(), &[0.9, 0.5, 0.2]);
    }

    #[test]
    fn test_every_edge_round_trips_to_names() {
        let input = records(&[("A", "B", 0.1), ("B", "C", 0.2), ("D", "A", 0.3), ("C", "D", 0.4)]);
        let g = Interactome::from_records(input.clone()).unwrap();

        let ids: AHashSet<usize> = g.names().iter().filter_map(|n| g.node_id(n)).collect();
        assert_eq!(ids, (0..g.node_count()).collect::<AHashSet<usize>>());

        for (i, rec) in input.iter().enumerate() {
            let e = g.edge_endpoints(i).unwrap();
            assert_eq!((e.source, e.target, e.cost), (rec.source.as_str(), rec.target.as_str(), rec.cost));
        }
        assert!(g.edge_endpoints(input.len()).is_none());
    }

    #[test]
    fn test_degree_sum_is_twice_edge_count() {
        let g = Interactome::from_records(records(&[("A", "B", 0.5), ("B", "C", 0.5), ("C", "D", 0.5)]))
            .unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.degrees(), &[1, 2, 2, 1]);
        let sum: u32 = g.degrees().iter().sum();
        assert_eq!(sum as usize, 2 * g.edge_count());
    }

    #[test]
    fn test_self_loop_counts_per_occurrence() {
        let g = Interactome::from_records(records(&[("A", "A", 0.5), ("A", "B", 0.5)])).unwrap();
        assert_eq!(g.degree(0), Some(3));
        assert_eq!(g.degree(1), Some(1));
    }

    #[test]
    fn test_out_of_range_cost_is_flagged_not_rejected() {
        let g = Interactome::from_records(records(&[("A", "B", 1.5), ("B", "C", 0.4), ("C", "A", -0.1)]))
            .unwrap();
        assert_eq!(g.edge_count(), 3);
        let flagged: Vec<usize> = g.suspicious_costs().iter().map(|s| s.edge_index).collect();
        assert_eq!(flagged, vec![0, 2]);
    }

    #[test]
    fn test_non_finite_cost_rejected() {
        let err = Interactome::from_records(records(&[("A", "B", f64::NAN)])).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_from_reader_parses_tsv() {
        let tsv = "A\tB\t0.5\nB\tC\t0.25\n\nC\tA\t1\n";
        let g = Interactome::from_reader(tsv.as_bytes(), "edges.tsv").unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.costs(), &[0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let tsv = "A\tB\t0.5\nB\tC\n";
        let err = Interactome::from_reader(tsv.as_bytes(), "edges.tsv").unwrap_err();
        match err {
            ForestError::MalformedRow { file, line, reason } => {
                assert_eq!(file, "edges.tsv");
                assert_eq!(line, 2);
                assert!(reason.contains("found 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparsable_cost_reports_value() {
        let tsv = "A\tB\theavy\n";
        let err = Interactome::from_reader(tsv.as_bytes(), "edges.tsv").unwrap_err();
        assert!(err.to_string().contains("'heavy'"));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Interactome::from_path("/nonexistent/edges.tsv").unwrap_err();
        assert!(matches!(err, ForestError::Io { .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.tsv");
        std::fs::write(&path, "X\tY\t0.3\n").unwrap();
        let g = Interactome::from_path(&path).unwrap();
        assert_eq!(g.node_id("Y"), Some(1));
    }

    #[test]
    fn test_nodes_sorted_by_degree_breaks_ties_by_id() {
        let g = Interactome::from_records(records(&[("A", "B", 0.5), ("B", "C", 0.5), ("D", "B", 0.5)]))
            .unwrap();
        // degrees: A=1, B=3, C=1, D=1
        assert_eq!(g.nodes_sorted_by_degree(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_knockout_removes_incident_edges() {
        let input = records(&[("A", "B", 0.1), ("B", "C", 0.2), ("C", "D", 0.3)]);
        let ko = knock_out(input, &["B".to_string(), "ZZZ".to_string()]);
        assert_eq!(ko.removed_edges, 2);
        assert_eq!(ko.records, records(&[("C", "D", 0.3)]));
        assert_eq!(ko.unmatched, vec!["ZZZ".to_string()]);

        let g = Interactome::from_records(ko.records).unwrap();
        assert!(g.node_id("B").is_none());
        assert_eq!(g.node_count(), 2);
    }
}
