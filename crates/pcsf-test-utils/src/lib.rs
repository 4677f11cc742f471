//! Shared fixtures for pcsf integration tests: synthetic interactomes,
//! TSV inputs on disk and scripted solvers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use pcsf_ensemble::{MockSolver, SolverAdapter, SolverRequest, TrialResult};
use pcsf_graph::{EdgeRecord, Interactome};
use tempfile::TempDir;

// ── Synthetic interactomes ────────────────────────────────────────────────────

/// A ring `P0 - P1 - ... - P{n-1} - P0` with a hub `HUB` joined to every
/// fourth node. Costs cycle through `0.1..=0.9`. Edge count is `n + n / 4`.
pub fn hub_ring_records(n: usize) -> Vec<EdgeRecord> {
    let cost = |i: usize| 0.1 + (i % 9) as f64 * 0.1;
    let mut records: Vec<EdgeRecord> = (0..n)
        .map(|i| EdgeRecord::new(format!("P{i}"), format!("P{}", (i + 1) % n), cost(i)))
        .collect();
    records.extend(
        (0..n)
            .step_by(4)
            .map(|i| EdgeRecord::new("HUB", format!("P{i}"), cost(i + 3))),
    );
    records
}

pub fn hub_ring(n: usize) -> Interactome {
    Interactome::from_records(hub_ring_records(n)).expect("fixture records are well formed")
}

/// `(name, prize)` rows for every `step`-th ring node.
pub fn ring_prizes(n: usize, step: usize) -> Vec<(String, f64)> {
    (0..n)
        .step_by(step)
        .map(|i| (format!("P{i}"), 1.0 + (i % 3) as f64))
        .collect()
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Input files written to a temporary directory that lives as long as this value.
pub struct TempInputs {
    pub dir: TempDir,
    pub edge_file: PathBuf,
    pub prize_file: PathBuf,
}

impl TempInputs {
    pub fn new(edges: &[EdgeRecord], prizes: &[(String, f64)]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let edge_file = dir.path().join("interactome.tsv");
        let prize_file = dir.path().join("prizes.tsv");

        let edge_rows: String = edges
            .iter()
            .map(|e| format!("{}\t{}\t{}\n", e.source, e.target, e.cost))
            .collect();
        fs::write(&edge_file, edge_rows).expect("write edge file");
        write_prizes(&prize_file, prizes);

        Self { dir, edge_file, prize_file }
    }

    /// Write an extra prize table next to the others.
    pub fn add_prize_file(&self, name: &str, prizes: &[(String, f64)]) -> PathBuf {
        let path = self.dir.path().join(name);
        write_prizes(&path, prizes);
        path
    }
}

fn write_prizes(path: &Path, prizes: &[(String, f64)]) {
    let rows: String = prizes.iter().map(|(n, p)| format!("{n}\t{p}\n")).collect();
    fs::write(path, rows).expect("write prize file");
}

// ── Scripted solvers ──────────────────────────────────────────────────────────

/// Counts calls and delegates to a [`MockSolver`].
#[derive(Debug, Default)]
pub struct CountingSolver {
    inner: MockSolver,
    calls: AtomicUsize,
}

impl CountingSolver {
    pub fn new(inner: MockSolver) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SolverAdapter for CountingSolver {
    fn solve(&self, request: &SolverRequest<'_>) -> anyhow::Result<TrialResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve(request)
    }
}

/// Succeeds for the first `ok_calls` calls, then fails every call.
#[derive(Debug)]
pub struct FailingSolver {
    ok_calls: usize,
    calls: AtomicUsize,
}

impl FailingSolver {
    pub fn after(ok_calls: usize) -> Self {
        Self { ok_calls, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SolverAdapter for FailingSolver {
    fn solve(&self, request: &SolverRequest<'_>) -> anyhow::Result<TrialResult> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_calls {
            anyhow::bail!("scripted failure on call {}", n + 1);
        }
        MockSolver::new().solve(request)
    }
}

/// Returns a fixed selection including indices outside any interactome,
/// the way a solver with an internal dummy root would.
#[derive(Debug, Clone)]
pub struct DummyRootSolver {
    pub dummy_node: usize,
    pub dummy_edge: usize,
}

impl SolverAdapter for DummyRootSolver {
    fn solve(&self, request: &SolverRequest<'_>) -> anyhow::Result<TrialResult> {
        let mut result = MockSolver::new().solve(request)?;
        result.vertices.push(self.dummy_node);
        result.edges.push(self.dummy_edge);
        Ok(result)
    }
}
