//! Solver adapter seam.
//!
//! The PCST algorithm itself lives outside this workspace. A solver receives
//! the integer-indexed instance and returns the selected vertex IDs and edge
//! indices (positions in `SolverRequest::edges`).

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use pcsf_common::{ForestParams, PruningMode, SolverConfig};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

/// One solver invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SolverRequest<'a> {
    pub edges: &'a [(usize, usize)],
    pub prizes: &'a [f64],
    pub costs: &'a [f64],
    /// Unrooted when `None` (encoded as -1 on the wire)
    #[serde(serialize_with = "root_or_sentinel")]
    pub root: Option<usize>,
    pub num_clusters: usize,
    pub pruning: PruningMode,
    pub verbosity: u32,
    /// Dummy-node and scoring parameters, forwarded as configured
    pub params: &'a ForestParams,
}

fn root_or_sentinel<S: Serializer>(root: &Option<usize>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match root {
        Some(id) => s.serialize_i64(*id as i64),
        None => s.serialize_i64(-1),
    }
}

/// Vertices and edge indices selected by one solver call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
}

impl TrialResult {
    pub fn new(vertices: Vec<usize>, edges: Vec<usize>) -> Self {
        Self { vertices, edges }
    }
}

/// Trait for PCST solvers.
///
/// Implementations can use:
/// - an external executable (`CommandSolver`)
/// - an in-process binding
/// - mock selections (testing)
pub trait SolverAdapter: Send + Sync {
    fn solve(&self, request: &SolverRequest<'_>) -> Result<TrialResult>;
}

impl<F> SolverAdapter for F
where
    F: Fn(&SolverRequest<'_>) -> Result<TrialResult> + Send + Sync,
{
    fn solve(&self, request: &SolverRequest<'_>) -> Result<TrialResult> {
        self(request)
    }
}

// ── External executable ──────────────────────────────────────────────────────

/// Runs an external solver that reads the request as JSON on stdin and
/// prints `{"vertices": [...], "edges": [...]}` on stdout.
#[derive(Debug, Clone)]
pub struct CommandSolver {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSolver {
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: vec![],
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `None` when no solver command is configured.
    pub fn from_config(config: &SolverConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|cmd| Self::new(cmd).with_args(config.args.iter().cloned()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SolverAdapter for CommandSolver {
    fn solve(&self, request: &SolverRequest<'_>) -> Result<TrialResult> {
        let payload = serde_json::to_vec(request).context("Failed to encode solver request")?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start solver {:?}", self.program))?;

        let mut stdin = child.stdin.take().context("Solver stdin unavailable")?;
        let writer = std::thread::spawn(move || stdin.write_all(&payload));

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for solver {:?}", self.program))?;
        let sent = writer
            .join()
            .map_err(|_| anyhow::anyhow!("solver stdin writer panicked"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("solver exited with {}: {}", output.status, stderr.trim());
        }

        match sent {
            // A solver may answer without consuming the whole request.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("Solver closed stdin before reading the full request");
            }
            other => other.context("Failed to send instance to solver")?,
        }

        let result: TrialResult = serde_json::from_slice(&output.stdout)
            .context("Solver output is not a {\"vertices\", \"edges\"} JSON object")?;

        debug!(
            vertices = result.vertices.len(),
            edges = result.edges.len(),
            "Solver completed"
        );
        Ok(result)
    }
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// Deterministic stand-in: selects every node with a positive prize and
/// every edge joining two selected nodes whose cost is at most `max_cost`.
#[derive(Debug, Clone)]
pub struct MockSolver {
    max_cost: f64,
}

impl MockSolver {
    pub fn new() -> Self {
        Self { max_cost: f64::INFINITY }
    }

    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = max_cost;
        self
    }
}

impl Default for MockSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverAdapter for MockSolver {
    fn solve(&self, request: &SolverRequest<'_>) -> Result<TrialResult> {
        let selected: Vec<bool> = request.prizes.iter().map(|&p| p > 0.0).collect();
        let vertices = selected
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect();
        let edges = request
            .edges
            .iter()
            .zip(request.costs)
            .enumerate()
            .filter(|&(_, (&(a, b), &c))| selected[a] && selected[b] && c <= self.max_cost)
            .map(|(i, _)| i)
            .collect();
        Ok(TrialResult { vertices, edges })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(edges: &'a [(usize, usize)], prizes: &'a [f64], costs: &'a [f64]) -> SolverRequest<'a> {
        SolverRequest {
            edges,
            prizes,
            costs,
            root: None,
            num_clusters: 1,
            pruning: PruningMode::Strong,
            verbosity: 0,
            params: Box::leak(Box::new(ForestParams::default())),
        }
    }

    #[test]
    fn test_request_encodes_unrooted_as_minus_one() {
        let edges = [(0, 1)];
        let json = serde_json::to_value(request(&edges, &[1.0, 0.0], &[0.5])).unwrap();
        assert_eq!(json["root"], -1);
        assert_eq!(json["pruning"], "strong");
        assert_eq!(json["edges"][0][1], 1);
    }

    #[test]
    fn test_request_forwards_dummy_params() {
        let params = ForestParams {
            w: 99.0,
            d: 4.0,
            r: Some(0.5),
            dummy_mode: pcsf_common::DummyMode::All,
            ..ForestParams::default()
        };
        let edges = [(0, 1)];
        let mut req = request(&edges, &[1.0, 0.0], &[0.5]);
        req.params = &params;
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["params"]["w"], 99.0);
        assert_eq!(json["params"]["D"], 4.0);
        assert_eq!(json["params"]["r"], 0.5);
        assert_eq!(json["params"]["dummy_mode"], "all");
        assert_eq!(json["params"]["b"], 12.0);
    }

    #[test]
    fn test_request_encodes_root_id() {
        let edges = [(0, 1)];
        let mut req = request(&edges, &[1.0, 0.0], &[0.5]);
        req.root = Some(1);
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["root"], 1);
    }

    #[test]
    fn test_mock_solver_selects_prized_nodes() {
        let edges = [(0, 1), (1, 2), (0, 2)];
        let result = MockSolver::new()
            .solve(&request(&edges, &[1.0, -0.5, 2.0], &[0.1, 0.1, 0.9]))
            .unwrap();
        assert_eq!(result, TrialResult::new(vec![0, 2], vec![2]));

        let result = MockSolver::new()
            .with_max_cost(0.5)
            .solve(&request(&edges, &[1.0, -0.5, 2.0], &[0.1, 0.1, 0.9]))
            .unwrap();
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_closure_is_a_solver() {
        let solver = |_: &SolverRequest<'_>| Ok::<_, anyhow::Error>(TrialResult::new(vec![3], vec![]));
        let edges: [(usize, usize); 0] = [];
        assert_eq!(solver.solve(&request(&edges, &[], &[])).unwrap().vertices, vec![3]);
    }

    #[test]
    fn test_from_config_requires_command() {
        assert!(CommandSolver::from_config(&SolverConfig::default()).is_none());
        let cfg = SolverConfig {
            command: Some("pcst-solve".to_string()),
            args: vec!["--json".to_string()],
        };
        let solver = CommandSolver::from_config(&cfg).unwrap();
        assert_eq!(solver.program(), Path::new("pcst-solve"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_solver_round_trip() {
        // `cat` ignores the request shape, so feed it a script instead.
        let solver = CommandSolver::new("sh")
            .with_args(["-c", "cat > /dev/null; echo '{\"vertices\":[0,1],\"edges\":[0]}'"]);
        let edges = [(0, 1)];
        let result = solver.solve(&request(&edges, &[1.0, 1.0], &[0.2])).unwrap();
        assert_eq!(result, TrialResult::new(vec![0, 1], vec![0]));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_solver_may_ignore_stdin() {
        // Larger than any pipe buffer, so the writer sees the closed pipe.
        let edges: Vec<(usize, usize)> = (0..200_000).map(|i| (i, i + 1)).collect();
        let costs = vec![0.5; edges.len()];
        let prizes = vec![1.0; edges.len() + 1];
        let solver = CommandSolver::new("sh").with_args(["-c", "echo '{\"vertices\":[2],\"edges\":[]}'"]);
        let result = solver.solve(&request(&edges, &prizes, &costs)).unwrap();
        assert_eq!(result, TrialResult::new(vec![2], vec![]));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_solver_failure_carries_stderr() {
        let solver = CommandSolver::new("sh").with_args(["-c", "cat > /dev/null; echo boom >&2; exit 3"]);
        let edges = [(0, 1)];
        let err = solver.solve(&request(&edges, &[1.0, 1.0], &[0.2])).unwrap_err();
        assert!(format!("{err:#}").contains("boom"));
    }
}
