//! Configuration loading for pcsf.
//! Reads pcsf.toml (or a YAML equivalent) from the current directory or the path in PCSF_CONFIG.
//!
//! Every option of a run lives here and is handed to the pipeline at
//! construction time; nothing is read from process-wide state afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ForestError, Result};

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Input / output locations
    #[serde(default)]
    pub input: InputConfig,

    /// Algorithm parameters
    #[serde(default)]
    pub params: ForestParams,

    /// Randomization and ensemble options
    #[serde(default)]
    pub run: RunConfig,

    /// External solver invocation
    #[serde(default)]
    pub solver: SolverConfig,
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Tab-delimited `nodeA\tnodeB\tcost`
    #[serde(default = "default_edge_file")]
    pub edge_file: PathBuf,

    /// Tab-delimited `nodeName\tprize`
    #[serde(default = "default_prize_file")]
    pub prize_file: PathBuf,

    /// Additional prize tables merged after `prize_file`
    #[serde(default)]
    pub extra_prize_files: Vec<PathBuf>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Proteins removed from the interactome before indexing
    #[serde(default)]
    pub knockout: Vec<String>,
}

fn default_edge_file()  -> PathBuf { PathBuf::from("interactome.tsv") }
fn default_prize_file() -> PathBuf { PathBuf::from("prizes.tsv") }
fn default_output_dir() -> PathBuf { PathBuf::from("./output") }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            edge_file: default_edge_file(),
            prize_file: default_prize_file(),
            extra_prize_files: vec![],
            output_dir: default_output_dir(),
            knockout: vec![],
        }
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Which interactome nodes a dummy root is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyMode {
    #[default]
    Terminals,
    #[serde(alias = "others")]
    Other,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    #[serde(default = "default_w")]
    pub w: f64,
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_gb")]
    pub gb: f64,
    /// Depth bound
    #[serde(default = "default_d", rename = "D", alias = "d")]
    pub d: f64,
    /// Hub penalty coefficient
    #[serde(default = "default_mu")]
    pub mu: f64,
    #[serde(default)]
    pub r: Option<f64>,
    /// Standard deviation of the Gaussian edge-cost noise
    #[serde(default = "default_noise")]
    pub noise: f64,
    #[serde(default, alias = "dummyMode")]
    pub dummy_mode: DummyMode,
    /// Penalise hubs by degree² instead of degree
    #[serde(default, alias = "muSquared")]
    pub mu_squared: bool,
    /// Terminals keep their assigned prize regardless of degree
    #[serde(default, alias = "excludeTerminals")]
    pub exclude_terminals: bool,
}

fn default_w()     -> f64 { 6.0 }
fn default_b()     -> f64 { 12.0 }
fn default_gb()    -> f64 { 0.1 }
fn default_d()     -> f64 { 6.0 }
fn default_mu()    -> f64 { 0.04 }
fn default_noise() -> f64 { 0.33 }

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            w: default_w(),
            b: default_b(),
            gb: default_gb(),
            d: default_d(),
            mu: default_mu(),
            r: None,
            noise: default_noise(),
            dummy_mode: DummyMode::default(),
            mu_squared: false,
            exclude_terminals: false,
        }
    }
}

// ── Run options ───────────────────────────────────────────────────────────────

/// Solver pruning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruningMode {
    None,
    Simple,
    Gw,
    #[default]
    Strong,
}

impl PruningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PruningMode::None => "none",
            PruningMode::Simple => "simple",
            PruningMode::Gw => "gw",
            PruningMode::Strong => "strong",
        }
    }
}

impl FromStr for PruningMode {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PruningMode::None),
            "simple" => Ok(PruningMode::Simple),
            "gw" => Ok(PruningMode::Gw),
            "strong" => Ok(PruningMode::Strong),
            other => Err(ForestError::invalid_parameter(
                "pruning",
                format!("unknown mode '{other}' (expected none, simple, gw or strong)"),
            )),
        }
    }
}

/// How repeated names in a prize table are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePrizePolicy {
    /// Later record wins
    #[default]
    Last,
    Sum,
    Max,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub noisy_edges_repetitions: usize,
    #[serde(default)]
    pub random_terminals_repetitions: usize,
    /// Run seed; drawn from system entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Also solve the unperturbed instance (reported apart from the ensemble)
    #[serde(default = "bool_true")]
    pub include_base_trial: bool,
    /// Execute trials on the rayon pool
    #[serde(default = "bool_true")]
    pub parallel: bool,
    /// Root protein for rooted PCST; unrooted when absent
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default = "default_num_clusters")]
    pub num_clusters: usize,
    #[serde(default)]
    pub pruning: PruningMode,
    #[serde(default)]
    pub verbosity: u32,
    /// Std-dev of the degree-rank jitter used by random terminals
    #[serde(default = "default_rank_jitter")]
    pub terminal_rank_jitter: f64,
    #[serde(default = "default_min_edges")]
    pub min_edges_for_random_terminals: usize,
    #[serde(default)]
    pub duplicate_prizes: DuplicatePrizePolicy,
    /// Add non-selected interactome edges between forest nodes
    #[serde(default)]
    pub augment_forest: bool,
}

fn bool_true()            -> bool  { true }
fn default_num_clusters() -> usize { 1 }
fn default_rank_jitter()  -> f64   { 100.0 }
fn default_min_edges()    -> usize { 50 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            noisy_edges_repetitions: 0,
            random_terminals_repetitions: 0,
            seed: None,
            include_base_trial: true,
            parallel: true,
            root: None,
            num_clusters: default_num_clusters(),
            pruning: PruningMode::default(),
            verbosity: 0,
            terminal_rank_jitter: default_rank_jitter(),
            min_edges_for_random_terminals: default_min_edges(),
            duplicate_prizes: DuplicatePrizePolicy::default(),
            augment_forest: false,
        }
    }
}

impl RunConfig {
    pub fn is_ensemble(&self) -> bool {
        self.noisy_edges_repetitions + self.random_terminals_repetitions > 0
    }
}

// ── Solver ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Executable speaking the JSON solver protocol on stdin/stdout
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

mod tests;

impl ForestConfig {
    /// Load configuration from pcsf.toml.
    /// Checks PCSF_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var("PCSF_CONFIG")
            .unwrap_or_else(|_| "pcsf.toml".to_string());
        Self::load_from(&path)
    }

    /// Load from an explicit path. `.yaml`/`.yml` files are parsed as YAML, anything else as TOML.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForestError::Config(format!(
                "Config file not found: {}\nCopy pcsf.example.toml to pcsf.toml and edit it.",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ForestError::io(path, e))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ForestError::Config(e.to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ForestError::Config(e.to_string()))
    }

    /// Reject parameter values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.params;
        if !p.mu.is_finite() || p.mu < 0.0 {
            return Err(ForestError::invalid_parameter("mu", format!("must be finite and >= 0, got {}", p.mu)));
        }
        if !p.noise.is_finite() || p.noise < 0.0 {
            return Err(ForestError::invalid_parameter("noise", format!("must be finite and >= 0, got {}", p.noise)));
        }
        let r = &self.run;
        if !r.terminal_rank_jitter.is_finite() || r.terminal_rank_jitter < 0.0 {
            return Err(ForestError::invalid_parameter(
                "terminal_rank_jitter",
                format!("must be finite and >= 0, got {}", r.terminal_rank_jitter),
            ));
        }
        if r.num_clusters == 0 {
            return Err(ForestError::invalid_parameter("num_clusters", "must be at least 1"));
        }
        Ok(())
    }
}
