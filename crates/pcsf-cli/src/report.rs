//! Run report written next to the forest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pcsf_common::ForestConfig;
use pcsf_ensemble::ForestOutcome;
use pcsf_graph::{Interactome, Knockout, MissingTerminal, PrizeMapping};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub version: String,
    pub run_seed: Option<u64>,

    pub noisy_edges_repetitions: usize,
    pub random_terminals_repetitions: usize,
    pub base_trial: bool,
    /// Randomized trials counted in the occurrence fractions
    pub trials_counted: usize,

    pub interactome_nodes: usize,
    pub interactome_edges: usize,
    pub suspicious_costs: usize,
    pub knocked_out_edges: usize,
    pub unmatched_knockouts: Vec<String>,

    pub terminals: usize,
    pub missing_terminals: Vec<MissingTerminal>,

    pub forest_nodes: usize,
    pub forest_edges: usize,
}

impl RunReport {
    pub fn begin(config: &ForestConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_seed: config.run.seed,
            noisy_edges_repetitions: config.run.noisy_edges_repetitions,
            random_terminals_repetitions: config.run.random_terminals_repetitions,
            base_trial: false,
            trials_counted: 0,
            interactome_nodes: 0,
            interactome_edges: 0,
            suspicious_costs: 0,
            knocked_out_edges: 0,
            unmatched_knockouts: vec![],
            terminals: 0,
            missing_terminals: vec![],
            forest_nodes: 0,
            forest_edges: 0,
        }
    }

    pub fn record_inputs(&mut self, interactome: &Interactome, knockout: &Knockout, mapping: &PrizeMapping) {
        self.interactome_nodes = interactome.node_count();
        self.interactome_edges = interactome.edge_count();
        self.suspicious_costs = interactome.suspicious_costs().len();
        self.knocked_out_edges = knockout.removed_edges;
        self.unmatched_knockouts = knockout.unmatched.clone();
        self.terminals = mapping.terminal_count();
        self.missing_terminals = mapping.missing.clone();
    }

    pub fn finish(&mut self, outcome: &ForestOutcome) {
        self.run_seed = Some(outcome.run_seed);
        self.base_trial = outcome.base.is_some();
        self.trials_counted = outcome.trials;
        self.forest_nodes = outcome.forest.node_count();
        self.forest_edges = outcome.forest.edge_count();
        self.finished_at = Some(Utc::now());
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("report.json");
        let json = serde_json::to_string_pretty(self).context("Failed to encode run report")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// `name\tprize\tsource\tline` for every prize row absent from the interactome.
pub fn missing_terminals_tsv(missing: &[MissingTerminal]) -> String {
    missing
        .iter()
        .map(|m| {
            let line = m.line.map(|l| l.to_string()).unwrap_or_default();
            format!("{}\t{}\t{}\t{}\n", m.name, m.prize, m.source, line)
        })
        .collect()
}
