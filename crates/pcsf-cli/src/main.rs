//! `pcsf`: run a PCSF ensemble from a config file.
//!
//! Usage: `pcsf [CONFIG]`. Without an argument the config is read from
//! `$PCSF_CONFIG`, falling back to `./pcsf.toml`.

mod report;

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use pcsf_common::ForestConfig;
use pcsf_ensemble::{CommandSolver, ForestRun};
use pcsf_graph::{knock_out, read_edge_records, Interactome, PrizeTable};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::report::{missing_terminals_tsv, RunReport};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pcsf=debug,info")),
        )
        .init();

    info!("pcsf {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => ForestConfig::load_from(&path),
        None => ForestConfig::load(),
    }
    .context("Could not load configuration")?;

    run(&config)
}

fn run(config: &ForestConfig) -> Result<()> {
    let mut report = RunReport::begin(config);
    let input = &config.input;

    // Interactome
    let edge_file = File::open(&input.edge_file)
        .with_context(|| format!("Failed to open edge file {}", input.edge_file.display()))?;
    let records = read_edge_records(edge_file, &input.edge_file.display().to_string())?;
    let knockout = knock_out(records, &input.knockout);
    let interactome = Interactome::from_records(knockout.records.iter().cloned())?;

    // Prizes
    let mut table = PrizeTable::from_path(&input.prize_file)?;
    for extra in &input.extra_prize_files {
        table = table.merge(PrizeTable::from_path(extra)?);
    }
    let mapping = table.map_onto(&interactome, config.run.duplicate_prizes);
    report.record_inputs(&interactome, &knockout, &mapping);

    let solver = CommandSolver::from_config(&config.solver)
        .context("No solver configured: set [solver].command in the config file")?;
    info!(solver = %solver.program().display(), "Using external PCST solver");

    let outcome = ForestRun::new(config, &interactome, &mapping, &solver)?.run()?;
    report.finish(&outcome);

    // Outputs
    let out = &input.output_dir;
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    write_json(&out.join("forest.json"), &outcome.forest)?;
    if let Some(base) = outcome.ensemble.as_ref().and(outcome.base.as_ref()) {
        write_json(&out.join("base_forest.json"), base)?;
    }
    if !mapping.missing.is_empty() {
        let path = out.join("missing_terminals.tsv");
        fs::write(&path, missing_terminals_tsv(&mapping.missing))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        warn!(
            count = mapping.missing.len(),
            path = %path.display(),
            "Some prize names are not in the interactome"
        );
    }
    let report_path = report.write(out)?;

    info!(
        run_id = %report.run_id,
        run_seed = outcome.run_seed,
        nodes = outcome.forest.node_count(),
        edges = outcome.forest.edge_count(),
        report = %report_path.display(),
        "Forest written"
    );
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
