//! `ForestRun`: one configured PCSF run from mapped inputs to an annotated forest.
//!
//! The run owns nothing global. Interactome and prize mapping are borrowed
//! read-only and shared by every trial; each randomized trial overlays its own
//! costs or prizes through `Cow` and seeds its own generator from the run seed
//! and its trial index.

use std::borrow::Cow;
use std::fmt;

use pcsf_common::{ForestConfig, ForestError, Result};
use pcsf_graph::{Interactome, NegativePrizeModel, PrizeMapping};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::aggregate::{EnsembleStats, OccurrenceCounter};
use crate::forest::AnnotatedForest;
use crate::randomize::{trial_rng, RandomizationEngine};
use crate::solver::{SolverAdapter, SolverRequest, TrialResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrialKind {
    Base,
    NoisyEdges,
    RandomTerminals,
}

impl TrialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialKind::Base => "base",
            TrialKind::NoisyEdges => "noisy-edges",
            TrialKind::RandomTerminals => "random-terminals",
        }
    }
}

/// One planned solver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialSpec {
    pub kind: TrialKind,
    /// 1-based repetition within its kind
    pub repetition: usize,
    /// Repetitions of this kind in the run
    pub total: usize,
    /// Run-wide trial index; the base trial is 0
    pub index: usize,
}

impl TrialSpec {
    pub fn base() -> Self {
        Self { kind: TrialKind::Base, repetition: 1, total: 1, index: 0 }
    }
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TrialKind::Base => write!(f, "base trial"),
            kind => write!(f, "{} trial {} of {}", kind.as_str(), self.repetition, self.total),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ForestOutcome {
    /// Forest of the unperturbed instance, when it was solved
    pub base: Option<AnnotatedForest>,
    /// Occurrence statistics over the randomized trials
    pub ensemble: Option<EnsembleStats>,
    /// The ensemble forest if any randomized trials ran, the base forest otherwise
    pub forest: AnnotatedForest,
    pub run_seed: u64,
    /// Randomized trials counted in the fractions
    pub trials: usize,
}

pub struct ForestRun<'a, S: SolverAdapter + ?Sized> {
    config: &'a ForestConfig,
    interactome: &'a Interactome,
    mapping: &'a PrizeMapping,
    solver: &'a S,
    penalties: NegativePrizeModel,
    engine: RandomizationEngine,
    base_prizes: Vec<f64>,
    root: Option<usize>,
    run_seed: u64,
}

impl<'a, S: SolverAdapter + ?Sized> ForestRun<'a, S> {
    pub fn new(
        config: &'a ForestConfig,
        interactome: &'a Interactome,
        mapping: &'a PrizeMapping,
        solver: &'a S,
    ) -> Result<Self> {
        config.validate()?;

        let root = match &config.run.root {
            Some(name) => Some(interactome.node_id(name).ok_or_else(|| {
                ForestError::invalid_parameter("root", format!("protein '{name}' is not in the interactome"))
            })?),
            None => None,
        };

        let engine = RandomizationEngine::from_config(config)?;
        if config.run.random_terminals_repetitions > 0 {
            engine.check_random_terminals(interactome)?;
        }

        let penalties = NegativePrizeModel::from_params(interactome, &config.params);
        let base_prizes = penalties.effective_prizes(&mapping.prizes, &mapping.terminals);

        let run_seed = match config.run.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!(run_seed = seed, "No seed configured; drew one from system entropy");
                seed
            }
        };

        Ok(Self {
            config,
            interactome,
            mapping,
            solver,
            penalties,
            engine,
            base_prizes,
            root,
            run_seed,
        })
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// Randomized trials in execution order: noisy edges first, then random terminals.
    pub fn plan(&self) -> Vec<TrialSpec> {
        let r1 = self.config.run.noisy_edges_repetitions;
        let r2 = self.config.run.random_terminals_repetitions;

        let noisy = (1..=r1).map(|rep| TrialSpec {
            kind: TrialKind::NoisyEdges,
            repetition: rep,
            total: r1,
            index: rep,
        });
        let random = (1..=r2).map(|rep| TrialSpec {
            kind: TrialKind::RandomTerminals,
            repetition: rep,
            total: r2,
            index: r1 + rep,
        });
        noisy.chain(random).collect()
    }

    pub fn solve_base(&self) -> Result<TrialResult> {
        self.run_trial(&TrialSpec::base())
    }

    /// Build the trial's instance overlay and hand it to the solver.
    pub fn run_trial(&self, spec: &TrialSpec) -> Result<TrialResult> {
        let mut rng = trial_rng(self.run_seed, spec.index as u64);
        let base_costs = self.interactome.costs();

        let (costs, prizes): (Cow<'_, [f64]>, Cow<'_, [f64]>) = match spec.kind {
            TrialKind::Base => (Cow::Borrowed(base_costs), Cow::Borrowed(self.base_prizes.as_slice())),
            TrialKind::NoisyEdges => (
                Cow::Owned(self.engine.noisy_costs(base_costs, &mut rng)),
                Cow::Borrowed(self.base_prizes.as_slice()),
            ),
            TrialKind::RandomTerminals => {
                let drawn = self.engine.random_terminals(
                    self.interactome,
                    &self.mapping.prizes,
                    &self.mapping.terminals,
                    &mut rng,
                )?;
                let prizes = self.penalties.effective_prizes(&drawn.prizes, &drawn.terminals);
                (Cow::Borrowed(base_costs), Cow::Owned(prizes))
            }
        };

        let request = SolverRequest {
            edges: self.interactome.edges(),
            prizes: &prizes,
            costs: &costs,
            root: self.root,
            num_clusters: self.config.run.num_clusters,
            pruning: self.config.run.pruning,
            verbosity: self.config.run.verbosity,
            params: &self.config.params,
        };

        let result = self.solver.solve(&request).map_err(|e| ForestError::Solver {
            trial: spec.to_string(),
            reason: format!("{e:#}"),
        })?;

        debug!(
            trial = %spec,
            vertices = result.vertices.len(),
            edges = result.edges.len(),
            "Trial solved"
        );
        Ok(result)
    }

    /// Solve every planned trial and count selections. The first failing trial aborts.
    pub fn run_ensemble(&self, plan: &[TrialSpec]) -> Result<OccurrenceCounter> {
        if self.config.run.parallel {
            plan.par_iter()
                .map(|spec| self.run_trial(spec).map(|r| OccurrenceCounter::from_trial(&r)))
                .try_reduce(OccurrenceCounter::new, |a, b| Ok(a.merge(b)))
        } else {
            plan.iter().try_fold(OccurrenceCounter::new(), |mut counter, spec| {
                counter.record(&self.run_trial(spec)?);
                Ok(counter)
            })
        }
    }

    #[instrument(skip(self), fields(run_seed = self.run_seed))]
    pub fn run(&self) -> Result<ForestOutcome> {
        let ensemble_mode = self.config.run.is_ensemble();
        info!(
            nodes = self.interactome.node_count(),
            edges = self.interactome.edge_count(),
            terminals = self.mapping.terminal_count(),
            noisy_edges = self.config.run.noisy_edges_repetitions,
            random_terminals = self.config.run.random_terminals_repetitions,
            "Starting PCSF run"
        );

        let base = if !ensemble_mode || self.config.run.include_base_trial {
            let result = self.solve_base()?;
            Some(AnnotatedForest::from_trial(&result, self.interactome, self.mapping))
        } else {
            None
        };

        let (ensemble, mut forest) = if ensemble_mode {
            let plan = self.plan();
            let counter = self.run_ensemble(&plan)?;
            let stats = counter.resolve(self.interactome);
            let forest = AnnotatedForest::from_ensemble(&stats, self.interactome, self.mapping);
            (Some(stats), forest)
        } else {
            let forest = base.clone().ok_or_else(|| {
                ForestError::Config("no trials to run: enable the base trial or a randomization".to_string())
            })?;
            (None, forest)
        };

        if self.config.run.augment_forest {
            forest.augment(self.interactome);
        }

        let trials = ensemble.as_ref().map_or(0, |s| s.trials);
        info!(
            nodes = forest.node_count(),
            edges = forest.edge_count(),
            trials,
            "PCSF run finished"
        );

        Ok(ForestOutcome { base, ensemble, forest, run_seed: self.run_seed, trials })
    }
}
