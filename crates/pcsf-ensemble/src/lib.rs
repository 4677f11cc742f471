//! pcsf-ensemble: Randomized PCSF trials and their aggregation.
//!
//! A run solves the unperturbed instance and/or a set of randomized
//! instances (noisy edge costs, degree-matched random terminals) through a
//! [`SolverAdapter`], counts how often every vertex and edge is selected,
//! and materializes the result as an [`AnnotatedForest`].

pub mod solver;
pub mod randomize;
pub mod aggregate;
pub mod forest;
pub mod run;

pub use solver::{CommandSolver, MockSolver, SolverAdapter, SolverRequest, TrialResult};
pub use randomize::{derive_trial_seed, trial_rng, RandomTerminals, RandomizationEngine};
pub use aggregate::{EdgeOccurrence, EnsembleStats, NodeOccurrence, OccurrenceCounter};
pub use forest::{AnnotatedForest, ForestEdge, ForestNode};
pub use run::{ForestOutcome, ForestRun, TrialKind, TrialSpec};
