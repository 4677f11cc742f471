//! pcsf-common: Shared error taxonomy and configuration used across all pcsf crates.

pub mod error;
pub mod config;

// Re-export commonly used types
pub use error::{ForestError, Result};
pub use config::{
    DummyMode, DuplicatePrizePolicy, ForestConfig, ForestParams, InputConfig, PruningMode,
    RunConfig, SolverConfig,
};
