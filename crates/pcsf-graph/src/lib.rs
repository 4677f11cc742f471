//! pcsf-graph: Interactome indexing, prize mapping and hub penalties.
//!
//! Everything here is built once per run and read-only afterwards; the
//! randomized trials in `pcsf-ensemble` borrow these structures and never
//! mutate them.

pub mod interactome;
pub mod prizes;
pub mod penalty;
mod tsv;

pub use interactome::{knock_out, read_edge_records, EdgeRecord, EdgeView, Interactome, Knockout, SuspiciousCost};
pub use prizes::{MissingTerminal, PrizeMapping, PrizeRecord, PrizeTable};
pub use penalty::{degree_penalties, NegativePrizeModel};
