//! Randomized instances: Gaussian edge-cost noise and degree-matched random terminals.
//!
//! Every trial draws from its own generator seeded by
//! [`derive_trial_seed`], so trials can run in any order or in parallel and
//! still reproduce the same draws for the same run seed.

use pcsf_common::{ForestConfig, ForestError, Result};
use pcsf_graph::Interactome;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Re-jitter attempts before falling back to the nearest free rank.
const MAX_REJITTER: usize = 16;

/// Combine the run seed and a trial index deterministically.
pub fn derive_trial_seed(run_seed: u64, trial_index: u64) -> u64 {
    run_seed.wrapping_add(trial_index.wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

pub fn trial_rng(run_seed: u64, trial_index: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(derive_trial_seed(run_seed, trial_index))
}

/// Prize vector with terminals moved to degree-matched replacements.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomTerminals {
    pub prizes: Vec<f64>,
    /// Sorted replacement IDs
    pub terminals: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct RandomizationEngine {
    edge_noise: Normal<f64>,
    rank_jitter: Normal<f64>,
    min_edges: usize,
}

impl RandomizationEngine {
    pub fn new(noise: f64, rank_jitter: f64, min_edges: usize) -> Result<Self> {
        let edge_noise = Normal::new(0.0, noise).map_err(|e| {
            ForestError::invalid_parameter("noise", format!("{noise} is not a valid standard deviation: {e}"))
        })?;
        let rank_jitter = Normal::new(0.0, rank_jitter).map_err(|e| {
            ForestError::invalid_parameter(
                "terminal_rank_jitter",
                format!("{rank_jitter} is not a valid standard deviation: {e}"),
            )
        })?;
        Ok(Self { edge_noise, rank_jitter, min_edges })
    }

    pub fn from_config(config: &ForestConfig) -> Result<Self> {
        Self::new(
            config.params.noise,
            config.run.terminal_rank_jitter,
            config.run.min_edges_for_random_terminals,
        )
    }

    /// `c + N(0, noise)` for every cost. No clamping.
    pub fn noisy_costs<R: Rng + ?Sized>(&self, costs: &[f64], rng: &mut R) -> Vec<f64> {
        costs.iter().map(|&c| c + self.edge_noise.sample(rng)).collect()
    }

    /// Fails unless the interactome has at least `min_edges` edges.
    pub fn check_random_terminals(&self, interactome: &Interactome) -> Result<()> {
        if interactome.edge_count() < self.min_edges {
            return Err(ForestError::InteractomeTooSmall {
                edges: interactome.edge_count(),
                required: self.min_edges,
            });
        }
        Ok(())
    }

    /// Move every terminal's prize to a node of similar degree rank.
    ///
    /// Ranks come from the ascending-degree order of all nodes; each terminal's
    /// rank is shifted by `N(0, rank_jitter)`, rounded and clipped to
    /// `[0, n-1]`. A rank already claimed in this draw is re-jittered, then
    /// resolved to the nearest free rank, so replacements are always distinct.
    pub fn random_terminals<R: Rng + ?Sized>(
        &self,
        interactome: &Interactome,
        prizes: &[f64],
        terminals: &[usize],
        rng: &mut R,
    ) -> Result<RandomTerminals> {
        self.check_random_terminals(interactome)?;

        let order = interactome.nodes_sorted_by_degree();
        let n = order.len();
        let mut rank_of = vec![0usize; n];
        for (rank, &id) in order.iter().enumerate() {
            rank_of[id] = rank;
        }

        let mut claimed = vec![false; n];
        let mut new_prizes = vec![0.0f64; prizes.len()];
        let mut new_terminals = Vec::with_capacity(terminals.len());
        let mut collisions = 0usize;

        for &terminal in terminals {
            let (Some(&rank), Some(&prize)) = (rank_of.get(terminal), prizes.get(terminal)) else {
                continue;
            };

            let (chosen, collided) = self.pick_rank(rank, &claimed, rng);
            collisions += collided;
            claimed[chosen] = true;

            let replacement = order[chosen];
            if let Some(slot) = new_prizes.get_mut(replacement) {
                *slot = prize;
            }
            new_terminals.push(replacement);
        }

        new_terminals.sort_unstable();
        debug!(terminals = new_terminals.len(), collisions, "Drew random terminals");

        Ok(RandomTerminals { prizes: new_prizes, terminals: new_terminals })
    }

    fn jitter_rank<R: Rng + ?Sized>(&self, rank: usize, n: usize, rng: &mut R) -> usize {
        let shifted = rank as f64 + self.rank_jitter.sample(rng);
        shifted.round().clamp(0.0, (n - 1) as f64) as usize
    }

    /// Returns the chosen rank and how many draws collided.
    fn pick_rank<R: Rng + ?Sized>(&self, rank: usize, claimed: &[bool], rng: &mut R) -> (usize, usize) {
        let n = claimed.len();
        for attempt in 0..MAX_REJITTER {
            let r = self.jitter_rank(rank, n, rng);
            if !claimed[r] {
                return (r, attempt);
            }
        }
        (nearest_free(rank, claimed), MAX_REJITTER)
    }
}

/// Closest unclaimed rank to `rank`, preferring the lower one on ties.
fn nearest_free(rank: usize, claimed: &[bool]) -> usize {
    let n = claimed.len();
    for d in 0..n {
        if d <= rank && !claimed[rank - d] {
            return rank - d;
        }
        if rank + d < n && !claimed[rank + d] {
            return rank + d;
        }
    }
    // Callers never claim more ranks than there are nodes.
    rank
}
