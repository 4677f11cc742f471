//! Degree-based negative prizes that discourage hub nodes.

use pcsf_common::ForestParams;

use crate::interactome::Interactome;

/// `(degree or degree²) × mu` for every node.
pub fn degree_penalties(degrees: &[u32], mu: f64, mu_squared: bool) -> Vec<f64> {
    degrees
        .iter()
        .map(|&d| {
            let d = f64::from(d);
            if mu_squared { d * d * mu } else { d * mu }
        })
        .collect()
}

/// Penalties computed once per run from the interactome degree sequence.
#[derive(Debug, Clone)]
pub struct NegativePrizeModel {
    penalties: Vec<f64>,
    exclude_terminals: bool,
}

impl NegativePrizeModel {
    pub fn new(degrees: &[u32], mu: f64, mu_squared: bool, exclude_terminals: bool) -> Self {
        Self {
            penalties: degree_penalties(degrees, mu, mu_squared),
            exclude_terminals,
        }
    }

    pub fn from_params(interactome: &Interactome, params: &ForestParams) -> Self {
        Self::new(
            interactome.degrees(),
            params.mu,
            params.mu_squared,
            params.exclude_terminals,
        )
    }

    /// Raw penalties, before terminal exclusion.
    pub fn base_penalties(&self) -> &[f64] {
        &self.penalties
    }

    /// Penalties for a given terminal set; terminals get 0 when exclusion is on.
    pub fn penalties_for(&self, terminals: &[usize]) -> Vec<f64> {
        let mut out = self.penalties.clone();
        if self.exclude_terminals {
            for &t in terminals {
                if let Some(p) = out.get_mut(t) {
                    *p = 0.0;
                }
            }
        }
        out
    }

    /// Prize vector handed to the solver: `prize - penalty`.
    pub fn effective_prizes(&self, prizes: &[f64], terminals: &[usize]) -> Vec<f64> {
        prizes
            .iter()
            .zip(self.penalties_for(terminals))
            .map(|(p, n)| p - n)
            .collect()
    }
}
