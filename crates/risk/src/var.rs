//! Monte-Carlo portfolio Value-at-Risk
//!
//! Marginal VaR per strategy from simulated one-period P&L shocks,
//! aggregated through the ledger's correlation matrix as a quadratic
//! form so diversification and concentration both show up.

use crate::ledger::PortfolioLedger;
use helios_core::MarketSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Monte-Carlo VaR estimator
///
/// Owns its RNG so repeated estimates are reproducible under a seed.
pub struct VarEstimator {
    draws: usize,
    rng: StdRng,
}

impl VarEstimator {
    pub fn new() -> Self {
        Self {
            draws: 10_000,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a specific seed for reproducible estimates
    pub fn with_seed(seed: u64) -> Self {
        Self {
            draws: 10_000,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Marginal VaR of a single position at the given confidence level
    ///
    /// Simulates `position * volatility * N(0,1)` P&L shocks, keeps the
    /// loss magnitudes sorted descending, and reads the value at rank
    /// `floor(n * (1 - confidence/100))`.
    pub fn marginal_var(&mut self, position: f64, volatility: f64, confidence: f64) -> f64 {
        let mut losses = Vec::with_capacity(self.draws / 2);
        for _ in 0..self.draws {
            let shock = standard_normal(&mut self.rng);
            let pnl_change = position * volatility * shock;
            if pnl_change < 0.0 {
                losses.push(-pnl_change);
            }
        }

        losses.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let index = (losses.len() as f64 * (1.0 - confidence / 100.0)).floor() as usize;
        losses.get(index).copied().unwrap_or(0.0)
    }

    /// Portfolio VaR across strategies
    ///
    /// `sqrt(sum_ij var_i * var_j * rho_ij)` over the ledger's correlation
    /// matrix; a quadratic form rather than a simple sum.
    pub fn portfolio_var(
        &mut self,
        ledger: &PortfolioLedger,
        strategy_ids: &[String],
        snapshot: &MarketSnapshot,
    ) -> f64 {
        let confidence = ledger.limits().var_confidence;
        let marginals: Vec<f64> = strategy_ids
            .iter()
            .map(|id| self.marginal_var(ledger.position(id), snapshot.volatility, confidence))
            .collect();

        let mut quadratic = 0.0;
        for (i, var_i) in marginals.iter().enumerate() {
            for (j, var_j) in marginals.iter().enumerate() {
                quadratic += var_i * var_j * ledger.correlation(i, j);
            }
        }
        quadratic.max(0.0).sqrt()
    }
}

impl Default for VarEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard-normal draw via the Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
