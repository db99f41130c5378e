//! Market simulator
//!
//! `advance()` produces one snapshot per cycle: updates the variance
//! recurrence, draws a fat-tailed return scaled by sqrt(volatility * dt),
//! and derives spread and depth from the new volatility level.

use crate::volatility::VolatilityState;
use helios_core::{MarketRegime, MarketSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Market process parameters
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Starting (normalized) price
    pub initial_price: f64,
    /// Starting instantaneous volatility
    pub initial_volatility: f64,
    /// Long-run volatility the variance reverts to
    pub long_run_volatility: f64,
    /// Variance persistence weight
    pub persistence: f64,
    /// Variance mean-reversion weight
    pub mean_reversion: f64,
    /// Scale of the symmetric variance perturbation
    pub noise_scale: f64,
    /// Probability of scaling a return draw to fatten the tail
    pub fat_tail_probability: f64,
    /// Floor on elapsed time between snapshots, in days
    pub min_dt_days: f64,
    /// Price history ring capacity
    pub history_capacity: usize,
    /// Log-return window for realized volatility
    pub volatility_window: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_price: 1.0,
            initial_volatility: 0.02,
            long_run_volatility: 0.015,
            persistence: 0.9,
            mean_reversion: 0.1,
            noise_scale: 0.01,
            fat_tail_probability: 0.05,
            min_dt_days: 0.001,
            history_capacity: 1000,
            volatility_window: 20,
        }
    }
}

/// Synthetic market data source
///
/// Never fails: with insufficient history the realized-volatility
/// estimate degrades to the instantaneous one.
pub struct MarketSimulator {
    config: MarketConfig,
    state: VolatilityState,
    price: f64,
    last_update: Option<Instant>,
    rng: StdRng,
}

impl MarketSimulator {
    pub fn new(config: MarketConfig) -> Self {
        let state = VolatilityState::new(
            config.initial_volatility,
            config.history_capacity,
            config.volatility_window,
        );
        Self {
            price: config.initial_price,
            state,
            config,
            last_update: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a specific seed for reproducible simulations
    pub fn with_seed(config: MarketConfig, seed: u64) -> Self {
        let mut simulator = Self::new(config);
        simulator.rng = StdRng::seed_from_u64(seed);
        simulator
    }

    /// Produce the next market snapshot
    pub fn advance(&mut self) -> MarketSnapshot {
        let dt_days = self.elapsed_days();

        // Volatility clustering: persistence-weighted variance recurrence
        // with a small symmetric perturbation.
        let u: f64 = self.rng.r#gen();
        let noise = self.config.noise_scale * (u - 0.5) * (u - 0.5);
        self.state.update(
            self.config.persistence,
            self.config.mean_reversion,
            self.config.long_run_volatility,
            noise,
        );
        let volatility = self.state.volatility();

        // Fat-tailed return: occasionally scale the normal draw
        let mut shock = standard_normal(&mut self.rng);
        if self.rng.gen_bool(self.config.fat_tail_probability) {
            shock *= (5.0_f64 / 3.0).sqrt();
        }

        let price_return = volatility * shock * dt_days.sqrt();
        self.price *= 1.0 + price_return;
        self.state.record_price(self.price);

        // Spread and depth both worsen as volatility rises
        let spread = (0.5 * volatility).max(0.0005);
        let depth = (50_000.0 / (1.0 + 100.0 * volatility)).max(1000.0);
        let volume = self.rng.gen_range(100_000.0..1_100_000.0);

        log::trace!(
            "[MARKET] price={:.6} vol={:.4} spread={:.5} depth={:.0}",
            self.price,
            volatility,
            spread,
            depth
        );

        MarketSnapshot::new(self.price, volatility, spread, depth, volume)
    }

    /// Annualized realized volatility of recent log-returns
    ///
    /// Degrades to the instantaneous estimate when history is short.
    pub fn recent_volatility(&self) -> f64 {
        self.state
            .realized_volatility()
            .unwrap_or_else(|| self.state.volatility())
    }

    /// Current market regime from recent volatility
    pub fn regime(&self) -> MarketRegime {
        MarketRegime::from_volatility(self.recent_volatility())
    }

    pub fn last_price(&self) -> f64 {
        self.price
    }

    /// Wall-clock time since the previous snapshot, in days, floored
    fn elapsed_days(&mut self) -> f64 {
        let now = Instant::now();
        let dt = match self.last_update {
            Some(prev) => now.duration_since(prev).as_secs_f64() / 86_400.0,
            None => 0.0,
        };
        self.last_update = Some(now);
        dt.max(self.config.min_dt_days)
    }
}

/// Standard-normal draw via the Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
