//! Volatility state: variance recurrence and realized-volatility window
//!
//! The variance estimate follows a persistence-weighted, mean-reverting
//! recurrence (GARCH-like): high-variance periods persist while slowly
//! reverting to a long-run level. Price history is a bounded ring buffer
//! used for the realized-volatility estimate behind regime classification.

use std::collections::VecDeque;

/// Trading days per year, used to annualize realized volatility
const ANNUALIZATION_DAYS: f64 = 252.0;

/// Volatility state owned by the market simulator
#[derive(Debug, Clone)]
pub struct VolatilityState {
    /// Current variance estimate (never negative)
    variance: f64,
    /// Rolling price history, oldest evicted first
    history: VecDeque<f64>,
    /// Ring buffer capacity
    capacity: usize,
    /// Log-return window for realized volatility
    window: usize,
}

impl VolatilityState {
    pub fn new(initial_volatility: f64, capacity: usize, window: usize) -> Self {
        Self {
            variance: initial_volatility * initial_volatility,
            history: VecDeque::with_capacity(capacity),
            capacity,
            window,
        }
    }

    /// Current instantaneous volatility (sqrt of variance)
    pub fn volatility(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Apply one step of the variance recurrence
    ///
    /// `v^2 <- persistence * v^2 + mean_reversion * long_run^2 + noise`
    /// where `noise` is a small non-negative perturbation supplied by the
    /// caller. The persistence term keeps high-variance periods sticky.
    pub fn update(&mut self, persistence: f64, mean_reversion: f64, long_run: f64, noise: f64) {
        self.variance = (persistence * self.variance
            + mean_reversion * long_run * long_run
            + noise)
            .max(0.0);
    }

    /// Record a new price, evicting the oldest once at capacity
    pub fn record_price(&mut self, price: f64) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(price);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Annualized realized volatility of the last `window` log-returns
    ///
    /// Returns `None` when the history is too short; callers degrade to
    /// the instantaneous estimate.
    pub fn realized_volatility(&self) -> Option<f64> {
        if self.history.len() < self.window {
            return None;
        }

        let start = self.history.len() - self.window;
        let mut returns = Vec::with_capacity(self.window - 1);
        for i in (start + 1)..self.history.len() {
            let prev = self.history[i - 1];
            let curr = self.history[i];
            if prev > 0.0 && curr > 0.0 {
                returns.push((curr / prev).ln());
            }
        }
        if returns.is_empty() {
            return None;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        Some((variance * ANNUALIZATION_DAYS).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_never_negative() {
        let mut state = VolatilityState::new(0.02, 1000, 20);
        // Even with zero inputs the recurrence must not go negative
        for _ in 0..100 {
            state.update(0.0, 0.0, 0.0, 0.0);
        }
        assert!(state.volatility() >= 0.0);
    }

    #[test]
    fn test_variance_reverts_to_long_run() {
        let mut state = VolatilityState::new(0.5, 1000, 20);
        for _ in 0..500 {
            state.update(0.9, 0.1, 0.015, 0.0);
        }
        // Should settle near the long-run volatility
        assert!((state.volatility() - 0.015).abs() < 0.001);
    }

    #[test]
    fn test_ring_buffer_eviction() {
        let mut state = VolatilityState::new(0.02, 5, 3);
        for i in 0..10 {
            state.record_price(1.0 + i as f64);
        }
        assert_eq!(state.history_len(), 5);
    }

    #[test]
    fn test_realized_volatility_requires_window() {
        let mut state = VolatilityState::new(0.02, 1000, 20);
        for i in 0..10 {
            state.record_price(1.0 + 0.01 * i as f64);
        }
        assert!(state.realized_volatility().is_none());
    }

    #[test]
    fn test_realized_volatility_zero_for_flat_prices() {
        let mut state = VolatilityState::new(0.02, 1000, 20);
        for _ in 0..30 {
            state.record_price(1.0);
        }
        let vol = state.realized_volatility().unwrap();
        assert!(vol.abs() < 1e-12);
    }
}
