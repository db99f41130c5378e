//! Portfolio ledger: positions, daily P&L, and trade gating
//!
//! `PortfolioLedger` is the synchronous state machine; `RiskLedger` wraps
//! it in a single async mutex shared by all strategies. The emergency
//! flag is sticky: once set it suspends all new approvals until
//! `reset_daily()`.

use helios_core::{MarketSnapshot, RiskLimits};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Default pairwise correlation assumed when no matrix is supplied.
/// A placeholder, not a calibrated model; override with
/// `set_correlation_matrix` when better data exists.
const DEFAULT_CORRELATION: f64 = 0.3;

/// Fraction of the daily loss limit that triggers emergency mode early
const EMERGENCY_LOSS_FRACTION: f64 = 0.8;

/// Largest order as a fraction of snapshot depth
const MAX_DEPTH_FRACTION: f64 = 0.1;

/// Volatility level above which crisis sizing applies
const CRISIS_VOLATILITY: f64 = 0.5;

/// Fraction of the position cap allowed per order in crisis volatility
const CRISIS_SIZE_FRACTION: f64 = 0.2;

/// Outcome of a pre-trade check
#[derive(Debug, Clone, PartialEq)]
pub enum TradeDecision {
    Approved,
    Rejected {
        reason: String,
        /// Largest size that would pass, signed toward the requested
        /// direction, when a smaller order could still be approved
        max_allowed_size: Option<f64>,
    },
}

impl TradeDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, TradeDecision::Approved)
    }

    fn rejected(reason: impl Into<String>) -> Self {
        TradeDecision::Rejected {
            reason: reason.into(),
            max_allowed_size: None,
        }
    }

    fn rejected_with_max(reason: impl Into<String>, max_allowed_size: f64) -> Self {
        TradeDecision::Rejected {
            reason: reason.into(),
            max_allowed_size: Some(max_allowed_size),
        }
    }
}

/// Shared portfolio state, exclusively owned by the risk component
pub struct PortfolioLedger {
    limits: RiskLimits,
    /// strategy id -> signed position
    positions: HashMap<String, f64>,
    /// strategy id -> cumulative daily P&L
    daily_pnl: HashMap<String, f64>,
    /// Sticky protective throttle, cleared only by `reset_daily`
    emergency: bool,
    /// Optional empirical correlation matrix (symmetric, unit diagonal)
    correlation: Option<Vec<Vec<f64>>>,
}

impl PortfolioLedger {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            positions: HashMap::new(),
            daily_pnl: HashMap::new(),
            emergency: false,
            correlation: None,
        }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Supply an empirical correlation matrix, replacing the flat default
    pub fn set_correlation_matrix(&mut self, matrix: Vec<Vec<f64>>) {
        self.correlation = Some(matrix);
    }

    /// Pairwise correlation between strategy indices
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        if let Some(matrix) = &self.correlation
            && let Some(value) = matrix.get(i).and_then(|row| row.get(j))
        {
            return *value;
        }
        if i == j { 1.0 } else { DEFAULT_CORRELATION }
    }

    pub fn position(&self, strategy_id: &str) -> f64 {
        self.positions.get(strategy_id).copied().unwrap_or(0.0)
    }

    pub fn positions(&self) -> HashMap<String, f64> {
        self.positions.clone()
    }

    /// Aggregate daily P&L across all strategies
    pub fn total_daily_pnl(&self) -> f64 {
        self.daily_pnl.values().sum()
    }

    /// Sum of absolute positions across strategies
    pub fn total_exposure(&self) -> f64 {
        self.positions.values().map(|p| p.abs()).sum()
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    /// Pre-trade approval gate
    ///
    /// Checks run in a fixed order; the first failing check wins and there
    /// is no partial approval.
    pub fn pre_trade_check(
        &self,
        strategy_id: &str,
        size: f64,
        snapshot: &MarketSnapshot,
    ) -> TradeDecision {
        // 1. Emergency throttle
        if self.emergency {
            return TradeDecision::rejected("Emergency mode active - no new trades");
        }

        // 2. Daily loss limit
        if self.total_daily_pnl() <= -self.limits.max_daily_loss {
            return TradeDecision::rejected("Daily loss limit exceeded");
        }

        // 3. Per-strategy position cap
        let current = self.position(strategy_id);
        let new_position = current + size;
        if new_position.abs() > self.limits.max_position_size {
            let max_allowed = size.signum() * (self.limits.max_position_size - current.abs());
            return TradeDecision::rejected_with_max("Position size limit exceeded", max_allowed);
        }

        // 4. Liquidity
        if size.abs() > snapshot.depth * MAX_DEPTH_FRACTION {
            return TradeDecision::rejected("Insufficient liquidity for trade size");
        }

        // 5. Volatility-based sizing
        if snapshot.volatility > CRISIS_VOLATILITY {
            let max_crisis_size = self.limits.max_position_size * CRISIS_SIZE_FRACTION;
            if size.abs() > max_crisis_size {
                return TradeDecision::rejected_with_max(
                    "Trade size too large for current volatility",
                    size.signum() * max_crisis_size,
                );
            }
        }

        TradeDecision::Approved
    }

    /// Atomically apply a position delta and a P&L delta, then evaluate
    /// the emergency transition
    pub fn settle(&mut self, strategy_id: &str, position_delta: f64, pnl_delta: f64) {
        *self.positions.entry(strategy_id.to_string()).or_insert(0.0) += position_delta;
        *self.daily_pnl.entry(strategy_id.to_string()).or_insert(0.0) += pnl_delta;
        self.check_emergency_conditions();
    }

    fn check_emergency_conditions(&mut self) {
        if self.emergency {
            return;
        }
        let total_pnl = self.total_daily_pnl();
        let total_exposure = self.total_exposure();
        if total_pnl <= -self.limits.max_daily_loss * EMERGENCY_LOSS_FRACTION
            || total_exposure > self.limits.max_aggregate_exposure
        {
            self.emergency = true;
            log::error!(
                "[RISK] Emergency mode activated: pnl={:.4} exposure={:.4}",
                total_pnl,
                total_exposure
            );
        }
    }

    /// Start a new trading day: clears P&L and the emergency flag.
    /// Positions persist.
    pub fn reset_daily(&mut self) {
        log::info!(
            "[RISK] Daily reset: P&L was {:.4}",
            self.total_daily_pnl()
        );
        self.daily_pnl.clear();
        self.emergency = false;
    }
}

/// Handle to the shared ledger
///
/// Cloneable; every clone refers to the same state. `lock()` returns a
/// guard over the full ledger so a check-then-settle sequence can be
/// held together without interleaving.
#[derive(Clone)]
pub struct RiskLedger {
    inner: Arc<Mutex<PortfolioLedger>>,
}

impl RiskLedger {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PortfolioLedger::new(limits))),
        }
    }

    /// Acquire exclusive access for a composed check-then-settle sequence
    pub async fn lock(&self) -> MutexGuard<'_, PortfolioLedger> {
        self.inner.lock().await
    }

    pub async fn total_daily_pnl(&self) -> f64 {
        self.inner.lock().await.total_daily_pnl()
    }

    pub async fn positions(&self) -> HashMap<String, f64> {
        self.inner.lock().await.positions()
    }

    pub async fn total_exposure(&self) -> f64 {
        self.inner.lock().await.total_exposure()
    }

    pub async fn is_emergency(&self) -> bool {
        self.inner.lock().await.is_emergency()
    }

    pub async fn settle(&self, strategy_id: &str, position_delta: f64, pnl_delta: f64) {
        self.inner
            .lock()
            .await
            .settle(strategy_id, position_delta, pnl_delta);
    }

    pub async fn reset_daily(&self) {
        self.inner.lock().await.reset_daily();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(depth: f64, volatility: f64) -> MarketSnapshot {
        MarketSnapshot::default()
            .with_depth(depth)
            .with_volatility(volatility)
    }

    fn ledger() -> PortfolioLedger {
        PortfolioLedger::new(RiskLimits::default())
    }

    #[test]
    fn test_approves_normal_trade() {
        let ledger = ledger();
        let decision = ledger.pre_trade_check("S1", 0.5, &snapshot(10_000.0, 0.02));
        assert!(decision.is_approved());
    }

    #[test]
    fn test_rejects_in_emergency_mode() {
        let mut ledger = ledger();
        // Drive straight into emergency via a catastrophic settlement
        ledger.settle("S1", 0.0, -4.5);
        assert!(ledger.is_emergency());

        let decision = ledger.pre_trade_check("S1", 0.1, &snapshot(10_000.0, 0.02));
        assert!(!decision.is_approved());
    }

    #[test]
    fn test_rejects_after_daily_loss_limit() {
        let mut ledger = PortfolioLedger::new(RiskLimits {
            max_daily_loss: 5.0,
            ..Default::default()
        });
        // Past the full limit but split across strategies
        ledger.settle("S1", 0.0, -3.0);
        ledger.settle("S2", 0.0, -2.5);

        let decision = ledger.pre_trade_check("S3", 0.1, &snapshot(10_000.0, 0.02));
        match decision {
            TradeDecision::Rejected { .. } => {}
            TradeDecision::Approved => panic!("expected rejection past loss limit"),
        }
    }

    #[test]
    fn test_position_cap_reports_max_allowed() {
        let mut ledger = PortfolioLedger::new(RiskLimits {
            max_position_size: 2.0,
            max_daily_loss: 100.0,
            max_aggregate_exposure: 100.0,
            ..Default::default()
        });
        ledger.settle("S1", 1.5, 0.0);

        let decision = ledger.pre_trade_check("S1", 1.0, &snapshot(10_000.0, 0.02));
        match decision {
            TradeDecision::Rejected {
                max_allowed_size, ..
            } => {
                // 2.0 cap minus |1.5| current, signed toward the buy
                assert_eq!(max_allowed_size, Some(0.5));
            }
            TradeDecision::Approved => panic!("expected position cap rejection"),
        }
    }

    #[test]
    fn test_liquidity_gate() {
        // Scenario from the risk contract: depth 5 means at most 0.5 passes
        let ledger = PortfolioLedger::new(RiskLimits {
            max_position_size: 2.0,
            ..Default::default()
        });
        let decision = ledger.pre_trade_check("S1", 1.0, &snapshot(5.0, 0.1));
        match decision {
            TradeDecision::Rejected { reason, .. } => {
                assert!(reason.contains("liquidity"));
            }
            TradeDecision::Approved => panic!("expected liquidity rejection"),
        }
    }

    #[test]
    fn test_volatility_sizing_gate() {
        let ledger = PortfolioLedger::new(RiskLimits {
            max_position_size: 2.0,
            ..Default::default()
        });
        // 0.2 * 2.0 = 0.4 cap under crisis volatility
        let decision = ledger.pre_trade_check("S1", 0.5, &snapshot(10_000.0, 0.6));
        match decision {
            TradeDecision::Rejected {
                max_allowed_size, ..
            } => assert_eq!(max_allowed_size, Some(0.4)),
            TradeDecision::Approved => panic!("expected volatility sizing rejection"),
        }

        // Within the crisis cap it still passes
        let decision = ledger.pre_trade_check("S1", 0.3, &snapshot(10_000.0, 0.6));
        assert!(decision.is_approved());
    }

    #[test]
    fn test_settle_conserves_position() {
        let mut ledger = ledger();
        ledger.settle("S1", 0.7, 0.1);
        ledger.settle("S1", -0.2, -0.05);
        assert!((ledger.position("S1") - 0.5).abs() < 1e-12);
        assert!((ledger.total_daily_pnl() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_emergency_flips_exactly_at_threshold() {
        let mut ledger = PortfolioLedger::new(RiskLimits {
            max_daily_loss: 5.0,
            ..Default::default()
        });
        ledger.settle("S1", 0.0, -3.9);
        assert!(!ledger.is_emergency());

        // Crossing exactly -0.8 * 5.0 = -4.0 must flip on this call
        ledger.settle("S1", 0.0, -0.1);
        assert!(ledger.is_emergency());
    }

    #[test]
    fn test_emergency_sticky_until_reset() {
        let mut ledger = PortfolioLedger::new(RiskLimits {
            max_daily_loss: 5.0,
            ..Default::default()
        });
        ledger.settle("S1", 0.0, -4.5);
        assert!(ledger.is_emergency());

        // Profitable settlements do not clear it
        ledger.settle("S1", 0.0, 10.0);
        assert!(ledger.is_emergency());

        ledger.reset_daily();
        assert!(!ledger.is_emergency());
        assert_eq!(ledger.total_daily_pnl(), 0.0);
    }

    #[test]
    fn test_reset_daily_keeps_positions() {
        let mut ledger = ledger();
        ledger.settle("S1", 1.2, -0.3);
        ledger.reset_daily();
        assert!((ledger.position("S1") - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_exposure_emergency() {
        let mut ledger = PortfolioLedger::new(RiskLimits {
            max_aggregate_exposure: 2.0,
            max_position_size: 2.0,
            max_daily_loss: 100.0,
            ..Default::default()
        });
        ledger.settle("S1", 1.5, 0.0);
        assert!(!ledger.is_emergency());
        ledger.settle("S2", -1.0, 0.0);
        // |1.5| + |-1.0| = 2.5 > 2.0
        assert!(ledger.is_emergency());
    }

    #[test]
    fn test_default_correlation() {
        let ledger = ledger();
        assert_eq!(ledger.correlation(0, 0), 1.0);
        assert_eq!(ledger.correlation(0, 1), 0.3);
    }

    #[test]
    fn test_supplied_correlation_matrix() {
        let mut ledger = ledger();
        ledger.set_correlation_matrix(vec![vec![1.0, 0.8], vec![0.8, 1.0]]);
        assert_eq!(ledger.correlation(0, 1), 0.8);
        // Out-of-range indices fall back to the flat default
        assert_eq!(ledger.correlation(0, 5), 0.3);
    }

    #[tokio::test]
    async fn test_shared_handle_sees_same_state() {
        let ledger = RiskLedger::new(RiskLimits::default());
        let clone = ledger.clone();
        clone.settle("S1", 0.4, 0.0).await;
        assert!((ledger.positions().await["S1"] - 0.4).abs() < 1e-12);
    }
}
