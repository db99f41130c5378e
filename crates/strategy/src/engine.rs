//! Strategy engine
//!
//! Owns one signal generator and its local book (position, entry price,
//! last acted-on signal). Each cycle it sizes a target with a fractional
//! Kelly rule, asks the shared risk ledger for approval, executes through
//! the slicer, and settles the resulting deltas back into the ledger.
//!
//! The ledger lock is held across the whole check, execute, settle
//! sequence so concurrent strategies cannot both spend headroom only one
//! of them was approved for.

use crate::deviation::DeviationArb;
use crate::generator::SignalGenerator;
use crate::mean_reversion::MeanReversion;
use crate::momentum::Momentum;
use helios_core::{MarketSnapshot, Side, StrategyAllocation, StrategyKind};
use helios_execution::ExecutionSlicer;
use helios_risk::{RiskLedger, TradeDecision};

/// Minimum absolute signal strength worth acting on
const SIGNAL_FLOOR: f64 = 0.3;
/// Minimum change versus the last acted-on signal
const SIGNAL_CHANGE_FLOOR: f64 = 0.1;
/// Fraction of full Kelly sizing
const KELLY_FRACTION: f64 = 0.5;
/// Floor on the volatility haircut applied to position sizing
const MIN_VOLATILITY_SCALE: f64 = 0.1;
/// Smallest order worth sending to execution
const MIN_ORDER_SIZE: f64 = 0.01;

/// Per-strategy trading statistics
#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    pub trades: u64,
    pub wins: u64,
    pub realized_pnl: f64,
}

impl PerformanceMetrics {
    pub fn win_rate(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades as f64
        }
    }
}

/// What one cycle of a strategy did
#[derive(Debug, Clone)]
pub enum ActOutcome {
    /// No actionable signal this cycle
    Hold { reason: String },
    /// The risk ledger refused the order
    RiskRejected { reason: String },
    /// Approved but nothing filled
    NoFill,
    /// Filled and settled
    Traded { fill_size: f64, pnl_delta: f64 },
}

pub struct StrategyEngine {
    id: String,
    capital: f64,
    generator: Box<dyn SignalGenerator>,
    position: f64,
    entry_price: f64,
    last_signal: f64,
    metrics: PerformanceMetrics,
}

impl StrategyEngine {
    pub fn new(id: impl Into<String>, capital: f64, generator: Box<dyn SignalGenerator>) -> Self {
        Self {
            id: id.into(),
            capital,
            generator,
            position: 0.0,
            entry_price: 0.0,
            last_signal: 0.0,
            metrics: PerformanceMetrics::default(),
        }
    }

    /// Build the engine for a roster slot; `seed` feeds generators that
    /// synthesize their own randomness
    pub fn from_allocation(allocation: &StrategyAllocation, seed: u64) -> Self {
        let generator: Box<dyn SignalGenerator> = match allocation.kind {
            StrategyKind::MeanReversion => Box::new(MeanReversion::new()),
            StrategyKind::Momentum => Box::new(Momentum::new()),
            StrategyKind::DeviationArb => Box::new(DeviationArb::with_seed(seed)),
        };
        Self::new(allocation.id.clone(), allocation.capital, generator)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Unrealized P&L of the open position at the given mark price
    pub fn unrealized_pnl(&self, mark_price: f64) -> f64 {
        self.position * (mark_price - self.entry_price)
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Run one decision cycle against the given snapshot
    pub async fn act(
        &mut self,
        instrument_id: &str,
        snapshot: &MarketSnapshot,
        ledger: &RiskLedger,
        slicer: &ExecutionSlicer,
        max_slippage_bps: f64,
    ) -> ActOutcome {
        let signal = self.generator.generate(snapshot);

        // Hysteresis: ignore weak signals and small wobbles around the
        // last signal we actually traded on.
        if signal.value.abs() < SIGNAL_FLOOR {
            return ActOutcome::Hold {
                reason: signal.reasoning,
            };
        }
        if (signal.value - self.last_signal).abs() < SIGNAL_CHANGE_FLOOR {
            return ActOutcome::Hold {
                reason: "signal unchanged".to_string(),
            };
        }

        let volatility_scale = (1.0 - snapshot.volatility).max(MIN_VOLATILITY_SCALE);
        let target =
            signal.value * KELLY_FRACTION * self.capital * volatility_scale * signal.confidence;
        let delta = target - self.position;
        if delta.abs() < MIN_ORDER_SIZE {
            return ActOutcome::Hold {
                reason: "order size below minimum".to_string(),
            };
        }

        let mut ledger_guard = ledger.lock().await;
        if let TradeDecision::Rejected { reason, .. } =
            ledger_guard.pre_trade_check(&self.id, delta, snapshot)
        {
            // A rejection may carry a size suggestion; it is advisory
            // only and the cycle is skipped either way.
            log::info!("[STRATEGY] {} rejected: {}", self.id, reason);
            return ActOutcome::RiskRejected { reason };
        }

        let side = Side::from_delta(delta);
        let result = slicer
            .execute(instrument_id, side, delta.abs(), snapshot, max_slippage_bps)
            .await;
        if !result.success {
            return ActOutcome::NoFill;
        }

        let fill = result.executed_size * side.sign();
        let mark_to_market = self.apply_fill(fill, result.avg_price, snapshot.price);
        let pnl_delta = mark_to_market - result.cost;
        ledger_guard.settle(&self.id, fill, pnl_delta);
        drop(ledger_guard);

        self.last_signal = signal.value;
        log::info!(
            "[STRATEGY] {} {} {:.4} -> position {:.4} pnl_delta {:+.6} ({})",
            self.id,
            side,
            fill.abs(),
            self.position,
            pnl_delta,
            signal.reasoning
        );
        ActOutcome::Traded {
            fill_size: fill,
            pnl_delta,
        }
    }

    /// Apply one fill to the local book
    ///
    /// Returns realized P&L plus the change in marked unrealized P&L, so
    /// the ledger's running total stays consistent with mark-to-market.
    fn apply_fill(&mut self, fill: f64, fill_price: f64, mark_price: f64) -> f64 {
        let old_position = self.position;
        let old_unrealized = old_position * (mark_price - self.entry_price);
        let new_position = old_position + fill;

        // Trades are counted when P&L is realized, so opening fills do
        // not dilute the win rate.
        let mut realized = 0.0;
        if old_position != 0.0 && fill.signum() != old_position.signum() {
            let reduction = fill.abs().min(old_position.abs());
            realized = reduction * (fill_price - self.entry_price) * old_position.signum();
            self.metrics.trades += 1;
            self.metrics.realized_pnl += realized;
            if realized > 0.0 {
                self.metrics.wins += 1;
            }
        }

        if old_position == 0.0
            || new_position == 0.0
            || new_position.signum() != old_position.signum()
        {
            // Fresh entry, flat, or reversal: the residual (if any) was
            // entered at the fill price
            self.entry_price = fill_price;
        } else if fill.signum() == old_position.signum() {
            // Adding to a winner or loser: blend the entry
            self.entry_price = (old_position.abs() * self.entry_price
                + fill.abs() * fill_price)
                / new_position.abs();
        }
        // Pure reduction keeps the original entry price

        self.position = new_position;

        let new_unrealized = new_position * (mark_price - self.entry_price);
        realized + (new_unrealized - old_unrealized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_core::{RiskLimits, Signal};
    use helios_execution::{SimulatedSubmitter, SlicerConfig};
    use std::sync::Arc;

    struct FixedSignal {
        value: f64,
        confidence: f64,
    }

    impl SignalGenerator for FixedSignal {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn generate(&mut self, _snapshot: &MarketSnapshot) -> Signal {
            Signal::new(self.value, self.confidence, "fixed test signal")
        }
    }

    fn engine(value: f64, confidence: f64, capital: f64) -> StrategyEngine {
        StrategyEngine::new("TEST_1", capital, Box::new(FixedSignal { value, confidence }))
    }

    fn slicer() -> ExecutionSlicer {
        let config = SlicerConfig {
            rejection_probability: 0.0,
            min_chunk_delay_ms: 1,
            max_chunk_delay_ms: 2,
            ..Default::default()
        };
        ExecutionSlicer::with_seed(config, Arc::new(SimulatedSubmitter), 42)
    }

    fn calm_snapshot() -> MarketSnapshot {
        MarketSnapshot::default()
            .with_volatility(0.02)
            .with_depth(10_000.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_weak_signal_holds() {
        let mut engine = engine(0.2, 1.0, 3.0);
        let ledger = RiskLedger::new(RiskLimits::default());
        let outcome = engine
            .act("SYNTH-1", &calm_snapshot(), &ledger, &slicer(), 1000.0)
            .await;
        assert!(matches!(outcome, ActOutcome::Hold { .. }));
        assert_eq!(engine.position(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strong_signal_trades_and_settles() {
        let mut engine = engine(1.0, 1.0, 3.0);
        let ledger = RiskLedger::new(RiskLimits::default());
        let slicer = slicer();

        let outcome = engine
            .act("SYNTH-1", &calm_snapshot(), &ledger, &slicer, 1000.0)
            .await;
        let ActOutcome::Traded { fill_size, .. } = outcome else {
            panic!("expected a trade, got {outcome:?}");
        };
        assert!(fill_size > 0.0);
        // Engine book and ledger agree on the new position
        assert!((engine.position() - fill_size).abs() < 1e-9);
        let positions = ledger.positions().await;
        assert!((positions["TEST_1"] - fill_size).abs() < 1e-9);
        // Opening fill: nothing realized, so no trade is counted yet
        assert_eq!(engine.metrics().trades, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_signal_holds_after_fill() {
        let mut engine = engine(1.0, 1.0, 3.0);
        let ledger = RiskLedger::new(RiskLimits::default());
        let slicer = slicer();
        let snapshot = calm_snapshot();

        let first = engine
            .act("SYNTH-1", &snapshot, &ledger, &slicer, 1000.0)
            .await;
        assert!(matches!(first, ActOutcome::Traded { .. }));

        let second = engine
            .act("SYNTH-1", &snapshot, &ledger, &slicer, 1000.0)
            .await;
        assert!(matches!(second, ActOutcome::Hold { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_emergency_ledger_rejects() {
        let mut engine = engine(1.0, 1.0, 3.0);
        let ledger = RiskLedger::new(RiskLimits {
            max_daily_loss: 5.0,
            ..Default::default()
        });
        ledger.settle("OTHER", 0.0, -4.5).await;
        assert!(ledger.is_emergency().await);

        let outcome = engine
            .act("SYNTH-1", &calm_snapshot(), &ledger, &slicer(), 1000.0)
            .await;
        assert!(matches!(outcome, ActOutcome::RiskRejected { .. }));
        assert_eq!(engine.position(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_order_takes_no_action() {
        // Huge capital sizes a target well past the 2.0 position cap;
        // the cap rejection must skip the cycle entirely, even though it
        // carries a size suggestion.
        let mut engine = engine(1.0, 1.0, 10.0);
        let ledger = RiskLedger::new(RiskLimits::default());
        let outcome = engine
            .act("SYNTH-1", &calm_snapshot(), &ledger, &slicer(), 1000.0)
            .await;
        assert!(matches!(outcome, ActOutcome::RiskRejected { .. }));
        assert_eq!(engine.position(), 0.0);
        assert!(ledger.positions().await.is_empty());
        assert_eq!(engine.metrics().trades, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dust_target_skips_before_risk_check() {
        // Tiny confidence sizes a target below the minimum order size
        let mut engine = engine(1.0, 0.005, 3.0);
        let ledger = RiskLedger::new(RiskLimits::default());
        let outcome = engine
            .act("SYNTH-1", &calm_snapshot(), &ledger, &slicer(), 1000.0)
            .await;
        assert!(matches!(outcome, ActOutcome::Hold { .. }));
        assert!(ledger.positions().await.is_empty());
    }

    #[test]
    fn test_apply_fill_realizes_profit_on_reduction() {
        let mut engine = engine(0.0, 0.0, 1.0);
        // Open 1.0 at 1.00, sell 0.4 at 1.10 with the mark also at 1.10
        engine.apply_fill(1.0, 1.00, 1.00);
        assert_eq!(engine.metrics().trades, 0);
        let delta = engine.apply_fill(-0.4, 1.10, 1.10);
        assert!((engine.metrics().realized_pnl - 0.04).abs() < 1e-12);
        assert_eq!(engine.metrics().trades, 1);
        assert_eq!(engine.metrics().wins, 1);
        // Entry price unchanged on a pure reduction
        assert!((engine.position() - 0.6).abs() < 1e-12);
        // Realized 0.04 plus unrealized moving from 0.10 to 0.06
        assert!((delta - (0.04 + 0.06 - 0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_apply_fill_reversal_resets_entry() {
        let mut engine = engine(0.0, 0.0, 1.0);
        engine.apply_fill(1.0, 1.00, 1.00);
        // Sell 1.5 at 0.90: realizes a loss on the long, flips short 0.5
        engine.apply_fill(-1.5, 0.90, 0.90);
        assert!((engine.position() + 0.5).abs() < 1e-12);
        assert!((engine.metrics().realized_pnl + 0.10).abs() < 1e-12);
        assert_eq!(engine.metrics().wins, 0);
    }
}
