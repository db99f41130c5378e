//! Session controller
//!
//! Drives the whole simulation: one market snapshot per cycle, strategies
//! fanned out as parallel tasks, periodic emergency sweeps, and a final
//! report. Cycle cadence follows the market regime so calm markets poll
//! slowly and crisis markets poll fast.

use crate::report::{CycleSummary, LogSink, ReportBuilder, ReportSink, SessionReport, StrategyReport};
use chrono::Utc;
use helios_core::{MarketSnapshot, SessionConfig, Side};
use helios_execution::{ExecutionSlicer, SimulatedSubmitter, SlicerConfig};
use helios_market::{MarketConfig, MarketSimulator};
use helios_risk::{RiskLedger, VarEstimator};
use helios_strategy::StrategyEngine;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Cycles between emergency condition sweeps
const EMERGENCY_CHECK_INTERVAL: u64 = 10;
/// Cycles between per-strategy performance logs
const PERFORMANCE_LOG_INTERVAL: u64 = 20;
/// Daily loss fraction that triggers a proactive position reduction
const REDUCTION_LOSS_FRACTION: f64 = 0.9;
/// Instantaneous volatility that triggers a proactive reduction
const REDUCTION_VOLATILITY: f64 = 1.0;
/// Fraction of a limit at which proximity warnings fire
const PROXIMITY_FRACTION: f64 = 0.9;

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Halted,
    Reporting,
    Terminal,
}

pub struct SessionController {
    config: SessionConfig,
    market: MarketSimulator,
    ledger: RiskLedger,
    slicer: Arc<ExecutionSlicer>,
    var: VarEstimator,
    strategies: Vec<Arc<Mutex<StrategyEngine>>>,
    strategy_ids: Vec<String>,
    sink: Box<dyn ReportSink>,
    state: SessionState,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        let market = MarketSimulator::new(MarketConfig::default());
        let slicer = ExecutionSlicer::new(SlicerConfig::default(), Arc::new(SimulatedSubmitter));
        Self::assemble(config, market, slicer, VarEstimator::new(), 0)
    }

    /// Create with a specific seed so the market path, execution draws,
    /// and noisy signal generators all reproduce
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        let market = MarketSimulator::with_seed(MarketConfig::default(), seed);
        let slicer = ExecutionSlicer::with_seed(
            SlicerConfig::default(),
            Arc::new(SimulatedSubmitter),
            seed.wrapping_add(1),
        );
        Self::assemble(config, market, slicer, VarEstimator::with_seed(seed.wrapping_add(2)), seed)
    }

    fn assemble(
        config: SessionConfig,
        market: MarketSimulator,
        slicer: ExecutionSlicer,
        var: VarEstimator,
        seed: u64,
    ) -> Self {
        let ledger = RiskLedger::new(config.risk.clone());
        let strategies: Vec<Arc<Mutex<StrategyEngine>>> = config
            .strategies
            .iter()
            .enumerate()
            .map(|(index, allocation)| {
                Arc::new(Mutex::new(StrategyEngine::from_allocation(
                    allocation,
                    seed.wrapping_add(10 + index as u64),
                )))
            })
            .collect();
        let strategy_ids = config.strategies.iter().map(|s| s.id.clone()).collect();
        Self {
            config,
            market,
            ledger,
            slicer: Arc::new(slicer),
            var,
            strategies,
            strategy_ids,
            sink: Box::new(LogSink),
            state: SessionState::Running,
        }
    }

    /// Replace the default log sink
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion and return the final report
    pub async fn run(&mut self) -> SessionReport {
        log::info!(
            "[SESSION] starting: instrument={} strategies={} duration={}s",
            self.config.instrument_id,
            self.strategies.len(),
            self.config.duration_secs
        );

        let deadline = Instant::now() + self.config.duration();
        let mut builder = ReportBuilder::new();
        let mut cycle: u64 = 0;

        while self.state == SessionState::Running && Instant::now() < deadline {
            let cycle_start = Instant::now();
            cycle += 1;

            let snapshot = self.market.advance();
            let regime = self.market.regime();

            self.run_strategies(&snapshot).await;
            if self.state == SessionState::Halted {
                // A strategy task died; flatten everything before reporting
                self.reduce_all(0.0, &snapshot).await;
                break;
            }

            let summary = self.summarize(cycle, &snapshot).await;
            self.sink.on_cycle(&summary);
            builder.record(&summary);

            if cycle % EMERGENCY_CHECK_INTERVAL == 0 {
                self.emergency_sweep(&snapshot).await;
            }
            if cycle % PERFORMANCE_LOG_INTERVAL == 0 {
                self.log_performance().await;
            }

            let cadence = self.config.cadence.for_regime(regime);
            let elapsed = cycle_start.elapsed();
            tokio::time::sleep(cadence.saturating_sub(elapsed)).await;
        }

        self.state = SessionState::Reporting;
        let report = builder.finish(
            &self.config.risk,
            self.slicer.metrics().await,
            self.strategy_reports().await,
        );
        self.sink.on_session(&report);
        self.state = SessionState::Terminal;
        report
    }

    /// Fan strategies out as parallel tasks and join them all
    async fn run_strategies(&mut self, snapshot: &MarketSnapshot) {
        let mut handles = Vec::with_capacity(self.strategies.len());
        for engine in &self.strategies {
            let engine = Arc::clone(engine);
            let ledger = self.ledger.clone();
            let slicer = Arc::clone(&self.slicer);
            let snapshot = snapshot.clone();
            let instrument_id = self.config.instrument_id.clone();
            let max_slippage_bps = self.config.max_slippage_bps;
            handles.push(tokio::spawn(async move {
                engine
                    .lock()
                    .await
                    .act(&instrument_id, &snapshot, &ledger, &slicer, max_slippage_bps)
                    .await
            }));
        }
        for handle in handles {
            if let Err(join_error) = handle.await {
                log::error!("[SESSION] strategy task failed: {join_error}");
                self.state = SessionState::Halted;
            }
        }
    }

    async fn summarize(&self, cycle: u64, snapshot: &MarketSnapshot) -> CycleSummary {
        let ledger = self.ledger.lock().await;
        CycleSummary {
            cycle,
            timestamp: Utc::now(),
            price: snapshot.price,
            volatility: snapshot.volatility,
            spread: snapshot.spread,
            depth: snapshot.depth,
            regime: self.market.regime(),
            total_pnl: ledger.total_daily_pnl(),
            total_exposure: ledger.total_exposure(),
            positions: ledger.positions(),
            emergency: ledger.is_emergency(),
        }
    }

    /// Periodic sweep for conditions the per-trade gates cannot see
    async fn emergency_sweep(&mut self, snapshot: &MarketSnapshot) {
        let limits = self.config.risk.clone();
        let (total_pnl, total_exposure, positions, portfolio_var) = {
            let ledger = self.ledger.lock().await;
            let var = self
                .var
                .portfolio_var(&ledger, &self.strategy_ids, snapshot);
            (
                ledger.total_daily_pnl(),
                ledger.total_exposure(),
                ledger.positions(),
                var,
            )
        };

        log::info!(
            "[RISK] sweep: pnl={:+.4} exposure={:.4} var={:.4}",
            total_pnl,
            total_exposure,
            portfolio_var
        );

        // Every condition is evaluated on each sweep; a loss reduction
        // does not mask a concurrent volatility spike or thin book.
        if total_pnl <= -limits.max_daily_loss * REDUCTION_LOSS_FRACTION {
            log::error!("[RISK] loss {:.4} near daily limit, halving positions", total_pnl);
            self.reduce_all(0.5, snapshot).await;
        }
        if snapshot.volatility > REDUCTION_VOLATILITY {
            log::error!(
                "[RISK] extreme volatility {:.4}, cutting positions to 30%",
                snapshot.volatility
            );
            self.reduce_all(0.3, snapshot).await;
        }

        if snapshot.depth < limits.min_liquidity {
            log::warn!(
                "[RISK] depth {:.0} below minimum {:.0}",
                snapshot.depth,
                limits.min_liquidity
            );
        }
        for (id, position) in &positions {
            if position.abs() > limits.max_position_size * PROXIMITY_FRACTION {
                log::warn!("[RISK] {} position {:.4} near cap", id, position);
            }
        }
        if total_exposure > limits.max_aggregate_exposure * PROXIMITY_FRACTION {
            log::warn!("[RISK] exposure {:.4} near aggregate cap", total_exposure);
        }
    }

    /// Cut every position down to `keep_ratio` of its current size
    ///
    /// Emergency path: bypasses the strategies and their pre-trade gates,
    /// pays the wider emergency slippage tolerance, and settles only the
    /// transaction cost against each strategy's P&L.
    async fn reduce_all(&mut self, keep_ratio: f64, snapshot: &MarketSnapshot) {
        log::warn!("[RISK] reducing all positions to {:.0}%", keep_ratio * 100.0);
        let positions = self.ledger.positions().await;
        for (id, position) in positions {
            let cut = -position * (1.0 - keep_ratio);
            if cut.abs() < f64::EPSILON {
                continue;
            }
            let result = self
                .slicer
                .execute(
                    &self.config.instrument_id,
                    Side::from_delta(cut),
                    cut.abs(),
                    snapshot,
                    self.config.emergency_slippage_bps,
                )
                .await;
            if result.success {
                let fill = result.executed_size * Side::from_delta(cut).sign();
                self.ledger.settle(&id, fill, -result.cost).await;
            } else {
                log::error!("[RISK] failed to reduce {id}, position unchanged");
            }
        }
    }

    async fn log_performance(&self) {
        for report in self.strategy_reports().await {
            log::info!(
                "[SESSION] {} position={:.4} trades={} win_rate={:.0}% realized={:+.4}",
                report.id,
                report.position,
                report.trades,
                report.win_rate * 100.0,
                report.realized_pnl
            );
        }
    }

    async fn strategy_reports(&self) -> Vec<StrategyReport> {
        let mark_price = self.market.last_price();
        let mut reports = Vec::with_capacity(self.strategies.len());
        for engine in &self.strategies {
            let engine = engine.lock().await;
            let metrics = engine.metrics();
            reports.push(StrategyReport {
                id: engine.id().to_string(),
                position: engine.position(),
                entry_price: engine.entry_price(),
                unrealized_pnl: engine.unrealized_pnl(mark_price),
                trades: metrics.trades,
                win_rate: metrics.win_rate(),
                realized_pnl: metrics.realized_pnl,
            });
        }
        reports
    }
}
