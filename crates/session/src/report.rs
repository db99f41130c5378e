//! Cycle and session reporting
//!
//! Summaries are plain serializable values pushed through a `ReportSink`
//! so the controller never cares whether they end up in logs, files, or
//! test assertions.

use chrono::{DateTime, Utc};
use helios_core::{MarketRegime, RiskLimits};
use helios_execution::ExecutionMetrics;
use serde::Serialize;
use std::collections::HashMap;

/// Sharpe annualization for one-cycle returns at roughly minute cadence
const CYCLES_PER_YEAR: f64 = 252.0 * 24.0 * 60.0;

/// Snapshot of portfolio state after one cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volatility: f64,
    pub spread: f64,
    pub depth: f64,
    pub regime: MarketRegime,
    pub total_pnl: f64,
    pub total_exposure: f64,
    pub positions: HashMap<String, f64>,
    pub emergency: bool,
}

/// Final per-strategy statistics
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub id: String,
    pub position: f64,
    pub entry_price: f64,
    pub unrealized_pnl: f64,
    pub trades: u64,
    pub win_rate: f64,
    pub realized_pnl: f64,
}

/// How much of each hard limit the session consumed
#[derive(Debug, Clone, Serialize)]
pub struct LimitUtilization {
    /// Worst daily loss as a fraction of the loss limit
    pub loss_limit_used: f64,
    /// Peak exposure as a fraction of the aggregate cap
    pub exposure_used: f64,
    /// Realized drawdown as a fraction of the drawdown limit
    pub drawdown_used: f64,
}

/// End-of-session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub cycles: u64,
    pub duration_secs: f64,
    pub final_pnl: f64,
    pub min_pnl: f64,
    pub max_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub emergency_triggered: bool,
    pub regime_distribution: HashMap<MarketRegime, u64>,
    pub utilization: LimitUtilization,
    pub execution: ExecutionMetrics,
    pub strategies: Vec<StrategyReport>,
}

/// Accumulates per-cycle observations into a `SessionReport`
pub struct ReportBuilder {
    pnl_curve: Vec<f64>,
    regimes: HashMap<MarketRegime, u64>,
    peak_exposure: f64,
    emergency_seen: bool,
    started: DateTime<Utc>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            pnl_curve: Vec::new(),
            regimes: HashMap::new(),
            peak_exposure: 0.0,
            emergency_seen: false,
            started: Utc::now(),
        }
    }

    pub fn record(&mut self, summary: &CycleSummary) {
        self.pnl_curve.push(summary.total_pnl);
        *self.regimes.entry(summary.regime).or_insert(0) += 1;
        self.peak_exposure = self.peak_exposure.max(summary.total_exposure);
        self.emergency_seen |= summary.emergency;
    }

    /// Per-cycle Sharpe ratio annualized to `CYCLES_PER_YEAR`
    fn sharpe_ratio(&self) -> f64 {
        if self.pnl_curve.len() < 2 {
            return 0.0;
        }
        let returns: Vec<f64> = self.pnl_curve.windows(2).map(|w| w[1] - w[0]).collect();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev <= f64::EPSILON {
            return 0.0;
        }
        mean / std_dev * CYCLES_PER_YEAR.sqrt()
    }

    fn min_pnl(&self) -> f64 {
        self.pnl_curve.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    fn max_pnl(&self) -> f64 {
        self.pnl_curve.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    /// Fall from the highest recorded P&L to the lowest, as a fraction of
    /// the high, regardless of which came first. Zero unless the curve
    /// went above water.
    fn max_drawdown(&self) -> f64 {
        let max_pnl = self.max_pnl();
        if max_pnl > 0.0 {
            (max_pnl - self.min_pnl()) / max_pnl
        } else {
            0.0
        }
    }

    pub fn finish(
        self,
        limits: &RiskLimits,
        execution: ExecutionMetrics,
        strategies: Vec<StrategyReport>,
    ) -> SessionReport {
        let max_drawdown = self.max_drawdown();
        let min_pnl = self.min_pnl();
        SessionReport {
            cycles: self.pnl_curve.len() as u64,
            duration_secs: (Utc::now() - self.started).num_milliseconds() as f64 / 1000.0,
            final_pnl: self.pnl_curve.last().copied().unwrap_or(0.0),
            min_pnl,
            max_pnl: self.max_pnl(),
            sharpe_ratio: self.sharpe_ratio(),
            max_drawdown,
            emergency_triggered: self.emergency_seen,
            regime_distribution: self.regimes,
            utilization: LimitUtilization {
                loss_limit_used: (-min_pnl / limits.max_daily_loss).max(0.0),
                exposure_used: self.peak_exposure / limits.max_aggregate_exposure,
                drawdown_used: max_drawdown / limits.max_drawdown,
            },
            execution,
            strategies,
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for cycle and session summaries
pub trait ReportSink: Send + Sync {
    fn on_cycle(&self, summary: &CycleSummary);
    fn on_session(&self, report: &SessionReport);
}

/// Sink that writes summaries to the log
pub struct LogSink;

impl ReportSink for LogSink {
    fn on_cycle(&self, summary: &CycleSummary) {
        log::info!(
            "[SESSION] cycle {} {} price={:.6} vol={:.4} pnl={:+.4} exposure={:.4}{}",
            summary.cycle,
            summary.regime,
            summary.price,
            summary.volatility,
            summary.total_pnl,
            summary.total_exposure,
            if summary.emergency { " EMERGENCY" } else { "" }
        );
    }

    fn on_session(&self, report: &SessionReport) {
        match serde_json::to_string_pretty(report) {
            Ok(json) => log::info!("[SESSION] final report:\n{json}"),
            Err(error) => log::error!("[SESSION] failed to serialize report: {error}"),
        }
    }
}
