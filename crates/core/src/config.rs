//! Session configuration
//!
//! Read once at startup. Covers the risk limits, the traded instrument,
//! the strategy roster with capital allocations, and the regime-dependent
//! cycle cadence.

use crate::limits::RiskLimits;
use crate::snapshot::MarketRegime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which signal generator a strategy slot runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    MeanReversion,
    Momentum,
    DeviationArb,
}

/// One strategy instance with its capital allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAllocation {
    /// Strategy identifier (ledger key)
    pub id: String,
    /// Signal generator variant
    pub kind: StrategyKind,
    /// Capital allocated to this strategy
    pub capital: f64,
}

/// Inter-cycle sleep per market regime (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    pub low_ms: u64,
    pub medium_ms: u64,
    pub high_ms: u64,
    pub crisis_ms: u64,
}

impl CadenceConfig {
    /// Cadence for a regime
    pub fn for_regime(&self, regime: MarketRegime) -> Duration {
        let ms = match regime {
            MarketRegime::Low => self.low_ms,
            MarketRegime::Medium => self.medium_ms,
            MarketRegime::High => self.high_ms,
            MarketRegime::Crisis => self.crisis_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            low_ms: 5000,
            medium_ms: 2000,
            high_ms: 500,
            crisis_ms: 100,
        }
    }
}

/// Full session configuration (external interface, read once)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Instrument identifier passed to the order-submission collaborator
    pub instrument_id: String,
    /// Portfolio risk limits
    pub risk: RiskLimits,
    /// Session duration in seconds
    pub duration_secs: u64,
    /// Strategy roster with capital allocations
    pub strategies: Vec<StrategyAllocation>,
    /// Slippage tolerance for strategy orders (basis points)
    pub max_slippage_bps: f64,
    /// Wider slippage tolerance for emergency reductions (basis points)
    pub emergency_slippage_bps: f64,
    /// Regime-dependent cycle cadence
    pub cadence: CadenceConfig,
}

impl SessionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instrument_id: "SYNTH-1".to_string(),
            risk: RiskLimits::default(),
            duration_secs: 1800,
            strategies: vec![
                StrategyAllocation {
                    id: "MEAN_REV_1".to_string(),
                    kind: StrategyKind::MeanReversion,
                    capital: 3.0,
                },
                StrategyAllocation {
                    id: "MOMENTUM_1".to_string(),
                    kind: StrategyKind::Momentum,
                    capital: 2.5,
                },
                StrategyAllocation {
                    id: "ARBITRAGE_1".to_string(),
                    kind: StrategyKind::DeviationArb,
                    capital: 2.0,
                },
            ],
            max_slippage_bps: 1000.0,
            emergency_slippage_bps: 500.0,
            cadence: CadenceConfig::default(),
        }
    }
}
