//! Portfolio risk limits
//!
//! Immutable configuration consumed by the risk ledger and the session
//! controller. Stress scenario tags are opaque labels carried for
//! reporting only.

use serde::{Deserialize, Serialize};

/// Portfolio-level risk limits (read once at session start)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum daily loss before all trading is rejected
    pub max_daily_loss: f64,
    /// Maximum absolute position per strategy
    pub max_position_size: f64,
    /// Maximum sum of absolute positions across strategies
    pub max_aggregate_exposure: f64,
    /// VaR confidence level in percent (e.g. 95.0)
    pub var_confidence: f64,
    /// Maximum tolerated drawdown fraction
    pub max_drawdown: f64,
    /// Minimum order-book depth before liquidity warnings fire
    pub min_liquidity: f64,
    /// Opaque stress scenario labels (not separately modeled)
    pub stress_scenarios: Vec<String>,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_daily_loss: 5.0,
            max_position_size: 2.0,
            max_aggregate_exposure: 8.0,
            var_confidence: 95.0,
            max_drawdown: 0.08,
            min_liquidity: 1000.0,
            stress_scenarios: vec![
                "FLASH_CRASH".to_string(),
                "LIQUIDITY_CRUNCH".to_string(),
                "BLACK_SWAN".to_string(),
            ],
        }
    }
}
