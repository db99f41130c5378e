//! Market snapshot and regime classification
//!
//! One immutable `MarketSnapshot` is produced per simulation cycle and
//! shared read-only by every component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One immutable synthetic market observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// When the snapshot was produced
    pub timestamp: DateTime<Utc>,
    /// Mid price (always positive)
    pub price: f64,
    /// Instantaneous volatility estimate (>= 0)
    pub volatility: f64,
    /// Fractional bid-ask spread (>= 0)
    pub spread: f64,
    /// Liquidity units absorbable near mid (always positive)
    pub depth: f64,
    /// Traded volume over the last interval
    pub volume: f64,
}

impl MarketSnapshot {
    pub fn new(price: f64, volatility: f64, spread: f64, depth: f64, volume: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            price,
            volatility,
            spread,
            depth,
            volume,
        }
    }

    /// Half the fractional spread (cost of crossing once)
    pub fn half_spread(&self) -> f64 {
        self.spread / 2.0
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self::new(1.0, 0.02, 0.001, 10_000.0, 500_000.0)
    }
}

/// Coarse volatility regime driving cycle cadence and risk sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    Low,
    Medium,
    High,
    Crisis,
}

impl MarketRegime {
    /// Classify an annualized realized volatility into a regime
    pub fn from_volatility(annualized_vol: f64) -> Self {
        if annualized_vol < 0.15 {
            MarketRegime::Low
        } else if annualized_vol < 0.35 {
            MarketRegime::Medium
        } else if annualized_vol < 0.75 {
            MarketRegime::High
        } else {
            MarketRegime::Crisis
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Low => write!(f, "LOW"),
            MarketRegime::Medium => write!(f, "MEDIUM"),
            MarketRegime::High => write!(f, "HIGH"),
            MarketRegime::Crisis => write!(f, "CRISIS"),
        }
    }
}
