//! Rolling execution quality metrics
//!
//! Exponential moving averages seeded with plausible steady-state values
//! so early reports are not dominated by the first few fills. Price and
//! latency averages update per filled chunk; fill and rejection rates
//! update once per parent order.

use chrono::{DateTime, Utc};
use helios_core::Side;
use serde::Serialize;

/// EMA smoothing factor for all execution metrics
const EMA_ALPHA: f64 = 0.1;

/// Smoothed execution quality statistics
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionMetrics {
    /// Fraction of orders with at least one fill
    pub fill_rate: f64,
    /// Average realized slippage fraction on filled chunks
    pub avg_slippage: f64,
    /// Average market impact fraction on filled chunks
    pub avg_impact: f64,
    /// Average wall-clock latency per filled chunk
    pub avg_latency_ms: f64,
    /// Fraction of orders with no fill at all
    pub rejection_rate: f64,
    /// Count of orders with at least one fill
    pub orders_executed: u64,
    /// Total size filled across all orders
    pub total_volume: f64,
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self {
            fill_rate: 0.98,
            avg_slippage: 0.002,
            avg_impact: 0.001,
            avg_latency_ms: 150.0,
            rejection_rate: 0.02,
            orders_executed: 0,
            total_volume: 0.0,
        }
    }
}

impl ExecutionMetrics {
    /// Fold one filled chunk into the price and latency averages
    ///
    /// `latency_ms` is the elapsed time since the parent order started,
    /// so later chunks report the cumulative wait.
    pub fn observe_chunk(&mut self, slippage: f64, impact: f64, latency_ms: f64) {
        self.avg_slippage = ema(self.avg_slippage, slippage);
        self.avg_impact = ema(self.avg_impact, impact);
        self.avg_latency_ms = ema(self.avg_latency_ms, latency_ms);
    }

    /// Fold one completed parent order into the fill statistics
    pub fn observe_order(&mut self, filled: bool, size: f64) {
        let fill = if filled { 1.0 } else { 0.0 };
        self.fill_rate = ema(self.fill_rate, fill);
        self.rejection_rate = ema(self.rejection_rate, 1.0 - fill);
        if filled {
            self.orders_executed += 1;
            self.total_volume += size;
        }
    }

    pub fn avg_order_size(&self) -> f64 {
        if self.orders_executed == 0 {
            0.0
        } else {
            self.total_volume / self.orders_executed as f64
        }
    }
}

fn ema(previous: f64, observation: f64) -> f64 {
    (1.0 - EMA_ALPHA) * previous + EMA_ALPHA * observation
}

/// One completed order, retained in the slicer's bounded history
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub instrument_id: String,
    pub side: Side,
    pub requested_size: f64,
    pub executed_size: f64,
    pub avg_price: f64,
    pub slippage: f64,
    pub cost: f64,
    pub timestamp: DateTime<Utc>,
}
