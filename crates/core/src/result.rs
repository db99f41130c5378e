//! Execution result value type

use serde::{Deserialize, Serialize};

/// Aggregated outcome of one sliced order execution
///
/// Produced once per order by the execution slicer; not retained beyond
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Total size filled across all accepted chunks
    pub executed_size: f64,
    /// Volume-weighted average fill price
    pub avg_price: f64,
    /// Total slippage fraction applied to the fills
    pub slippage: f64,
    /// Total transaction cost (fixed + size-proportional fees)
    pub cost: f64,
    /// True when at least one chunk filled
    pub success: bool,
}

impl ExecutionResult {
    /// A zero-fill rejection at the given reference price
    pub fn rejected(reference_price: f64, slippage: f64) -> Self {
        Self {
            executed_size: 0.0,
            avg_price: reference_price,
            slippage,
            cost: 0.0,
            success: false,
        }
    }
}
