//! Impact-aware execution slicer
//!
//! Large orders are split into liquidity-sized chunks released with
//! jittered sizes and randomized delays. Expected slippage (half-spread,
//! square-root impact, volatility buffer) is estimated up front and the
//! whole order is rejected when it breaches the caller's tolerance.

use crate::metrics::{ExecutionMetrics, OrderRecord};
use crate::submitter::OrderSubmitter;
use chrono::Utc;
use helios_core::{ExecutionResult, MarketSnapshot, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Slicing and cost-model parameters
#[derive(Debug, Clone)]
pub struct SlicerConfig {
    /// Orders below this size are dropped outright
    pub min_order_size: f64,
    /// Hard ceiling on a single chunk
    pub max_chunk_size: f64,
    /// Chunk ceiling as a fraction of snapshot depth
    pub depth_chunk_fraction: f64,
    /// Square-root impact coefficient
    pub impact_coefficient: f64,
    /// Cap on modeled impact per order
    pub max_impact: f64,
    /// Volatility contribution to expected slippage
    pub volatility_slippage: f64,
    /// Chunk size jitter fraction (each chunk scaled by 1 +/- jitter)
    pub chunk_jitter: f64,
    /// Probability any single chunk is rejected by the venue model
    pub rejection_probability: f64,
    /// Fixed fee per filled chunk
    pub base_fee: f64,
    /// Size-proportional fee per filled chunk
    pub size_fee: f64,
    /// Inter-chunk delay bounds
    pub min_chunk_delay_ms: u64,
    pub max_chunk_delay_ms: u64,
    /// Completed-order history ring capacity
    pub history_capacity: usize,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            min_order_size: 0.01,
            max_chunk_size: 10.0,
            depth_chunk_fraction: 0.05,
            impact_coefficient: 0.1,
            max_impact: 0.05,
            volatility_slippage: 0.1,
            chunk_jitter: 0.2,
            rejection_probability: 0.02,
            base_fee: 0.000005,
            size_fee: 0.0001,
            min_chunk_delay_ms: 100,
            max_chunk_delay_ms: 300,
            history_capacity: 1000,
        }
    }
}

/// Mutable slicer internals behind one lock, never held across an await
struct SlicerState {
    rng: StdRng,
    metrics: ExecutionMetrics,
    history: VecDeque<OrderRecord>,
}

/// Sliced order executor
///
/// Shared across strategies; all interior state is behind a mutex so a
/// single instance serves concurrent callers.
pub struct ExecutionSlicer {
    config: SlicerConfig,
    submitter: Arc<dyn OrderSubmitter>,
    state: Mutex<SlicerState>,
}

impl ExecutionSlicer {
    pub fn new(config: SlicerConfig, submitter: Arc<dyn OrderSubmitter>) -> Self {
        Self::with_rng(config, submitter, StdRng::from_entropy())
    }

    /// Create with a specific seed for reproducible chunk draws
    pub fn with_seed(config: SlicerConfig, submitter: Arc<dyn OrderSubmitter>, seed: u64) -> Self {
        Self::with_rng(config, submitter, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SlicerConfig, submitter: Arc<dyn OrderSubmitter>, rng: StdRng) -> Self {
        Self {
            state: Mutex::new(SlicerState {
                rng,
                metrics: ExecutionMetrics::default(),
                history: VecDeque::with_capacity(config.history_capacity),
            }),
            config,
            submitter,
        }
    }

    /// Execute one parent order of `size` units (a magnitude) on `side`
    ///
    /// Returns an aggregate result; partial fills report `success` with a
    /// reduced `executed_size`, and a fully rejected order reports a
    /// zero fill at the reference price.
    pub async fn execute(
        &self,
        instrument_id: &str,
        side: Side,
        size: f64,
        snapshot: &MarketSnapshot,
        max_slippage_bps: f64,
    ) -> ExecutionResult {
        if size < self.config.min_order_size {
            log::debug!(
                "[EXEC] dropping {} {:.6}: below minimum order size",
                instrument_id,
                size
            );
            return ExecutionResult::rejected(snapshot.price, 0.0);
        }

        // Expected cost of crossing: half the spread, square-root market
        // impact, and a volatility buffer.
        let impact = (self.config.impact_coefficient
            * (size / snapshot.depth).sqrt()
            * snapshot.volatility)
            .min(self.config.max_impact);
        let total_slippage =
            snapshot.half_spread() + impact + self.config.volatility_slippage * snapshot.volatility;

        if total_slippage > max_slippage_bps / 10_000.0 {
            log::warn!(
                "[EXEC] rejecting {} {} {:.4}: expected slippage {:.1} bps over {:.1} bps tolerance",
                side,
                instrument_id,
                size,
                total_slippage * 10_000.0,
                max_slippage_bps
            );
            return ExecutionResult::rejected(snapshot.price, total_slippage);
        }

        let chunk_ceiling = self
            .config
            .max_chunk_size
            .min(self.config.depth_chunk_fraction * snapshot.depth);
        let num_chunks = ((size / chunk_ceiling).ceil() as usize).max(1);
        let base_chunk = size / num_chunks as f64;

        let fill_price = snapshot.price * (1.0 + total_slippage * side.sign());
        let started = Instant::now();

        let mut executed = 0.0;
        let mut cost = 0.0;
        let mut remaining = size;

        for index in 0..num_chunks {
            let last = index == num_chunks - 1;

            let (chunk, rejected, delay_ms) = {
                let mut state = self.state.lock().await;
                let jitter = state
                    .rng
                    .gen_range(1.0 - self.config.chunk_jitter..=1.0 + self.config.chunk_jitter);
                // The final chunk absorbs the jitter so fills sum to size
                let chunk = if last {
                    remaining
                } else {
                    (base_chunk * jitter).min(remaining)
                };
                let rejected = state.rng.gen_bool(self.config.rejection_probability);
                let delay_ms = state
                    .rng
                    .gen_range(self.config.min_chunk_delay_ms..=self.config.max_chunk_delay_ms);
                (chunk, rejected, delay_ms)
            };
            remaining -= chunk;

            if rejected {
                log::debug!("[EXEC] chunk {}/{} rejected by venue model", index + 1, num_chunks);
            } else {
                match self
                    .submitter
                    .submit(instrument_id, side, chunk, fill_price)
                    .await
                {
                    Ok(_) => {
                        executed += chunk;
                        cost += self.config.base_fee + self.config.size_fee * chunk;
                        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                        self.state
                            .lock()
                            .await
                            .metrics
                            .observe_chunk(total_slippage, impact, elapsed_ms);
                    }
                    Err(error) => {
                        log::warn!(
                            "[EXEC] chunk {}/{} failed: {}",
                            index + 1,
                            num_chunks,
                            error
                        );
                    }
                }
            }

            if !last {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        let success = executed > 0.0;
        let result = ExecutionResult {
            executed_size: executed,
            avg_price: if success { fill_price } else { snapshot.price },
            slippage: total_slippage,
            cost,
            success,
        };

        let mut state = self.state.lock().await;
        state.metrics.observe_order(success, executed);
        if state.history.len() == self.config.history_capacity {
            state.history.pop_front();
        }
        state.history.push_back(OrderRecord {
            instrument_id: instrument_id.to_string(),
            side,
            requested_size: size,
            executed_size: executed,
            avg_price: result.avg_price,
            slippage: total_slippage,
            cost,
            timestamp: Utc::now(),
        });

        log::info!(
            "[EXEC] {} {} filled {:.4}/{:.4} @ {:.6} slip={:.1}bps cost={:.6}",
            side,
            instrument_id,
            executed,
            size,
            result.avg_price,
            total_slippage * 10_000.0,
            cost
        );
        result
    }

    /// Snapshot of the rolling execution metrics
    pub async fn metrics(&self) -> ExecutionMetrics {
        self.state.lock().await.metrics.clone()
    }

    /// Most recent completed orders, newest last
    pub async fn recent_orders(&self, count: usize) -> Vec<OrderRecord> {
        let state = self.state.lock().await;
        let skip = state.history.len().saturating_sub(count);
        state.history.iter().skip(skip).cloned().collect()
    }
}
