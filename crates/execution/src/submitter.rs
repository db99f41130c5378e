//! Order submission seam
//!
//! The slicer talks to a venue through `OrderSubmitter` so tests can
//! substitute failing or recording venues for the simulated one.

use crate::error::ExecutionError;
use async_trait::async_trait;
use helios_core::Side;
use uuid::Uuid;

/// Venue-facing order entry
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit one child order; returns the venue order id on acceptance
    async fn submit(
        &self,
        instrument_id: &str,
        side: Side,
        size: f64,
        limit_price: f64,
    ) -> Result<String, ExecutionError>;
}

/// In-process venue that accepts every order
///
/// Stochastic rejections are modeled inside the slicer, not here, so the
/// submitter stays deterministic.
pub struct SimulatedSubmitter;

#[async_trait]
impl OrderSubmitter for SimulatedSubmitter {
    async fn submit(
        &self,
        instrument_id: &str,
        side: Side,
        size: f64,
        limit_price: f64,
    ) -> Result<String, ExecutionError> {
        let order_id = Uuid::new_v4().to_string();
        log::debug!(
            "[EXEC] submitted {} {} {:.4} @ {:.6} id={}",
            side,
            instrument_id,
            size,
            limit_price,
            order_id
        );
        Ok(order_id)
    }
}
