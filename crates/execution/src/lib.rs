//! Helios Execution
//!
//! Order execution for the trading session:
//! - Cost model: half-spread, square-root market impact, volatility buffer
//! - Parent orders sliced into jittered chunks with randomized delays
//! - Stochastic venue rejections with graceful partial fills
//! - Rolling EMA execution quality metrics and a bounded order history
//!
//! The venue seam is the `OrderSubmitter` trait; the bundled
//! `SimulatedSubmitter` accepts everything and randomness lives in the
//! slicer itself.

pub mod error;
pub mod metrics;
pub mod slicer;
pub mod submitter;

pub use error::ExecutionError;
pub use metrics::{ExecutionMetrics, OrderRecord};
pub use slicer::{ExecutionSlicer, SlicerConfig};
pub use submitter::{OrderSubmitter, SimulatedSubmitter};
