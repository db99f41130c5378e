//! Signal generation seam
//!
//! Generators are stateful (they accumulate price history) and owned by
//! exactly one strategy engine, so `&mut self` and `Send` suffice.

use helios_core::{MarketSnapshot, Signal};

/// A source of directional trading signals
pub trait SignalGenerator: Send {
    fn name(&self) -> &'static str;

    /// Fold in one snapshot and emit a signal
    fn generate(&mut self, snapshot: &MarketSnapshot) -> Signal;
}
