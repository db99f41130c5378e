//! Helios Strategy
//!
//! Three signal generator variants behind one trait:
//! - Mean reversion: fades z-score extremes over a rolling window
//! - Momentum: follows drift past a return threshold
//! - Deviation arbitrage: trades a noisy secondary quote back to fair
//!
//! `StrategyEngine` wraps a generator with hysteresis, fractional Kelly
//! sizing, risk-ledger gating, and mark-to-market settlement.

pub mod deviation;
pub mod engine;
pub mod generator;
pub mod mean_reversion;
pub mod momentum;

pub use deviation::DeviationArb;
pub use engine::{ActOutcome, PerformanceMetrics, StrategyEngine};
pub use generator::SignalGenerator;
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
