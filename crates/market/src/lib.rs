//! Helios Market Simulator
//!
//! Manufactures synthetic market snapshots with realistic texture:
//! - Volatility clustering via a mean-reverting variance recurrence
//! - Fat-tailed returns from scaled Box-Muller draws
//! - Spread and depth that worsen monotonically with volatility
//! - Regime classification from realized volatility
//!
//! All randomness in the market process lives behind `MarketSimulator`;
//! construct with `with_seed` for reproducible runs.

pub mod simulator;
pub mod volatility;

pub use simulator::{MarketConfig, MarketSimulator};
pub use volatility::VolatilityState;
