//! Helios Core Domain
//!
//! Pure domain types shared by every Helios component.
//! This crate contains no async, no I/O, and no randomness.

pub mod config;
pub mod limits;
pub mod result;
pub mod side;
pub mod signal;
pub mod snapshot;

// Re-export commonly used types at crate root
pub use config::{CadenceConfig, SessionConfig, StrategyAllocation, StrategyKind};
pub use limits::RiskLimits;
pub use result::ExecutionResult;
pub use side::Side;
pub use signal::Signal;
pub use snapshot::{MarketRegime, MarketSnapshot};
