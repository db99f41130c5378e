//! Helios Risk Ledger
//!
//! Process-wide shared risk state:
//! - Per-strategy positions and daily P&L
//! - Ordered pre-trade gates (emergency, loss limit, position cap,
//!   liquidity, volatility sizing)
//! - Atomic settlement with sticky emergency transitions
//! - Monte-Carlo portfolio VaR with correlation aggregation
//!
//! The ledger is guarded by a single mutex; callers hold it across the
//! whole check-then-settle sequence so no two strategies can pass a gate
//! only one of them could satisfy.

pub mod ledger;
pub mod var;

pub use ledger::{PortfolioLedger, RiskLedger, TradeDecision};
pub use var::VarEstimator;
