//! Helios Session
//!
//! Top-level orchestration for the trading simulation:
//! - Regime-paced cycle loop over the synthetic market
//! - Strategies spawned as parallel tasks each cycle
//! - Periodic emergency sweeps with forced position reduction
//! - Cycle summaries and a final session report through `ReportSink`

pub mod controller;
pub mod report;

pub use controller::{SessionController, SessionState};
pub use report::{
    CycleSummary, LimitUtilization, LogSink, ReportBuilder, ReportSink, SessionReport,
    StrategyReport,
};
