//! Full-session integration test
//!
//! Runs a short seeded session end to end through the real market
//! simulator, strategies, risk ledger, and execution slicer, then checks
//! the report is internally consistent.

use helios_core::{CadenceConfig, SessionConfig};
use helios_session::{CycleSummary, ReportSink, SessionController, SessionReport, SessionState};
use std::sync::{Arc, Mutex};

/// Sink that records everything it is given; clones share storage
#[derive(Clone, Default)]
struct RecordingSink {
    cycles: Arc<Mutex<Vec<CycleSummary>>>,
    reports: Arc<Mutex<Vec<SessionReport>>>,
}

impl ReportSink for RecordingSink {
    fn on_cycle(&self, summary: &CycleSummary) {
        self.cycles.lock().unwrap().push(summary.clone());
    }

    fn on_session(&self, report: &SessionReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

fn short_config() -> SessionConfig {
    SessionConfig {
        duration_secs: 60,
        cadence: CadenceConfig {
            low_ms: 1000,
            medium_ms: 500,
            high_ms: 200,
            crisis_ms: 50,
        },
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_seeded_session_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut controller = SessionController::with_seed(short_config(), 42);
    let report = controller.run().await;

    assert_eq!(controller.state(), SessionState::Terminal);
    assert!(report.cycles > 10, "expected many cycles, got {}", report.cycles);

    // Every cycle lands in exactly one regime bucket
    let counted: u64 = report.regime_distribution.values().sum();
    assert_eq!(counted, report.cycles);

    // All roster strategies are reported
    assert_eq!(report.strategies.len(), 3);
    for strategy in &report.strategies {
        assert!(strategy.position.abs() <= 2.0 + 1e-9, "{} over cap", strategy.id);
        assert!(strategy.win_rate >= 0.0 && strategy.win_rate <= 1.0);
    }

    assert!(report.max_drawdown >= 0.0);
    assert!(report.utilization.exposure_used >= 0.0);
    assert!(report.execution.fill_rate > 0.0 && report.execution.fill_rate <= 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_sink_receives_every_cycle_and_one_report() {
    let sink = RecordingSink::default();
    let mut controller =
        SessionController::with_seed(short_config(), 7).with_sink(Box::new(sink.clone()));

    let report = controller.run().await;

    assert_eq!(sink.cycles.lock().unwrap().len() as u64, report.cycles);
    assert_eq!(sink.reports.lock().unwrap().len(), 1);
    assert_eq!(sink.reports.lock().unwrap()[0].final_pnl, report.final_pnl);
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_same_market_path() {
    let sink_a = RecordingSink::default();
    let sink_b = RecordingSink::default();

    SessionController::with_seed(short_config(), 99)
        .with_sink(Box::new(sink_a.clone()))
        .run()
        .await;
    SessionController::with_seed(short_config(), 99)
        .with_sink(Box::new(sink_b.clone()))
        .run()
        .await;

    // The market path depends only on the market's own seeded generator,
    // never on fills, so two equally seeded sessions trace one price path.
    let cycles_a = sink_a.cycles.lock().unwrap();
    let cycles_b = sink_b.cycles.lock().unwrap();
    let shared = cycles_a.len().min(cycles_b.len());
    assert!(shared > 0);
    for (a, b) in cycles_a.iter().take(shared).zip(cycles_b.iter().take(shared)) {
        assert_eq!(a.price, b.price, "market paths diverged at cycle {}", a.cycle);
    }
}
