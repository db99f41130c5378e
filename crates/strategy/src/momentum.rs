//! Momentum signal
//!
//! Simple return over a rolling window; follows moves beyond a 2% drift.

use crate::generator::SignalGenerator;
use helios_core::{MarketSnapshot, Signal};
use std::collections::VecDeque;

const WINDOW: usize = 10;
const MOMENTUM_THRESHOLD: f64 = 0.02;
const STRENGTH_SCALE: f64 = 0.1;
const CONFIDENCE_SCALE: f64 = 0.05;

pub struct Momentum {
    prices: VecDeque<f64>,
}

impl Momentum {
    pub fn new() -> Self {
        Self {
            prices: VecDeque::with_capacity(WINDOW),
        }
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn generate(&mut self, snapshot: &MarketSnapshot) -> Signal {
        if self.prices.len() == WINDOW {
            self.prices.pop_front();
        }
        self.prices.push_back(snapshot.price);

        if self.prices.len() < WINDOW {
            return Signal::neutral("warming up price window");
        }

        let oldest = self.prices[0];
        if oldest <= f64::EPSILON {
            return Signal::neutral("degenerate reference price");
        }
        let momentum = (snapshot.price - oldest) / oldest;

        if momentum.abs() <= MOMENTUM_THRESHOLD {
            return Signal::neutral(format!("drift {:.2}% within band", momentum * 100.0));
        }

        Signal::new(
            momentum.signum() * (momentum.abs() / STRENGTH_SCALE).min(1.0),
            (momentum.abs() / CONFIDENCE_SCALE).min(1.0),
            format!("drift {:.2}% over {WINDOW} snapshots", momentum * 100.0),
        )
    }
}
