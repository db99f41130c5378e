//! Mean-reversion signal
//!
//! Z-score of the latest price against a rolling window; fades moves
//! beyond two standard deviations.

use crate::generator::SignalGenerator;
use helios_core::{MarketSnapshot, Signal};
use std::collections::VecDeque;

const WINDOW: usize = 20;
const Z_THRESHOLD: f64 = 2.0;
const Z_SATURATION: f64 = 3.0;

pub struct MeanReversion {
    prices: VecDeque<f64>,
}

impl MeanReversion {
    pub fn new() -> Self {
        Self {
            prices: VecDeque::with_capacity(WINDOW),
        }
    }
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn generate(&mut self, snapshot: &MarketSnapshot) -> Signal {
        if self.prices.len() == WINDOW {
            self.prices.pop_front();
        }
        self.prices.push_back(snapshot.price);

        if self.prices.len() < WINDOW {
            return Signal::neutral("warming up price window");
        }

        let n = self.prices.len() as f64;
        let mean = self.prices.iter().sum::<f64>() / n;
        let variance = self.prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev <= f64::EPSILON {
            return Signal::neutral("flat price window");
        }

        let z = (snapshot.price - mean) / std_dev;
        if z.abs() <= Z_THRESHOLD {
            return Signal::neutral(format!("z-score {z:.2} within band"));
        }

        // Fade the extreme: short rich prices, buy cheap ones
        let strength = (z.abs() / Z_SATURATION).min(1.0);
        Signal::new(
            -z.signum() * strength,
            strength,
            format!("z-score {z:.2} beyond {Z_THRESHOLD} sigma"),
        )
    }
}
