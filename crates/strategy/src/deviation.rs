//! Deviation-arbitrage signal
//!
//! Compares a noisy secondary quote for the same instrument against a
//! short moving average of the primary feed and trades the gap closing.
//! The secondary quote is synthesized from the primary with a small
//! uniform perturbation, standing in for a second venue.

use crate::generator::SignalGenerator;
use helios_core::{MarketSnapshot, Signal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

const WINDOW: usize = 5;
const QUOTE_NOISE: f64 = 0.005;
const DEVIATION_THRESHOLD: f64 = 0.005;
const CONFIDENCE_SCALE: f64 = 0.02;

pub struct DeviationArb {
    prices: VecDeque<f64>,
    rng: StdRng,
}

impl DeviationArb {
    pub fn new() -> Self {
        Self {
            prices: VecDeque::with_capacity(WINDOW),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a specific seed for reproducible secondary quotes
    pub fn with_seed(seed: u64) -> Self {
        Self {
            prices: VecDeque::with_capacity(WINDOW),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for DeviationArb {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator for DeviationArb {
    fn name(&self) -> &'static str {
        "deviation_arb"
    }

    fn generate(&mut self, snapshot: &MarketSnapshot) -> Signal {
        if self.prices.len() == WINDOW {
            self.prices.pop_front();
        }
        self.prices.push_back(snapshot.price);

        if self.prices.len() < WINDOW {
            return Signal::neutral("warming up price window");
        }

        let sma = self.prices.iter().sum::<f64>() / self.prices.len() as f64;
        let noise = self.rng.gen_range(-QUOTE_NOISE..=QUOTE_NOISE);
        let secondary = snapshot.price * (1.0 + noise);
        let deviation = (secondary - sma) / sma;

        if deviation.abs() <= DEVIATION_THRESHOLD {
            return Signal::neutral(format!("deviation {:.3}% within band", deviation * 100.0));
        }

        // Trade against the rich quote, expecting convergence
        Signal::new(
            -deviation.signum(),
            (deviation.abs() / CONFIDENCE_SCALE).min(1.0),
            format!("secondary quote {:.3}% off fair value", deviation * 100.0),
        )
    }
}
