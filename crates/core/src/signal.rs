//! Strategy signal value type

/// Directional signal emitted by a strategy variant
#[derive(Debug, Clone)]
pub struct Signal {
    /// Direction and strength in [-1, 1] (positive = buy)
    pub value: f64,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable explanation for logging
    pub reasoning: String,
}

impl Signal {
    /// Build a signal, clamping value and confidence into range
    pub fn new(value: f64, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            value: value.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }

    /// A zero-strength signal with the given reason
    pub fn neutral(reasoning: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }
}
