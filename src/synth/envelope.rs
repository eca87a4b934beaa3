//! Exponential decay envelope
//!
//! Struck-instrument amplitude shaping: full level at onset, then
//! `exp(-rate * t)`. Silent before onset.

/// Exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    rate: f64,
}

impl Envelope {
    /// Create an envelope decaying at `rate` (per second)
    pub fn new(rate: f64) -> Self {
        Self {
            rate: if rate.is_finite() { rate.max(0.0) } else { 0.0 },
        }
    }

    /// Decay rate per second
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Level at `t` seconds after onset
    pub fn level_at(&self, t: f64) -> f64 {
        if t < 0.0 || !t.is_finite() {
            return 0.0;
        }
        (-t * self.rate).exp()
    }
}
