//! Sine partials

use std::f64::consts::PI;

/// Value of a phase-zero sine of `frequency` Hz at `t` seconds
///
/// Non-positive or non-finite frequencies are silent.
pub fn sine(frequency: f64, t: f64) -> f64 {
    if !(frequency.is_finite() && frequency > 0.0 && t.is_finite()) {
        return 0.0;
    }
    (2.0 * PI * frequency * t).sin()
}
