//! Power-law time scale shared by the scrubber and every task bar.
//!
//! Elapsed time is normalized to `[0, 1]`, raised to `exponent`, and scaled
//! back. Exponents below 1 stretch the dense start of a run and squeeze its
//! sparse tail. All quantities are milliseconds.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Exponent used when none is configured.
pub const DEFAULT_EXPONENT: f64 = 0.4;

fn usable_exponent(exponent: f64) -> f64 {
    if exponent.is_finite() && exponent > 0.0 {
        exponent
    } else {
        DEFAULT_EXPONENT
    }
}

fn usable_total(total_duration: f64) -> bool {
    total_duration.is_finite() && total_duration > 0.0
}

/// Clamp into `[0, total]`; NaN maps to 0.
fn clamp_to(value: f64, total: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, total)
    }
}

/// Map linear elapsed time to display time.
///
/// Out-of-range input is clamped, and a non-positive `total_duration`
/// yields 0. A non-finite or non-positive exponent falls back to
/// [`DEFAULT_EXPONENT`].
pub fn to_display(elapsed: f64, total_duration: f64, exponent: f64) -> f64 {
    if !usable_total(total_duration) {
        return 0.0;
    }
    let normalized = clamp_to(elapsed, total_duration) / total_duration;
    normalized.powf(usable_exponent(exponent)) * total_duration
}

/// Exact inverse of [`to_display`].
pub fn to_linear(display_elapsed: f64, total_duration: f64, exponent: f64) -> f64 {
    if !usable_total(total_duration) {
        return 0.0;
    }
    let normalized = clamp_to(display_elapsed, total_duration) / total_duration;
    normalized.powf(1.0 / usable_exponent(exponent)) * total_duration
}

/// A validated scale exponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    exponent: f64,
}

impl TimeScale {
    /// # Errors
    /// `Error::Validation` unless `exponent` is finite and positive.
    pub fn new(exponent: f64) -> Result<Self> {
        if exponent.is_finite() && exponent > 0.0 {
            Ok(Self { exponent })
        } else {
            Err(Error::Validation(format!(
                "time scale exponent must be finite and positive, got {}",
                exponent
            )))
        }
    }

    /// The identity scale.
    pub fn linear() -> Self {
        Self { exponent: 1.0 }
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn to_display(&self, elapsed: f64, total_duration: f64) -> f64 {
        to_display(elapsed, total_duration, self.exponent)
    }

    pub fn to_linear(&self, display_elapsed: f64, total_duration: f64) -> f64 {
        to_linear(display_elapsed, total_duration, self.exponent)
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
        }
    }
}
