//! Per-sample report structures

use serde::{Deserialize, Serialize};

/// Output of one classifier observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkReport {
    /// Debounced blink signal: closure held for the configured frame count
    pub is_blinking: bool,
    /// Instantaneous average EAR (0.0 when no face was present).
    /// Always reported, independent of the debounce outcome; calibration
    /// consumes this field raw.
    pub ear: f64,
}

impl BlinkReport {
    /// Report for a tick with no landmark frame
    pub fn no_face() -> Self {
        Self {
            is_blinking: false,
            ear: 0.0,
        }
    }
}

/// Progress of the calibration window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    /// Fraction of the window elapsed, in [0, 1]
    pub fraction: f64,
    /// Seconds left in the window (0 when done)
    pub remaining_secs: f64,
    /// The window has elapsed; callers should invoke finish()
    pub done: bool,
}
