//! Threshold self-calibration
//!
//! A fixed 3-second window samples EAR while the player keeps their eyes
//! open, then sets the blink threshold to 80% of the observed baseline,
//! clamped to [0.15, 0.35]. With zero samples the threshold is left
//! untouched. States: Idle -> Running -> Done, re-enterable via start().

use std::time::{Duration, Instant};

use tracing::info;

use crate::types::CalibrationProgress;
use crate::{CALIBRATION_MARGIN, CALIBRATION_WINDOW_SECS, THRESHOLD_CEIL, THRESHOLD_FLOOR};

/// Calibration lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    Running,
    Done,
}

/// Runs the eyes-open sampling window and derives the personalized
/// threshold
#[derive(Debug)]
pub struct CalibrationController {
    state: CalibrationState,
    window: Duration,
    started_at: Option<Instant>,
    samples: Vec<f64>,
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationController {
    /// Controller with the standard 3-second window
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs_f64(CALIBRATION_WINDOW_SECS))
    }

    /// Controller with a custom window (tests, HTTP surface)
    pub fn with_window(window: Duration) -> Self {
        Self {
            state: CalibrationState::Idle,
            window,
            started_at: None,
            samples: Vec::new(),
        }
    }

    /// Begin (or restart) the sampling window
    pub fn start(&mut self, now: Instant) {
        self.state = CalibrationState::Running;
        self.started_at = Some(now);
        self.samples.clear();
    }

    /// Append one EAR sample. Ignored unless the window is running.
    pub fn sample(&mut self, ear: f64) {
        if self.state == CalibrationState::Running {
            self.samples.push(ear);
        }
    }

    /// Report window progress; marks the window done once it has elapsed
    pub fn tick(&mut self, now: Instant) -> CalibrationProgress {
        let elapsed = match (self.state, self.started_at) {
            (CalibrationState::Running, Some(started)) => {
                now.saturating_duration_since(started).as_secs_f64()
            }
            (CalibrationState::Done, _) => self.window.as_secs_f64(),
            _ => 0.0,
        };

        let window = self.window.as_secs_f64();
        let done = self.state != CalibrationState::Idle && elapsed >= window;
        if done && self.state == CalibrationState::Running {
            self.state = CalibrationState::Done;
        }

        CalibrationProgress {
            fraction: if window > 0.0 {
                (elapsed / window).min(1.0)
            } else {
                1.0
            },
            remaining_secs: (window - elapsed).max(0.0),
            done,
        }
    }

    /// Derive the new threshold: mean of the window's samples scaled by the
    /// safety margin and clamped. Returns None (threshold unchanged) when no
    /// samples were collected.
    pub fn finish(&mut self) -> Option<f64> {
        self.state = CalibrationState::Done;

        if self.samples.is_empty() {
            info!("calibration window collected no samples; threshold unchanged");
            return None;
        }

        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        let threshold = (mean * CALIBRATION_MARGIN).clamp(THRESHOLD_FLOOR, THRESHOLD_CEIL);
        info!(
            samples = self.samples.len(),
            baseline = mean,
            threshold,
            "calibration complete"
        );
        Some(threshold)
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
