//! Blink classification: EAR stream -> debounced blink signal
//!
//! A blink is only reported once closure has held for the configured number
//! of consecutive samples; a single noisy frame below threshold must never
//! end a game session. The instantaneous EAR is always reported alongside
//! the debounced signal so calibration can consume raw openness.

use tracing::debug;

use crate::core::ear::average_ear;
use crate::types::{BlinkReport, LandmarkFrame};
use crate::{DEFAULT_BLINK_THRESHOLD, MIN_CONSECUTIVE_CLOSED_FRAMES};

/// Classifier tuning. Both knobs are deliberately configuration, not
/// hard-coded at use sites.
#[derive(Debug, Clone)]
pub struct BlinkConfig {
    /// EAR below this counts as a closed frame
    pub threshold: f64,
    /// Closed frames required before reporting a blink
    pub min_consecutive_frames: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BLINK_THRESHOLD,
            min_consecutive_frames: MIN_CONSECUTIVE_CLOSED_FRAMES,
        }
    }
}

/// Stateful blink classifier. Owns the closure counter and the live
/// threshold; independent instances never share state.
#[derive(Debug, Default)]
pub struct BlinkClassifier {
    config: BlinkConfig,
    consecutive_closed_frames: u32,
}

impl BlinkClassifier {
    /// Create a classifier with default tuning
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with explicit tuning
    pub fn with_config(config: BlinkConfig) -> Self {
        Self {
            config,
            consecutive_closed_frames: 0,
        }
    }

    /// Observe one detection tick. `None` means no face was detected.
    pub fn observe(&mut self, frame: Option<&LandmarkFrame>) -> BlinkReport {
        self.observe_ear(frame.map(average_ear))
    }

    /// Observe a pre-computed EAR sample (the HTTP surface and the simulate
    /// CLI deliver EAR directly instead of raw landmarks)
    pub fn observe_ear(&mut self, ear: Option<f64>) -> BlinkReport {
        let Some(ear) = ear else {
            self.consecutive_closed_frames = 0;
            return BlinkReport::no_face();
        };

        if ear < self.config.threshold {
            self.consecutive_closed_frames += 1;
        } else {
            self.consecutive_closed_frames = 0;
        }

        BlinkReport {
            is_blinking: self.consecutive_closed_frames >= self.config.min_consecutive_frames,
            ear,
        }
    }

    /// Current threshold
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Replace the threshold (applied by calibration)
    pub fn set_threshold(&mut self, threshold: f64) {
        debug!(threshold, "blink threshold updated");
        self.config.threshold = threshold;
    }

    /// Closed frames observed so far
    pub fn consecutive_closed_frames(&self) -> u32 {
        self.consecutive_closed_frames
    }

    /// Zero the closure counter (called on mode transitions)
    pub fn reset_state(&mut self) {
        self.consecutive_closed_frames = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_closed_frame_is_not_a_blink() {
        let mut classifier = BlinkClassifier::new();
        let report = classifier.observe_ear(Some(0.1));
        assert!(!report.is_blinking);
        assert!((report.ear - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sustained_closure_reports_blink() {
        let mut classifier = BlinkClassifier::new();
        assert!(!classifier.observe_ear(Some(0.1)).is_blinking);
        assert!(classifier.observe_ear(Some(0.1)).is_blinking);
        // stays blinking while closure holds
        assert!(classifier.observe_ear(Some(0.08)).is_blinking);
    }

    #[test]
    fn test_open_frame_resets_counter() {
        let mut classifier = BlinkClassifier::new();
        classifier.observe_ear(Some(0.1));
        classifier.observe_ear(Some(0.3)); // open again
        assert_eq!(classifier.consecutive_closed_frames(), 0);
        // closure must accumulate from scratch
        assert!(!classifier.observe_ear(Some(0.1)).is_blinking);
    }

    #[test]
    fn test_no_face_resets_counter_and_reports_zero_ear() {
        let mut classifier = BlinkClassifier::new();
        classifier.observe_ear(Some(0.1));
        let report = classifier.observe_ear(None);
        assert!(!report.is_blinking);
        assert_eq!(report.ear, 0.0);
        assert_eq!(classifier.consecutive_closed_frames(), 0);
    }

    #[test]
    fn test_ear_reported_regardless_of_debounce() {
        // calibration reads raw openness off the report even though the
        // debounced signal stays false
        let mut classifier = BlinkClassifier::new();
        let report = classifier.observe_ear(Some(0.31));
        assert!(!report.is_blinking);
        assert!((report.ear - 0.31).abs() < f64::EPSILON);
    }

    #[test]
    fn test_observe_frame_computes_average_ear() {
        let mut classifier = BlinkClassifier::new();
        let frame = LandmarkFrame::with_eye_openness(0.12);
        let report = classifier.observe(Some(&frame));
        assert!((report.ear - 0.12).abs() < 1e-9);
        assert_eq!(classifier.consecutive_closed_frames(), 1);
    }

    #[test]
    fn test_threshold_is_mutable_at_runtime() {
        let mut classifier = BlinkClassifier::new();
        classifier.set_threshold(0.18);
        assert!((classifier.threshold() - 0.18).abs() < f64::EPSILON);
        // 0.2 is closed under the default threshold but open under 0.18
        classifier.observe_ear(Some(0.2));
        assert_eq!(classifier.consecutive_closed_frames(), 0);
    }

    #[test]
    fn test_reset_state_zeroes_counter() {
        let mut classifier = BlinkClassifier::new();
        classifier.observe_ear(Some(0.1));
        classifier.reset_state();
        assert_eq!(classifier.consecutive_closed_frames(), 0);
    }

    #[test]
    fn test_custom_debounce_depth() {
        let mut classifier = BlinkClassifier::with_config(BlinkConfig {
            threshold: 0.25,
            min_consecutive_frames: 3,
        });
        assert!(!classifier.observe_ear(Some(0.1)).is_blinking);
        assert!(!classifier.observe_ear(Some(0.1)).is_blinking);
        assert!(classifier.observe_ear(Some(0.1)).is_blinking);
    }
}
