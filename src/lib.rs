//! Blink Stop: headless engine for a blink-avoidance reflex game
//!
//! Pipeline: landmark frame -> EAR -> BlinkClassifier -> GameEngine -> score

pub mod core;
pub mod types;

// =============================================================================
// DETECTION CONSTANTS [C]
// =============================================================================

/// Default EAR threshold below which an eye counts as closed.
/// Overwritten per user once calibration completes.
pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.25;

/// Consecutive below-threshold frames required before a blink is reported.
/// Two samples at the 100ms detection cadence separate real blinks from
/// single-frame tracking jitter.
pub const MIN_CONSECUTIVE_CLOSED_FRAMES: u32 = 2;

/// Lower clamp for a calibrated threshold
pub const THRESHOLD_FLOOR: f64 = 0.15;

/// Upper clamp for a calibrated threshold
pub const THRESHOLD_CEIL: f64 = 0.35;

/// Expected landmark count per face-mesh frame
pub const LANDMARK_COUNT: usize = 468;

// =============================================================================
// CALIBRATION CONSTANTS [C]
// =============================================================================

/// Duration of the eyes-open sampling window (seconds)
pub const CALIBRATION_WINDOW_SECS: f64 = 3.0;

/// Safety margin applied to the observed eyes-open baseline
pub const CALIBRATION_MARGIN: f64 = 0.8;

// =============================================================================
// SCHEDULING CONSTANTS [C]
// =============================================================================

/// Detection tick interval (milliseconds). 10 FPS is sufficient for blinking.
pub const DETECTION_INTERVAL_MS: u64 = 100;

/// Per-call inference timeout (milliseconds); a timed-out frame is dropped
pub const INFERENCE_TIMEOUT_MS: u64 = 100;

// =============================================================================
// GAME CONSTANTS [C]
// =============================================================================

/// Consecutive no-face frames before a running session is disqualified
pub const FACE_LOST_FRAME_LIMIT: u32 = 30;

/// Endurance round length (seconds)
pub const ENDURANCE_DURATION_SECS: f64 = 30.0;

/// Fixed score awarded for surviving a full endurance round
pub const ENDURANCE_WIN_SCORE: f64 = 30.0;

/// Precision mode: a miss under this many seconds counts as PERFECT
pub const PRECISION_PERFECT_WINDOW_SECS: f64 = 0.1;

/// Default precision target when none is chosen (seconds)
pub const DEFAULT_PRECISION_TARGET_SECS: f64 = 10.0;

// =============================================================================
// LEADERBOARD CONSTANTS [C]
// =============================================================================

/// Entries kept per mode in the local leaderboard
pub const LEADERBOARD_CAPACITY: usize = 5;

/// Default entry count for a remote top-N fetch
pub const DEFAULT_REMOTE_FETCH_COUNT: usize = 10;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
