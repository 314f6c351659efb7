//! Eye Aspect Ratio (EAR) computation
//!
//! EAR = (||p2 - p6|| + ||p3 - p5||) / (2 * ||p1 - p4||) over a 6-point eye
//! contour, distances taken in 3D. Pure functions of the frame; callers must
//! not invoke these on an absent frame (no face means no reading, not a
//! zero reading).

use crate::types::{LandmarkFrame, LEFT_EYE, RIGHT_EYE};

/// EAR of a single eye contour
pub fn eye_aspect_ratio(frame: &LandmarkFrame, indices: &[usize; 6]) -> f64 {
    let p1 = frame.point(indices[0]);
    let p2 = frame.point(indices[1]);
    let p3 = frame.point(indices[2]);
    let p4 = frame.point(indices[3]);
    let p5 = frame.point(indices[4]);
    let p6 = frame.point(indices[5]);

    let vertical_a = p2.distance(p6);
    let vertical_b = p3.distance(p5);
    let horizontal = p1.distance(p4);

    (vertical_a + vertical_b) / (2.0 * horizontal)
}

/// Average EAR of both eyes
pub fn average_ear(frame: &LandmarkFrame) -> f64 {
    let left = eye_aspect_ratio(frame, &LEFT_EYE);
    let right = eye_aspect_ratio(frame, &RIGHT_EYE);
    (left + right) / 2.0
}

// =============================================================================
// TESTS
// =============================================================================
