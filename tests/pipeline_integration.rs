//! Integration tests for the detection-to-score pipeline
//!
//! Full path: landmark frames -> EAR -> BlinkClassifier -> GameEngine

use std::time::{Duration, Instant};

use blinkstop::core::{BlinkClassifier, CalibrationController, GameEngine};
use blinkstop::types::{EndReason, GameMode, GamePhase, LandmarkFrame};
use blinkstop::FACE_LOST_FRAME_LIMIT;

fn face(ear: f64) -> LandmarkFrame {
    LandmarkFrame::with_eye_openness(ear)
}

/// Drive calibration with open-eye frames and apply the derived threshold
fn calibrate(
    engine: &mut GameEngine,
    classifier: &mut BlinkClassifier,
    baseline_ear: f64,
    t0: Instant,
) {
    let mut calibration = CalibrationController::new();
    calibration.start(t0);

    for i in 0..5 {
        let frame = face(baseline_ear);
        let report = classifier.observe(Some(&frame));
        calibration.sample(report.ear);
        calibration.tick(t0 + Duration::from_millis(600 * (i + 1)));
    }

    if let Some(threshold) = calibration.finish() {
        classifier.set_threshold(threshold);
    }
    classifier.reset_state();
    engine.begin_play(t0 + Duration::from_secs(3));
}

#[test]
fn test_full_classic_path() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Classic, None, Ok(()), t0)
        .unwrap();
    assert_eq!(engine.phase(), GamePhase::Calibrating);

    // wide-open baseline (0.40) calibrates the threshold up to the 0.32 cap
    calibrate(&mut engine, &mut classifier, 0.40, t0);
    assert_eq!(engine.phase(), GamePhase::Playing);
    assert!((classifier.threshold() - 0.32).abs() < 1e-9);

    let play_start = t0 + Duration::from_secs(3);

    // 0.28 would read as open under the default threshold, but this player's
    // calibration classifies it as closed
    let drooping = face(0.28);
    let report = classifier.observe(Some(&drooping));
    assert!(engine.on_frame(&report, true, play_start).is_none());

    let report = classifier.observe(Some(&drooping));
    let outcome = engine
        .on_frame(&report, true, play_start + Duration::from_secs(4))
        .expect("second closed frame confirms the blink");
    assert_eq!(outcome.end_reason, EndReason::Blink);
    assert!((outcome.score - 4.0).abs() < 1e-6);
}

#[test]
fn test_precision_perfect_end_to_end() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Precision, Some(10.0), Ok(()), t0)
        .unwrap();
    calibrate(&mut engine, &mut classifier, 0.30, t0);
    let play_start = t0 + Duration::from_secs(3);

    // eyes open through most of the run
    for i in 1..10 {
        let report = classifier.observe(Some(&face(0.30)));
        assert!(engine
            .on_frame(&report, true, play_start + Duration::from_secs(i))
            .is_none());
    }

    // closure starts at 9.97s, confirmed at 10.07s
    let report = classifier.observe(Some(&face(0.10)));
    assert!(engine
        .on_frame(&report, true, play_start + Duration::from_secs_f64(9.97))
        .is_none());

    let report = classifier.observe(Some(&face(0.10)));
    let outcome = engine
        .on_frame(&report, true, play_start + Duration::from_secs_f64(10.07))
        .expect("debounced blink ends the run");

    assert!((outcome.score - 0.07).abs() < 1e-9);
    let result = engine.last_result().unwrap();
    assert!(result.perfect, "0.07s off is PERFECT");
}

#[test]
fn test_endurance_win_end_to_end() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Endurance, None, Ok(()), t0)
        .unwrap();
    calibrate(&mut engine, &mut classifier, 0.30, t0);
    let play_start = t0 + Duration::from_secs(3);
    assert_eq!(engine.phase(), GamePhase::Endurance);

    for i in 1..30 {
        let report = classifier.observe(Some(&face(0.30)));
        assert!(engine
            .on_frame(&report, true, play_start + Duration::from_secs(i))
            .is_none());
    }

    let report = classifier.observe(Some(&face(0.30)));
    let outcome = engine
        .on_frame(&report, true, play_start + Duration::from_secs_f64(30.05))
        .expect("full round survived");

    assert_eq!(outcome.end_reason, EndReason::WinEndurance);
    assert!((outcome.score - 30.0).abs() < f64::EPSILON);
    assert!(engine.last_result().unwrap().reward_unlocked);

    // the cosmetic reward unlocks exactly once
    engine.return_to_menu();
    let t1 = Instant::now();
    engine
        .start_session(GameMode::Endurance, None, Ok(()), t1)
        .unwrap();
    engine.begin_play(t1);
    let outcome = engine.tick(t1 + Duration::from_secs(31)).unwrap();
    assert_eq!(outcome.end_reason, EndReason::WinEndurance);
    assert!(!engine.last_result().unwrap().reward_unlocked);
}

#[test]
fn test_face_loss_disqualifies_through_classifier() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Classic, None, Ok(()), t0)
        .unwrap();
    calibrate(&mut engine, &mut classifier, 0.30, t0);
    let play_start = t0 + Duration::from_secs(3);

    let mut outcome = None;
    for i in 0..FACE_LOST_FRAME_LIMIT {
        assert!(outcome.is_none());
        let report = classifier.observe(None);
        assert!(!report.is_blinking);
        outcome = engine.on_frame(
            &report,
            false,
            play_start + Duration::from_millis(100 * (i as u64 + 1)),
        );
    }

    let outcome = outcome.expect("sustained face loss disqualifies");
    assert_eq!(outcome.end_reason, EndReason::Disqualified);
    assert_eq!(outcome.score, 0.0);
}

#[test]
fn test_no_face_interrupts_debounce() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Classic, None, Ok(()), t0)
        .unwrap();
    calibrate(&mut engine, &mut classifier, 0.30, t0);
    let now = t0 + Duration::from_secs(4);

    // closed, face lost, closed, closed: the gap resets the counter, so
    // only the final pair forms a blink
    let closed = face(0.10);

    let report = classifier.observe(Some(&closed));
    assert!(engine.on_frame(&report, true, now).is_none());

    let report = classifier.observe(None);
    assert!(engine.on_frame(&report, false, now).is_none());

    let report = classifier.observe(Some(&closed));
    assert!(engine.on_frame(&report, true, now).is_none());

    let report = classifier.observe(Some(&closed));
    assert!(engine.on_frame(&report, true, now).is_some());
}

#[test]
fn test_single_frame_jitter_never_ends_a_round() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Classic, None, Ok(()), t0)
        .unwrap();
    calibrate(&mut engine, &mut classifier, 0.30, t0);
    let now = t0 + Duration::from_secs(4);

    // alternating closed/open frames: tracking jitter, not a blink
    for _ in 0..20 {
        let report = classifier.observe(Some(&face(0.10)));
        assert!(engine.on_frame(&report, true, now).is_none());
        let report = classifier.observe(Some(&face(0.30)));
        assert!(engine.on_frame(&report, true, now).is_none());
    }
    assert_eq!(engine.phase(), GamePhase::Playing);
}

#[test]
fn test_zero_sample_calibration_keeps_default_threshold() {
    let mut engine = GameEngine::new();
    let mut classifier = BlinkClassifier::new();
    let mut calibration = CalibrationController::new();
    let t0 = Instant::now();

    engine
        .start_session(GameMode::Classic, None, Ok(()), t0)
        .unwrap();
    calibration.start(t0);

    // the whole window passes with no face in frame
    let default_threshold = classifier.threshold();
    calibration.tick(t0 + Duration::from_secs(4));
    if let Some(threshold) = calibration.finish() {
        classifier.set_threshold(threshold);
    }
    engine.begin_play(t0 + Duration::from_secs(4));

    assert!((classifier.threshold() - default_threshold).abs() < f64::EPSILON);
    assert_eq!(engine.phase(), GamePhase::Playing);
}
