//! Integration tests for the detection scheduler
//!
//! Covers the at-most-one-in-flight guarantee, timeout handling, and
//! stop semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use blinkstop::core::{DetectionScheduler, InferenceError, SchedulerConfig};
use blinkstop::types::LandmarkFrame;

fn frame() -> LandmarkFrame {
    LandmarkFrame::with_eye_openness(0.3)
}

#[tokio::test]
async fn test_slow_inference_skips_ticks() {
    // inference takes 100ms against a 20ms interval: ticks that land while
    // a call is outstanding must be skipped, never queued
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut scheduler = DetectionScheduler::new();
    let _rx = scheduler.start_loop(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_millis(100)).await;
                Ok::<_, InferenceError>(Some(frame()))
            }
        },
        SchedulerConfig {
            interval: Duration::from_millis(20),
            inference_timeout: Duration::from_millis(500),
        },
    );

    sleep(Duration::from_millis(210)).await;
    scheduler.stop_loop();

    // a naive loop would have issued ~10 calls; one-in-flight allows ~2-3
    let total = calls.load(Ordering::SeqCst);
    assert!(total >= 1, "loop never ran");
    assert!(
        total <= 4,
        "expected skipped ticks while inference was outstanding, got {} calls",
        total
    );
}

#[tokio::test]
async fn test_timed_out_inference_drops_frame_and_loop_continues() {
    // every call hangs past the timeout: no frame is ever delivered, but
    // the loop keeps issuing fresh calls
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut scheduler = DetectionScheduler::new();
    let mut rx = scheduler.start_loop(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_secs(60)).await;
                Ok::<_, InferenceError>(Some(frame()))
            }
        },
        SchedulerConfig {
            interval: Duration::from_millis(20),
            inference_timeout: Duration::from_millis(10),
        },
    );

    sleep(Duration::from_millis(150)).await;
    scheduler.stop_loop();

    assert!(rx.try_recv().is_err(), "hung inference must deliver nothing");
    assert!(
        calls.load(Ordering::SeqCst) >= 2,
        "loop must keep ticking after timeouts"
    );
}

#[tokio::test]
async fn test_inference_cadence_never_exceeds_interval() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut scheduler = DetectionScheduler::new();
    let _rx = scheduler.start_loop(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, InferenceError>(Some(frame())) }
        },
        SchedulerConfig {
            interval: Duration::from_millis(50),
            inference_timeout: Duration::from_millis(100),
        },
    );

    sleep(Duration::from_millis(120)).await;
    scheduler.stop_loop();

    // first tick fires immediately, then one per 50ms
    let total = calls.load(Ordering::SeqCst);
    assert!((1..=4).contains(&total), "expected <=4 calls in 120ms, got {}", total);
}

#[tokio::test]
async fn test_stop_discards_in_flight_result() {
    // the call completes after stop_loop(); its result must not be
    // delivered into a torn-down session
    let mut scheduler = DetectionScheduler::new();
    let mut rx = scheduler.start_loop(
        || async {
            sleep(Duration::from_millis(60)).await;
            Ok::<_, InferenceError>(Some(frame()))
        },
        SchedulerConfig {
            interval: Duration::from_millis(10),
            inference_timeout: Duration::from_millis(500),
        },
    );

    sleep(Duration::from_millis(20)).await; // first call is now in flight
    scheduler.stop_loop();
    sleep(Duration::from_millis(100)).await; // let it complete

    assert!(rx.try_recv().is_err(), "post-stop result leaked");
}

#[tokio::test]
async fn test_restart_after_stop() {
    let mut scheduler = DetectionScheduler::new();

    let _rx = scheduler.start_loop(
        || async { Ok::<_, InferenceError>(None) },
        SchedulerConfig::default(),
    );
    scheduler.stop_loop();
    assert!(!scheduler.is_running());

    let mut rx = scheduler.start_loop(
        || async { Ok::<_, InferenceError>(Some(frame())) },
        SchedulerConfig {
            interval: Duration::from_millis(10),
            inference_timeout: Duration::from_millis(50),
        },
    );
    assert!(scheduler.is_running());
    assert!(rx.recv().await.expect("restarted loop delivers").is_some());
    scheduler.stop_loop();
}
