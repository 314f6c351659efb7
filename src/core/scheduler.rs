//! Detection scheduling: bridges continuous frame capture to a slow,
//! possibly hanging landmark-inference call
//!
//! Guarantees:
//! - inference cadence never exceeds the configured interval
//! - at most one inference call is in flight; a tick that lands while a
//!   previous call is outstanding is skipped entirely
//! - each call races a timeout; a timed-out or failed call drops the frame
//!   and never surfaces to the player
//! - stopping is immediate and idempotent, and results from calls still in
//!   flight at stop time are discarded

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::types::LandmarkFrame;
use crate::{DETECTION_INTERVAL_MS, INFERENCE_TIMEOUT_MS};

/// Inference failure carried back from the model boundary
pub type InferenceError = Box<dyn std::error::Error + Send + Sync>;

/// Loop timing configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tick interval between inference attempts
    pub interval: Duration,
    /// Per-call deadline; a slower call is abandoned and the frame dropped
    pub inference_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DETECTION_INTERVAL_MS),
            inference_timeout: Duration::from_millis(INFERENCE_TIMEOUT_MS),
        }
    }
}

/// Owns the detection loop task
#[derive(Debug)]
pub struct DetectionScheduler {
    handle: Option<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
}

impl Default for DetectionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionScheduler {
    pub fn new() -> Self {
        Self {
            handle: None,
            stopped: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Start the loop. `infer` is called at most once per interval; each
    /// delivered item is `Some(frame)` for a detected face or `None` for a
    /// processed frame with no face. Dropped frames (timeout, failure,
    /// skipped tick) deliver nothing.
    pub fn start_loop<F, Fut>(
        &mut self,
        infer: F,
        config: SchedulerConfig,
    ) -> mpsc::Receiver<Option<LandmarkFrame>>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<LandmarkFrame>, InferenceError>> + Send + 'static,
    {
        self.stop_loop();

        let stopped = Arc::new(AtomicBool::new(false));
        self.stopped = Arc::clone(&stopped);

        let (tx, rx) = mpsc::channel(8);
        let in_flight = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                if in_flight.swap(true, Ordering::SeqCst) {
                    // previous inference still outstanding: skip this tick
                    debug!("inference outstanding, tick skipped");
                    continue;
                }

                let call = infer();
                let tx = tx.clone();
                let in_flight = Arc::clone(&in_flight);
                let stopped = Arc::clone(&stopped);
                let timeout = config.inference_timeout;

                tokio::spawn(async move {
                    match tokio::time::timeout(timeout, call).await {
                        Err(_) => {
                            // timeout is not an error, just a dropped frame
                            debug!("inference timed out, frame dropped");
                        }
                        Ok(Err(err)) => {
                            warn!(%err, "inference failed, frame dropped");
                        }
                        Ok(Ok(frame)) => {
                            // a call that outlives stop_loop() must not leak
                            // its result into a torn-down session
                            if !stopped.load(Ordering::SeqCst) {
                                let _ = tx.try_send(frame);
                            }
                        }
                    }
                    in_flight.store(false, Ordering::SeqCst);
                });
            }
        });

        self.handle = Some(handle);
        rx
    }

    /// Stop the loop. Immediate, idempotent, and safe to call before any
    /// start.
    pub fn stop_loop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for DetectionScheduler {
    fn drop(&mut self) {
        self.stop_loop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
