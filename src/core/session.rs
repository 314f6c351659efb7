//! Game session state machine
//!
//! Phases: MENU -> CALIBRATING -> PLAYING | ENDURANCE -> GAME_OVER -> MENU.
//! Transitions are strictly linear within one session; calibration is never
//! skipped. The machine consumes the debounced blink signal plus elapsed
//! time and produces a score with an end reason. The face-missing counter
//! lives here as session state, never as an ambient global.

use std::time::Instant;

use tracing::{debug, info};

use crate::types::{
    BlinkReport, CameraError, EndReason, GameMode, GamePhase, ScoreResult, SessionOutcome,
};
use crate::{
    DEFAULT_PRECISION_TARGET_SECS, ENDURANCE_DURATION_SECS, ENDURANCE_WIN_SCORE,
    FACE_LOST_FRAME_LIMIT, PRECISION_PERFECT_WINDOW_SECS,
};

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Consecutive no-face frames before disqualification
    pub face_lost_frame_limit: u32,
    /// Endurance round length (seconds)
    pub endurance_duration_secs: f64,
    /// Precision misses under this count as PERFECT (seconds)
    pub perfect_window_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            face_lost_frame_limit: FACE_LOST_FRAME_LIMIT,
            endurance_duration_secs: ENDURANCE_DURATION_SECS,
            perfect_window_secs: PRECISION_PERFECT_WINDOW_SECS,
        }
    }
}

/// The game state machine
#[derive(Debug)]
pub struct GameEngine {
    config: SessionConfig,
    phase: GamePhase,
    mode: Option<GameMode>,
    target_secs: Option<f64>,
    started_at: Option<Instant>,
    face_missing_frames: u32,
    /// Cosmetic reward latch; survives return to menu
    reward_unlocked: bool,
    /// Most recent finished score, kept for display and sharing
    last_result: Option<ScoreResult>,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            phase: GamePhase::Menu,
            mode: None,
            target_secs: None,
            started_at: None,
            face_missing_frames: 0,
            reward_unlocked: false,
            last_result: None,
        }
    }

    /// Start a session for the chosen mode. `camera` carries the result of
    /// camera acquisition: a failure aborts the transition and the machine
    /// stays in MENU. Allowed from MENU and, for restarts, from GAME_OVER.
    pub fn start_session(
        &mut self,
        mode: GameMode,
        target_secs: Option<f64>,
        camera: Result<(), CameraError>,
        _now: Instant,
    ) -> Result<(), CameraError> {
        if !matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
            debug!(phase = %self.phase, "start_session ignored mid-session");
            return Ok(());
        }

        if let Err(err) = camera {
            info!(%err, "camera acquisition failed, returning to menu");
            self.phase = GamePhase::Menu;
            return Err(err);
        }

        self.mode = Some(mode);
        self.target_secs = match mode {
            GameMode::Precision => Some(target_secs.unwrap_or(DEFAULT_PRECISION_TARGET_SECS)),
            _ => None,
        };
        self.started_at = None;
        self.face_missing_frames = 0;
        self.phase = GamePhase::Calibrating;
        info!(%mode, "session started, calibrating");
        Ok(())
    }

    /// Enter the scored round once calibration has finished
    pub fn begin_play(&mut self, now: Instant) {
        if self.phase != GamePhase::Calibrating {
            debug!(phase = %self.phase, "begin_play ignored outside calibration");
            return;
        }

        self.started_at = Some(now);
        self.face_missing_frames = 0;
        self.phase = match self.mode {
            Some(GameMode::Endurance) => GamePhase::Endurance,
            _ => GamePhase::Playing,
        };
        info!(phase = %self.phase, "round started");
    }

    /// Process one detection tick while a round is running. Returns the
    /// session outcome when this frame ends the round.
    pub fn on_frame(
        &mut self,
        report: &BlinkReport,
        face_present: bool,
        now: Instant,
    ) -> Option<SessionOutcome> {
        if !self.phase.is_running() {
            return None;
        }

        // the endurance clock wins over a simultaneous blink
        if let Some(outcome) = self.check_endurance_clock(now) {
            return Some(outcome);
        }

        if !face_present {
            self.face_missing_frames += 1;
            if self.face_missing_frames >= self.config.face_lost_frame_limit {
                return Some(self.end(EndReason::Disqualified, now));
            }
            return None;
        }

        self.face_missing_frames = 0;
        if report.is_blinking {
            return Some(self.end(EndReason::Blink, now));
        }
        None
    }

    /// Render-loop tick: checks only the clock, never the blink signal
    pub fn tick(&mut self, now: Instant) -> Option<SessionOutcome> {
        if !self.phase.is_running() {
            return None;
        }
        self.check_endurance_clock(now)
    }

    /// Return to the menu after game over (or abandon a running session).
    /// Camera and detection resources are released by the caller; the
    /// machine resets its per-session state. Idempotent.
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.mode = None;
        self.target_secs = None;
        self.started_at = None;
        self.face_missing_frames = 0;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn target_secs(&self) -> Option<f64> {
        self.target_secs
    }

    /// Seconds since the round began, while one is running
    pub fn elapsed_secs(&self, now: Instant) -> Option<f64> {
        if self.phase.is_running() {
            self.started_at
                .map(|t| now.saturating_duration_since(t).as_secs_f64())
        } else {
            None
        }
    }

    pub fn face_missing_frames(&self) -> u32 {
        self.face_missing_frames
    }

    pub fn reward_unlocked(&self) -> bool {
        self.reward_unlocked
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last_result.as_ref()
    }

    fn check_endurance_clock(&mut self, now: Instant) -> Option<SessionOutcome> {
        if self.phase == GamePhase::Endurance {
            let elapsed = self.elapsed_secs(now).unwrap_or(0.0);
            if elapsed >= self.config.endurance_duration_secs {
                return Some(self.end(EndReason::WinEndurance, now));
            }
        }
        None
    }

    /// Finish the round and emit the once-per-session outcome event
    fn end(&mut self, reason: EndReason, now: Instant) -> SessionOutcome {
        let mode = self.mode.unwrap_or(GameMode::Classic);
        let elapsed = self
            .started_at
            .map(|t| now.saturating_duration_since(t).as_secs_f64())
            .unwrap_or(0.0);

        let mut perfect = false;
        let mut newly_unlocked = false;
        let value = match reason {
            EndReason::WinEndurance => {
                newly_unlocked = !self.reward_unlocked;
                self.reward_unlocked = true;
                ENDURANCE_WIN_SCORE
            }
            EndReason::Disqualified => 0.0,
            EndReason::Blink => match mode {
                GameMode::Classic | GameMode::Endurance => elapsed,
                GameMode::Precision => {
                    let target = self.target_secs.unwrap_or(DEFAULT_PRECISION_TARGET_SECS);
                    let miss = (target - elapsed).abs();
                    perfect = miss < self.config.perfect_window_secs;
                    miss
                }
            },
        };

        let result = ScoreResult {
            mode,
            value,
            end_reason: reason,
            perfect,
            reward_unlocked: newly_unlocked,
        };
        let outcome = SessionOutcome::new(&result);
        info!(reason = %reason, score = %outcome.formatted_score, "round over");

        self.phase = GamePhase::GameOver;
        self.last_result = Some(result);
        outcome
    }
}

// =============================================================================
// TESTS
// =============================================================================
