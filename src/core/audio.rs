//! Audio cue direction
//!
//! Synthesis is an external collaborator; this component decides *when*
//! tones should fire. Beat timing is owned state here, fed the current
//! elapsed time explicitly, never read from ambient globals.

use crate::types::{EndReason, ScoreResult};

/// Cues handed to the external tone generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Low background drone, on at round start
    DroneOn,
    /// Drone off at round end
    DroneOff,
    /// Accelerating heartbeat during classic/precision play
    Heartbeat,
    /// Harsh glitch burst at game over
    Glitch,
    /// Rising jingle for an endurance win or a PERFECT precision hit
    Win,
}

/// Paces heartbeat cues against elapsed round time. The interval shrinks
/// from 1.0s toward a 0.3s floor as the round drags on.
#[derive(Debug, Default)]
pub struct HeartbeatPacer {
    last_beat_secs: Option<f64>,
}

impl HeartbeatPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Should a heartbeat fire at this elapsed time? The first poll always
    /// beats; later polls wait out the current interval.
    pub fn poll(&mut self, elapsed_secs: f64) -> bool {
        let interval = (1.0 - elapsed_secs * 0.02).max(0.3);
        let due = match self.last_beat_secs {
            None => true,
            Some(last) => elapsed_secs - last > interval,
        };
        if due {
            self.last_beat_secs = Some(elapsed_secs);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_beat_secs = None;
    }
}

/// Maps session events to audio cues
#[derive(Debug, Default)]
pub struct AudioDirector {
    pacer: HeartbeatPacer,
}

impl AudioDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues for a round starting (calibration finished)
    pub fn round_started(&mut self) -> Vec<AudioCue> {
        self.pacer.reset();
        vec![AudioCue::DroneOn]
    }

    /// Per-display-tick poll while a classic/precision round runs
    pub fn poll(&mut self, elapsed_secs: f64) -> Option<AudioCue> {
        self.pacer.poll(elapsed_secs).then_some(AudioCue::Heartbeat)
    }

    /// Cues for a finished round
    pub fn round_ended(&mut self, result: &ScoreResult) -> Vec<AudioCue> {
        let mut cues = vec![AudioCue::DroneOff, AudioCue::Glitch];
        if result.end_reason == EndReason::WinEndurance || result.perfect {
            cues.push(AudioCue::Win);
        }
        cues
    }
}

// =============================================================================
// TESTS
// =============================================================================
