//! Session outcome types: end reasons, score results, and the
//! once-per-session event handed to UI/audio collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GameMode;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    /// A debounced blink was detected
    Blink,
    /// The face left the frame for too long
    Disqualified,
    /// The full endurance round was survived
    WinEndurance,
}

impl EndReason {
    /// Game-over headline
    pub fn headline(&self) -> &'static str {
        match self {
            EndReason::Blink => "BLINK DETECTED",
            EndReason::Disqualified => "DISQUALIFIED",
            EndReason::WinEndurance => "THEME UNLOCKED",
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EndReason::Blink => "BLINK",
            EndReason::Disqualified => "DISQUALIFIED",
            EndReason::WinEndurance => "WIN_ENDURANCE",
        };
        write!(f, "{}", name)
    }
}

/// Final score of one session. The engine keeps the most recent one for
/// display and sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub mode: GameMode,
    /// Mode-dependent value: survived seconds (Classic/Endurance),
    /// absolute miss in seconds (Precision), 0.0 when disqualified
    pub value: f64,
    pub end_reason: EndReason,
    /// Precision only: the miss landed inside the PERFECT window
    pub perfect: bool,
    /// Endurance win unlocked the cosmetic reward just now
    pub reward_unlocked: bool,
}

impl ScoreResult {
    /// Score formatted per mode conventions ("DQ" when disqualified)
    pub fn formatted(&self) -> String {
        match self.end_reason {
            EndReason::Disqualified => "DQ".to_string(),
            _ => self.mode.format_score(self.value),
        }
    }

    /// Label above the final score
    pub fn label(&self) -> &'static str {
        match (self.end_reason, self.mode) {
            (EndReason::Disqualified, _) => "FACE LOST",
            (EndReason::WinEndurance, _) => "EYES OF STEEL",
            (EndReason::Blink, GameMode::Classic) => "YOU SURVIVED",
            (EndReason::Blink, GameMode::Precision) => "OFF BY",
            (EndReason::Blink, GameMode::Endurance) => "YOUR EYES GAVE UP AT",
        }
    }

    /// Shareable one-liner for the clipboard/share sheet
    pub fn share_text(&self) -> String {
        format!(
            "👁️ I survived {} in the Void! My eyes are made of steel.\n\nCan you beat my high score? Play Blink Stop now! #BlinkStop",
            self.formatted()
        )
    }
}

/// Event fired exactly once per completed session, consumed by UI and
/// audio collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub end_reason: EndReason,
    pub mode: GameMode,
    pub score: f64,
    pub formatted_score: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionOutcome {
    pub fn new(result: &ScoreResult) -> Self {
        Self {
            end_reason: result.end_reason,
            mode: result.mode,
            score: result.value,
            formatted_score: result.formatted(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
