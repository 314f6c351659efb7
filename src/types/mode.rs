//! Game mode definitions and per-mode scoring conventions

use serde::{Deserialize, Serialize};

/// The three selectable game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// Survive as long as possible; higher score is better
    Classic,
    /// Blink as close to the target time as possible; lower miss is better
    Precision,
    /// Hold out for the full round; ranked ascending like Precision
    Endurance,
}

impl GameMode {
    /// Leaderboard sort order for this mode
    pub fn higher_is_better(&self) -> bool {
        matches!(self, GameMode::Classic)
    }

    /// Key fragment used in the string-keyed local store
    pub fn storage_key(&self) -> &'static str {
        match self {
            GameMode::Classic => "CLASSIC",
            GameMode::Precision => "PRECISION",
            GameMode::Endurance => "ENDURANCE",
        }
    }

    /// Format a score value for display
    pub fn format_score(&self, value: f64) -> String {
        match self {
            GameMode::Classic | GameMode::Endurance => format!("{:.2}s", value),
            GameMode::Precision => format!("{:.3}s off", value),
        }
    }

    /// Parse a CLI mode name (case insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "CLASSIC" => Some(GameMode::Classic),
            "PRECISION" => Some(GameMode::Precision),
            "ENDURANCE" => Some(GameMode::Endurance),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

// =============================================================================
// TESTS
// =============================================================================
