//! Game phase definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The five phases a session moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Mode selection; no camera held
    Menu,
    /// Eyes-open sampling window personalizing the threshold
    Calibrating,
    /// Classic/Precision round in progress
    Playing,
    /// Endurance round in progress
    Endurance,
    /// Session finished; score available
    GameOver,
}

impl GamePhase {
    /// Is a round currently being scored?
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Endurance)
    }

    /// Terminal color for status lines
    pub fn color(&self) -> Color {
        match self {
            GamePhase::Menu => Color::BrightBlack,
            GamePhase::Calibrating => Color::Yellow,
            GamePhase::Playing => Color::Cyan,
            GamePhase::Endurance => Color::Magenta,
            GamePhase::GameOver => Color::Red,
        }
    }

    /// Emoji marker for status lines
    pub fn emoji(&self) -> &'static str {
        match self {
            GamePhase::Menu => "🏠",
            GamePhase::Calibrating => "🎯",
            GamePhase::Playing => "👁",
            GamePhase::Endurance => "🔥",
            GamePhase::GameOver => "💀",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Menu => "MENU",
            GamePhase::Calibrating => "CALIBRATING",
            GamePhase::Playing => "PLAYING",
            GamePhase::Endurance => "ENDURANCE",
            GamePhase::GameOver => "GAME_OVER",
        };
        write!(f, "{}", name)
    }
}
