//! Core modules for Blink Stop

pub mod api;
pub mod audio;
pub mod blink;
pub mod calibration;
pub mod ear;
pub mod leaderboard;
pub mod scheduler;
pub mod session;

pub use api::{create_router, run_server, ApiConfig};
pub use audio::{AudioCue, AudioDirector, HeartbeatPacer};
pub use blink::{BlinkClassifier, BlinkConfig};
pub use calibration::{CalibrationController, CalibrationState};
pub use ear::{average_ear, eye_aspect_ratio};
pub use leaderboard::{
    FileStore, KeyValueStore, LocalLeaderboard, MemoryRemote, MemoryStore, RemoteLeaderboard,
    ScoreAdapter,
};
pub use scheduler::{DetectionScheduler, InferenceError, SchedulerConfig};
pub use session::{GameEngine, SessionConfig};
