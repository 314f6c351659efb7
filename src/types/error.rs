//! Error taxonomy
//!
//! Camera-acquisition errors are the only failures fatal to a session
//! attempt. Everything else is absorbed at the boundary that detects it and
//! degrades to a dropped frame or an empty result.

use serde::{Deserialize, Serialize};

/// Why camera acquisition failed. Aborts the Menu -> Calibrating transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraError {
    PermissionDenied,
    NotFound,
    Busy,
}

impl CameraError {
    /// User-facing message for the menu screen
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => {
                "Camera permission denied. Enable camera access for this app and try again."
            }
            CameraError::NotFound => "No camera found on this device.",
            CameraError::Busy => {
                "Camera is being used by another app. Close other apps and try again."
            }
        }
    }
}

impl std::fmt::Display for CameraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CameraError::PermissionDenied => "PERMISSION_DENIED",
            CameraError::NotFound => "NOT_FOUND",
            CameraError::Busy => "BUSY",
        };
        write!(f, "{}", name)
    }
}

impl std::error::Error for CameraError {}

/// Local persistence failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    ReadFailed,
    WriteFailed,
    SerializeFailed,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StoreError::ReadFailed => "store read failed",
            StoreError::WriteFailed => "store write failed",
            StoreError::SerializeFailed => "store serialization failed",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for StoreError {}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_messages_are_categorized() {
        assert!(CameraError::PermissionDenied
            .user_message()
            .contains("permission"));
        assert!(CameraError::NotFound.user_message().contains("No camera"));
        assert!(CameraError::Busy.user_message().contains("another app"));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(CameraError::PermissionDenied.to_string(), "PERMISSION_DENIED");
        assert_eq!(StoreError::ReadFailed.to_string(), "store read failed");
    }
}
