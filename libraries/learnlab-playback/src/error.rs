//! Error types for playback tracking

use thiserror::Error;

/// Tracker errors
///
/// None of these are fatal. Controls return them so the caller can surface
/// a notification, and the tracker also queues them as events.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The playback resource rejected a command (autoplay policy, decode failure, ...)
    #[error("Playback resource error: {0}")]
    Resource(String),

    /// The resource could not load the item's audio
    #[error("Failed to load item {item_id}: {reason}")]
    LoadFailed { item_id: String, reason: String },

    /// Rate outside the allowed speed set
    #[error("Unsupported playback rate: {0}")]
    UnsupportedRate(f64),

    /// Malformed transcript cue timestamp
    #[error("Invalid transcript timestamp: {0}")]
    InvalidTimestamp(String),
}

impl TrackerError {
    /// Create a resource error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
