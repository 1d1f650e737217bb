//! Tracker events
//!
//! Queued by the tracker and drained by the UI layer. Events are emitted at:
//! - Play/pause changes
//! - Binder transitions (item bound / unbound)
//! - Seeks, volume and speed changes
//! - Progress samples
//! - Rejected resource commands

use crate::types::{PlaybackRate, ProgressReport};
use serde::{Deserialize, Serialize};

/// Events emitted by the media tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// Playing flag changed after a confirmed resource command
    StateChanged {
        /// New playing flag
        is_playing: bool,
    },

    /// An item was attached to the resource and its listeners registered
    ItemBound {
        /// ID of the bound item
        item_id: String,
        /// Position the resource was resumed at
        resume_position: f64,
    },

    /// Listeners were removed and the resource detached
    ItemUnbound {
        /// ID of the item that was bound
        item_id: String,
    },

    /// Position changed through a seek control
    PositionChanged {
        /// New position in seconds
        position_seconds: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume (0-1)
        volume: f64,
    },

    /// Speed changed
    RateChanged {
        /// New speed
        rate: PlaybackRate,
    },

    /// Sampler produced a progress report
    ProgressSampled {
        /// Report handed to the persistence collaborator
        report: ProgressReport,
    },

    /// A resource command failed; the store was left unchanged
    Error {
        /// Error message
        message: String,
    },
}

impl TrackerEvent {
    /// Whether this event describes a binder transition
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            TrackerEvent::ItemBound { .. } | TrackerEvent::ItemUnbound { .. }
        )
    }
}
