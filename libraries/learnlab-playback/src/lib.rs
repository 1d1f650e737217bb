//! LearnLab - Podcast Playback Tracking
//!
//! Platform-agnostic playback and progress tracking for LearnLab podcasts.
//!
//! This crate provides:
//! - Observable playback store (current item, playing flag, position, volume, speed)
//! - Transport binder keeping a playback resource in step with the store
//! - Periodic progress sampling while playing (15 second cadence by default)
//! - Controls surface (play/pause, seek, skip, volume, mute, speed)
//! - Transcript parsing (WebVTT and plain text) with active line lookup
//!
//! # Architecture
//!
//! `learnlab-playback` is completely platform-agnostic:
//! - No dependency on an audio backend (the resource is a trait)
//! - No dependency on HTTP (progress persistence is a sink trait)
//! - No threads or async runtime; the host drives [`MediaTracker::tick`]
//!
//! The store is the single source of truth the UI renders from. The resource
//! is the authority on position and duration; the store mirrors what the
//! resource confirmed.
//!
//! # Example: Basic Tracking
//!
//! ```rust,ignore
//! use learnlab_playback::{MediaTracker, PlaybackItem, TrackerConfig, PlaybackRate};
//! use std::time::Instant;
//!
//! // `resource` implements PlaybackResource for your platform
//! let mut tracker = MediaTracker::new(TrackerConfig::default(), Box::new(resource))
//!     .with_progress_sink(Box::new(|report: &learnlab_playback::ProgressReport| {
//!         println!("{} at {:.0}%", report.item_id, report.completion_percentage);
//!     }));
//!
//! tracker.select_item(Some(item));
//! tracker.controls().toggle_play_pause()?;
//! tracker.controls().set_rate(PlaybackRate::OneAndHalf);
//!
//! // From the host event loop
//! tracker.tick(Instant::now());
//! for event in tracker.drain_events() {
//!     // update UI
//! }
//! ```
//!
//! # Example: Transcripts
//!
//! ```rust
//! use learnlab_playback::Transcript;
//!
//! let vtt = "WEBVTT\n\n00:00:00.000 --> 00:00:05.000\nWelcome back.";
//! let transcript = Transcript::parse("episode.vtt", vtt, 300.0);
//!
//! assert_eq!(transcript.active_line(2.0).map(|l| l.text.as_str()), Some("Welcome back."));
//! ```

mod binder;
mod controls;
mod error;
mod events;
pub mod format;
mod resource;
mod sampler;
mod store;
mod tracker;
mod transcript;
pub mod types;

// Public exports
pub use binder::{BinderState, TransportBinder};
pub use controls::Controls;
pub use error::{Result, TrackerError};
pub use events::TrackerEvent;
pub use resource::{EndedListener, ListenerId, PlaybackResource, PositionListener};
pub use sampler::{completion_percentage, IntervalTimer, ProgressSink, Sampler};
pub use store::{PlaybackStore, SharedStore, StoreListener, StoreState, SubscriptionId};
pub use tracker::MediaTracker;
pub use transcript::{parse_timestamp, Transcript, TranscriptLine};
pub use types::{
    AnalyticsSummary, AnalyticsUpdate, ListeningStatus, PlaybackItem, PlaybackRate,
    PlaybackState, ProgressReport, ProgressSnapshot, ProgressUpdate, TrackerConfig,
};
