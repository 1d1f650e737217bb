//! Core types for playback tracking

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A podcast episode that can be played
///
/// Loaded from the API and never mutated afterwards. Selecting another
/// episode replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackItem {
    /// Unique item identifier from the API
    pub id: String,

    /// Display title
    pub title: String,

    /// Optional description shown in the info panel
    #[serde(default)]
    pub description: Option<String>,

    /// Duration in seconds
    pub duration: f64,

    /// Audio resource locator
    #[serde(alias = "s3_audio_key")]
    pub audio_url: String,

    /// Plain text transcript locator
    #[serde(default, alias = "transcriptTxtUrl")]
    pub transcript_txt_url: Option<String>,

    /// WebVTT transcript locator (preferred when present)
    #[serde(default, alias = "transcriptVttUrl")]
    pub transcript_vtt_url: Option<String>,

    /// Last persisted completion percentage (0-100)
    #[serde(default, alias = "currentProgress")]
    pub current_progress: f64,

    /// Last used playback speed
    #[serde(default = "default_speed", alias = "currentSpeed")]
    pub current_speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

impl PlaybackItem {
    /// Duration with unknown or negative values mapped to zero
    pub fn duration_seconds(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }

    /// Transcript locator to fetch: VTT first, then plain text
    pub fn transcript_url(&self) -> Option<&str> {
        self.transcript_vtt_url
            .as_deref()
            .or(self.transcript_txt_url.as_deref())
    }

    /// Listening status badge for this item given the live playback state
    pub fn status(&self, state: &PlaybackState) -> ListeningStatus {
        let is_current = state
            .current_item
            .as_ref()
            .is_some_and(|current| current.id == self.id);

        if is_current && state.is_playing {
            ListeningStatus::Playing
        } else if self.current_progress > 0.0 {
            ListeningStatus::InProgress
        } else {
            ListeningStatus::New
        }
    }
}

/// Status badge shown next to each item in the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListeningStatus {
    /// Currently playing
    Playing,

    /// Started but not currently playing
    InProgress,

    /// Never started
    New,
}

/// Allowed playback speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackRate {
    /// 0.5x
    Half,

    /// 0.75x
    ThreeQuarters,

    /// 1x
    #[default]
    Normal,

    /// 1.25x
    OneAndQuarter,

    /// 1.5x
    OneAndHalf,

    /// 2x
    Double,
}

impl PlaybackRate {
    /// Every selectable speed, slowest first
    pub const ALL: [PlaybackRate; 6] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    /// Speed multiplier
    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - value).abs() < f64::EPSILON)
            .ok_or(TrackerError::UnsupportedRate(value))
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f64()
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

/// Live playback state held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Item attached to the player, if any
    pub current_item: Option<PlaybackItem>,

    /// Whether playback is running
    pub is_playing: bool,

    /// Position in seconds, clamped to `[0, duration]`
    pub position_seconds: f64,

    /// Volume in `[0, 1]`
    pub volume: f64,

    /// Playback speed
    pub rate: PlaybackRate,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_item: None,
            is_playing: false,
            position_seconds: 0.0,
            volume: 1.0,
            rate: PlaybackRate::Normal,
        }
    }
}

/// Periodically sampled listening progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Position in seconds at sample time
    pub position_seconds: f64,

    /// Completion in percent (0-100)
    pub completion_percentage: f64,

    /// Speed at sample time
    pub playback_speed: f64,

    /// Indices of segments the listener has finished
    pub completed_segments: Vec<u32>,
}

/// Partial progress update, merged field-by-field into [`ProgressSnapshot`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub position_seconds: Option<f64>,
    pub completion_percentage: Option<f64>,
    pub playback_speed: Option<f64>,
    pub completed_segments: Option<Vec<u32>>,
}

impl ProgressSnapshot {
    /// Shallow merge: fields present in `update` overwrite, others are kept
    pub fn merge(&mut self, update: ProgressUpdate) {
        if let Some(position) = update.position_seconds {
            self.position_seconds = position;
        }
        if let Some(percentage) = update.completion_percentage {
            self.completion_percentage = percentage;
        }
        if let Some(speed) = update.playback_speed {
            self.playback_speed = speed;
        }
        if let Some(segments) = update.completed_segments {
            self.completed_segments = segments;
        }
    }
}

/// Aggregate listening statistics supplied by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Total listening time in seconds
    #[serde(alias = "totalTimeListened")]
    pub total_time_listened: f64,

    /// Mean playback speed across sessions
    #[serde(alias = "averageSpeed")]
    pub average_speed: f64,

    /// Number of listening sessions
    #[serde(alias = "numberOfSessions")]
    pub session_count: u32,

    /// Completion ratio (0-1)
    #[serde(alias = "completionRate")]
    pub completion_rate: f64,
}

/// Partial analytics update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsUpdate {
    pub total_time_listened: Option<f64>,
    pub average_speed: Option<f64>,
    pub session_count: Option<u32>,
    pub completion_rate: Option<f64>,
}

impl AnalyticsSummary {
    /// Shallow merge: fields present in `update` overwrite, others are kept
    pub fn merge(&mut self, update: AnalyticsUpdate) {
        if let Some(total) = update.total_time_listened {
            self.total_time_listened = total;
        }
        if let Some(speed) = update.average_speed {
            self.average_speed = speed;
        }
        if let Some(sessions) = update.session_count {
            self.session_count = sessions;
        }
        if let Some(rate) = update.completion_rate {
            self.completion_rate = rate;
        }
    }
}

impl From<AnalyticsSummary> for AnalyticsUpdate {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            total_time_listened: Some(summary.total_time_listened),
            average_speed: Some(summary.average_speed),
            session_count: Some(summary.session_count),
            completion_rate: Some(summary.completion_rate),
        }
    }
}

/// What the sampler hands to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub item_id: String,
    pub position_seconds: f64,
    pub completion_percentage: f64,
}

/// Configuration for the media tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Seconds between progress samples while playing (default: 15)
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,

    /// Initial volume, 0-1 (default: 1.0)
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Initial speed (default: 1x)
    #[serde(default)]
    pub rate: PlaybackRate,

    /// Skip back/forward step in seconds (default: 10)
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,
}

fn default_sample_interval_secs() -> u64 {
    15
}

fn default_volume() -> f64 {
    1.0
}

fn default_seek_step_secs() -> f64 {
    10.0
}

impl TrackerConfig {
    /// Sampling cadence as a [`Duration`]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: default_sample_interval_secs(),
            volume: default_volume(),
            rate: PlaybackRate::Normal,
            seek_step_secs: default_seek_step_secs(),
        }
    }
}
