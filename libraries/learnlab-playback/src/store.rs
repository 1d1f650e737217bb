//! Observable playback store
//!
//! Single source of truth read by every presentational layer. State is only
//! reachable through the setters below, and every setter notifies
//! subscribers synchronously after the write.

use crate::types::{
    AnalyticsSummary, AnalyticsUpdate, PlaybackItem, PlaybackRate, PlaybackState,
    ProgressSnapshot, ProgressUpdate, TrackerConfig,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Store handle shared by the tracker, the resource listeners and the UI
pub type SharedStore = Rc<RefCell<PlaybackStore>>;

/// Subscriber callback, invoked after every mutation
///
/// Subscribers receive the new state by reference and must not call back
/// into the store from inside the callback.
pub type StoreListener = Box<dyn FnMut(&StoreState)>;

/// Handle returned by [`PlaybackStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Everything the store holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Live playback state
    pub playback: PlaybackState,

    /// Latest sampled progress, if any
    pub progress: Option<ProgressSnapshot>,

    /// Latest analytics received from the API
    pub analytics: Option<AnalyticsSummary>,

    /// Items available for selection
    pub items: Vec<PlaybackItem>,

    /// Item highlighted in the list view
    pub selected_item_id: Option<String>,
}

/// Playback store with whitelisted mutators
pub struct PlaybackStore {
    state: StoreState,
    listeners: Vec<(SubscriptionId, StoreListener)>,
    next_subscription: u64,
}

impl PlaybackStore {
    /// Create an empty store with default volume and speed
    pub fn new() -> Self {
        Self {
            state: StoreState::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create an empty store seeded from tracker configuration
    pub fn with_config(config: &TrackerConfig) -> Self {
        let mut store = Self::new();
        store.state.playback.volume = clamp_volume(config.volume);
        store.state.playback.rate = config.rate;
        store
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    // ===== Reads =====

    /// Full state
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Playback portion of the state
    pub fn playback(&self) -> &PlaybackState {
        &self.state.playback
    }

    /// Currently attached item
    pub fn current_item(&self) -> Option<&PlaybackItem> {
        self.state.playback.current_item.as_ref()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.state.playback.is_playing
    }

    // ===== Mutations =====

    /// Replace the current item
    ///
    /// Position and playing flag are carried over, with the position
    /// clamped to the new item's duration. Callers that want a fresh start
    /// reset them explicitly.
    pub fn set_current_item(&mut self, item: Option<PlaybackItem>) {
        self.state.playback.position_seconds =
            clamp_position(self.state.playback.position_seconds, item.as_ref());
        self.state.playback.current_item = item;
        self.notify();
    }

    /// Set the playing flag
    pub fn set_playing(&mut self, is_playing: bool) {
        self.state.playback.is_playing = is_playing;
        self.notify();
    }

    /// Set position, clamped to `[0, duration]`
    pub fn set_position(&mut self, seconds: f64) {
        self.state.playback.position_seconds =
            clamp_position(seconds, self.state.playback.current_item.as_ref());
        self.notify();
    }

    /// Set volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f64) {
        self.state.playback.volume = clamp_volume(volume);
        self.notify();
    }

    /// Set playback speed
    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.state.playback.rate = rate;
        self.notify();
    }

    /// Merge a partial progress update, creating the snapshot if absent
    pub fn merge_progress(&mut self, update: ProgressUpdate) {
        self.state
            .progress
            .get_or_insert_with(ProgressSnapshot::default)
            .merge(update);
        self.notify();
    }

    /// Merge a partial analytics update, creating the summary if absent
    pub fn merge_analytics(&mut self, update: AnalyticsUpdate) {
        self.state
            .analytics
            .get_or_insert_with(AnalyticsSummary::default)
            .merge(update);
        self.notify();
    }

    /// Replace the list of available items
    pub fn set_items(&mut self, items: Vec<PlaybackItem>) {
        self.state.items = items;
        self.notify();
    }

    /// Set the highlighted item in the list view
    pub fn set_selected_item_id(&mut self, id: Option<String>) {
        self.state.selected_item_id = id;
        self.notify();
    }

    /// Drop the current item and rewind (deselect / navigate away)
    ///
    /// Volume, speed, items and analytics survive a reset.
    pub fn reset(&mut self) {
        let playback = &mut self.state.playback;
        playback.current_item = None;
        playback.is_playing = false;
        playback.position_seconds = 0.0;
        self.notify();
    }

    // ===== Subscriptions =====

    /// Register a subscriber
    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a subscriber, returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() < before
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlaybackStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackStore")
            .field("state", &self.state)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// Clamp a position to `[0, duration]` of the given item
///
/// Without an item only the lower bound applies. NaN maps to zero.
pub(crate) fn clamp_position(seconds: f64, item: Option<&PlaybackItem>) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    let seconds = seconds.max(0.0);
    match item {
        Some(item) => seconds.min(item.duration_seconds()),
        None => seconds,
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
