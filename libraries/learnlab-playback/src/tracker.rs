//! Media tracker - composition root
//!
//! Owns the store handle, the transport binder, the sampler and the event
//! queue, and wires them together.

use crate::{
    binder::TransportBinder,
    controls::Controls,
    events::TrackerEvent,
    resource::PlaybackResource,
    sampler::{ProgressSink, Sampler},
    store::{PlaybackStore, SharedStore, StoreState},
    types::{PlaybackItem, ProgressReport, TrackerConfig},
};
use std::rc::Rc;
use std::time::Instant;
use tracing::debug;

/// Podcast playback and progress tracking
///
/// Orchestrates:
/// - The observable store (single source of truth for the UI)
/// - Binding the playback resource to the selected item
/// - Periodic progress sampling and reporting
/// - User controls (play/pause, seek, volume, speed)
///
/// The host calls [`tick`](Self::tick) from its event loop; the tracker
/// never spawns threads or timers of its own.
pub struct MediaTracker {
    config: TrackerConfig,
    store: SharedStore,
    binder: TransportBinder,
    sampler: Sampler,
    progress_sink: Option<Box<dyn ProgressSink>>,
    pending_events: Vec<TrackerEvent>,
}

impl MediaTracker {
    /// Create a tracker with a fresh store
    pub fn new(config: TrackerConfig, resource: Box<dyn PlaybackResource>) -> Self {
        let store = PlaybackStore::with_config(&config).into_shared();
        Self::with_store(config, store, resource)
    }

    /// Create a tracker around an existing store handle
    pub fn with_store(
        config: TrackerConfig,
        store: SharedStore,
        resource: Box<dyn PlaybackResource>,
    ) -> Self {
        let binder = TransportBinder::new(resource, Rc::clone(&store));
        let sampler = Sampler::new(config.sample_interval());

        Self {
            config,
            store,
            binder,
            sampler,
            progress_sink: None,
            pending_events: Vec::new(),
        }
    }

    /// Attach the persistence collaborator
    pub fn set_progress_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.progress_sink = Some(sink);
    }

    /// Builder-style [`set_progress_sink`](Self::set_progress_sink)
    pub fn with_progress_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Tracker configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared store handle, for subscribing and reading
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Copy of the current store state
    pub fn snapshot(&self) -> StoreState {
        self.store.borrow().state().clone()
    }

    /// Transport binder
    pub fn binder(&self) -> &TransportBinder {
        &self.binder
    }

    /// Sampler
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    // ===== Selection =====

    /// Select an item (or clear with `None`) and rebind
    ///
    /// Position and playing flag are carried over; use
    /// [`deselect`](Self::deselect) for a clean reset.
    pub fn select_item(&mut self, item: Option<PlaybackItem>) {
        {
            let mut store = self.store.borrow_mut();
            store.set_selected_item_id(item.as_ref().map(|i| i.id.clone()));
            store.set_current_item(item);
        }
        self.sync();
    }

    /// Select an item from the store's item list by ID
    ///
    /// Returns false if no such item is listed.
    pub fn select_item_by_id(&mut self, id: &str) -> bool {
        let item = self
            .store
            .borrow()
            .state()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned();

        match item {
            Some(item) => {
                self.select_item(Some(item));
                true
            }
            None => false,
        }
    }

    /// Drop the current item and rewind (user navigated away)
    pub fn deselect(&mut self) {
        {
            let mut store = self.store.borrow_mut();
            store.reset();
            store.set_selected_item_id(None);
        }
        self.sampler.reset();
        self.sync();
    }

    /// Reconcile the binder with the store
    ///
    /// Called by [`select_item`](Self::select_item) and on every tick, so
    /// changes made directly through the store are picked up as well.
    pub fn sync(&mut self) {
        let events = self.binder.sync();
        if events.iter().any(TrackerEvent::is_transition) {
            self.sampler.reset();
        }
        self.pending_events.extend(events);
    }

    // ===== Controls =====

    /// Command surface for play/pause, seek, volume and speed
    pub fn controls(&mut self) -> Controls<'_> {
        Controls {
            binder: &mut self.binder,
            store: Rc::clone(&self.store),
            sampler: &mut self.sampler,
            events: &mut self.pending_events,
            seek_step: self.config.seek_step_secs,
        }
    }

    // ===== Sampling =====

    /// Drive the tracker from the host event loop
    ///
    /// Reconciles the binding, advances the sampler and, when a sample is
    /// due, merges it into the store, queues a `ProgressSampled` event and
    /// hands the report to the progress sink.
    pub fn tick(&mut self, now: Instant) -> Option<ProgressReport> {
        self.sync();

        let is_playing = self.store.borrow().is_playing() && self.binder.is_bound();
        if !self.sampler.poll(now, is_playing) {
            return None;
        }

        let item_id = self.binder.bound_item_id()?.to_owned();
        let resource = self.binder.resource()?;
        let rate = self.store.borrow().playback().rate;
        let (report, update) = Sampler::sample(&item_id, resource, rate);

        self.store.borrow_mut().merge_progress(update);
        debug!(
            item_id = %report.item_id,
            position = report.position_seconds,
            completion = report.completion_percentage,
            "Sampled progress"
        );

        if let Some(sink) = &self.progress_sink {
            sink.report(&report);
        }
        self.pending_events.push(TrackerEvent::ProgressSampled {
            report: report.clone(),
        });

        Some(report)
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// The UI should call this after each tick or command.
    pub fn drain_events(&mut self) -> Vec<TrackerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}
