//! Transport binder
//!
//! Keeps the playback resource in step with the store. Store state flows
//! into the resource when an item is bound; resource events ("position
//! advanced", "playback ended") flow back into the store while it stays
//! bound.
//!
//! Teardown order is fixed: listeners are removed before the resource is
//! unloaded, so a callback belonging to a previous item can never write into
//! the store once the next item is bound.

use crate::error::TrackerError;
use crate::events::TrackerEvent;
use crate::resource::{ListenerId, PlaybackResource};
use crate::store::{clamp_position, PlaybackStore, SharedStore};
use crate::types::PlaybackItem;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Binder lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderState {
    /// No item attached
    Idle,

    /// Item loaded, resource configured, listeners registered
    Bound { item_id: String },

    /// Listeners being removed and resource being detached
    Unbound { item_id: String },
}

/// Synchronizes one playback resource with the store
pub struct TransportBinder {
    resource: Box<dyn PlaybackResource>,
    store: SharedStore,
    state: BinderState,
    listeners: Vec<ListenerId>,
    failed_item_id: Option<String>,
    ended: Rc<Cell<bool>>,
}

impl TransportBinder {
    /// Create an idle binder around a resource
    pub fn new(resource: Box<dyn PlaybackResource>, store: SharedStore) -> Self {
        Self {
            resource,
            store,
            state: BinderState::Idle,
            listeners: Vec::new(),
            failed_item_id: None,
            ended: Rc::new(Cell::new(false)),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> &BinderState {
        &self.state
    }

    /// ID of the bound item, if any
    pub fn bound_item_id(&self) -> Option<&str> {
        match &self.state {
            BinderState::Bound { item_id } => Some(item_id),
            BinderState::Idle | BinderState::Unbound { .. } => None,
        }
    }

    /// Whether an item is bound
    pub fn is_bound(&self) -> bool {
        self.bound_item_id().is_some()
    }

    /// The resource, only while an item is bound
    pub fn resource(&self) -> Option<&dyn PlaybackResource> {
        if self.is_bound() {
            Some(self.resource.as_ref())
        } else {
            None
        }
    }

    /// Mutable resource access, only while an item is bound
    pub fn resource_mut(&mut self) -> Option<&mut dyn PlaybackResource> {
        if self.is_bound() {
            Some(self.resource.as_mut())
        } else {
            None
        }
    }

    /// Reconcile the binding with the store's current item
    ///
    /// Unbinds when the item was cleared or replaced, then binds the new
    /// item. Returns the events that happened, in order, starting with a
    /// pause reported by the resource since the last sync. An item that
    /// failed to load is not retried until the selection changes.
    pub fn sync(&mut self) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if self.ended.replace(false) {
            events.push(TrackerEvent::StateChanged { is_playing: false });
        }

        let wanted = self.store.borrow().current_item().cloned();
        if wanted.is_none() {
            self.failed_item_id = None;
        }

        let unchanged = match (&wanted, self.bound_item_id()) {
            (None, None) => true,
            (Some(item), Some(bound)) => item.id == bound,
            (Some(item), None) => self.failed_item_id.as_deref() == Some(item.id.as_str()),
            (None, Some(_)) => false,
        };
        if unchanged {
            return events;
        }
        self.failed_item_id = None;

        events.extend(self.unbind());
        if let Some(item) = wanted {
            events.extend(self.bind(&item));
        }
        events
    }

    /// Remove listeners and detach the resource
    ///
    /// Returns `None` when nothing was bound.
    pub fn unbind(&mut self) -> Option<TrackerEvent> {
        let item_id = self.bound_item_id()?.to_owned();
        self.state = BinderState::Unbound {
            item_id: item_id.clone(),
        };

        for id in self.listeners.drain(..) {
            if !self.resource.remove_listener(id) {
                warn!(item_id = %item_id, listener = ?id, "Listener already gone during unbind");
            }
        }
        self.resource.unload();

        self.state = BinderState::Idle;
        debug!(item_id = %item_id, "Unbound playback resource");

        Some(TrackerEvent::ItemUnbound { item_id })
    }

    fn bind(&mut self, item: &PlaybackItem) -> Vec<TrackerEvent> {
        let mut events = Vec::new();

        if let Err(e) = self.resource.load(item) {
            let error = TrackerError::LoadFailed {
                item_id: item.id.clone(),
                reason: e.to_string(),
            };
            warn!(item_id = %item.id, error = %e, "Failed to load item");
            self.failed_item_id = Some(item.id.clone());
            events.push(TrackerEvent::Error {
                message: error.to_string(),
            });
            return events;
        }

        // Resume from the store, not from zero
        let (volume, rate, stored_position, wants_playback) = {
            let store = self.store.borrow();
            let playback = store.playback();
            (
                playback.volume,
                playback.rate,
                playback.position_seconds,
                playback.is_playing,
            )
        };
        let resume_position = clamp_position(stored_position, Some(item));

        self.resource.set_volume(volume);
        self.resource.set_rate(rate.as_f64());
        self.resource.set_position(resume_position);

        if resume_position != stored_position {
            self.store.borrow_mut().set_position(resume_position);
        }

        let position_store = Rc::downgrade(&self.store);
        let position_id = self.resource.on_position_changed(Box::new(move |seconds| {
            with_store(&position_store, |store| store.set_position(seconds));
        }));

        let ended_store = Rc::downgrade(&self.store);
        let ended_flag = Rc::downgrade(&self.ended);
        let ended_id = self.resource.on_ended(Box::new(move || {
            with_store(&ended_store, |store| {
                store.set_playing(false);
                store.set_position(0.0);
            });
            if let Some(flag) = ended_flag.upgrade() {
                flag.set(true);
            }
        }));

        self.listeners = vec![position_id, ended_id];
        self.state = BinderState::Bound {
            item_id: item.id.clone(),
        };
        debug!(item_id = %item.id, resume_position, "Bound playback resource");

        events.push(TrackerEvent::ItemBound {
            item_id: item.id.clone(),
            resume_position,
        });

        // Switching items mid-playback keeps playing, but only if the
        // resource confirms it.
        if wants_playback {
            if let Err(e) = self.resource.play() {
                warn!(item_id = %item.id, error = %e, "Resource refused to resume playback");
                self.store.borrow_mut().set_playing(false);
                events.push(TrackerEvent::StateChanged { is_playing: false });
                events.push(TrackerEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        events
    }
}

impl Drop for TransportBinder {
    fn drop(&mut self) {
        self.unbind();
    }
}

/// Run `f` against the store if it is still alive and not already borrowed
fn with_store(store: &Weak<RefCell<PlaybackStore>>, f: impl FnOnce(&mut PlaybackStore)) {
    let Some(store) = store.upgrade() else {
        return;
    };
    match store.try_borrow_mut() {
        Ok(mut store) => f(&mut *store),
        Err(_) => warn!("Store busy, dropping resource event"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mock::MockResource;

    fn item(id: &str, duration: f64) -> PlaybackItem {
        PlaybackItem {
            id: id.to_string(),
            title: format!("Episode {}", id),
            description: None,
            duration,
            audio_url: format!("https://cdn.example.com/{}.mp3", id),
            transcript_txt_url: None,
            transcript_vtt_url: None,
            current_progress: 0.0,
            current_speed: 1.0,
        }
    }

    fn setup() -> (TransportBinder, SharedStore, MockResource) {
        let store = PlaybackStore::new().into_shared();
        let resource = MockResource::new();
        let binder = TransportBinder::new(Box::new(resource.clone()), Rc::clone(&store));
        (binder, store, resource)
    }

    #[test]
    fn idle_without_item() {
        let (mut binder, _store, resource) = setup();
        assert!(binder.sync().is_empty());
        assert_eq!(binder.state(), &BinderState::Idle);
        assert!(binder.resource().is_none());
        assert!(resource.log().is_empty());
    }

    #[test]
    fn bind_applies_store_state_to_resource() {
        let (mut binder, store, resource) = setup();
        {
            let mut store = store.borrow_mut();
            store.set_volume(0.3);
            store.set_rate(crate::types::PlaybackRate::OneAndHalf);
            store.set_current_item(Some(item("a", 300.0)));
            store.set_position(42.0);
        }

        let events = binder.sync();

        assert_eq!(
            events,
            vec![TrackerEvent::ItemBound {
                item_id: "a".to_string(),
                resume_position: 42.0
            }]
        );
        let bound = binder.resource().unwrap();
        assert_eq!(bound.volume(), 0.3);
        assert_eq!(bound.rate(), 1.5);
        assert_eq!(bound.position(), 42.0);
        assert_eq!(resource.listener_count(), 2);
    }

    #[test]
    fn resume_position_clamped_to_new_item() {
        let (mut binder, store, resource) = setup();
        {
            let mut store = store.borrow_mut();
            store.set_position(500.0);
            store.set_current_item(Some(item("short", 60.0)));
        }

        binder.sync();

        assert_eq!(store.borrow().playback().position_seconds, 60.0);
        assert_eq!(resource.position(), 60.0);
    }

    #[test]
    fn resource_events_reach_store() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();

        resource.emit_position(12.5);
        assert_eq!(store.borrow().playback().position_seconds, 12.5);

        store.borrow_mut().set_playing(true);
        resource.emit_ended();
        let playback = store.borrow().playback().clone();
        assert!(!playback.is_playing);
        assert_eq!(playback.position_seconds, 0.0);
    }

    #[test]
    fn unbind_removes_listeners_before_unload() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();

        let event = binder.unbind();

        assert_eq!(
            event,
            Some(TrackerEvent::ItemUnbound {
                item_id: "a".to_string()
            })
        );
        assert_eq!(binder.state(), &BinderState::Idle);
        assert_eq!(resource.listener_count(), 0);

        let log = resource.log();
        let unload = log.iter().position(|c| c == "unload").unwrap();
        let last_unsubscribe = log.iter().rposition(|c| c == "unsubscribe").unwrap();
        assert!(last_unsubscribe < unload);

        // Stale events no longer reach the store
        resource.emit_position(99.0);
        assert_eq!(store.borrow().playback().position_seconds, 0.0);
    }

    #[test]
    fn ended_is_reported_on_next_sync() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();
        store.borrow_mut().set_playing(true);

        resource.emit_ended();

        assert_eq!(
            binder.sync(),
            vec![TrackerEvent::StateChanged { is_playing: false }]
        );
        assert!(binder.sync().is_empty());
    }

    #[test]
    fn same_item_does_not_rebind() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();
        assert!(binder.sync().is_empty());
        assert_eq!(resource.count("load:a"), 1);
    }

    #[test]
    fn switching_while_playing_resumes_on_new_item() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();
        store.borrow_mut().set_playing(true);

        store.borrow_mut().set_current_item(Some(item("b", 200.0)));
        let events = binder.sync();

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], TrackerEvent::ItemUnbound { item_id } if item_id == "a"));
        assert!(matches!(&events[1], TrackerEvent::ItemBound { item_id, .. } if item_id == "b"));
        assert_eq!(resource.count("play"), 1);
        assert!(store.borrow().is_playing());
    }

    #[test]
    fn rejected_resume_clears_playing_flag() {
        let (mut binder, store, resource) = setup();
        resource.reject_play(true);
        {
            let mut store = store.borrow_mut();
            store.set_playing(true);
            store.set_current_item(Some(item("a", 300.0)));
        }

        let events = binder.sync();

        assert!(matches!(events.last(), Some(TrackerEvent::Error { .. })));
        assert!(events.contains(&TrackerEvent::StateChanged { is_playing: false }));
        assert!(!store.borrow().is_playing());
        assert!(binder.is_bound());
    }

    #[test]
    fn failed_load_stays_idle_until_selection_changes() {
        let (mut binder, store, resource) = setup();
        resource.reject_load(true);
        store.borrow_mut().set_current_item(Some(item("broken", 300.0)));

        let events = binder.sync();
        assert!(matches!(events.as_slice(), [TrackerEvent::Error { .. }]));
        assert_eq!(binder.state(), &BinderState::Idle);
        assert_eq!(resource.listener_count(), 0);

        // Not retried on every sync
        assert!(binder.sync().is_empty());
        assert_eq!(resource.count("load:broken"), 1);

        resource.reject_load(false);
        store.borrow_mut().set_current_item(Some(item("b", 200.0)));
        binder.sync();
        assert_eq!(binder.bound_item_id(), Some("b"));
    }

    #[test]
    fn drop_unbinds() {
        let (mut binder, store, resource) = setup();
        store.borrow_mut().set_current_item(Some(item("a", 300.0)));
        binder.sync();

        drop(binder);

        assert_eq!(resource.listener_count(), 0);
        assert_eq!(resource.count("unload"), 1);
    }
}
