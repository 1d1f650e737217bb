//! Controls surface
//!
//! User intents applied to the resource first and the store second. The
//! store only changes after the resource accepted the command. Every
//! control is a no-op while nothing is bound.

use crate::binder::TransportBinder;
use crate::error::Result;
use crate::events::TrackerEvent;
use crate::resource::PlaybackResource;
use crate::sampler::Sampler;
use crate::store::SharedStore;
use crate::types::PlaybackRate;
use tracing::{debug, warn};

/// Borrowed view over the tracker used to issue commands
///
/// Obtained from [`MediaTracker::controls`](crate::MediaTracker::controls).
pub struct Controls<'a> {
    pub(crate) binder: &'a mut TransportBinder,
    pub(crate) store: SharedStore,
    pub(crate) sampler: &'a mut Sampler,
    pub(crate) events: &'a mut Vec<TrackerEvent>,
    pub(crate) seek_step: f64,
}

impl Controls<'_> {
    /// Play when paused, pause when playing
    ///
    /// If the resource rejects the command the store keeps its previous
    /// state and the error is returned (and queued as an event).
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let Some(resource) = self.binder.resource_mut() else {
            debug!("Toggle ignored, nothing bound");
            return Ok(());
        };

        let was_playing = self.store.borrow().is_playing();
        let result = if was_playing {
            resource.pause()
        } else {
            resource.play()
        };

        if let Err(e) = result {
            warn!(error = %e, was_playing, "Resource rejected play/pause");
            self.events.push(TrackerEvent::Error {
                message: e.to_string(),
            });
            return Err(e);
        }

        // Phase resets on every toggle
        self.sampler.reset();
        self.store.borrow_mut().set_playing(!was_playing);
        self.events.push(TrackerEvent::StateChanged {
            is_playing: !was_playing,
        });
        Ok(())
    }

    /// Move relative to the resource's current position
    pub fn seek_by(&mut self, delta_seconds: f64) {
        let Some(current) = self.binder.resource().map(|r| r.position()) else {
            debug!("Seek ignored, nothing bound");
            return;
        };
        self.seek_to(current + delta_seconds);
    }

    /// Jump back by the configured step
    pub fn skip_back(&mut self) {
        self.seek_by(-self.seek_step);
    }

    /// Jump forward by the configured step
    pub fn skip_forward(&mut self) {
        self.seek_by(self.seek_step);
    }

    /// Move to an absolute position, clamped to `[0, duration]`
    pub fn seek_to(&mut self, seconds: f64) {
        let fallback = self
            .store
            .borrow()
            .current_item()
            .map(|item| item.duration_seconds())
            .unwrap_or(0.0);

        let Some(resource) = self.binder.resource_mut() else {
            debug!("Seek ignored, nothing bound");
            return;
        };

        let duration = usable_duration(resource, fallback);
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, duration)
        };

        resource.set_position(target);
        self.store.borrow_mut().set_position(target);
        self.events.push(TrackerEvent::PositionChanged {
            position_seconds: target,
        });
    }

    /// Set volume from a 0-100 slider value
    pub fn set_volume_percent(&mut self, percent: f64) {
        let Some(resource) = self.binder.resource_mut() else {
            debug!("Volume change ignored, nothing bound");
            return;
        };

        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        let volume = percent / 100.0;

        resource.set_volume(volume);
        self.store.borrow_mut().set_volume(volume);
        self.events.push(TrackerEvent::VolumeChanged { volume });
    }

    /// Silence when audible, full volume when silent
    pub fn toggle_mute(&mut self) {
        let muted = self.store.borrow().playback().volume == 0.0;
        self.set_volume_percent(if muted { 100.0 } else { 0.0 });
    }

    /// Change playback speed
    pub fn set_rate(&mut self, rate: PlaybackRate) {
        let Some(resource) = self.binder.resource_mut() else {
            debug!("Rate change ignored, nothing bound");
            return;
        };

        resource.set_rate(rate.as_f64());
        self.store.borrow_mut().set_rate(rate);
        self.events.push(TrackerEvent::RateChanged { rate });
    }
}

/// Resource duration when known, otherwise the item's advertised duration
fn usable_duration(resource: &dyn PlaybackResource, fallback: f64) -> f64 {
    let duration = resource.duration();
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        fallback
    }
}
