//! Playback resource abstraction
//!
//! The thing that actually renders audio and advances time: an HTML audio
//! element behind wasm bindings, a native decoder, or a mock in tests.

use crate::error::Result;
use crate::types::PlaybackItem;

/// Handle returned when registering a resource listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback for "position advanced", receives the new position in seconds
pub type PositionListener = Box<dyn FnMut(f64)>;

/// Callback for "playback ended"
pub type EndedListener = Box<dyn FnMut()>;

/// Platform playback resource
///
/// Implementors own the audio pipeline and are the authority on position
/// and duration. The tracker only reads them and issues commands.
///
/// Listeners must be invoked in the order the resource produces events, and
/// a listener removed with [`remove_listener`](Self::remove_listener) must
/// never be invoked again.
pub trait PlaybackResource {
    /// Attach an item's audio
    fn load(&mut self, item: &PlaybackItem) -> Result<()>;

    /// Detach the current audio and release platform resources
    fn unload(&mut self);

    /// Start or resume playback
    ///
    /// Returns an error when the platform refuses (for example an autoplay
    /// policy), in which case the resource stays paused.
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Move the playhead
    fn set_position(&mut self, seconds: f64);

    /// Total duration in seconds (0 or NaN while metadata is unknown)
    fn duration(&self) -> f64;

    /// Current volume (0-1)
    fn volume(&self) -> f64;

    /// Set volume (0-1)
    fn set_volume(&mut self, volume: f64);

    /// Current speed multiplier
    fn rate(&self) -> f64;

    /// Set speed multiplier
    fn set_rate(&mut self, rate: f64);

    /// Register a "position advanced" listener
    fn on_position_changed(&mut self, listener: PositionListener) -> ListenerId;

    /// Register a "playback ended" listener
    fn on_ended(&mut self, listener: EndedListener) -> ListenerId;

    /// Remove a listener, returns false if it was not registered
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}
