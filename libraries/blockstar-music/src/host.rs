//! Host environment contract
//!
//! Abstracts the platform audio services the music manager drives. The
//! manager never talks to a platform directly; each platform (and the
//! simulated host used by tests) implements these traits.

use crate::error::Result;
use crate::types::TrackHandle;
use std::sync::Arc;

/// Notification invoked when a native player finished preparing its track
pub type ReadyCallback = Arc<dyn Fn() + Send + Sync>;

/// Identifies one ready-callback subscription on a native player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Access point to the platform's audio services
pub trait HostEnvironment: Send + Sync {
    /// Bind to the system audio service
    ///
    /// Returns `None` when the platform has no audio service available.
    fn audio_service(&self) -> Option<Arc<dyn AudioService>>;
}

/// Platform audio service
pub trait AudioService: Send + Sync {
    /// Create a native player bound to a bundled track
    ///
    /// Creation is asynchronous relative to audio readiness: the player is
    /// not guaranteed to be able to produce sound until its ready
    /// notification fires.
    fn create_player(&self, track: TrackHandle) -> Result<Box<dyn NativePlayer>>;

    /// Maximum gain of the music stream
    fn max_stream_gain(&self) -> f32;

    /// Release resources held by the binding
    fn unload(&self) {}
}

/// One native audio player
///
/// Implementations must deliver ready notifications from outside
/// `subscribe_ready` (typically from a platform callback thread).
pub trait NativePlayer: Send {
    fn set_looping(&mut self, looping: bool);

    fn set_gain(&mut self, gain: f32);

    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Free the native resources; the player is unusable afterwards
    fn release(&mut self);

    fn is_playing(&self) -> bool;

    /// Register a callback for the "prepared" event
    fn subscribe_ready(&mut self, callback: ReadyCallback) -> SubscriptionId;

    fn unsubscribe_ready(&mut self, subscription: SubscriptionId);
}
