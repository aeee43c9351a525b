//! The single active native player and its ready subscription

use crate::host::{NativePlayer, SubscriptionId};
use crate::types::NowPlaying;
use tracing::debug;

/// Identifies one session across its lifetime
///
/// Tokens are never reused, so a ready notification captured for an old
/// session can never match a newer one.
pub(crate) type SessionToken = u64;

/// Currently active native player
///
/// The player and its ready subscription live and die together.
pub(crate) struct Session {
    pub token: SessionToken,
    pub now_playing: NowPlaying,
    player: Box<dyn NativePlayer>,
    subscription: SubscriptionId,

    /// Ready notification has been delivered
    ready: bool,

    /// Start the player once the ready notification arrives
    start_on_ready: bool,
}

impl Session {
    pub fn new(
        token: SessionToken,
        now_playing: NowPlaying,
        player: Box<dyn NativePlayer>,
        subscription: SubscriptionId,
    ) -> Self {
        Self {
            token,
            now_playing,
            player,
            subscription,
            ready: false,
            start_on_ready: true,
        }
    }

    /// Handle the native ready notification
    ///
    /// Returns true if playback was started.
    pub fn on_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        if self.start_on_ready && !self.player.is_playing() {
            self.player.start();
            return true;
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Waiting on the ready notification with a start still pending
    pub fn is_preparing(&self) -> bool {
        !self.ready && self.start_on_ready
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.player.set_gain(gain);
    }

    /// Start the player, or re-arm the pending start if it is not prepared yet
    pub fn resume(&mut self) {
        self.start_on_ready = true;
        if self.ready && !self.player.is_playing() {
            self.player.start();
        }
    }

    pub fn pause(&mut self) {
        // A pause before the track is prepared cancels the pending start.
        self.start_on_ready = false;
        if self.player.is_playing() {
            self.player.pause();
        }
    }

    /// Unsubscribe, stop and release the native player
    pub fn teardown(mut self) {
        debug!(
            "Tearing down session {} ({} #{}, {})",
            self.token, self.now_playing.category, self.now_playing.index, self.now_playing.handle
        );
        self.player.unsubscribe_ready(self.subscription);
        self.player.stop();
        self.player.release();
    }
}
