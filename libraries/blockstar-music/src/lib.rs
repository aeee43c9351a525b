//! Blockstar - Background Music
//!
//! Owns the game's background music: a catalog of bundled tracks grouped
//! by category and at most one native player at a time.
//!
//! This crate provides:
//! - Track catalog (menu and level music)
//! - Playback lifecycle (initialize, play, pause/resume, destroy)
//! - Volume control (0-100% of the device's music stream maximum)
//! - Screen lifecycle hooks for the UI layer
//! - A simulated host for headless runs and tests
//!
//! # Architecture
//!
//! The manager never talks to a platform directly. Native players are
//! created through the [`HostEnvironment`] / [`AudioService`] /
//! [`NativePlayer`] traits. Player creation is asynchronous relative to
//! audio readiness: `play` returns once the player is configured, and
//! playback starts when the host delivers the player's ready notification.
//!
//! # Example
//!
//! ```rust
//! use blockstar_music::{PlaybackManager, PlaybackState, SimulatedHost, TrackCategory};
//!
//! let host = SimulatedHost::new();
//! let manager = PlaybackManager::default();
//!
//! manager.initialize(&host, 100).unwrap();
//! manager.play_track(TrackCategory::Menu, 0).unwrap();
//! assert_eq!(manager.state(), PlaybackState::Preparing);
//!
//! // Host reports the track as prepared
//! host.complete_preparation();
//! assert_eq!(manager.state(), PlaybackState::Playing);
//!
//! manager.pause().unwrap();
//! assert_eq!(manager.state(), PlaybackState::Paused);
//!
//! manager.destroy();
//! assert_eq!(host.live_players(), 0);
//! ```

mod catalog;
pub mod config;
mod error;
pub mod host;
mod manager;
pub mod screen;
mod session;
pub mod simulated;
pub mod types;
mod volume;

// Public exports
pub use self::config::MusicConfig;
pub use error::{MusicError, Result};
pub use host::{AudioService, HostEnvironment, NativePlayer, ReadyCallback, SubscriptionId};
pub use manager::PlaybackManager;
pub use screen::ScreenLifecycle;
pub use simulated::{PlayerRecord, ReadyDispatch, SimulatedHost};
pub use types::{
    default_bundle, NowPlaying, PlaybackState, TrackCategory, TrackHandle, TrackRegistration,
    MENU_MUSIC,
};
pub use volume::{player_gain, Volume, DEFAULT_VOLUME_PERCENT};
